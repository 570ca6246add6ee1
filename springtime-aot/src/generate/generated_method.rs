//! Methods of [GeneratedClass](crate::generate::generated_class::GeneratedClass)es.

use crate::generate::class_name::ClassName;
use crate::generate::spec::MethodSpec;
use convert_case::{Case, Casing};
use fxhash::FxHashMap;
use itertools::Itertools;
use parking_lot::Mutex;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use std::sync::Arc;
use unicode_ident::{is_xid_continue, is_xid_start};

const DEFAULT_METHOD_NAME: &str = "apply";

/// A method added to a generated class.
#[derive(Clone, Debug)]
pub struct GeneratedMethod {
    class_name: ClassName,
    spec: MethodSpec,
}

impl GeneratedMethod {
    #[inline]
    pub fn name(&self) -> String {
        self.spec.name().to_string()
    }

    #[inline]
    pub fn class_name(&self) -> &ClassName {
        &self.class_name
    }

    #[inline]
    pub fn spec(&self) -> &MethodSpec {
        &self.spec
    }

    /// Returns a reference which can be used to invoke this method from generated code.
    pub fn to_method_reference(&self) -> MethodReference {
        MethodReference::new(self.class_name.clone(), self.name())
    }
}

/// Reference to an associated function of a generated type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodReference {
    declaring_class: ClassName,
    method_name: String,
}

impl MethodReference {
    pub fn new(declaring_class: ClassName, method_name: String) -> Self {
        Self {
            declaring_class,
            method_name,
        }
    }

    #[inline]
    pub fn declaring_class(&self) -> &ClassName {
        &self.declaring_class
    }

    #[inline]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Generates an invocation with given arguments. When invoked from within the declaring class
    /// itself, `Self` is used instead of the full path.
    pub fn to_invoke_code(
        &self,
        arguments: &[TokenStream],
        target_class: Option<&ClassName>,
    ) -> TokenStream {
        let method = Ident::new(&self.method_name, Span::call_site());
        if target_class == Some(&self.declaring_class) {
            quote!(Self::#method(#(#arguments),*))
        } else {
            let class = &self.declaring_class;
            quote!(#class::#method(#(#arguments),*))
        }
    }
}

/// Collection of methods belonging to a single generated class. Method names are unique within the
/// collection.
#[derive(Debug)]
pub struct GeneratedMethods {
    class_name: ClassName,
    methods: Mutex<Vec<Arc<GeneratedMethod>>>,
    name_sequence: Mutex<FxHashMap<String, usize>>,
}

impl GeneratedMethods {
    pub(crate) fn new(class_name: ClassName) -> Self {
        Self {
            class_name,
            methods: Default::default(),
            name_sequence: Default::default(),
        }
    }

    /// Adds a new method named after given name parts, which is then built with given function.
    pub fn add<F: FnOnce(&mut MethodSpec)>(
        &self,
        suggested_name: &[&str],
        method: F,
    ) -> Arc<GeneratedMethod> {
        let result: Result<_, std::convert::Infallible> =
            self.try_add(suggested_name, |spec| {
                method(spec);
                Ok(())
            });

        match result {
            Ok(method) => method,
            Err(never) => match never {},
        }
    }

    /// Fallible version of [GeneratedMethods::add]. The building function might itself add
    /// methods to this collection.
    pub fn try_add<E, F: FnOnce(&mut MethodSpec) -> Result<(), E>>(
        &self,
        suggested_name: &[&str],
        method: F,
    ) -> Result<Arc<GeneratedMethod>, E> {
        let name = self.generate_sequenced_name(&method_name(suggested_name));

        let mut spec = MethodSpec::new(&name);
        method(&mut spec)?;

        let generated_method = Arc::new(GeneratedMethod {
            class_name: self.class_name.clone(),
            spec,
        });

        self.methods.lock().push(generated_method.clone());
        Ok(generated_method)
    }

    /// Returns all methods in the order they have been added.
    pub fn methods(&self) -> Vec<Arc<GeneratedMethod>> {
        self.methods.lock().clone()
    }

    fn generate_sequenced_name(&self, name: &str) -> String {
        let mut name_sequence = self.name_sequence.lock();
        let next = name_sequence.entry(name.to_string()).or_insert(0);
        let sequence = *next;
        *next += 1;

        if sequence > 0 {
            format!("{}_{}", name, sequence)
        } else {
            name.to_string()
        }
    }
}

// joins name parts into a valid snake_case identifier
fn method_name(parts: &[&str]) -> String {
    let name = parts
        .iter()
        .map(|part| {
            part.chars()
                .map(|ch| if ch != '_' && is_xid_continue(ch) { ch } else { ' ' })
                .collect::<String>()
        })
        .join(" ")
        .to_case(Case::Snake);

    if name.is_empty() {
        DEFAULT_METHOD_NAME.to_string()
    } else if !name.starts_with(is_xid_start) {
        format!("_{}", name)
    } else if syn::parse_str::<Ident>(&name).is_err() {
        // keyword
        format!("{}_", name)
    } else {
        name
    }
}
