//! Build instructions for generated types and methods. Instructions are plain data, so two of them
//! can be compared to check if they describe the same thing.

use itertools::Itertools;
use proc_macro2::TokenStream;

/// Visibility of generated items.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Crate,
    Private,
}

impl Visibility {
    /// Keyword prefix for an item, including the trailing space when non-empty.
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Public => "pub ",
            Visibility::Crate => "pub(crate) ",
            Visibility::Private => "",
        }
    }
}

/// Build instructions for a generated type.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct TypeSpec {
    doc: Option<String>,
    visibility: Visibility,
    imports: Vec<String>,
}

impl TypeSpec {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_doc<T: ToString>(mut self, doc: T) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Adds a `use` declaration to the file containing the type.
    pub fn with_import<T: ToString>(mut self, path: T) -> Self {
        self.imports.push(path.to_string());
        self
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn imports(&self) -> &[String] {
        &self.imports
    }
}

/// Parameter of a generated method.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

/// Build instructions for a generated method. The body consists of statements, each terminated
/// with `;`, followed by an optional tail expression. Code fragments are given as token streams and
/// kept in their rendered form, so specs can be shared between threads.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodSpec {
    name: String,
    doc: Option<String>,
    visibility: Visibility,
    parameters: Vec<Parameter>,
    return_type: Option<String>,
    statements: Vec<String>,
    tail: Option<String>,
}

impl MethodSpec {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            doc: None,
            visibility: Visibility::Public,
            parameters: Vec::new(),
            return_type: None,
            statements: Vec::new(),
            tail: None,
        }
    }

    pub fn add_doc<T: ToString>(&mut self, doc: T) -> &mut Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> &mut Self {
        self.visibility = visibility;
        self
    }

    pub fn add_parameter(&mut self, name: &str, ty: TokenStream) -> &mut Self {
        self.parameters.push(Parameter {
            name: name.to_string(),
            ty: ty.to_string(),
        });
        self
    }

    pub fn returns(&mut self, ty: TokenStream) -> &mut Self {
        self.return_type = Some(ty.to_string());
        self
    }

    pub fn add_statement(&mut self, statement: TokenStream) -> &mut Self {
        self.statements.push(statement.to_string());
        self
    }

    pub fn set_tail(&mut self, tail: TokenStream) -> &mut Self {
        self.tail = Some(tail.to_string());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[inline]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[inline]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    #[inline]
    pub fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }

    /// Signature of the method, without the body.
    pub fn signature(&self) -> String {
        let parameters = self
            .parameters
            .iter()
            .map(|Parameter { name, ty }| format!("{}: {}", name, ty))
            .join(", ");

        let mut signature = format!(
            "{}fn {}({})",
            self.visibility.keyword(),
            self.name,
            parameters
        );

        if let Some(return_type) = &self.return_type {
            signature.push_str(" -> ");
            signature.push_str(return_type);
        }

        signature
    }
}
