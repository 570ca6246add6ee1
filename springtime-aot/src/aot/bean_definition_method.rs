//! Default generation of methods rebuilding bean definitions.

use crate::aot::{BeanDefinitionMethodGenerator, BeanRegistrationsCode};
use crate::error::AotError;
use crate::generate::class_name::ClassName;
use crate::generate::generated_method::{GeneratedMethods, MethodReference};
use crate::generate::generation_context::GenerationContext;
use crate::generate::spec::{MethodSpec, TypeSpec};
use crate::hint::{MemberCategory, TypeReference};
use proc_macro2::TokenStream;
use quote::quote;
use springtime_di::bean_definition::{BeanDefinition, PropertyValue, ProxyMode, Value, SINGLETON};
use tracing::debug;

const BEAN_DEFINITIONS_FEATURE: &str = "BeanDefinitions";

/// Generates a `get_<bean>_bean_definition()` method returning a copy of the processed bean
/// definition. Methods are placed in a `BeanDefinitions` class next to the bean type, shared by all
/// beans of that type. If the bean type is not a valid path, the method is placed in the bean
/// registrations class instead.
#[derive(Clone, Debug)]
pub struct DefaultBeanDefinitionMethodGenerator {
    bean_name: String,
    definition: BeanDefinition,
}

impl DefaultBeanDefinitionMethodGenerator {
    pub fn new<T: ToString>(bean_name: T, definition: BeanDefinition) -> Self {
        Self {
            bean_name: bean_name.to_string(),
            definition,
        }
    }

    #[inline]
    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    fn generate_method(&self, methods: &GeneratedMethods) -> MethodReference {
        methods
            .add(&["get", &self.bean_name, "bean", "definition"], |method| {
                method
                    .add_doc(format!("Bean definition for '{}'.", self.bean_name))
                    .returns(quote!(::springtime_di::bean_definition::BeanDefinition));

                build_definition(method, &self.definition);
            })
            .to_method_reference()
    }
}

impl BeanDefinitionMethodGenerator for DefaultBeanDefinitionMethodGenerator {
    fn generate_bean_definition_method(
        &self,
        generation_context: &dyn GenerationContext,
        bean_registrations_code: &dyn BeanRegistrationsCode,
    ) -> Result<MethodReference, AotError> {
        let bean_type = &self.definition.bean_type;

        generation_context
            .runtime_hints()
            .reflection()
            .register_type(TypeReference::of(bean_type), |hint| {
                hint.with_members(&[MemberCategory::IntrospectDeclaredConstructors]);
            });

        match ClassName::parse(bean_type) {
            Some(target) => {
                let class = generation_context
                    .generated_classes()
                    .get_or_add_for_feature_component(
                        BEAN_DEFINITIONS_FEATURE,
                        &target,
                        TypeSpec::new().with_doc(format!("Bean definitions for [`{}`].", target)),
                    )?;

                Ok(self.generate_method(class.methods()))
            }
            None => {
                debug!(
                    "Bean type {} of {} is not a valid path - generating definition in {}.",
                    bean_type,
                    self.bean_name,
                    bean_registrations_code.class_name()
                );

                Ok(self.generate_method(bean_registrations_code.methods()))
            }
        }
    }
}

fn build_definition(method: &mut MethodSpec, definition: &BeanDefinition) {
    let bean_type = &definition.bean_type;
    method.add_statement(quote!(
        let mut bean_definition = ::springtime_di::bean_definition::BeanDefinition::new(#bean_type)
    ));

    if let Some(instance_supplier) = &definition.instance_supplier {
        method.add_statement(quote!(
            bean_definition.instance_supplier = Some(#instance_supplier.to_string())
        ));
    }

    if definition.scope != SINGLETON {
        let scope = &definition.scope;
        method.add_statement(quote!(bean_definition.scope = #scope.to_string()));
    }

    if definition.is_primary {
        method.add_statement(quote!(bean_definition.is_primary = true));
    }

    if definition.is_lazy_init {
        method.add_statement(quote!(bean_definition.is_lazy_init = true));
    }

    if !definition.depends_on.is_empty() {
        let depends_on = &definition.depends_on;
        method.add_statement(quote!(
            bean_definition.depends_on = vec![#(#depends_on.to_string()),*]
        ));
    }

    if let Some(init_method) = &definition.init_method {
        method.add_statement(quote!(
            bean_definition.init_method = Some(#init_method.to_string())
        ));
    }

    if let Some(destroy_method) = &definition.destroy_method {
        method.add_statement(quote!(
            bean_definition.destroy_method = Some(#destroy_method.to_string())
        ));
    }

    if let Some(description) = &definition.description {
        method.add_statement(quote!(
            bean_definition.description = Some(#description.to_string())
        ));
    }

    if !definition.property_values.is_empty() {
        let property_values = definition.property_values.iter().map(property_value);
        method.add_statement(quote!(
            bean_definition.property_values = vec![#(#property_values),*]
        ));
    }

    if definition.proxy_mode == ProxyMode::Subclass {
        method.add_statement(quote!(
            bean_definition.proxy_mode = ::springtime_di::bean_definition::ProxyMode::Subclass
        ));
    }

    if let Some(proxy_type) = &definition.proxy_type {
        method.add_statement(quote!(
            bean_definition.proxy_type = Some(#proxy_type.to_string())
        ));
    }

    method.set_tail(quote!(bean_definition));
}

fn property_value(property_value: &PropertyValue) -> TokenStream {
    let name = &property_value.name;
    let value = match &property_value.value {
        Value::Str(value) => {
            quote!(::springtime_di::bean_definition::Value::Str(#value.to_string()))
        }
        Value::Int(value) => quote!(::springtime_di::bean_definition::Value::Int(#value)),
        Value::Bool(value) => quote!(::springtime_di::bean_definition::Value::Bool(#value)),
        Value::BeanReference(value) => {
            quote!(::springtime_di::bean_definition::Value::BeanReference(#value.to_string()))
        }
    };

    quote!(::springtime_di::bean_definition::PropertyValue::new(#name, #value))
}
