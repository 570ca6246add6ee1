//! Entry point of generated code, invoking all recorded initializers.

use crate::aot::BeanFactoryInitializationCode;
use crate::error::AotError;
use crate::generate::class_name::ClassName;
use crate::generate::generated_class::GeneratedClass;
use crate::generate::generated_method::MethodReference;
use crate::generate::generation_context::GenerationContext;
use crate::generate::spec::TypeSpec;
use quote::quote;
use std::sync::Arc;

const APPLICATION_CONTEXT_INITIALIZER_FEATURE: &str = "ApplicationContextInitializer";

/// Generates the `ApplicationContextInitializer` class, whose `initialize(bean_factory)` function
/// invokes all initializers in the order of addition.
#[derive(Debug)]
pub struct ApplicationContextInitializationCodeGenerator {
    class: Arc<GeneratedClass>,
    initializers: Vec<MethodReference>,
}

impl ApplicationContextInitializationCodeGenerator {
    pub fn new(generation_context: &dyn GenerationContext) -> Result<Self, AotError> {
        let class = generation_context.generated_classes().add_for_feature(
            APPLICATION_CONTEXT_INITIALIZER_FEATURE,
            TypeSpec::new().with_doc("Initializes the bean factory without runtime discovery."),
        )?;

        Ok(Self {
            class,
            initializers: Vec::new(),
        })
    }

    #[inline]
    pub fn class_name(&self) -> &ClassName {
        self.class.name()
    }

    #[inline]
    pub fn initializers(&self) -> &[MethodReference] {
        &self.initializers
    }

    /// Generates the `initialize` function and returns the name of the entry point class.
    pub fn finish(self) -> ClassName {
        let class_name = self.class.name().clone();
        let initializers = self.initializers;

        self.class.methods().add(&["initialize"], |method| {
            method
                .add_doc("Registers all beans in given bean factory.")
                .add_parameter(
                    "bean_factory",
                    quote!(&mut ::springtime_di::bean_factory::DefaultBeanFactory),
                )
                .returns(
                    quote!(Result<(), ::springtime_di::error::BeanDefinitionRegistryError>),
                );

            for initializer in &initializers {
                let invocation = initializer.to_invoke_code(&[quote!(bean_factory)], Some(&class_name));
                method.add_statement(quote!(#invocation?));
            }

            method.set_tail(quote!(Ok(())));
        });

        class_name
    }
}

impl BeanFactoryInitializationCode for ApplicationContextInitializationCodeGenerator {
    fn add_initializer(&mut self, method_reference: MethodReference) {
        self.initializers.push(method_reference);
    }
}

#[cfg(test)]
mod tests {
    use crate::aot::initialization_code::ApplicationContextInitializationCodeGenerator;
    use crate::aot::BeanFactoryInitializationCode;
    use crate::generate::class_name::{ClassName, ClassNameGenerator};
    use crate::generate::generated_files::InMemoryGeneratedFiles;
    use crate::generate::generated_method::MethodReference;
    use crate::generate::generation_context::{DefaultGenerationContext, GenerationContext};
    use quote::quote;
    use std::sync::Arc;

    #[test]
    fn should_invoke_initializers_in_order() {
        let context = DefaultGenerationContext::new(
            ClassNameGenerator::new(ClassName::parse("app::Application").unwrap()),
            Arc::new(InMemoryGeneratedFiles::new()),
        );
        let registrations = ClassName::parse("app::Application__BeanFactoryRegistrations").unwrap();

        let mut code = ApplicationContextInitializationCodeGenerator::new(&context).unwrap();
        code.add_initializer(MethodReference::new(
            registrations.clone(),
            "register_bean_definitions".to_string(),
        ));
        code.add_initializer(MethodReference::new(
            registrations,
            "register_aliases".to_string(),
        ));

        let class_name = code.finish();
        assert_eq!(
            class_name.canonical_name(),
            "app::Application__ApplicationContextInitializer"
        );

        let classes = context.generated_classes().classes();
        let methods = classes[0].methods().methods();
        assert_eq!(methods[0].name(), "initialize");
        assert_eq!(
            methods[0].spec().statements(),
            [
                quote!(app::Application__BeanFactoryRegistrations::register_bean_definitions(bean_factory)?)
                    .to_string(),
                quote!(app::Application__BeanFactoryRegistrations::register_aliases(bean_factory)?)
                    .to_string(),
            ]
        );
    }
}
