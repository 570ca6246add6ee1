//! Generated code registering bean definitions and aliases.

use crate::aot::bean_definition_method::DefaultBeanDefinitionMethodGenerator;
use crate::aot::{
    BeanDefinitionMethodGeneratorPtr, BeanFactoryInitializationAotContribution,
    BeanFactoryInitializationAotContributionPtr, BeanFactoryInitializationAotProcessor,
    BeanFactoryInitializationCode, BeanRegistrationsCode,
};
use crate::error::AotError;
use crate::generate::class_name::ClassName;
use crate::generate::generated_class::GeneratedClass;
use crate::generate::generated_method::{GeneratedMethod, GeneratedMethods};
use crate::generate::generation_context::GenerationContext;
use crate::generate::spec::TypeSpec;
use derivative::Derivative;
use quote::quote;
use springtime_di::bean_factory::{BeanDefinitionRegistry, DefaultBeanFactory};
use std::sync::Arc;
use tracing::debug;

const BEAN_FACTORY_REGISTRATIONS_FEATURE: &str = "BeanFactoryRegistrations";

/// A single bean to register: its name, the strategy generating its definition and its aliases in
/// registration order.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Registration {
    bean_name: String,
    #[derivative(Debug = "ignore")]
    method_generator: BeanDefinitionMethodGeneratorPtr,
    aliases: Vec<String>,
}

impl Registration {
    pub fn new<T: ToString>(
        bean_name: T,
        method_generator: BeanDefinitionMethodGeneratorPtr,
        aliases: Vec<String>,
    ) -> Self {
        Self {
            bean_name: bean_name.to_string(),
            method_generator,
            aliases,
        }
    }

    #[inline]
    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// Contribution generating `register_bean_definitions` and `register_aliases` initializers.
#[derive(Debug)]
pub struct BeanRegistrationsAotContribution {
    registrations: Vec<Registration>,
}

impl BeanRegistrationsAotContribution {
    pub fn new(registrations: Vec<Registration>) -> Self {
        Self { registrations }
    }

    #[inline]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    fn generate_register_bean_definitions_method(
        &self,
        generation_context: &dyn GenerationContext,
        code: &BeanRegistrationsCodeGenerator,
    ) -> Result<Arc<GeneratedMethod>, AotError> {
        let methods = code.methods();
        let class_name = code.class_name().clone();

        methods.try_add(&["register", "bean", "definitions"], |method| {
            method
                .add_doc("Registers bean definitions.")
                .add_parameter(
                    "bean_factory",
                    quote!(&mut ::springtime_di::bean_factory::DefaultBeanFactory),
                )
                .returns(
                    quote!(Result<(), ::springtime_di::error::BeanDefinitionRegistryError>),
                );

            for registration in &self.registrations {
                let reference = registration
                    .method_generator
                    .generate_bean_definition_method(generation_context, code)?;

                let bean_name = &registration.bean_name;
                let definition = reference.to_invoke_code(&[], Some(&class_name));
                method.add_statement(quote!(
                    bean_factory.register_bean_definition(#bean_name, #definition)?
                ));
            }

            method.set_tail(quote!(Ok(())));
            Ok::<_, AotError>(())
        })
    }

    fn generate_register_aliases_method(
        &self,
        code: &BeanRegistrationsCodeGenerator,
    ) -> Arc<GeneratedMethod> {
        code.methods().add(&["register", "aliases"], |method| {
            method
                .add_doc("Registers bean aliases.")
                .add_parameter(
                    "bean_factory",
                    quote!(&mut ::springtime_di::bean_factory::DefaultBeanFactory),
                )
                .returns(
                    quote!(Result<(), ::springtime_di::error::BeanDefinitionRegistryError>),
                );

            for registration in &self.registrations {
                let bean_name = &registration.bean_name;
                for alias in &registration.aliases {
                    method.add_statement(quote!(
                        bean_factory.register_alias(#bean_name, #alias)?
                    ));
                }
            }

            method.set_tail(quote!(Ok(())));
        })
    }
}

impl BeanFactoryInitializationAotContribution for BeanRegistrationsAotContribution {
    fn apply_to(
        &self,
        generation_context: &dyn GenerationContext,
        initialization_code: &mut dyn BeanFactoryInitializationCode,
    ) -> Result<(), AotError> {
        let class = generation_context.generated_classes().add_for_feature(
            BEAN_FACTORY_REGISTRATIONS_FEATURE,
            TypeSpec::new()
                .with_doc("Registers bean definitions and aliases of the bean factory.")
                .with_import("::springtime_di::bean_factory::BeanDefinitionRegistry as _"),
        )?;

        let code = BeanRegistrationsCodeGenerator::new(class);

        let register_bean_definitions =
            self.generate_register_bean_definitions_method(generation_context, &code)?;
        let register_aliases = self.generate_register_aliases_method(&code);

        // definitions need to be registered before their aliases
        initialization_code.add_initializer(register_bean_definitions.to_method_reference());
        initialization_code.add_initializer(register_aliases.to_method_reference());

        debug!(
            "Generated registrations of {} beans in {}.",
            self.registrations.len(),
            code.class_name()
        );

        Ok(())
    }
}

/// [BeanRegistrationsCode] backed by a generated class.
#[derive(Debug)]
pub struct BeanRegistrationsCodeGenerator {
    class: Arc<GeneratedClass>,
}

impl BeanRegistrationsCodeGenerator {
    pub fn new(class: Arc<GeneratedClass>) -> Self {
        Self { class }
    }
}

impl BeanRegistrationsCode for BeanRegistrationsCodeGenerator {
    #[inline]
    fn class_name(&self) -> &ClassName {
        self.class.name()
    }

    #[inline]
    fn methods(&self) -> &GeneratedMethods {
        self.class.methods()
    }
}

/// Processor registering every bean definition of the factory, in registration order, using
/// [DefaultBeanDefinitionMethodGenerator].
#[derive(Clone, Copy, Debug, Default)]
pub struct BeanRegistrationsAotProcessor;

impl BeanFactoryInitializationAotProcessor for BeanRegistrationsAotProcessor {
    fn process_ahead_of_time(
        &self,
        bean_factory: &DefaultBeanFactory,
    ) -> Option<BeanFactoryInitializationAotContributionPtr> {
        let registrations: Vec<_> = bean_factory
            .bean_definition_names()
            .iter()
            .filter_map(|name| {
                bean_factory.bean_definition(name).map(|definition| {
                    Registration::new(
                        name,
                        Box::new(DefaultBeanDefinitionMethodGenerator::new(
                            name,
                            definition.clone(),
                        )),
                        bean_factory.aliases(name),
                    )
                })
            })
            .collect();

        if registrations.is_empty() {
            None
        } else {
            Some(Box::new(BeanRegistrationsAotContribution::new(registrations)))
        }
    }
}
