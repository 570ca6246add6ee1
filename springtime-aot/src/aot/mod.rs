//! Ahead-of-time processing of bean factories. Each [BeanFactoryInitializationAotProcessor] can
//! inspect a refreshed bean factory and produce a [BeanFactoryInitializationAotContribution],
//! which generates code and registers initializers to be invoked at startup.

pub mod bean_definition_method;
pub mod bean_registrations;
pub mod contributions;
pub mod initialization_code;

use crate::error::AotError;
use crate::generate::class_name::ClassName;
use crate::generate::generated_method::{GeneratedMethods, MethodReference};
use crate::generate::generation_context::GenerationContext;
#[cfg(test)]
use mockall::automock;
use springtime_di::bean_factory::DefaultBeanFactory;

pub type BeanFactoryInitializationAotContributionPtr =
    Box<dyn BeanFactoryInitializationAotContribution + Send + Sync>;

pub type BeanFactoryInitializationAotProcessorPtr =
    Box<dyn BeanFactoryInitializationAotProcessor + Send + Sync>;

/// Processor inspecting a refreshed bean factory ahead-of-time.
#[cfg_attr(test, automock)]
pub trait BeanFactoryInitializationAotProcessor {
    /// Returns a contribution for given factory, or `None` if there's nothing to contribute.
    fn process_ahead_of_time(
        &self,
        bean_factory: &DefaultBeanFactory,
    ) -> Option<BeanFactoryInitializationAotContributionPtr>;
}

/// Generated code and hints contributed to bean factory initialization.
pub trait BeanFactoryInitializationAotContribution {
    fn apply_to(
        &self,
        generation_context: &dyn GenerationContext,
        initialization_code: &mut dyn BeanFactoryInitializationCode,
    ) -> Result<(), AotError>;
}

/// Code initializing a bean factory at startup.
pub trait BeanFactoryInitializationCode {
    /// Records an initializer, which is a generated method taking `&mut DefaultBeanFactory`.
    /// Initializers are invoked in the order of addition.
    fn add_initializer(&mut self, method_reference: MethodReference);
}

/// Code registering bean definitions, which can be extended by [BeanDefinitionMethodGenerator]s.
pub trait BeanRegistrationsCode {
    fn class_name(&self) -> &ClassName;

    fn methods(&self) -> &GeneratedMethods;
}

/// Strategy generating a method which returns a bean definition.
pub trait BeanDefinitionMethodGenerator {
    fn generate_bean_definition_method(
        &self,
        generation_context: &dyn GenerationContext,
        bean_registrations_code: &dyn BeanRegistrationsCode,
    ) -> Result<MethodReference, AotError>;
}

pub type BeanDefinitionMethodGeneratorPtr = Box<dyn BeanDefinitionMethodGenerator + Send + Sync>;
