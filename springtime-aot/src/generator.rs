//! Orchestration of AOT processing for an application context.

use crate::aot::contributions::BeanFactoryInitializationAotContributions;
use crate::aot::initialization_code::ApplicationContextInitializationCodeGenerator;
use crate::context::GenericApplicationContext;
use crate::error::AotError;
use crate::generate::class_name::ClassName;
use crate::generate::generation_context::GenerationContext;
use crate::proxy_capture::ProxyCaptureHandler;
use springtime_di::proxy::ProxyHooks;
use std::sync::Arc;
use tracing::info;

/// Processes an application context ahead-of-time: refreshes it while capturing proxies, applies
/// all contributions and generates the entry point.
///
/// Proxy hooks capture a single AOT run at a time, so runs sharing the same hooks need to be
/// serialized by the caller.
#[derive(Default)]
pub struct ApplicationContextAotGenerator {
    proxy_hooks: Arc<ProxyHooks>,
}

impl ApplicationContextAotGenerator {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a generator using given hooks.
    pub fn with_proxy_hooks(proxy_hooks: Arc<ProxyHooks>) -> Self {
        Self { proxy_hooks }
    }

    #[inline]
    pub fn proxy_hooks(&self) -> &Arc<ProxyHooks> {
        &self.proxy_hooks
    }

    /// Refreshes given context and generates code able to initialize its bean factory. Returns
    /// the name of the generated entry point class. Proxy capture is active only for the duration
    /// of this call, regardless of the outcome.
    pub fn process_ahead_of_time(
        &self,
        application_context: &mut GenericApplicationContext,
        generation_context: &dyn GenerationContext,
    ) -> Result<ClassName, AotError> {
        let _guard = self.proxy_hooks.install(Arc::new(ProxyCaptureHandler::new(
            generation_context.runtime_hints().clone(),
            generation_context.generated_files().clone(),
        )));

        application_context
            .refresh_for_aot_processing(generation_context.runtime_hints(), &self.proxy_hooks)?;

        let mut initialization_code =
            ApplicationContextInitializationCodeGenerator::new(generation_context)?;

        let contributions = BeanFactoryInitializationAotContributions::new(
            application_context.bean_factory(),
            application_context.aot_processors(),
        );
        contributions.apply_to(generation_context, &mut initialization_code)?;

        let class_name = initialization_code.finish();

        info!("Generated AOT entry point {}.", class_name);
        Ok(class_name)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::{GenericApplicationContext, MockBeanFactoryPostProcessor};
    use crate::error::{AotError, ContextError};
    use crate::generate::class_name::{ClassName, ClassNameGenerator};
    use crate::generate::generated_files::{InMemoryGeneratedFiles, Kind};
    use crate::generate::generation_context::{DefaultGenerationContext, GenerationContext};
    use crate::generator::ApplicationContextAotGenerator;
    use crate::hint::TypeReference;
    use springtime_di::bean_definition::{BeanDefinition, ProxyMode};
    use springtime_di::bean_factory::{BeanDefinitionRegistry, DefaultBeanFactory};
    use springtime_di::error::ErrorPtr;
    use std::fmt::{Display, Formatter};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError;

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("test error")
        }
    }

    impl std::error::Error for TestError {}

    fn generation_context(files: Arc<InMemoryGeneratedFiles>) -> DefaultGenerationContext {
        DefaultGenerationContext::new(
            ClassNameGenerator::new(ClassName::parse("app::Application").unwrap()),
            files,
        )
    }

    #[test]
    fn should_uninstall_hooks_after_success() {
        let generator = ApplicationContextAotGenerator::new();
        let mut context = GenericApplicationContext::new(DefaultBeanFactory::new(false));

        let class_name = generator
            .process_ahead_of_time(
                &mut context,
                &generation_context(Arc::new(InMemoryGeneratedFiles::new())),
            )
            .unwrap();

        assert_eq!(
            class_name.canonical_name(),
            "app::Application__ApplicationContextInitializer"
        );
        assert!(!generator.proxy_hooks().is_installed());
    }

    #[test]
    fn should_uninstall_hooks_after_failure() {
        let mut post_processor = MockBeanFactoryPostProcessor::new();
        post_processor
            .expect_post_process_bean_factory()
            .returning(|_| Err(Arc::new(TestError) as ErrorPtr));

        let mut context = GenericApplicationContext::new(DefaultBeanFactory::new(false));
        context.add_bean_factory_post_processor(Box::new(post_processor));

        let generator = ApplicationContextAotGenerator::new();
        let result = generator.process_ahead_of_time(
            &mut context,
            &generation_context(Arc::new(InMemoryGeneratedFiles::new())),
        );

        assert!(matches!(
            result,
            Err(AotError::Refresh(ContextError::PostProcessing(_)))
        ));
        assert!(!generator.proxy_hooks().is_installed());
    }

    #[test]
    fn should_capture_proxies_during_refresh() {
        let mut factory = DefaultBeanFactory::new(false);
        factory
            .register_bean_definition(
                "service",
                BeanDefinition::new("app::Service").with_proxy_mode(ProxyMode::Subclass),
            )
            .unwrap();

        let files = Arc::new(InMemoryGeneratedFiles::new());
        let generation_context = generation_context(files.clone());
        let mut context = GenericApplicationContext::new(factory);

        ApplicationContextAotGenerator::new()
            .process_ahead_of_time(&mut context, &generation_context)
            .unwrap();

        assert_eq!(
            files.paths(Kind::Class),
            vec!["app/Service__SpringtimeProxy.rs"]
        );
        assert!(generation_context
            .runtime_hints()
            .reflection()
            .type_hint(&TypeReference::of("app::Service__SpringtimeProxy"))
            .is_some());
    }
}
