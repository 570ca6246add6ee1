//! Collection of contributions from all processors.

use crate::aot::{
    BeanFactoryInitializationAotContributionPtr, BeanFactoryInitializationAotProcessorPtr,
    BeanFactoryInitializationCode,
};
use crate::error::AotError;
use crate::generate::generation_context::GenerationContext;
use springtime_di::bean_factory::DefaultBeanFactory;
use tracing::debug;

/// Contributions gathered by running processors, in processor order, against a bean factory.
pub struct BeanFactoryInitializationAotContributions {
    contributions: Vec<BeanFactoryInitializationAotContributionPtr>,
}

impl BeanFactoryInitializationAotContributions {
    /// Runs every processor once. Processors without a contribution are skipped.
    pub fn new(
        bean_factory: &DefaultBeanFactory,
        processors: &[BeanFactoryInitializationAotProcessorPtr],
    ) -> Self {
        let contributions: Vec<_> = processors
            .iter()
            .filter_map(|processor| processor.process_ahead_of_time(bean_factory))
            .collect();

        debug!(
            "Collected {} contributions from {} processors.",
            contributions.len(),
            processors.len()
        );

        Self { contributions }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Applies all contributions in order.
    pub fn apply_to(
        &self,
        generation_context: &dyn GenerationContext,
        initialization_code: &mut dyn BeanFactoryInitializationCode,
    ) -> Result<(), AotError> {
        for contribution in &self.contributions {
            contribution.apply_to(generation_context, initialization_code)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::aot::contributions::BeanFactoryInitializationAotContributions;
    use crate::aot::{
        BeanFactoryInitializationAotContribution, BeanFactoryInitializationAotProcessorPtr,
        BeanFactoryInitializationCode, MockBeanFactoryInitializationAotProcessor,
    };
    use crate::error::AotError;
    use crate::generate::class_name::{ClassName, ClassNameGenerator};
    use crate::generate::generated_files::InMemoryGeneratedFiles;
    use crate::generate::generated_method::MethodReference;
    use crate::generate::generation_context::{DefaultGenerationContext, GenerationContext};
    use springtime_di::bean_factory::DefaultBeanFactory;
    use springtime_di::error::BeanDefinitionRegistryError;
    use std::sync::Arc;

    struct InitializerContribution(&'static str);

    impl BeanFactoryInitializationAotContribution for InitializerContribution {
        fn apply_to(
            &self,
            _generation_context: &dyn GenerationContext,
            initialization_code: &mut dyn BeanFactoryInitializationCode,
        ) -> Result<(), AotError> {
            initialization_code.add_initializer(MethodReference::new(
                ClassName::parse("app::Test").unwrap(),
                self.0.to_string(),
            ));
            Ok(())
        }
    }

    struct FailingContribution;

    impl BeanFactoryInitializationAotContribution for FailingContribution {
        fn apply_to(
            &self,
            _generation_context: &dyn GenerationContext,
            _initialization_code: &mut dyn BeanFactoryInitializationCode,
        ) -> Result<(), AotError> {
            Err(AotError::Contribution(Arc::new(
                BeanDefinitionRegistryError::EmptyBeanName,
            )))
        }
    }

    #[derive(Default)]
    struct RecordingInitializationCode {
        initializers: Vec<String>,
    }

    impl BeanFactoryInitializationCode for RecordingInitializationCode {
        fn add_initializer(&mut self, method_reference: MethodReference) {
            self.initializers
                .push(method_reference.method_name().to_string());
        }
    }

    fn processor(
        initializer: Option<&'static str>,
    ) -> BeanFactoryInitializationAotProcessorPtr {
        let mut processor = MockBeanFactoryInitializationAotProcessor::new();
        processor
            .expect_process_ahead_of_time()
            .times(1)
            .returning(move |_| {
                initializer.map(|name| Box::new(InitializerContribution(name)) as _)
            });

        Box::new(processor)
    }

    fn context() -> DefaultGenerationContext {
        DefaultGenerationContext::new(
            ClassNameGenerator::new(ClassName::parse("app::Application").unwrap()),
            Arc::new(InMemoryGeneratedFiles::new()),
        )
    }

    #[test]
    fn should_apply_contributions_in_processor_order() {
        let processors = vec![
            processor(Some("first")),
            processor(None),
            processor(Some("second")),
        ];

        let contributions =
            BeanFactoryInitializationAotContributions::new(&DefaultBeanFactory::new(false), &processors);
        assert_eq!(contributions.len(), 2);

        let mut code = RecordingInitializationCode::default();
        contributions.apply_to(&context(), &mut code).unwrap();

        assert_eq!(code.initializers, vec!["first", "second"]);
    }

    #[test]
    fn should_stop_at_failing_contribution() {
        let mut failing = MockBeanFactoryInitializationAotProcessor::new();
        failing
            .expect_process_ahead_of_time()
            .times(1)
            .returning(|_| Some(Box::new(FailingContribution)));

        let processors: Vec<BeanFactoryInitializationAotProcessorPtr> = vec![
            processor(Some("first")),
            Box::new(failing),
            processor(Some("second")),
        ];

        let contributions =
            BeanFactoryInitializationAotContributions::new(&DefaultBeanFactory::new(false), &processors);

        let mut code = RecordingInitializationCode::default();
        assert!(matches!(
            contributions.apply_to(&context(), &mut code),
            Err(AotError::Contribution(_))
        ));
        assert_eq!(code.initializers, vec!["first"]);
    }
}
