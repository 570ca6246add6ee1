//! Application context refreshed for AOT processing. Refreshing post-processes the bean factory,
//! gathers runtime hints, validates bean references and synthesizes proxies, but doesn't create
//! any bean instances.

use crate::aot::bean_registrations::BeanRegistrationsAotProcessor;
use crate::aot::BeanFactoryInitializationAotProcessorPtr;
use crate::error::ContextError;
use crate::hint::RuntimeHints;
#[cfg(test)]
use mockall::automock;
use springtime_di::bean_factory::{BeanDefinitionRegistry, DefaultBeanFactory};
use springtime_di::error::ErrorPtr;
use springtime_di::proxy::{ProxyClassGenerator, ProxyHooks};
use tracing::{debug, info};

/// Modifies bean definitions before the factory is processed.
#[cfg_attr(test, automock)]
pub trait BeanFactoryPostProcessor {
    fn post_process_bean_factory(&self, bean_factory: &mut DefaultBeanFactory)
        -> Result<(), ErrorPtr>;
}

pub type BeanFactoryPostProcessorPtr = Box<dyn BeanFactoryPostProcessor + Send + Sync>;

/// Registers additional runtime hints during refresh.
pub trait RuntimeHintsRegistrar {
    fn register_hints(&self, hints: &RuntimeHints, bean_factory: &DefaultBeanFactory);
}

pub type RuntimeHintsRegistrarPtr = Box<dyn RuntimeHintsRegistrar + Send + Sync>;

/// Application context which can be refreshed once for AOT processing.
pub struct GenericApplicationContext {
    bean_factory: DefaultBeanFactory,
    post_processors: Vec<BeanFactoryPostProcessorPtr>,
    hints_registrars: Vec<RuntimeHintsRegistrarPtr>,
    aot_processors: Vec<BeanFactoryInitializationAotProcessorPtr>,
    proxy_generator: ProxyClassGenerator,
    refreshed: bool,
}

impl GenericApplicationContext {
    /// Creates a context for given bean factory, with bean registrations processing enabled.
    pub fn new(bean_factory: DefaultBeanFactory) -> Self {
        Self {
            bean_factory,
            post_processors: Vec::new(),
            hints_registrars: Vec::new(),
            aot_processors: vec![Box::new(BeanRegistrationsAotProcessor)],
            proxy_generator: Default::default(),
            refreshed: false,
        }
    }

    pub fn add_bean_factory_post_processor(&mut self, post_processor: BeanFactoryPostProcessorPtr) {
        self.post_processors.push(post_processor);
    }

    pub fn add_runtime_hints_registrar(&mut self, registrar: RuntimeHintsRegistrarPtr) {
        self.hints_registrars.push(registrar);
    }

    /// Adds a processor to run after the already registered ones.
    pub fn add_aot_processor(&mut self, processor: BeanFactoryInitializationAotProcessorPtr) {
        self.aot_processors.push(processor);
    }

    #[inline]
    pub fn bean_factory(&self) -> &DefaultBeanFactory {
        &self.bean_factory
    }

    #[inline]
    pub fn bean_factory_mut(&mut self) -> &mut DefaultBeanFactory {
        &mut self.bean_factory
    }

    #[inline]
    pub fn aot_processors(&self) -> &[BeanFactoryInitializationAotProcessorPtr] {
        &self.aot_processors
    }

    #[inline]
    pub fn is_refreshed(&self) -> bool {
        self.refreshed
    }

    /// Prepares the bean factory for AOT processing. Proxies are synthesized through given hooks.
    pub fn refresh_for_aot_processing(
        &mut self,
        runtime_hints: &RuntimeHints,
        proxy_hooks: &ProxyHooks,
    ) -> Result<(), ContextError> {
        if self.refreshed {
            return Err(ContextError::AlreadyRefreshed);
        }

        self.refreshed = true;

        info!("Refreshing application context for AOT processing.");

        for post_processor in &self.post_processors {
            post_processor
                .post_process_bean_factory(&mut self.bean_factory)
                .map_err(ContextError::PostProcessing)?;
        }

        for registrar in &self.hints_registrars {
            registrar.register_hints(runtime_hints, &self.bean_factory);
        }

        self.validate_references()?;
        self.create_proxies(proxy_hooks)?;

        debug!(
            "Refreshed context with {} bean definitions.",
            self.bean_factory.bean_definition_names().len()
        );

        Ok(())
    }

    fn validate_references(&self) -> Result<(), ContextError> {
        for bean_name in self.bean_factory.bean_definition_names() {
            let Some(definition) = self.bean_factory.bean_definition(bean_name) else {
                continue;
            };

            for reference in definition.referenced_bean_names() {
                let canonical_name = self.bean_factory.canonical_name(reference);
                if !self.bean_factory.contains_bean_definition(&canonical_name) {
                    return Err(ContextError::UnresolvableReference {
                        bean_name: bean_name.clone(),
                        reference: reference.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn create_proxies(&mut self, proxy_hooks: &ProxyHooks) -> Result<(), ContextError> {
        let bean_names = self.bean_factory.bean_definition_names().to_vec();
        for bean_name in bean_names {
            let Some(definition) = self.bean_factory.bean_definition_mut(&bean_name) else {
                continue;
            };

            if !definition.requires_proxy() {
                continue;
            }

            let proxy_type = self
                .proxy_generator
                .proxy_type_for(&definition.bean_type, proxy_hooks)
                .map_err(|source| ContextError::Proxy {
                    bean_name: bean_name.clone(),
                    source,
                })?;

            debug!("Using proxy {} for bean {}.", proxy_type, bean_name);
            definition.proxy_type = Some(proxy_type);
        }

        Ok(())
    }
}
