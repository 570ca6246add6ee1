use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// Shared pointer to errors coming from collaborators, e.g. post-processors or proxy handlers.
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

/// Error related to bean definition registries.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum BeanDefinitionRegistryError {
    #[error("Bean name must not be empty")]
    EmptyBeanName,
    #[error("Attempted to register a duplicated bean definition with name: {0}")]
    DuplicateBeanName(String),
    #[error("No bean definition named: {0}")]
    NoSuchBeanDefinition(String),
    #[error("Cannot register alias '{alias}' for name '{name}': it is already registered for name '{registered_name}'")]
    AliasAlreadyRegistered {
        alias: String,
        name: String,
        registered_name: String,
    },
    #[error("Cannot register alias '{alias}' for name '{name}': circular reference - '{name}' is a direct or indirect alias for '{alias}' already")]
    CircularAlias { alias: String, name: String },
}

/// Error related to synthesizing proxy types.
#[derive(Error, Clone, Debug)]
pub enum ProxyGenerationError {
    #[error("Cannot synthesize a proxy for invalid type path: {0}")]
    InvalidTypePath(String),
    #[error("Proxy class handler failed for {class_name}: {source}")]
    HandlerError {
        class_name: String,
        #[source]
        source: ErrorPtr,
    },
}
