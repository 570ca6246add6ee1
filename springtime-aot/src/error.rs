use crate::generate::generated_files::Kind;
use springtime_di::error::{ErrorPtr, ProxyGenerationError};
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors related to allocating generated classes.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum GeneratedClassError {
    #[error("Feature name must not be empty")]
    EmptyFeatureName,
    #[error("Generated class {class_name} is already defined with a different shape")]
    IncompatibleRedefinition { class_name: String },
}

/// Errors related to storing generated files.
#[derive(Error, Clone, Debug)]
pub enum GeneratedFilesError {
    #[error("{kind:?} file already generated at path: {path}")]
    FileAlreadyExists { kind: Kind, path: String },
    #[error("Invalid generated file path: {0}")]
    InvalidPath(String),
    #[error("Cannot write generated file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: Arc<io::Error>,
    },
}

/// Errors related to refreshing an application context.
#[derive(Error, Clone, Debug)]
pub enum ContextError {
    #[error("Application context has already been refreshed")]
    AlreadyRefreshed,
    #[error("Bean factory post-processing failed: {0}")]
    PostProcessing(#[source] ErrorPtr),
    #[error("Bean '{bean_name}' refers to unknown bean '{reference}'")]
    UnresolvableReference { bean_name: String, reference: String },
    #[error("Error creating proxy for bean '{bean_name}': {source}")]
    Proxy {
        bean_name: String,
        #[source]
        source: ProxyGenerationError,
    },
}

/// Errors related to ahead-of-time processing.
#[derive(Error, Clone, Debug)]
pub enum AotError {
    #[error("Error refreshing application context for AOT processing: {0}")]
    Refresh(#[from] ContextError),
    #[error(transparent)]
    GeneratedClass(#[from] GeneratedClassError),
    #[error(transparent)]
    GeneratedFiles(#[from] GeneratedFilesError),
    /// Failure of a contribution coming from outside of this crate.
    #[error("AOT contribution failed: {0}")]
    Contribution(#[source] ErrorPtr),
}
