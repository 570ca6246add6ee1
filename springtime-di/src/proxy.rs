//! Proxy types are synthesized for beans whose definitions ask for it (see
//! [ProxyMode](crate::bean_definition::ProxyMode)). A proxy is a delegating wrapper type emitted as
//! source code.
//!
//! Synthesis can be observed by installing a [ProxyClassHandler] into [ProxyHooks]. Hooks are an
//! explicit object passed to whoever synthesizes proxies, and the handler
//! stays installed only as long as the returned [ProxyHooksGuard] lives:
//!
//! ```
//! use springtime_di::error::ErrorPtr;
//! use springtime_di::proxy::{ProxyClassGenerator, ProxyClassHandler, ProxyHooks};
//! use std::sync::Arc;
//!
//! struct PrintingHandler;
//!
//! impl ProxyClassHandler for PrintingHandler {
//!     fn handle_generated_class(&self, class_name: &str, _content: &[u8]) -> Result<(), ErrorPtr> {
//!         println!("generated {class_name}");
//!         Ok(())
//!     }
//!
//!     fn handle_loaded_class(&self, class_name: &str) -> Result<(), ErrorPtr> {
//!         println!("reused {class_name}");
//!         Ok(())
//!     }
//! }
//!
//! let hooks = ProxyHooks::default();
//! let generator = ProxyClassGenerator::default();
//! {
//!     let _guard = hooks.install(Arc::new(PrintingHandler));
//!     generator.proxy_type_for("app::Service", &hooks).unwrap();
//! }
//! assert!(!hooks.is_installed());
//! ```

use crate::error::{ErrorPtr, ProxyGenerationError};
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::sync::Arc;
use syn::ext::IdentExt;
use syn::Path;
use tracing::debug;

/// Suffix appended to the bean type name to form the proxy type name.
pub const PROXY_TYPE_SUFFIX: &str = "__SpringtimeProxy";

/// Receives notifications about proxy types.
#[cfg_attr(test, automock)]
pub trait ProxyClassHandler {
    /// Called with the source of a newly synthesized proxy type.
    fn handle_generated_class(&self, class_name: &str, content: &[u8]) -> Result<(), ErrorPtr>;

    /// Called when an already synthesized proxy type is used again.
    fn handle_loaded_class(&self, class_name: &str) -> Result<(), ErrorPtr>;
}

pub type ProxyClassHandlerPtr = Arc<dyn ProxyClassHandler + Send + Sync>;

/// Interception point for proxy synthesis. When no handler is installed, notifications are
/// dropped.
#[derive(Default)]
pub struct ProxyHooks {
    handler: Mutex<Option<ProxyClassHandlerPtr>>,
}

impl ProxyHooks {
    /// Installs given handler until the returned guard is dropped, at which point the previously
    /// installed handler (usually none) is restored.
    #[must_use = "the handler is uninstalled when the guard is dropped"]
    pub fn install(&self, handler: ProxyClassHandlerPtr) -> ProxyHooksGuard<'_> {
        let previous = self.handler.lock().replace(handler);
        ProxyHooksGuard {
            hooks: self,
            previous,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.handler.lock().is_some()
    }

    fn on_generated_class(&self, class_name: &str, content: &[u8]) -> Result<(), ErrorPtr> {
        // don't hold the lock while calling out
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => handler.handle_generated_class(class_name, content),
            None => Ok(()),
        }
    }

    fn on_loaded_class(&self, class_name: &str) -> Result<(), ErrorPtr> {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => handler.handle_loaded_class(class_name),
            None => Ok(()),
        }
    }
}

/// Scope of an installed [ProxyClassHandler]. See [ProxyHooks::install].
pub struct ProxyHooksGuard<'a> {
    hooks: &'a ProxyHooks,
    previous: Option<ProxyClassHandlerPtr>,
}

impl Drop for ProxyHooksGuard<'_> {
    fn drop(&mut self) {
        *self.hooks.handler.lock() = self.previous.take();
    }
}

/// Synthesizes proxy types and remembers the ones already created, so each bean type gets a
/// single proxy.
#[derive(Default)]
pub struct ProxyClassGenerator {
    loaded: Mutex<FxHashMap<String, String>>,
}

impl ProxyClassGenerator {
    /// Returns the path of the proxy type for given bean type, synthesizing it if needed.
    pub fn proxy_type_for(
        &self,
        bean_type: &str,
        hooks: &ProxyHooks,
    ) -> Result<String, ProxyGenerationError> {
        let existing = self.loaded.lock().get(bean_type).cloned();
        if let Some(proxy_type) = existing {
            debug!("Reusing proxy {} for {}.", proxy_type, bean_type);

            hooks
                .on_loaded_class(&proxy_type)
                .map_err(|source| ProxyGenerationError::HandlerError {
                    class_name: proxy_type.clone(),
                    source,
                })?;

            return Ok(proxy_type);
        }

        let target: Path = syn::parse_str(bean_type)
            .map_err(|_| ProxyGenerationError::InvalidTypePath(bean_type.to_string()))?;

        let proxy_type = proxy_type_name(&target)
            .ok_or_else(|| ProxyGenerationError::InvalidTypePath(bean_type.to_string()))?;
        let content = generate_proxy_source(&target)
            .ok_or_else(|| ProxyGenerationError::InvalidTypePath(bean_type.to_string()))?
            .to_string();

        debug!("Synthesized proxy {} for {}.", proxy_type, bean_type);

        hooks
            .on_generated_class(&proxy_type, content.as_bytes())
            .map_err(|source| ProxyGenerationError::HandlerError {
                class_name: proxy_type.clone(),
                source,
            })?;

        self.loaded
            .lock()
            .insert(bean_type.to_string(), proxy_type.clone());

        Ok(proxy_type)
    }
}

fn proxy_type_name(target: &Path) -> Option<String> {
    let segments: Vec<_> = target
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect();

    let (_, module) = segments.split_last()?;
    let mut result = module.join("::");
    if !result.is_empty() {
        result.push_str("::");
    }

    result.push_str(&target.segments.last()?.ident.unraw().to_string());
    result.push_str(PROXY_TYPE_SUFFIX);
    Some(result)
}

fn generate_proxy_source(target: &Path) -> Option<TokenStream> {
    let name = &target.segments.last()?.ident;
    let proxy = format_ident!("{}{}", name, PROXY_TYPE_SUFFIX);
    let doc = format!("Delegating proxy for [`{}`].", name);

    Some(quote! {
        #[doc = #doc]
        pub struct #proxy {
            target: ::std::sync::Arc<#target>,
        }

        impl #proxy {
            pub fn new(target: ::std::sync::Arc<#target>) -> Self {
                Self { target }
            }
        }

        impl ::std::ops::Deref for #proxy {
            type Target = #target;

            fn deref(&self) -> &Self::Target {
                &self.target
            }
        }
    })
}
