//! Bridge between proxy synthesis and AOT output: captured proxies are written as generated files
//! and registered for reflective construction.

use crate::generate::class_name::ClassName;
use crate::generate::generated_files::{GeneratedFilesPtr, Kind};
use crate::hint::{MemberCategory, RuntimeHints, TypeReference};
use springtime_di::error::{ErrorPtr, ProxyGenerationError};
use springtime_di::proxy::ProxyClassHandler;
use std::sync::Arc;
use tracing::debug;

/// [ProxyClassHandler] recording proxies in generated files and runtime hints.
pub struct ProxyCaptureHandler {
    runtime_hints: RuntimeHints,
    generated_files: GeneratedFilesPtr,
}

impl ProxyCaptureHandler {
    pub fn new(runtime_hints: RuntimeHints, generated_files: GeneratedFilesPtr) -> Self {
        Self {
            runtime_hints,
            generated_files,
        }
    }

    fn register_hint(&self, class_name: &str) {
        self.runtime_hints
            .reflection()
            .register_type(TypeReference::of(class_name), |hint| {
                hint.with_members(&[MemberCategory::InvokeDeclaredConstructors]);
            });
    }
}

impl ProxyClassHandler for ProxyCaptureHandler {
    fn handle_generated_class(&self, class_name: &str, content: &[u8]) -> Result<(), ErrorPtr> {
        let path = ClassName::parse(class_name)
            .ok_or_else(|| {
                Arc::new(ProxyGenerationError::InvalidTypePath(class_name.to_string())) as ErrorPtr
            })?
            .file_path("rs");

        debug!("Capturing generated proxy {} at {}.", class_name, path);

        self.generated_files
            .add_file(Kind::Class, &path, content.to_vec())
            .map_err(|error| Arc::new(error) as ErrorPtr)?;

        self.register_hint(class_name);
        Ok(())
    }

    fn handle_loaded_class(&self, class_name: &str) -> Result<(), ErrorPtr> {
        debug!("Registering already loaded proxy {}.", class_name);

        self.register_hint(class_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::generate::generated_files::{InMemoryGeneratedFiles, Kind};
    use crate::hint::{MemberCategory, RuntimeHints, TypeReference};
    use crate::proxy_capture::ProxyCaptureHandler;
    use springtime_di::proxy::ProxyClassHandler;
    use std::sync::Arc;

    #[test]
    fn should_capture_generated_class() {
        let hints = RuntimeHints::new();
        let files = Arc::new(InMemoryGeneratedFiles::new());
        let handler = ProxyCaptureHandler::new(hints.clone(), files.clone());

        handler
            .handle_generated_class("app::Service__SpringtimeProxy", b"struct Proxy;")
            .unwrap();

        assert_eq!(
            files
                .file_string(Kind::Class, "app/Service__SpringtimeProxy.rs")
                .unwrap(),
            "struct Proxy;"
        );
        assert!(hints
            .reflection()
            .type_hint(&TypeReference::of("app::Service__SpringtimeProxy"))
            .unwrap()
            .member_categories()
            .contains(&MemberCategory::InvokeDeclaredConstructors));
    }

    #[test]
    fn should_only_register_hint_for_loaded_class() {
        let hints = RuntimeHints::new();
        let files = Arc::new(InMemoryGeneratedFiles::new());
        let handler = ProxyCaptureHandler::new(hints.clone(), files.clone());

        handler
            .handle_loaded_class("app::Service__SpringtimeProxy")
            .unwrap();

        assert!(files.paths(Kind::Class).is_empty());
        assert!(hints
            .reflection()
            .type_hint(&TypeReference::of("app::Service__SpringtimeProxy"))
            .is_some());
    }

    #[test]
    fn should_reject_invalid_class_name() {
        let handler = ProxyCaptureHandler::new(
            RuntimeHints::new(),
            Arc::new(InMemoryGeneratedFiles::new()),
        );

        assert!(handler.handle_generated_class("not a path", &[]).is_err());
    }
}
