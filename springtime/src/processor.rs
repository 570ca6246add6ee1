//! Top-level driver of AOT processing: prepares the application context, runs
//! [ApplicationContextAotGenerator] and writes all results to configured output directories.

use crate::config::{Settings, SettingsError};
use crate::native::{
    write_native_image_properties, FileNativeConfigurationWriter, NativeConfigurationError,
};
#[cfg(test)]
use mockall::automock;
use springtime_aot::context::GenericApplicationContext;
use springtime_aot::error::{AotError, GeneratedFilesError};
use springtime_aot::generate::class_name::{ClassName, ClassNameGenerator};
use springtime_aot::generate::generated_files::FileSystemGeneratedFiles;
use springtime_aot::generate::generation_context::{DefaultGenerationContext, GenerationContext};
use springtime_aot::generator::ApplicationContextAotGenerator;
use springtime_aot::hint::{ExecutableMode, TypeReference};
use springtime_di::error::ErrorPtr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Invalid application type: {0}")]
    InvalidApplicationType(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Error preparing application context: {0}")]
    ContextPreparation(#[source] ErrorPtr),
    #[error("AOT processing failed: {0}")]
    Aot(#[from] AotError),
    #[error("Cannot delete existing output {path}: {source}")]
    OutputDeletion {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot write generated files: {0}")]
    GeneratedFiles(#[from] GeneratedFilesError),
    #[error("Cannot write native configuration: {0}")]
    NativeConfiguration(#[from] NativeConfigurationError),
}

/// Creates a fresh, non-refreshed application context for the application type.
#[cfg_attr(test, automock)]
pub trait ApplicationContextFactory {
    fn prepare_application_context(
        &self,
        application_type: &ClassName,
    ) -> Result<GenericApplicationContext, ErrorPtr>;
}

impl<F> ApplicationContextFactory for F
where
    F: Fn(&ClassName) -> Result<GenericApplicationContext, ErrorPtr>,
{
    fn prepare_application_context(
        &self,
        application_type: &ClassName,
    ) -> Result<GenericApplicationContext, ErrorPtr> {
        self(application_type)
    }
}

/// Returns the default native image arguments for given application type.
pub fn default_native_image_arguments(application_type: &ClassName) -> Vec<String> {
    vec![
        format!("-H:Class={}", application_type),
        "--report-unsupported-elements-at-runtime".to_string(),
        "--no-fallback".to_string(),
        "--install-exit-handlers".to_string(),
    ]
}

/// Installs a `fmt` tracing subscriber configured from `RUST_LOG`. An already installed global
/// subscriber is left as-is.
pub fn install_tracing_logger() {
    if tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_err()
    {
        debug!("Global tracing subscriber already installed.");
    }
}

/// Processes an application ahead-of-time. Returns the name of the generated entry point, which
/// can initialize the bean factory at runtime.
pub struct ContextAotProcessor<F: ApplicationContextFactory> {
    application_type: ClassName,
    settings: Settings,
    context_factory: F,
    native_image_arguments: Vec<String>,
}

impl<F: ApplicationContextFactory> ContextAotProcessor<F> {
    /// Creates a processor for given application type path, using default native image arguments.
    pub fn new(
        application_type: &str,
        settings: Settings,
        context_factory: F,
    ) -> Result<Self, ProcessorError> {
        let application_type = ClassName::parse(application_type)
            .ok_or_else(|| ProcessorError::InvalidApplicationType(application_type.to_string()))?;

        Ok(Self {
            native_image_arguments: default_native_image_arguments(&application_type),
            application_type,
            settings,
            context_factory,
        })
    }

    /// Creates a processor with settings loaded from the environment.
    pub fn from_environment(
        application_type: &str,
        context_factory: F,
    ) -> Result<Self, ProcessorError> {
        Self::new(
            application_type,
            Settings::init_from_environment()?,
            context_factory,
        )
    }

    /// Replaces native image arguments. No properties file is written for empty arguments.
    pub fn with_native_image_arguments(mut self, native_image_arguments: Vec<String>) -> Self {
        self.native_image_arguments = native_image_arguments;
        self
    }

    #[inline]
    pub fn application_type(&self) -> &ClassName {
        &self.application_type
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn native_image_arguments(&self) -> &[String] {
        &self.native_image_arguments
    }

    /// Runs the whole processing: cleans output directories, prepares the context and performs
    /// AOT processing on it.
    pub fn process(&self) -> Result<ClassName, ProcessorError> {
        if self.settings.install_tracing_logger {
            install_tracing_logger();
        }

        info!("Starting AOT processing of {}.", self.application_type);

        self.delete_existing_output()?;

        let context = self
            .context_factory
            .prepare_application_context(&self.application_type)
            .map_err(ProcessorError::ContextPreparation)?;

        self.perform_aot_processing(context)
    }

    /// Generates code for given context and writes all files.
    pub fn perform_aot_processing(
        &self,
        mut application_context: GenericApplicationContext,
    ) -> Result<ClassName, ProcessorError> {
        let generated_files = Arc::new(FileSystemGeneratedFiles::new(
            self.settings.source_output.clone(),
            self.settings.resource_output.clone(),
            self.settings.class_output.clone(),
        ));

        let generation_context = DefaultGenerationContext::new(
            ClassNameGenerator::new(self.application_type.clone()),
            generated_files.clone(),
        );

        let entry_point = ApplicationContextAotGenerator::new()
            .process_ahead_of_time(&mut application_context, &generation_context)?;

        self.register_entry_point_hints(&generation_context, &entry_point);

        generation_context.write_generated_content()?;
        generated_files.flush()?;

        FileNativeConfigurationWriter::new(
            self.settings
                .resource_output
                .join(self.settings.native_image_directory()),
        )
        .write(generation_context.runtime_hints())?;

        write_native_image_properties(&self.settings, &self.native_image_arguments)?;

        info!("AOT processing finished with entry point {}.", entry_point);
        Ok(entry_point)
    }

    fn register_entry_point_hints(
        &self,
        generation_context: &DefaultGenerationContext,
        entry_point: &ClassName,
    ) {
        let application_type = TypeReference::of(&self.application_type);
        let reflection = generation_context.runtime_hints().reflection();

        reflection
            .register_type(application_type.clone(), |_| {})
            .register_type(TypeReference::of(entry_point), |hint| {
                hint.on_reachable_type(application_type)
                    .with_constructor(Vec::new(), ExecutableMode::Invoke);
            });
    }

    fn delete_existing_output(&self) -> Result<(), ProcessorError> {
        for path in [
            &self.settings.source_output,
            &self.settings.resource_output,
            &self.settings.class_output,
        ] {
            delete_directory(path)?;
        }

        Ok(())
    }
}

fn delete_directory(path: &Path) -> Result<(), ProcessorError> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Deleted existing output {}.", path.display());
            Ok(())
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ProcessorError::OutputDeletion {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Settings;
    use crate::processor::{
        default_native_image_arguments, ContextAotProcessor, MockApplicationContextFactory,
        ProcessorError,
    };
    use springtime_aot::context::GenericApplicationContext;
    use springtime_aot::generate::class_name::ClassName;
    use springtime_di::bean_definition::BeanDefinition;
    use springtime_di::bean_factory::{BeanDefinitionRegistry, DefaultBeanFactory};
    use springtime_di::error::ErrorPtr;
    use std::fmt::{Display, Formatter};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError;

    impl Display for TestError {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("test error")
        }
    }

    impl std::error::Error for TestError {}

    fn settings(root: &Path) -> Settings {
        Settings::builder()
            .with_source_output(root.join("sources"))
            .with_resource_output(root.join("resources"))
            .with_class_output(root.join("classes"))
            .with_group_id("com.example")
            .with_artifact_id("demo")
            .with_install_tracing_logger(false)
            .build()
            .unwrap()
    }

    fn service_context() -> GenericApplicationContext {
        let mut bean_factory = DefaultBeanFactory::new(false);
        bean_factory
            .register_bean_definition("service", BeanDefinition::new("app::Service"))
            .unwrap();

        GenericApplicationContext::new(bean_factory)
    }

    #[test]
    fn should_build_default_arguments() {
        assert_eq!(
            default_native_image_arguments(&ClassName::parse("app::Application").unwrap()),
            vec![
                "-H:Class=app::Application",
                "--report-unsupported-elements-at-runtime",
                "--no-fallback",
                "--install-exit-handlers"
            ]
        );
    }

    #[test]
    fn should_reject_invalid_application_type() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            ContextAotProcessor::new(
                "not a type",
                settings(dir.path()),
                MockApplicationContextFactory::new()
            ),
            Err(ProcessorError::InvalidApplicationType(_))
        ));
    }

    #[test]
    fn should_propagate_context_preparation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut factory = MockApplicationContextFactory::new();
        factory
            .expect_prepare_application_context()
            .times(1)
            .returning(|_| Err(Arc::new(TestError) as ErrorPtr));

        let processor =
            ContextAotProcessor::new("app::Application", settings(dir.path()), factory).unwrap();

        assert!(matches!(
            processor.process(),
            Err(ProcessorError::ContextPreparation(_))
        ));
    }

    #[test]
    fn should_write_all_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        let processor = ContextAotProcessor::new(
            "app::Application",
            settings.clone(),
            |_: &ClassName| -> Result<GenericApplicationContext, ErrorPtr> {
                Ok(service_context())
            },
        )
        .unwrap();

        let entry_point = processor.process().unwrap();
        assert_eq!(
            entry_point.canonical_name(),
            "app::Application__ApplicationContextInitializer"
        );

        let native_directory = settings
            .resource_output
            .join(settings.native_image_directory());

        assert!(settings
            .source_output
            .join("app/Application__ApplicationContextInitializer.rs")
            .exists());
        assert!(settings
            .source_output
            .join("app/Application__BeanFactoryRegistrations.rs")
            .exists());

        let reflect_config =
            fs::read_to_string(native_directory.join("reflect-config.json")).unwrap();
        assert!(reflect_config.contains("app::Application__ApplicationContextInitializer"));
        assert!(reflect_config.contains("app::Service"));

        let properties =
            fs::read_to_string(native_directory.join("native-image.properties")).unwrap();
        assert!(properties.starts_with("Args = -H:Class=app::Application \\\n"));
    }

    #[test]
    fn should_register_entry_point_hints() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        let processor = ContextAotProcessor::new(
            "app::Application",
            settings.clone(),
            |_: &ClassName| -> Result<GenericApplicationContext, ErrorPtr> {
                Ok(service_context())
            },
        )
        .unwrap();

        processor.process().unwrap();

        let reflect_config: Vec<serde_json::Value> = serde_json::from_str(
            &fs::read_to_string(
                settings
                    .resource_output
                    .join(settings.native_image_directory())
                    .join("reflect-config.json"),
            )
            .unwrap(),
        )
        .unwrap();

        let entry = |name: &str| {
            reflect_config
                .iter()
                .find(|entry| entry["name"] == name)
                .cloned()
                .unwrap()
        };

        assert_eq!(
            entry("app::Application"),
            serde_json::json!({ "name": "app::Application" })
        );
        assert_eq!(
            entry("app::Application__ApplicationContextInitializer"),
            serde_json::json!({
                "name": "app::Application__ApplicationContextInitializer",
                "condition": { "typeReachable": "app::Application" },
                "methods": [{ "name": "<init>", "parameterTypes": [] }]
            })
        );
    }

    #[test]
    fn should_replace_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        let stale = settings.source_output.join("stale.rs");
        fs::create_dir_all(&settings.source_output).unwrap();
        fs::write(&stale, "").unwrap();

        let processor = ContextAotProcessor::new(
            "app::Application",
            settings.clone(),
            |_: &ClassName| -> Result<GenericApplicationContext, ErrorPtr> {
                Ok(service_context())
            },
        )
        .unwrap()
        .with_native_image_arguments(Vec::new());

        processor.process().unwrap();
        processor.process().unwrap();

        assert!(!stale.exists());
        assert!(!settings
            .resource_output
            .join(settings.native_image_directory())
            .join("native-image.properties")
            .exists());
    }
}
