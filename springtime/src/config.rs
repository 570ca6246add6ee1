//! AOT processing configuration. [Settings] can be built programmatically with
//! [Settings::builder], or loaded from an optional `springtime-aot.json` file, which can then be
//! overwritten by environment variables prefixed with `SPRINGTIME_AOT_`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_ENV_PREFIX: &str = "SPRINGTIME_AOT";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "springtime-aot.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Missing required setting: {0}")]
    MissingValue(&'static str),
    #[error("Error loading settings: {0}")]
    Config(#[from] ConfigError),
}

/// Settings of a single AOT processing run.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    /// Root directory for generated source files.
    pub source_output: PathBuf,
    /// Root directory for generated resource files, e.g. native image configuration.
    pub resource_output: PathBuf,
    /// Root directory for synthesized types, e.g. proxies.
    pub class_output: PathBuf,
    /// Group identifier used to build native image configuration paths.
    pub group_id: String,
    /// Artifact identifier used to build native image configuration paths.
    pub artifact_id: String,
    /// Should a default tracing logger be installed for the processing run.
    pub install_tracing_logger: bool,
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        Default::default()
    }

    /// Loads settings from the default config file and environment.
    pub fn init_from_environment() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalSettings>())?;

        SettingsBuilder::from(settings).build()
    }

    /// Directory for native image configuration files of this artifact, relative to the resource
    /// output.
    pub fn native_image_directory(&self) -> PathBuf {
        Path::new("META-INF")
            .join("native-image")
            .join(&self.group_id)
            .join(&self.artifact_id)
    }
}

/// Builder for [Settings], validating that all required values are present.
#[derive(Clone, Debug, Default)]
pub struct SettingsBuilder {
    source_output: Option<PathBuf>,
    resource_output: Option<PathBuf>,
    class_output: Option<PathBuf>,
    group_id: Option<String>,
    artifact_id: Option<String>,
    install_tracing_logger: Option<bool>,
}

impl SettingsBuilder {
    pub fn with_source_output<T: Into<PathBuf>>(mut self, path: T) -> Self {
        self.source_output = Some(path.into());
        self
    }

    pub fn with_resource_output<T: Into<PathBuf>>(mut self, path: T) -> Self {
        self.resource_output = Some(path.into());
        self
    }

    pub fn with_class_output<T: Into<PathBuf>>(mut self, path: T) -> Self {
        self.class_output = Some(path.into());
        self
    }

    pub fn with_group_id<T: ToString>(mut self, group_id: T) -> Self {
        self.group_id = Some(group_id.to_string());
        self
    }

    pub fn with_artifact_id<T: ToString>(mut self, artifact_id: T) -> Self {
        self.artifact_id = Some(artifact_id.to_string());
        self
    }

    pub fn with_install_tracing_logger(mut self, install_tracing_logger: bool) -> Self {
        self.install_tracing_logger = Some(install_tracing_logger);
        self
    }

    pub fn build(self) -> Result<Settings, SettingsError> {
        Ok(Settings {
            source_output: self
                .source_output
                .ok_or(SettingsError::MissingValue("source_output"))?,
            resource_output: self
                .resource_output
                .ok_or(SettingsError::MissingValue("resource_output"))?,
            class_output: self
                .class_output
                .ok_or(SettingsError::MissingValue("class_output"))?,
            group_id: self
                .group_id
                .filter(|group_id| !group_id.is_empty())
                .ok_or(SettingsError::MissingValue("group_id"))?,
            artifact_id: self
                .artifact_id
                .filter(|artifact_id| !artifact_id.is_empty())
                .ok_or(SettingsError::MissingValue("artifact_id"))?,
            install_tracing_logger: self.install_tracing_logger.unwrap_or(true),
        })
    }
}

impl From<OptionalSettings> for SettingsBuilder {
    fn from(value: OptionalSettings) -> Self {
        Self {
            source_output: value.source_output,
            resource_output: value.resource_output,
            class_output: value.class_output,
            group_id: value.group_id,
            artifact_id: value.artifact_id,
            install_tracing_logger: value.install_tracing_logger,
        }
    }
}

#[derive(Deserialize)]
struct OptionalSettings {
    source_output: Option<PathBuf>,
    resource_output: Option<PathBuf>,
    class_output: Option<PathBuf>,
    group_id: Option<String>,
    artifact_id: Option<String>,
    install_tracing_logger: Option<bool>,
}

#[cfg(test)]
mod tests {
    use crate::config::{Settings, SettingsError};
    use std::path::PathBuf;

    #[test]
    fn should_build_settings() {
        let settings = Settings::builder()
            .with_source_output("target/aot/sources")
            .with_resource_output("target/aot/resources")
            .with_class_output("target/aot/classes")
            .with_group_id("com.example")
            .with_artifact_id("demo")
            .build()
            .unwrap();

        assert!(settings.install_tracing_logger);
        assert_eq!(settings.source_output, PathBuf::from("target/aot/sources"));
        assert_eq!(
            settings.native_image_directory(),
            PathBuf::from("META-INF/native-image/com.example/demo")
        );
    }

    #[test]
    fn should_require_all_values() {
        let result = Settings::builder()
            .with_source_output("sources")
            .with_resource_output("resources")
            .with_class_output("classes")
            .with_group_id("com.example")
            .build();

        assert!(matches!(
            result,
            Err(SettingsError::MissingValue("artifact_id"))
        ));
    }
}
