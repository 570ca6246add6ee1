//! Native image configuration: runtime hints and startup arguments written next to generated
//! resources.

use crate::config::Settings;
use derive_more::Constructor;
use springtime_aot::hint::native::render;
use springtime_aot::hint::RuntimeHints;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the native image properties file.
pub const NATIVE_IMAGE_PROPERTIES_FILE: &str = "native-image.properties";

#[derive(Error, Debug)]
pub enum NativeConfigurationError {
    #[error("Cannot serialize runtime hints: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Writes native image configuration files to a given directory.
#[derive(Constructor, Clone, Debug)]
pub struct FileNativeConfigurationWriter {
    base_path: PathBuf,
}

impl FileNativeConfigurationWriter {
    /// Writes configuration for given hints. Returns paths of written files.
    pub fn write(&self, hints: &RuntimeHints) -> Result<Vec<PathBuf>, NativeConfigurationError> {
        render(hints)?
            .into_iter()
            .map(|(file_name, content)| {
                let path = self.base_path.join(file_name);
                write_file(&path, content.as_bytes())?;

                debug!("Written native configuration: {}", path.display());
                Ok(path)
            })
            .collect()
    }
}

/// Writes `native-image.properties` with given arguments to the native image directory of the
/// resource output. Returns the path of the written file, or `None` if there are no arguments.
pub fn write_native_image_properties(
    settings: &Settings,
    arguments: &[String],
) -> Result<Option<PathBuf>, NativeConfigurationError> {
    if arguments.is_empty() {
        return Ok(None);
    }

    let path = settings
        .resource_output
        .join(settings.native_image_directory())
        .join(NATIVE_IMAGE_PROPERTIES_FILE);

    let content = format!("Args = {}", arguments.join(" \\\n"));
    write_file(&path, content.as_bytes())?;

    info!("Written native image properties: {}", path.display());
    Ok(Some(path))
}

// reuses an existing file, otherwise creates the file with missing parent directories
fn write_file(path: &Path, content: &[u8]) -> Result<(), NativeConfigurationError> {
    let io_error = |source| NativeConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    fs::write(path, content).map_err(io_error)
}
