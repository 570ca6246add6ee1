//! Storage for files produced during AOT processing. Each file is identified by its [Kind] and
//! relative path, and can only be added once.

use crate::error::GeneratedFilesError;
use crate::generate::generated_class::SourceFile;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Kind of generated file, deciding where it ends up.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Kind {
    /// Generated source code.
    Source,
    /// Resources, e.g. native image configuration.
    Resource,
    /// Synthesized types, e.g. proxies.
    Class,
}

/// Sink for generated files.
pub trait GeneratedFiles {
    /// Adds a file of given kind at given relative path.
    fn add_file(&self, kind: Kind, path: &str, content: Vec<u8>)
        -> Result<(), GeneratedFilesError>;

    /// Adds rendered source of a generated class.
    fn add_source_file(&self, source: &SourceFile) -> Result<(), GeneratedFilesError> {
        self.add_file(
            Kind::Source,
            &source.path(),
            source.content().as_bytes().to_vec(),
        )
    }

    fn add_resource_file(&self, path: &str, content: Vec<u8>) -> Result<(), GeneratedFilesError> {
        self.add_file(Kind::Resource, path, content)
    }
}

pub type GeneratedFilesPtr = Arc<dyn GeneratedFiles + Send + Sync>;

/// Keeps generated files in memory. Useful for tests and as a buffer for other implementations.
#[derive(Default, Debug)]
pub struct InMemoryGeneratedFiles {
    files: Mutex<BTreeMap<(Kind, String), Vec<u8>>>,
}

impl InMemoryGeneratedFiles {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn file(&self, kind: Kind, path: &str) -> Option<Vec<u8>> {
        self.files.lock().get(&(kind, path.to_string())).cloned()
    }

    /// Returns file content as a string, if it exists and is valid UTF-8.
    pub fn file_string(&self, kind: Kind, path: &str) -> Option<String> {
        self.file(kind, path)
            .and_then(|content| String::from_utf8(content).ok())
    }

    /// Returns sorted paths of all files of given kind.
    pub fn paths(&self, kind: Kind) -> Vec<String> {
        self.files
            .lock()
            .keys()
            .filter(|(file_kind, _)| *file_kind == kind)
            .map(|(_, path)| path.clone())
            .collect()
    }

    fn take_all(&self) -> BTreeMap<(Kind, String), Vec<u8>> {
        std::mem::take(&mut *self.files.lock())
    }
}

impl GeneratedFiles for InMemoryGeneratedFiles {
    fn add_file(
        &self,
        kind: Kind,
        path: &str,
        content: Vec<u8>,
    ) -> Result<(), GeneratedFilesError> {
        validate_path(path)?;

        let mut files = self.files.lock();
        let key = (kind, path.to_string());
        if files.contains_key(&key) {
            return Err(GeneratedFilesError::FileAlreadyExists {
                kind,
                path: path.to_string(),
            });
        }

        debug!("Adding {:?} file: {}", kind, path);

        files.insert(key, content);
        Ok(())
    }
}

fn validate_path(path: &str) -> Result<(), GeneratedFilesError> {
    let relative = Path::new(path);
    let valid = !path.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

    if valid {
        Ok(())
    } else {
        Err(GeneratedFilesError::InvalidPath(path.to_string()))
    }
}

/// Buffers generated files in memory and writes them to per-kind root directories on
/// [flush](FileSystemGeneratedFiles::flush).
#[derive(Debug)]
pub struct FileSystemGeneratedFiles {
    source_root: PathBuf,
    resource_root: PathBuf,
    class_root: PathBuf,
    buffer: InMemoryGeneratedFiles,
}

impl FileSystemGeneratedFiles {
    pub fn new(source_root: PathBuf, resource_root: PathBuf, class_root: PathBuf) -> Self {
        Self {
            source_root,
            resource_root,
            class_root,
            buffer: Default::default(),
        }
    }

    /// Returns the root directory for given kind.
    pub fn root(&self, kind: Kind) -> &Path {
        match kind {
            Kind::Source => &self.source_root,
            Kind::Resource => &self.resource_root,
            Kind::Class => &self.class_root,
        }
    }

    /// Writes all buffered files, creating missing directories. Returns the number of written
    /// files. Flushed files are removed from the buffer, but still count as existing.
    pub fn flush(&self) -> Result<usize, GeneratedFilesError> {
        let files = self.buffer.take_all();
        let count = files.len();

        for ((kind, path), content) in files {
            let target = self.root(kind).join(&path);
            let io_error = |source| GeneratedFilesError::Io {
                path: target.to_string_lossy().to_string(),
                source: Arc::new(source),
            };

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }

            if target.exists() {
                return Err(GeneratedFilesError::FileAlreadyExists { kind, path });
            }

            fs::write(&target, content).map_err(io_error)?;
        }

        info!("Flushed {} generated files.", count);
        Ok(count)
    }
}

impl GeneratedFiles for FileSystemGeneratedFiles {
    fn add_file(
        &self,
        kind: Kind,
        path: &str,
        content: Vec<u8>,
    ) -> Result<(), GeneratedFilesError> {
        validate_path(path)?;

        if self.root(kind).join(path).exists() {
            return Err(GeneratedFilesError::FileAlreadyExists {
                kind,
                path: path.to_string(),
            });
        }

        self.buffer.add_file(kind, path, content)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GeneratedFilesError;
    use crate::generate::generated_files::{GeneratedFiles, InMemoryGeneratedFiles, Kind};

    #[test]
    fn should_add_files() {
        let files = InMemoryGeneratedFiles::new();
        files
            .add_file(Kind::Source, "app/Test.rs", b"struct Test;".to_vec())
            .unwrap();
        files
            .add_resource_file("META-INF/test.json", b"{}".to_vec())
            .unwrap();

        assert_eq!(
            files.file_string(Kind::Source, "app/Test.rs").unwrap(),
            "struct Test;"
        );
        assert_eq!(files.paths(Kind::Resource), vec!["META-INF/test.json"]);
        assert!(files.paths(Kind::Class).is_empty());
    }

    #[test]
    fn should_reject_duplicate_files() {
        let files = InMemoryGeneratedFiles::new();
        files
            .add_file(Kind::Source, "app/Test.rs", Vec::new())
            .unwrap();

        assert!(matches!(
            files.add_file(Kind::Source, "app/Test.rs", Vec::new()),
            Err(GeneratedFilesError::FileAlreadyExists { kind: Kind::Source, .. })
        ));
        assert!(files
            .add_file(Kind::Class, "app/Test.rs", Vec::new())
            .is_ok());
    }

    #[test]
    fn should_reject_invalid_paths() {
        let files = InMemoryGeneratedFiles::new();

        for path in ["", "/abs/Test.rs", "../Test.rs", "app/../../Test.rs"] {
            assert!(matches!(
                files.add_file(Kind::Source, path, Vec::new()),
                Err(GeneratedFilesError::InvalidPath(_))
            ));
        }
    }
}
