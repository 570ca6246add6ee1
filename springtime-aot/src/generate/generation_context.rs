//! Everything needed to generate code during a single AOT run.

use crate::error::GeneratedFilesError;
use crate::generate::class_name::ClassNameGenerator;
use crate::generate::generated_classes::GeneratedClasses;
use crate::generate::generated_files::GeneratedFilesPtr;
use crate::hint::RuntimeHints;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Central access point for generated classes, generated files and runtime hints.
pub trait GenerationContext {
    fn generated_classes(&self) -> &GeneratedClasses;

    fn generated_files(&self) -> &GeneratedFilesPtr;

    fn runtime_hints(&self) -> &RuntimeHints;
}

/// Default [GenerationContext], which can be used to create named child contexts sharing the
/// same state.
#[derive(Clone)]
pub struct DefaultGenerationContext {
    generated_classes: GeneratedClasses,
    generated_files: GeneratedFilesPtr,
    runtime_hints: RuntimeHints,
    name_sequence: Arc<Mutex<FxHashMap<String, usize>>>,
}

impl DefaultGenerationContext {
    pub fn new(class_name_generator: ClassNameGenerator, generated_files: GeneratedFilesPtr) -> Self {
        Self::with_runtime_hints(class_name_generator, generated_files, RuntimeHints::new())
    }

    pub fn with_runtime_hints(
        class_name_generator: ClassNameGenerator,
        generated_files: GeneratedFilesPtr,
        runtime_hints: RuntimeHints,
    ) -> Self {
        Self {
            generated_classes: GeneratedClasses::new(class_name_generator),
            generated_files,
            runtime_hints,
            name_sequence: Default::default(),
        }
    }

    /// Creates a context whose classes use given name as feature name prefix. Asking for the same
    /// name multiple times yields unique prefixes: `name`, `name1`, `name2`...
    pub fn with_name(&self, name: &str) -> Self {
        let sequenced_name = {
            let mut name_sequence = self.name_sequence.lock();
            let next = name_sequence.entry(name.to_string()).or_insert(0);
            let sequence = *next;
            *next += 1;

            if sequence > 0 {
                format!("{}{}", name, sequence)
            } else {
                name.to_string()
            }
        };

        Self {
            generated_classes: self
                .generated_classes
                .with_feature_name_prefix(&sequenced_name),
            generated_files: self.generated_files.clone(),
            runtime_hints: self.runtime_hints.clone(),
            name_sequence: self.name_sequence.clone(),
        }
    }

    /// Writes all generated classes to generated files.
    pub fn write_generated_content(&self) -> Result<(), GeneratedFilesError> {
        self.generated_classes
            .write_to(self.generated_files.as_ref())
    }
}

impl GenerationContext for DefaultGenerationContext {
    #[inline]
    fn generated_classes(&self) -> &GeneratedClasses {
        &self.generated_classes
    }

    #[inline]
    fn generated_files(&self) -> &GeneratedFilesPtr {
        &self.generated_files
    }

    #[inline]
    fn runtime_hints(&self) -> &RuntimeHints {
        &self.runtime_hints
    }
}
