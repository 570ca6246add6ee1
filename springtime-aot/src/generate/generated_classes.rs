//! Registry of [GeneratedClass]es, keyed by their owner: feature name prefix, feature name and
//! optional target component.

use crate::error::{GeneratedClassError, GeneratedFilesError};
use crate::generate::class_name::{ClassName, ClassNameGenerator};
use crate::generate::generated_class::GeneratedClass;
use crate::generate::generated_files::GeneratedFiles;
use crate::generate::spec::TypeSpec;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct Owner {
    feature_name_prefix: String,
    feature_name: String,
    target: Option<ClassName>,
}

/// Registry of generated classes for a single AOT run. Cloned registries created via
/// [with_feature_name_prefix](GeneratedClasses::with_feature_name_prefix) share all classes with
/// the original.
#[derive(Clone, Debug)]
pub struct GeneratedClasses {
    class_name_generator: ClassNameGenerator,
    classes: Arc<Mutex<Vec<Arc<GeneratedClass>>>>,
    classes_by_owner: Arc<Mutex<FxHashMap<Owner, Arc<GeneratedClass>>>>,
}

impl GeneratedClasses {
    pub fn new(class_name_generator: ClassNameGenerator) -> Self {
        Self {
            class_name_generator,
            classes: Default::default(),
            classes_by_owner: Default::default(),
        }
    }

    #[inline]
    pub fn class_name_generator(&self) -> &ClassNameGenerator {
        &self.class_name_generator
    }

    /// Returns the class for given feature, creating it if needed. An existing class must have
    /// been created with the same type spec.
    pub fn get_or_add_for_feature(
        &self,
        feature_name: &str,
        type_spec: TypeSpec,
    ) -> Result<Arc<GeneratedClass>, GeneratedClassError> {
        self.get_or_add(feature_name, None, type_spec)
    }

    /// Returns the class for given feature and target component, creating it if needed. An
    /// existing class must have been created with the same type spec.
    pub fn get_or_add_for_feature_component(
        &self,
        feature_name: &str,
        target: &ClassName,
        type_spec: TypeSpec,
    ) -> Result<Arc<GeneratedClass>, GeneratedClassError> {
        self.get_or_add(feature_name, Some(target), type_spec)
    }

    /// Always creates a new class for given feature.
    pub fn add_for_feature(
        &self,
        feature_name: &str,
        type_spec: TypeSpec,
    ) -> Result<Arc<GeneratedClass>, GeneratedClassError> {
        validate_feature_name(feature_name)?;
        Ok(self.create(feature_name, None, type_spec))
    }

    /// Always creates a new class for given feature and target component.
    pub fn add_for_feature_component(
        &self,
        feature_name: &str,
        target: &ClassName,
        type_spec: TypeSpec,
    ) -> Result<Arc<GeneratedClass>, GeneratedClassError> {
        validate_feature_name(feature_name)?;
        Ok(self.create(feature_name, Some(target), type_spec))
    }

    /// Returns all classes sorted by name.
    pub fn classes(&self) -> Vec<Arc<GeneratedClass>> {
        let mut classes = self.classes.lock().clone();
        classes.sort_by(|a, b| a.name().cmp(b.name()));
        classes
    }

    /// Writes source of all classes, in name order.
    pub fn write_to(&self, generated_files: &dyn GeneratedFiles) -> Result<(), GeneratedFilesError> {
        for class in self.classes() {
            generated_files.add_source_file(&class.generate_source())?;
        }

        Ok(())
    }

    /// Returns a registry using given feature name prefix for new classes, sharing existing
    /// classes and name sequences with this one.
    pub fn with_feature_name_prefix(&self, feature_name_prefix: &str) -> Self {
        Self {
            class_name_generator: self
                .class_name_generator
                .with_feature_name_prefix(feature_name_prefix),
            classes: self.classes.clone(),
            classes_by_owner: self.classes_by_owner.clone(),
        }
    }

    fn get_or_add(
        &self,
        feature_name: &str,
        target: Option<&ClassName>,
        type_spec: TypeSpec,
    ) -> Result<Arc<GeneratedClass>, GeneratedClassError> {
        validate_feature_name(feature_name)?;

        let owner = Owner {
            feature_name_prefix: self.class_name_generator.feature_name_prefix().to_string(),
            feature_name: feature_name.to_string(),
            target: target.cloned(),
        };

        // held for the whole get-or-insert, so racing callers observe a single class
        let mut classes_by_owner = self.classes_by_owner.lock();
        if let Some(class) = classes_by_owner.get(&owner) {
            class.assert_same_type(&type_spec)?;
            return Ok(class.clone());
        }

        let class = self.create(feature_name, target, type_spec);
        classes_by_owner.insert(owner, class.clone());
        Ok(class)
    }

    fn create(
        &self,
        feature_name: &str,
        target: Option<&ClassName>,
        type_spec: TypeSpec,
    ) -> Arc<GeneratedClass> {
        let name = self
            .class_name_generator
            .generate_class_name(feature_name, target);

        debug!("Allocated generated class {}.", name);

        let class = Arc::new(GeneratedClass::new(name, type_spec));
        self.classes.lock().push(class.clone());
        class
    }
}

fn validate_feature_name(feature_name: &str) -> Result<(), GeneratedClassError> {
    if feature_name.is_empty() {
        Err(GeneratedClassError::EmptyFeatureName)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GeneratedClassError;
    use crate::generate::class_name::{ClassName, ClassNameGenerator};
    use crate::generate::generated_classes::GeneratedClasses;
    use crate::generate::generated_files::{InMemoryGeneratedFiles, Kind};
    use crate::generate::spec::TypeSpec;
    use std::sync::Arc;
    use std::thread;

    fn classes() -> GeneratedClasses {
        GeneratedClasses::new(ClassNameGenerator::new(
            ClassName::parse("app::Application").unwrap(),
        ))
    }

    #[test]
    fn should_return_same_class_for_same_owner() {
        let classes = classes();

        let first = classes
            .get_or_add_for_feature("Test", TypeSpec::new())
            .unwrap();
        let second = classes
            .get_or_add_for_feature("Test", TypeSpec::new())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(classes.classes().len(), 1);
    }

    #[test]
    fn should_return_distinct_classes_for_distinct_owners() {
        let classes = classes();
        let target = ClassName::parse("app::Service").unwrap();

        let feature = classes
            .get_or_add_for_feature("Test", TypeSpec::new())
            .unwrap();
        let component = classes
            .get_or_add_for_feature_component("Test", &target, TypeSpec::new())
            .unwrap();
        let prefixed = classes
            .with_feature_name_prefix("other")
            .get_or_add_for_feature("Test", TypeSpec::new())
            .unwrap();

        assert!(!Arc::ptr_eq(&feature, &component));
        assert_ne!(feature.name(), component.name());
        assert_ne!(feature.name(), prefixed.name());
        assert_eq!(component.name().canonical_name(), "app::Service__Test");
        assert_eq!(classes.classes().len(), 3);
    }

    #[test]
    fn should_always_add_new_class() {
        let classes = classes();

        let first = classes.add_for_feature("Test", TypeSpec::new()).unwrap();
        let second = classes.add_for_feature("Test", TypeSpec::new()).unwrap();

        assert_eq!(first.name().simple_name(), "Application__Test");
        assert_eq!(second.name().simple_name(), "Application__Test1");
    }

    #[test]
    fn should_reject_incompatible_redefinition() {
        let classes = classes();
        classes
            .get_or_add_for_feature("Test", TypeSpec::new())
            .unwrap();

        assert!(matches!(
            classes.get_or_add_for_feature("Test", TypeSpec::new().with_doc("other")),
            Err(GeneratedClassError::IncompatibleRedefinition { .. })
        ));
    }

    #[test]
    fn should_reject_empty_feature_name() {
        assert_eq!(
            classes()
                .get_or_add_for_feature("", TypeSpec::new())
                .unwrap_err(),
            GeneratedClassError::EmptyFeatureName
        );
    }

    #[test]
    fn should_register_single_class_concurrently() {
        let classes = classes();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let classes = classes.clone();
                thread::spawn(move || {
                    classes
                        .get_or_add_for_feature("Test", TypeSpec::new())
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert!(results.iter().all(|class| Arc::ptr_eq(class, &results[0])));
        assert_eq!(classes.classes().len(), 1);
    }

    #[test]
    fn should_write_sources_in_name_order() {
        let classes = classes();
        classes.add_for_feature("Zeta", TypeSpec::new()).unwrap();
        classes.add_for_feature("Alpha", TypeSpec::new()).unwrap();

        let files = InMemoryGeneratedFiles::new();
        classes.write_to(&files).unwrap();

        assert_eq!(
            files.paths(Kind::Source),
            vec!["app/Application__Alpha.rs", "app/Application__Zeta.rs"]
        );
    }
}
