//! Runtime hints describe what needs to stay accessible at runtime in a restricted environment,
//! e.g. types which are constructed reflectively, or resources loaded by name. Hints only
//! accumulate during processing.

pub mod native;

use parking_lot::Mutex;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Reference to a type by its fully qualified path.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeReference(String);

impl TypeReference {
    pub fn of<T: ToString>(name: T) -> Self {
        Self(name.to_string())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for TypeReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Groups of members which should be accessible.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum MemberCategory {
    PublicFields,
    DeclaredFields,
    IntrospectPublicConstructors,
    IntrospectDeclaredConstructors,
    InvokePublicConstructors,
    InvokeDeclaredConstructors,
    IntrospectPublicMethods,
    IntrospectDeclaredMethods,
    InvokePublicMethods,
    InvokeDeclaredMethods,
}

/// Level of access to an executable member. Invocation implies introspection.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ExecutableMode {
    Introspect,
    Invoke,
}

/// Hint for a single executable member.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ExecutableHint {
    pub name: String,
    pub parameter_types: Vec<TypeReference>,
    pub mode: ExecutableMode,
}

/// Reflection hint for a single type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeHint {
    type_reference: TypeReference,
    reachable_type: Option<TypeReference>,
    member_categories: BTreeSet<MemberCategory>,
    constructors: Vec<ExecutableHint>,
    methods: Vec<ExecutableHint>,
    fields: BTreeSet<String>,
}

impl TypeHint {
    fn new(type_reference: TypeReference) -> Self {
        Self {
            type_reference,
            reachable_type: None,
            member_categories: Default::default(),
            constructors: Vec::new(),
            methods: Vec::new(),
            fields: Default::default(),
        }
    }

    pub fn with_members(&mut self, categories: &[MemberCategory]) -> &mut Self {
        self.member_categories.extend(categories.iter().copied());
        self
    }

    /// Only apply this hint when given type is reachable.
    pub fn on_reachable_type(&mut self, reachable_type: TypeReference) -> &mut Self {
        self.reachable_type = Some(reachable_type);
        self
    }

    /// Registers a constructor with given parameter types. Registering the same constructor again
    /// keeps the stronger mode.
    pub fn with_constructor(
        &mut self,
        parameter_types: Vec<TypeReference>,
        mode: ExecutableMode,
    ) -> &mut Self {
        merge_executable(&mut self.constructors, "<init>", parameter_types, mode);
        self
    }

    pub fn with_method(
        &mut self,
        name: &str,
        parameter_types: Vec<TypeReference>,
        mode: ExecutableMode,
    ) -> &mut Self {
        merge_executable(&mut self.methods, name, parameter_types, mode);
        self
    }

    pub fn with_field(&mut self, name: &str) -> &mut Self {
        self.fields.insert(name.to_string());
        self
    }

    #[inline]
    pub fn type_reference(&self) -> &TypeReference {
        &self.type_reference
    }

    #[inline]
    pub fn reachable_type(&self) -> Option<&TypeReference> {
        self.reachable_type.as_ref()
    }

    #[inline]
    pub fn member_categories(&self) -> &BTreeSet<MemberCategory> {
        &self.member_categories
    }

    #[inline]
    pub fn constructors(&self) -> &[ExecutableHint] {
        &self.constructors
    }

    #[inline]
    pub fn methods(&self) -> &[ExecutableHint] {
        &self.methods
    }

    #[inline]
    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    fn merge(&mut self, other: TypeHint) {
        if other.reachable_type.is_some() {
            self.reachable_type = other.reachable_type;
        }

        self.member_categories.extend(other.member_categories);
        self.fields.extend(other.fields);

        for constructor in other.constructors {
            merge_executable(
                &mut self.constructors,
                &constructor.name,
                constructor.parameter_types,
                constructor.mode,
            );
        }

        for method in other.methods {
            merge_executable(
                &mut self.methods,
                &method.name,
                method.parameter_types,
                method.mode,
            );
        }
    }
}

fn merge_executable(
    executables: &mut Vec<ExecutableHint>,
    name: &str,
    parameter_types: Vec<TypeReference>,
    mode: ExecutableMode,
) {
    let existing = executables
        .iter_mut()
        .find(|hint| hint.name == name && hint.parameter_types == parameter_types);

    match existing {
        Some(hint) => hint.mode = hint.mode.max(mode),
        None => executables.push(ExecutableHint {
            name: name.to_string(),
            parameter_types,
            mode,
        }),
    }
}

/// Reflection hints, kept sorted by type name.
#[derive(Default, Debug)]
pub struct ReflectionHints {
    types: Mutex<BTreeMap<TypeReference, TypeHint>>,
}

impl ReflectionHints {
    /// Registers a hint for given type, which can be then customized. Registering the same type
    /// again merges the customized hint into the existing one. The customizer runs without
    /// holding any lock, so it can use these hints itself.
    pub fn register_type<F: FnOnce(&mut TypeHint)>(
        &self,
        type_reference: TypeReference,
        customizer: F,
    ) -> &Self {
        let mut hint = TypeHint::new(type_reference.clone());
        customizer(&mut hint);

        match self.types.lock().entry(type_reference) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(hint),
            Entry::Vacant(entry) => {
                entry.insert(hint);
            }
        }

        self
    }

    pub fn type_hint(&self, type_reference: &TypeReference) -> Option<TypeHint> {
        self.types.lock().get(type_reference).cloned()
    }

    /// Returns all hints in type name order.
    pub fn type_hints(&self) -> Vec<TypeHint> {
        self.types.lock().values().cloned().collect()
    }
}

/// Resource hints in the form of include patterns.
#[derive(Default, Debug)]
pub struct ResourceHints {
    patterns: Mutex<BTreeSet<String>>,
}

impl ResourceHints {
    pub fn register_pattern<T: ToString>(&self, pattern: T) -> &Self {
        self.patterns.lock().insert(pattern.to_string());
        self
    }

    pub fn patterns(&self) -> Vec<String> {
        self.patterns.lock().iter().cloned().collect()
    }
}

/// All runtime hints gathered during a single AOT run. Clones share the same hints.
#[derive(Clone, Default, Debug)]
pub struct RuntimeHints {
    reflection: Arc<ReflectionHints>,
    resources: Arc<ResourceHints>,
}

impl RuntimeHints {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn reflection(&self) -> &ReflectionHints {
        &self.reflection
    }

    #[inline]
    pub fn resources(&self) -> &ResourceHints {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use crate::hint::{ExecutableMode, MemberCategory, RuntimeHints, TypeReference};

    #[test]
    fn should_merge_type_hints() {
        let hints = RuntimeHints::new();
        let service = TypeReference::of("app::Service");

        hints
            .reflection()
            .register_type(service.clone(), |hint| {
                hint.with_members(&[MemberCategory::IntrospectDeclaredConstructors]);
            })
            .register_type(service.clone(), |hint| {
                hint.with_members(&[MemberCategory::InvokeDeclaredConstructors]);
            });

        let hint = hints.reflection().type_hint(&service).unwrap();
        assert_eq!(hint.member_categories().len(), 2);
        assert_eq!(hints.reflection().type_hints().len(), 1);
    }

    #[test]
    fn should_keep_stronger_executable_mode() {
        let hints = RuntimeHints::new();
        let service = TypeReference::of("app::Service");

        hints.reflection().register_type(service.clone(), |hint| {
            hint.with_constructor(vec![], ExecutableMode::Invoke)
                .with_constructor(vec![], ExecutableMode::Introspect);
        });

        let hint = hints.reflection().type_hint(&service).unwrap();
        assert_eq!(hint.constructors().len(), 1);
        assert_eq!(hint.constructors()[0].mode, ExecutableMode::Invoke);
    }

    #[test]
    fn should_merge_executables_of_repeated_registrations() {
        let hints = RuntimeHints::new();
        let service = TypeReference::of("app::Service");
        let application = TypeReference::of("app::Application");

        hints
            .reflection()
            .register_type(service.clone(), |hint| {
                hint.with_constructor(vec![], ExecutableMode::Invoke)
                    .on_reachable_type(application.clone())
                    .with_field("name");
            })
            .register_type(service.clone(), |hint| {
                hint.with_constructor(vec![], ExecutableMode::Introspect)
                    .with_method("run", vec![], ExecutableMode::Introspect);
            });

        let hint = hints.reflection().type_hint(&service).unwrap();
        assert_eq!(hint.constructors().len(), 1);
        assert_eq!(hint.constructors()[0].mode, ExecutableMode::Invoke);
        assert_eq!(hint.methods().len(), 1);
        assert_eq!(hint.reachable_type(), Some(&application));
        assert!(hint.fields().contains("name"));
    }

    #[test]
    fn should_allow_registering_from_customizer() {
        let hints = RuntimeHints::new();
        let service = TypeReference::of("app::Service");
        let repository = TypeReference::of("app::Repository");

        hints.reflection().register_type(service.clone(), |hint| {
            hints
                .reflection()
                .register_type(repository.clone(), |inner| {
                    inner.with_members(&[MemberCategory::InvokeDeclaredConstructors]);
                });

            assert!(hints.reflection().type_hint(&repository).is_some());
            hint.with_members(&[MemberCategory::IntrospectDeclaredConstructors]);
        });

        assert_eq!(hints.reflection().type_hints().len(), 2);
        assert!(hints
            .reflection()
            .type_hint(&service)
            .unwrap()
            .member_categories()
            .contains(&MemberCategory::IntrospectDeclaredConstructors));
    }

    #[test]
    fn should_sort_type_hints() {
        let hints = RuntimeHints::new();
        hints
            .reflection()
            .register_type(TypeReference::of("b::B"), |_| {})
            .register_type(TypeReference::of("a::A"), |_| {});

        let names: Vec<_> = hints
            .reflection()
            .type_hints()
            .iter()
            .map(|hint| hint.type_reference().to_string())
            .collect();

        assert_eq!(names, vec!["a::A", "b::B"]);
    }

    #[test]
    fn should_share_hints_between_clones() {
        let hints = RuntimeHints::new();
        hints.clone().resources().register_pattern("config/*.json");

        assert_eq!(hints.resources().patterns(), vec!["config/*.json"]);
    }
}
