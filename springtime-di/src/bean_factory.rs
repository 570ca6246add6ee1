//! Functionality related to registering [BeanDefinition]s and their aliases. A bean factory is the
//! state which gets snapshotted ahead-of-time, so every query here returns results in a stable,
//! registration-based order.
//!
//! Definitions can be registered manually, or discovered from statically submitted
//! [BeanDefinitionRegisterer]s:
//!
//! ```
//! use springtime_di::bean_definition::BeanDefinition;
//! use springtime_di::bean_factory::internal::submit;
//! use springtime_di::bean_factory::{
//!     BeanDefinitionRegisterer, BeanDefinitionRegistry, DefaultBeanFactory, RegisteredBean,
//! };
//!
//! fn register_greeter() -> RegisteredBean {
//!     RegisteredBean::new("greeter", BeanDefinition::new("app::Greeter")).with_alias("hello")
//! }
//!
//! submit! {
//!     BeanDefinitionRegisterer {
//!         register: register_greeter
//!     }
//! }
//!
//! let factory = DefaultBeanFactory::from_registered_beans(false).unwrap();
//! assert_eq!(factory.canonical_name("hello"), "greeter");
//! ```

use crate::bean_definition::BeanDefinition;
use crate::bean_factory::alias::AliasMap;
use crate::bean_factory::registry::NamedBeanDefinitionMap;
use crate::error::BeanDefinitionRegistryError;
use itertools::Itertools;
use tracing::debug;

/// A registry of bean definitions and aliases.
pub trait BeanDefinitionRegistry {
    /// Adds a new definition with given name. Handling of duplicate names is registry-dependent.
    fn register_bean_definition(
        &mut self,
        name: &str,
        definition: BeanDefinition,
    ) -> Result<(), BeanDefinitionRegistryError>;

    /// Removes the definition with given name and returns it.
    fn remove_bean_definition(
        &mut self,
        name: &str,
    ) -> Result<BeanDefinition, BeanDefinitionRegistryError>;

    /// Returns a definition with given name. Aliases are not resolved.
    fn bean_definition(&self, name: &str) -> Option<&BeanDefinition>;

    /// Mutable version of [BeanDefinitionRegistry::bean_definition].
    fn bean_definition_mut(&mut self, name: &str) -> Option<&mut BeanDefinition>;

    /// Checks if there's a definition with given name.
    fn contains_bean_definition(&self, name: &str) -> bool;

    /// Returns names of all registered definitions in registration order.
    fn bean_definition_names(&self) -> &[String];

    /// Registers `alias` as an alternative name for `name`.
    fn register_alias(&mut self, name: &str, alias: &str)
        -> Result<(), BeanDefinitionRegistryError>;

    /// Returns all aliases (including transitive ones) for given name in registration order.
    fn aliases(&self, name: &str) -> Vec<String>;

    /// Checks if given name is an alias.
    fn is_alias(&self, name: &str) -> bool;

    /// Resolves given name (possibly an alias) to the canonical bean name.
    fn canonical_name(&self, name: &str) -> String;
}

/// Default [BeanDefinitionRegistry] keeping definitions and aliases in registration order.
#[derive(Clone, Debug, Default)]
pub struct DefaultBeanFactory {
    definitions: NamedBeanDefinitionMap,
    aliases: AliasMap,
    allow_definition_overriding: bool,
}

impl DefaultBeanFactory {
    pub fn new(allow_definition_overriding: bool) -> Self {
        Self {
            allow_definition_overriding,
            ..Default::default()
        }
    }

    /// Creates a factory populated with all statically submitted [BeanDefinitionRegisterer]s.
    /// Registration happens in bean name order, since submission order is unspecified.
    pub fn from_registered_beans(
        allow_definition_overriding: bool,
    ) -> Result<Self, BeanDefinitionRegistryError> {
        let beans = inventory::iter::<BeanDefinitionRegisterer>
            .into_iter()
            .map(|registerer| (registerer.register)())
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect_vec();

        debug!("Discovered {} registered beans.", beans.len());

        let mut factory = Self::new(allow_definition_overriding);
        for bean in beans {
            factory.register_bean_definition(&bean.name, bean.definition)?;

            for alias in &bean.aliases {
                factory.register_alias(&bean.name, alias)?;
            }
        }

        Ok(factory)
    }

    #[inline]
    pub fn is_definition_overriding_allowed(&self) -> bool {
        self.allow_definition_overriding
    }
}

impl BeanDefinitionRegistry for DefaultBeanFactory {
    fn register_bean_definition(
        &mut self,
        name: &str,
        definition: BeanDefinition,
    ) -> Result<(), BeanDefinitionRegistryError> {
        if name.is_empty() {
            return Err(BeanDefinitionRegistryError::EmptyBeanName);
        }

        self.definitions
            .try_register(name, definition, self.allow_definition_overriding)
    }

    fn remove_bean_definition(
        &mut self,
        name: &str,
    ) -> Result<BeanDefinition, BeanDefinitionRegistryError> {
        self.definitions
            .remove(name)
            .ok_or_else(|| BeanDefinitionRegistryError::NoSuchBeanDefinition(name.to_string()))
    }

    #[inline]
    fn bean_definition(&self, name: &str) -> Option<&BeanDefinition> {
        self.definitions.get(name)
    }

    #[inline]
    fn bean_definition_mut(&mut self, name: &str) -> Option<&mut BeanDefinition> {
        self.definitions.get_mut(name)
    }

    #[inline]
    fn contains_bean_definition(&self, name: &str) -> bool {
        self.definitions.get(name).is_some()
    }

    #[inline]
    fn bean_definition_names(&self) -> &[String] {
        self.definitions.names()
    }

    fn register_alias(
        &mut self,
        name: &str,
        alias: &str,
    ) -> Result<(), BeanDefinitionRegistryError> {
        if name.is_empty() || alias.is_empty() {
            return Err(BeanDefinitionRegistryError::EmptyBeanName);
        }

        self.aliases.try_register(name, alias)
    }

    #[inline]
    fn aliases(&self, name: &str) -> Vec<String> {
        self.aliases.aliases(name)
    }

    #[inline]
    fn is_alias(&self, name: &str) -> bool {
        self.aliases.is_alias(name)
    }

    #[inline]
    fn canonical_name(&self, name: &str) -> String {
        self.aliases.canonical_name(name)
    }
}

/// Bean statically submitted for discovery. See [BeanDefinitionRegisterer].
#[derive(Clone, Debug)]
pub struct RegisteredBean {
    pub name: String,
    pub aliases: Vec<String>,
    pub definition: BeanDefinition,
}

impl RegisteredBean {
    pub fn new<T: ToString>(name: T, definition: BeanDefinition) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            definition,
        }
    }

    pub fn with_alias<T: ToString>(mut self, alias: T) -> Self {
        self.aliases.push(alias.to_string());
        self
    }
}

/// Entry submitted with [internal::submit] to make a bean discoverable by
/// [DefaultBeanFactory::from_registered_beans].
pub struct BeanDefinitionRegisterer {
    pub register: fn() -> RegisteredBean,
}

inventory::collect!(BeanDefinitionRegisterer);

mod registry {
    use crate::bean_definition::BeanDefinition;
    use crate::error::BeanDefinitionRegistryError;
    use fxhash::FxHashMap;
    use tracing::debug;

    #[derive(Default, Clone, Debug)]
    pub(super) struct NamedBeanDefinitionMap {
        definitions: FxHashMap<String, BeanDefinition>,
        names: Vec<String>,
    }

    impl NamedBeanDefinitionMap {
        #[inline]
        pub(super) fn get(&self, name: &str) -> Option<&BeanDefinition> {
            self.definitions.get(name)
        }

        #[inline]
        pub(super) fn get_mut(&mut self, name: &str) -> Option<&mut BeanDefinition> {
            self.definitions.get_mut(name)
        }

        #[inline]
        pub(super) fn names(&self) -> &[String] {
            &self.names
        }

        pub(super) fn try_register(
            &mut self,
            name: &str,
            definition: BeanDefinition,
            allow_definition_overriding: bool,
        ) -> Result<(), BeanDefinitionRegistryError> {
            if let Some(existing) = self.definitions.get_mut(name) {
                if !allow_definition_overriding {
                    return Err(BeanDefinitionRegistryError::DuplicateBeanName(
                        name.to_string(),
                    ));
                }

                debug!(
                    "Overriding bean definition '{}' of type {} with {}.",
                    name, existing.bean_type, definition.bean_type
                );

                // overriding keeps the original registration position
                *existing = definition;
                return Ok(());
            }

            self.definitions.insert(name.to_string(), definition);
            self.names.push(name.to_string());

            Ok(())
        }

        pub(super) fn remove(&mut self, name: &str) -> Option<BeanDefinition> {
            let definition = self.definitions.remove(name)?;
            self.names.retain(|registered| registered != name);
            Some(definition)
        }
    }

}

mod alias {
    use crate::error::BeanDefinitionRegistryError;
    use fxhash::FxHashMap;

    #[derive(Default, Clone, Debug)]
    pub(super) struct AliasMap {
        targets: FxHashMap<String, String>,
        order: Vec<String>,
    }

    impl AliasMap {
        pub(super) fn try_register(
            &mut self,
            name: &str,
            alias: &str,
        ) -> Result<(), BeanDefinitionRegistryError> {
            if alias == name {
                self.remove(alias);
                return Ok(());
            }

            if let Some(registered_name) = self.targets.get(alias) {
                if registered_name == name {
                    return Ok(());
                }

                return Err(BeanDefinitionRegistryError::AliasAlreadyRegistered {
                    alias: alias.to_string(),
                    name: name.to_string(),
                    registered_name: registered_name.clone(),
                });
            }

            if self.resolves_to(name, alias) {
                return Err(BeanDefinitionRegistryError::CircularAlias {
                    alias: alias.to_string(),
                    name: name.to_string(),
                });
            }

            self.targets.insert(alias.to_string(), name.to_string());
            self.order.push(alias.to_string());

            Ok(())
        }

        pub(super) fn aliases(&self, name: &str) -> Vec<String> {
            let mut result = Vec::new();
            self.collect_aliases(name, &mut result);
            result
        }

        fn collect_aliases(&self, name: &str, result: &mut Vec<String>) {
            for alias in &self.order {
                if self.targets.get(alias).map(String::as_str) == Some(name) {
                    result.push(alias.clone());
                    self.collect_aliases(alias, result);
                }
            }
        }

        #[inline]
        pub(super) fn is_alias(&self, name: &str) -> bool {
            self.targets.contains_key(name)
        }

        pub(super) fn canonical_name(&self, name: &str) -> String {
            let mut canonical = name;
            while let Some(target) = self.targets.get(canonical) {
                canonical = target;
            }

            canonical.to_string()
        }

        // checks if following aliases from `name` leads to `target`
        fn resolves_to(&self, name: &str, target: &str) -> bool {
            let mut current = name;
            while let Some(next) = self.targets.get(current) {
                if next == target {
                    return true;
                }

                current = next;
            }

            false
        }

        fn remove(&mut self, alias: &str) {
            if self.targets.remove(alias).is_some() {
                self.order.retain(|registered| registered != alias);
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use crate::bean_factory::alias::AliasMap;
        use crate::error::BeanDefinitionRegistryError;

        #[test]
        fn should_return_aliases_in_registration_order() {
            let mut aliases = AliasMap::default();
            aliases.try_register("service", "svc").unwrap();
            aliases.try_register("other", "oth").unwrap();
            aliases.try_register("service", "primaryService").unwrap();

            assert_eq!(
                aliases.aliases("service"),
                vec!["svc".to_string(), "primaryService".to_string()]
            );
        }

        #[test]
        fn should_return_transitive_aliases() {
            let mut aliases = AliasMap::default();
            aliases.try_register("service", "svc").unwrap();
            aliases.try_register("svc", "s").unwrap();

            assert_eq!(
                aliases.aliases("service"),
                vec!["svc".to_string(), "s".to_string()]
            );
            assert_eq!(aliases.canonical_name("s"), "service");
        }

        #[test]
        fn should_ignore_same_alias_registration() {
            let mut aliases = AliasMap::default();
            aliases.try_register("service", "svc").unwrap();
            aliases.try_register("service", "svc").unwrap();

            assert_eq!(aliases.aliases("service"), vec!["svc".to_string()]);
        }

        #[test]
        fn should_reject_alias_for_other_name() {
            let mut aliases = AliasMap::default();
            aliases.try_register("service", "svc").unwrap();

            assert_eq!(
                aliases.try_register("other", "svc").unwrap_err(),
                BeanDefinitionRegistryError::AliasAlreadyRegistered {
                    alias: "svc".to_string(),
                    name: "other".to_string(),
                    registered_name: "service".to_string(),
                }
            );
        }

        #[test]
        fn should_reject_circular_alias() {
            let mut aliases = AliasMap::default();
            aliases.try_register("a", "b").unwrap();
            aliases.try_register("b", "c").unwrap();

            assert!(matches!(
                aliases.try_register("c", "a").unwrap_err(),
                BeanDefinitionRegistryError::CircularAlias { .. }
            ));
        }

        #[test]
        fn should_drop_alias_equal_to_name() {
            let mut aliases = AliasMap::default();
            aliases.try_register("a", "b").unwrap();
            aliases.try_register("b", "b").unwrap();

            assert!(!aliases.is_alias("b"));
            assert!(aliases.aliases("a").is_empty());
        }
    }
}

#[doc(hidden)]
pub mod internal {
    pub use inventory::submit;
}
