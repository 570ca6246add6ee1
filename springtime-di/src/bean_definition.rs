//! Bean definitions describe how to construct and configure a bean. They are plain data, which
//! makes it possible to register them at runtime via discovery, or to rebuild them from generated
//! code produced ahead-of-time.
//!
//! ```
//! use springtime_di::bean_definition::{BeanDefinition, PropertyValue, ProxyMode};
//!
//! let definition = BeanDefinition::new("app::service::OrderService")
//!     .with_instance_supplier("app::service::OrderService::new")
//!     .with_primary(true)
//!     .with_property_value(PropertyValue::bean_reference("repository", "order_repository"))
//!     .with_proxy_mode(ProxyMode::Subclass);
//!
//! assert!(definition.requires_proxy());
//! ```

/// Name of the scope for instances shared between all dependants.
pub const SINGLETON: &str = "SINGLETON";

/// Name of the scope creating a new instance on each request.
pub const PROTOTYPE: &str = "PROTOTYPE";

/// Decides if the bean should be wrapped in a synthesized proxy type.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ProxyMode {
    /// Use the bean type as-is.
    #[default]
    None,
    /// Synthesize a delegating proxy type for the bean type.
    Subclass,
}

/// Value which should be injected into a named bean property.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Reference to another bean by name (or alias).
    BeanReference(String),
}

/// Named property of a bean.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PropertyValue {
    pub name: String,
    pub value: Value,
}

impl PropertyValue {
    pub fn new<N: ToString>(name: N, value: Value) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    /// Shortcut for a property referring to another bean.
    pub fn bean_reference<N: ToString, B: ToString>(name: N, bean_name: B) -> Self {
        Self::new(name, Value::BeanReference(bean_name.to_string()))
    }
}

/// Metadata describing how to construct and configure a bean.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BeanDefinition {
    /// Fully qualified path of the bean type, e.g. `app::service::OrderService`.
    pub bean_type: String,

    /// Path of the function creating the instance. When absent, the type is expected to be
    /// constructible by its default means.
    pub instance_supplier: Option<String>,

    /// Name of the scope in which instances live, [SINGLETON] by default.
    pub scope: String,

    /// With multiple beans registered for a given type, one of them can be marked as primary.
    pub is_primary: bool,

    pub is_lazy_init: bool,

    /// Names of beans which need to be initialized before this one.
    pub depends_on: Vec<String>,

    pub init_method: Option<String>,

    pub destroy_method: Option<String>,

    pub description: Option<String>,

    pub property_values: Vec<PropertyValue>,

    pub proxy_mode: ProxyMode,

    /// Path of the proxy type synthesized for this bean, resolved during context refresh.
    pub proxy_type: Option<String>,
}

impl BeanDefinition {
    pub fn new<T: ToString>(bean_type: T) -> Self {
        Self {
            bean_type: bean_type.to_string(),
            instance_supplier: None,
            scope: SINGLETON.to_string(),
            is_primary: false,
            is_lazy_init: false,
            depends_on: Vec::new(),
            init_method: None,
            destroy_method: None,
            description: None,
            property_values: Vec::new(),
            proxy_mode: ProxyMode::None,
            proxy_type: None,
        }
    }

    pub fn with_instance_supplier<T: ToString>(mut self, instance_supplier: T) -> Self {
        self.instance_supplier = Some(instance_supplier.to_string());
        self
    }

    pub fn with_scope<T: ToString>(mut self, scope: T) -> Self {
        self.scope = scope.to_string();
        self
    }

    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    pub fn with_lazy_init(mut self, is_lazy_init: bool) -> Self {
        self.is_lazy_init = is_lazy_init;
        self
    }

    pub fn with_depends_on<T: ToString>(mut self, bean_name: T) -> Self {
        self.depends_on.push(bean_name.to_string());
        self
    }

    pub fn with_init_method<T: ToString>(mut self, method: T) -> Self {
        self.init_method = Some(method.to_string());
        self
    }

    pub fn with_destroy_method<T: ToString>(mut self, method: T) -> Self {
        self.destroy_method = Some(method.to_string());
        self
    }

    pub fn with_description<T: ToString>(mut self, description: T) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_property_value(mut self, property_value: PropertyValue) -> Self {
        self.property_values.push(property_value);
        self
    }

    pub fn with_proxy_mode(mut self, proxy_mode: ProxyMode) -> Self {
        self.proxy_mode = proxy_mode;
        self
    }

    #[inline]
    pub fn requires_proxy(&self) -> bool {
        self.proxy_mode == ProxyMode::Subclass
    }

    /// Returns names of all beans this definition refers to, either via properties or explicit
    /// dependencies.
    pub fn referenced_bean_names(&self) -> impl Iterator<Item = &str> {
        self.property_values
            .iter()
            .filter_map(|property| match &property.value {
                Value::BeanReference(name) => Some(name.as_str()),
                _ => None,
            })
            .chain(self.depends_on.iter().map(String::as_str))
    }
}
