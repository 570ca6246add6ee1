//! Bean factory model for ahead-of-time processing. Beans are described by
//! [BeanDefinition](bean_definition::BeanDefinition)s registered in a
//! [DefaultBeanFactory](bean_factory::DefaultBeanFactory), either manually or via static
//! discovery. Beans can ask for a synthesized [proxy] type.

pub mod bean_definition;
pub mod bean_factory;
pub mod error;
pub mod proxy;
