//! Ahead-of-time processing of bean factories.
//!
//! A configured [GenericApplicationContext](context::GenericApplicationContext) is refreshed
//! without creating any beans, after which its state is snapshotted into generated Rust source
//! able to rebuild the bean factory without runtime discovery. Alongside the source, the run
//! gathers [RuntimeHints](hint::RuntimeHints) describing what needs to stay reflectively
//! accessible in a restricted runtime, and captures synthesized proxy types.
//!
//! The main entry point is [ApplicationContextAotGenerator](generator::ApplicationContextAotGenerator):
//!
//! ```
//! use springtime_aot::context::GenericApplicationContext;
//! use springtime_aot::generate::class_name::{ClassName, ClassNameGenerator};
//! use springtime_aot::generate::generated_files::{InMemoryGeneratedFiles, Kind};
//! use springtime_aot::generate::generation_context::DefaultGenerationContext;
//! use springtime_aot::generator::ApplicationContextAotGenerator;
//! use springtime_di::bean_definition::BeanDefinition;
//! use springtime_di::bean_factory::{BeanDefinitionRegistry, DefaultBeanFactory};
//! use std::sync::Arc;
//!
//! let mut bean_factory = DefaultBeanFactory::new(false);
//! bean_factory
//!     .register_bean_definition("service", BeanDefinition::new("app::Service"))
//!     .unwrap();
//! bean_factory.register_alias("service", "svc").unwrap();
//!
//! let files = Arc::new(InMemoryGeneratedFiles::new());
//! let generation_context = DefaultGenerationContext::new(
//!     ClassNameGenerator::new(ClassName::parse("app::Application").unwrap()),
//!     files.clone(),
//! );
//!
//! let entry_point = ApplicationContextAotGenerator::new()
//!     .process_ahead_of_time(
//!         &mut GenericApplicationContext::new(bean_factory),
//!         &generation_context,
//!     )
//!     .unwrap();
//! generation_context.write_generated_content().unwrap();
//!
//! assert_eq!(
//!     entry_point.canonical_name(),
//!     "app::Application__ApplicationContextInitializer"
//! );
//! assert!(files
//!     .file_string(Kind::Source, "app/Application__BeanFactoryRegistrations.rs")
//!     .unwrap()
//!     .contains("register_aliases"));
//! ```

pub mod aot;
pub mod context;
pub mod error;
pub mod generate;
pub mod generator;
pub mod hint;
pub mod proxy_capture;
