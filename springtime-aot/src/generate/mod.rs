//! Code generation building blocks: unique class names, generated classes with their methods,
//! generated files and the context tying them together for a single AOT run.

pub mod class_name;
pub mod generated_class;
pub mod generated_classes;
pub mod generated_files;
pub mod generated_method;
pub mod generation_context;
pub mod spec;
