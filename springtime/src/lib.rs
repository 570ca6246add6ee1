//! Ahead-of-time processing harness for [springtime_di] applications.
//!
//! Applications usually discover their beans at startup, which can be expensive or simply
//! impossible in restricted runtimes. [ContextAotProcessor](processor::ContextAotProcessor) runs
//! the discovery once, at build time, and writes:
//!
//! * generated source able to initialize the bean factory without discovery,
//! * synthesized proxy types,
//! * native image configuration with runtime hints and startup arguments.
//!
//! Output locations are described by [Settings](config::Settings), which can be loaded from the
//! environment or built programmatically.

pub mod config;
pub mod native;
pub mod processor;
