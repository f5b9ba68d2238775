//! Subcommand implementations.

/// Wraps the `foo` library function.
pub mod foo;

pub use foo::FooCommand;
