//! Command-line interface: the base interface and the commands attached to it.

/// Flags owned by the base interface.
pub mod args;

/// Interface assembly and the single parse-and-dispatch pass.
pub mod base;

/// The subcommand interface.
pub mod command;

/// Dropping foreign tokens for pass-through subcommands.
pub mod passthrough;

/// Subcommand implementations.
pub mod commands;

pub use args::BaseArgs;
pub use base::{BaseCli, GenerateOptions};
pub use command::{ActionContext, CommandDescriptor};
