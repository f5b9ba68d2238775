//! # getdotenv-child - a dotenv-aware CLI with a custom command
//!
//! A base command-line interface is generated from `getdotenv.toml` config
//! files and the process environment. Custom subcommands implementing
//! [`cli::CommandDescriptor`] are attached to it before a single
//! asynchronous parse-and-dispatch pass.
//!
//! ## Quick Start
//!
//! ```bash
//! # Prints $PUBLIC expanded, or the literal placeholder if PUBLIC is unset
//! getdotenv-child foo
//!
//! # Explicit target, long or short form
//! getdotenv-child foo --target hello
//! getdotenv-child foo -t hello
//!
//! # Supply variables on the command line
//! getdotenv-child --vars PUBLIC=world foo
//! ```
//!
//! ## Configuration
//!
//! The nearest `getdotenv.toml` at or above the working directory, layered
//! over `~/.config/getdotenv/getdotenv.toml`:
//!
//! ```toml
//! [cli]
//! env = "dev"
//!
//! [vars]
//! PUBLIC = "shared"
//!
//! [envs.dev]
//! PUBLIC = "dev-only"
//! ```

use anyhow::{Context, Result};
use std::process::ExitCode;

/// Command-line interface: base interface, subcommand interface, commands.
pub mod cli;

/// Configuration file management and variable layering.
pub mod config;

/// The variable mapping placeholders resolve against.
pub mod env;

/// Placeholder expansion.
pub mod expand;

/// The library function wrapped by the `foo` command.
pub mod foo;

/// Global output configuration (quiet mode, colors, stderr logging).
pub mod output;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Terminal styling.
pub mod ui;

use cli::commands::FooCommand;
use cli::{BaseCli, GenerateOptions};

/// Builds the base interface rooted at the working directory, attaches the
/// `foo` command and runs it against the process arguments.
pub async fn run() -> Result<ExitCode> {
    let root = std::env::current_dir().context("Failed to determine current directory")?;

    BaseCli::generate(GenerateOptions {
        root_hint: Some(root),
        ..GenerateOptions::default()
    })
    .await?
    .add_command(FooCommand)
    .parse_async()
    .await
}
