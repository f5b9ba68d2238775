//! The interface a subcommand implements to be attached to [`BaseCli`].
//!
//! [`BaseCli`]: crate::cli::BaseCli

use anyhow::Result;
use clap::{ArgMatches, Command};
use std::io::Write;

use crate::env::Env;
use crate::expand::expand;

/// A subcommand that can be registered with the base interface.
pub trait CommandDescriptor: Send + Sync {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &'static str;

    /// One-line description shown in help.
    fn about(&self) -> &'static str;

    /// Declares the subcommand's options on `command`.
    fn options(&self, command: Command) -> Command;

    /// Whether undeclared tokens after the subcommand name are dropped
    /// instead of rejected.
    fn passes_through(&self) -> bool {
        false
    }

    /// Runs the subcommand with its parsed matches.
    fn action(&self, matches: &ArgMatches, ctx: &mut ActionContext<'_>) -> Result<()>;
}

/// What an action may touch: the resolved variables and stdout.
pub struct ActionContext<'a> {
    env: Option<&'a Env>,
    out: &'a mut dyn Write,
}

impl<'a> ActionContext<'a> {
    pub fn new(env: Option<&'a Env>, out: &'a mut dyn Write) -> Self {
        Self { env, out }
    }

    pub const fn env(&self) -> Option<&Env> {
        self.env
    }

    /// Expands placeholders in `raw` against the resolved variables.
    pub fn expand(&self, raw: &str) -> String {
        expand(raw, self.env)
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }
}
