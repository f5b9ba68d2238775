//! `foo` command: wraps [`crate::foo::foo`].

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::cli::command::{ActionContext, CommandDescriptor};
use crate::foo::foo;

/// Placeholder for a value loaded from the environment.
pub const DEFAULT_TARGET: &str = "$PUBLIC";

pub struct FooCommand;

impl CommandDescriptor for FooCommand {
    fn name(&self) -> &'static str {
        "foo"
    }

    fn about(&self) -> &'static str {
        "Wraps the foo function into a CLI command."
    }

    fn options(&self, command: Command) -> Command {
        command
            .arg(
                Arg::new("target")
                    .short('t')
                    .long("target")
                    .value_name("string")
                    .help("the target to foo")
                    .default_value(DEFAULT_TARGET)
                    .action(ArgAction::Set)
                    .overrides_with("target"),
            )
    }

    fn passes_through(&self) -> bool {
        true
    }

    fn action(&self, matches: &ArgMatches, ctx: &mut ActionContext<'_>) -> Result<()> {
        let raw = matches
            .get_one::<String>("target")
            .map_or(DEFAULT_TARGET, String::as_str);
        let target = ctx.expand(raw);
        writeln!(ctx.out(), "{}", foo(&target))?;
        Ok(())
    }
}
