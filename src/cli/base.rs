//! The base interface: config-driven global flags plus registered subcommands.

use anyhow::{Result, anyhow};
use clap::{ArgMatches, CommandFactory, FromArgMatches};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::args::BaseArgs;
use super::command::{ActionContext, CommandDescriptor};
use super::passthrough;
use crate::config::{BaseConfig, ConfigManager, ResolveOptions, ResolvedEnv, resolve_env};
use crate::env::Env;
use crate::output::{self, OutputConfig};
use crate::ui::Style;

/// Options for [`BaseCli::generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Directory to start the project config search from.
    pub root_hint: Option<PathBuf>,
    /// Values layered over whatever the config files provide.
    pub overrides: BaseConfig,
}

/// A command-line interface that subcommands are attached to before a single
/// parse-and-dispatch pass.
pub struct BaseCli {
    config: BaseConfig,
    process_env: Env,
    commands: Vec<Box<dyn CommandDescriptor>>,
}

impl BaseCli {
    /// Builds the base interface from the user and project config files.
    pub async fn generate(options: GenerateOptions) -> Result<Self> {
        let manager = ConfigManager::discover(options.root_hint.as_deref()).await?;
        Self::from_manager(&manager, options.overrides, Env::from_process()).await
    }

    /// Builds the base interface from the files `manager` points at.
    pub async fn from_manager(
        manager: &ConfigManager,
        overrides: BaseConfig,
        process_env: Env,
    ) -> Result<Self> {
        let config = manager.load().await?.merge(overrides);
        Ok(Self::from_config(config, process_env))
    }

    /// Builds the base interface from an already loaded config.
    pub const fn from_config(config: BaseConfig, process_env: Env) -> Self {
        Self {
            config,
            process_env,
            commands: Vec::new(),
        }
    }

    pub const fn config(&self) -> &BaseConfig {
        &self.config
    }

    /// Attaches a subcommand.
    #[must_use]
    pub fn add_command(mut self, command: impl CommandDescriptor + 'static) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    /// The clap command with every attached subcommand.
    pub fn command(&self) -> clap::Command {
        self.commands
            .iter()
            .fold(BaseArgs::command(), |cli, descriptor| {
                let sub = clap::Command::new(descriptor.name()).about(descriptor.about());
                cli.subcommand(descriptor.options(sub))
            })
    }

    /// Parses the process arguments and dispatches to stdout.
    pub async fn parse_async(self) -> Result<ExitCode> {
        let mut stdout = tokio::io::stdout();
        self.parse_from(std::env::args_os(), &mut stdout).await
    }

    /// Parses `args` once and runs the selected subcommand, writing its
    /// output to `out`.
    pub async fn parse_from<I, T, W>(self, args: I, out: &mut W) -> Result<ExitCode>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        W: AsyncWrite + Unpin,
    {
        let command = self.command();
        let args = passthrough::filter_args(
            &command,
            |name| self.passes_through(name),
            args.into_iter().map(Into::into).collect(),
        );
        let matches = match command.try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) => {
                // --help and --version land here too, with exit code 0
                err.print()?;
                return Ok(ExitCode::from(err.exit_code() as u8));
            }
        };
        let args = BaseArgs::from_arg_matches(&matches)?;

        output::init(OutputConfig {
            quiet: args.quiet || self.config.cli.quiet.unwrap_or(false),
            no_color: args.no_color || OutputConfig::default().no_color,
        });

        let options = ResolveOptions {
            env: args.env.clone(),
            vars: args.vars.clone(),
        };
        let resolved = resolve_env(&options, &self.config, self.process_env.clone());

        if let Some(name) = &resolved.missing_env {
            crate::warn!(
                "{} environment '{name}' is not defined in config, using shared vars only",
                Style::warning("Warning:")
            );
        }
        if args.log || self.config.cli.log.unwrap_or(false) {
            log_env(&resolved);
        }

        let Some((name, sub_matches)) = matches.subcommand() else {
            eprintln!("{}", self.command().render_help());
            return Ok(ExitCode::from(exitcode::USAGE as u8));
        };

        let buffer = self.dispatch(name, sub_matches, &resolved.env)?;
        out.write_all(&buffer).await?;
        out.flush().await?;

        Ok(ExitCode::SUCCESS)
    }

    fn passes_through(&self, name: &str) -> bool {
        self.commands
            .iter()
            .any(|descriptor| descriptor.name() == name && descriptor.passes_through())
    }

    fn dispatch(&self, name: &str, matches: &ArgMatches, env: &Env) -> Result<Vec<u8>> {
        let descriptor = self
            .commands
            .iter()
            .find(|descriptor| descriptor.name() == name)
            .ok_or_else(|| anyhow!("Unknown command '{name}'"))?;

        let mut buffer = Vec::new();
        let mut ctx = ActionContext::new(Some(env), &mut buffer);
        descriptor.action(matches, &mut ctx)?;
        Ok(buffer)
    }
}

fn log_env(resolved: &ResolvedEnv) {
    let heading = resolved.selected.as_deref().map_or_else(
        || "Loaded variables".to_string(),
        |env| format!("Loaded variables ({env})"),
    );
    crate::status!("{}", Style::header(heading));
    if resolved.contributed.is_empty() {
        crate::status!("  {}", Style::label("(none)"));
    }
    for (name, value) in resolved.contributed.iter() {
        crate::status!("  {}={value}", Style::value(name));
    }
}
