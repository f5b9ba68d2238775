use clap::Parser;

/// Flags owned by the base interface. They must appear before the subcommand.
#[derive(Parser, Debug, Default)]
#[command(name = "getdotenv-child")]
#[command(about = "Dotenv-aware CLI extended with custom commands")]
#[command(version)]
pub struct BaseArgs {
    /// Environment name; selects the [envs.<NAME>] table from getdotenv.toml
    #[arg(short = 'e', long, value_name = "NAME")]
    pub env: Option<String>,

    /// Extra variable, highest precedence (repeatable)
    #[arg(long = "vars", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    /// Log variables loaded from config and flags to stderr
    #[arg(short = 'l', long)]
    pub log: bool,

    /// Suppress non-essential output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Parses a `KEY=VALUE` assignment. The value may itself contain `=`.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("PUBLIC=X").unwrap(),
            ("PUBLIC".to_string(), "X".to_string())
        );
        assert_eq!(
            parse_key_val("URL=a=b").unwrap(),
            ("URL".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_val("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_key_val_rejects_malformed() {
        assert!(parse_key_val("PUBLIC").unwrap_err().contains("no `=`"));
        assert!(parse_key_val("=X").unwrap_err().contains("empty key"));
    }

    #[test]
    fn test_base_args_parse() {
        let args = BaseArgs::try_parse_from([
            "getdotenv-child",
            "--env",
            "dev",
            "--vars",
            "A=1",
            "--vars",
            "B=2",
            "-l",
        ])
        .unwrap();

        assert_eq!(args.env.as_deref(), Some("dev"));
        assert_eq!(args.vars.len(), 2);
        assert!(args.log);
        assert!(!args.quiet);
    }
}
