use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::env::Env;
use crate::paths;

/// Name of the config file, both in the user config dir and in projects.
pub const CONFIG_FILE_NAME: &str = "getdotenv.toml";

/// Default flag values in the `[cli]` section of getdotenv.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CliDefaults {
    /// Default environment name, as if passed with `--env`.
    pub env: Option<String>,
    /// Log the loaded variables to stderr.
    pub log: Option<bool>,
    /// Suppress non-essential output.
    pub quiet: Option<bool>,
}

/// The complete configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BaseConfig {
    /// Default flag values.
    #[serde(default)]
    pub cli: CliDefaults,
    /// Variables applied in every environment.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    /// Variables applied only when the named environment is selected.
    #[serde(default)]
    pub envs: BTreeMap<String, BTreeMap<String, String>>,
}

impl BaseConfig {
    /// Layers `other` on top of `self`. Values set in `other` win.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.cli = CliDefaults {
            env: other.cli.env.or(self.cli.env),
            log: other.cli.log.or(self.cli.log),
            quiet: other.cli.quiet.or(self.cli.quiet),
        };
        self.vars.extend(other.vars);
        for (name, vars) in other.envs {
            self.envs.entry(name).or_default().extend(vars);
        }
        self
    }
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Selected environment name.
    pub env: Option<String>,
    /// `--vars` assignments, in command-line order.
    pub vars: Vec<(String, String)>,
}

/// The variable mapping after layering config and CLI over the process env.
#[derive(Debug, Clone, Default)]
pub struct ResolvedEnv {
    /// Every variable visible to commands.
    pub env: Env,
    /// Only the variables contributed by config and CLI.
    pub contributed: Env,
    /// The selected environment name, if any.
    pub selected: Option<String>,
    /// Set when the selected environment has no `[envs.<name>]` table.
    pub missing_env: Option<String>,
}

/// Resolves the variable mapping.
///
/// Precedence, lowest to highest: process env, `[vars]`,
/// `[envs.<selected>]`, then `--vars`. CLI `--env` overrides `[cli] env`.
pub fn resolve_env(options: &ResolveOptions, config: &BaseConfig, process: Env) -> ResolvedEnv {
    let selected = options.env.clone().or_else(|| config.cli.env.clone());

    let mut contributed = Env::new();
    contributed.extend(config.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let mut missing_env = None;
    if let Some(name) = &selected {
        match config.envs.get(name) {
            Some(vars) => contributed.extend(vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            None => missing_env = Some(name.clone()),
        }
    }

    contributed.extend(options.vars.iter().cloned());

    let mut env = process;
    env.extend(contributed.iter());

    ResolvedEnv {
        env,
        contributed,
        selected,
        missing_env,
    }
}

/// Walks up from `start` looking for a project config file.
pub async fn find_project_config(start: &Path) -> Result<Option<PathBuf>> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        let exists = tokio::fs::try_exists(&candidate)
            .await
            .with_context(|| format!("Failed to check for {}", candidate.display()))?;
        if exists {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Locates and loads the user and project configuration files.
pub struct ConfigManager {
    user_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Uses exactly the given files. `None` skips that layer.
    pub const fn new(user_path: Option<PathBuf>, project_path: Option<PathBuf>) -> Self {
        Self {
            user_path,
            project_path,
        }
    }

    /// Finds the config files for a run.
    ///
    /// The user config is `$XDG_CONFIG_HOME/getdotenv/getdotenv.toml` or
    /// `~/.config/getdotenv/getdotenv.toml`. The project config is the
    /// nearest getdotenv.toml at or above `root_hint`.
    pub async fn discover(root_hint: Option<&Path>) -> Result<Self> {
        let user_path = paths::config_dir()
            .ok()
            .map(|dir| dir.join(CONFIG_FILE_NAME));

        let project_path = match root_hint {
            Some(root) => find_project_config(root).await?,
            None => None,
        };

        Ok(Self::new(user_path, project_path))
    }

    /// Loads and merges both files. Missing files count as empty.
    pub async fn load(&self) -> Result<BaseConfig> {
        let mut config = BaseConfig::default();
        for path in [&self.user_path, &self.project_path].into_iter().flatten() {
            if let Some(file) = load_file(path).await? {
                config = config.merge(file);
            }
        }
        Ok(config)
    }
}

async fn load_file(path: &Path) -> Result<Option<BaseConfig>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read config file: {}", path.display()));
        }
    };

    let config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(Some(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config() -> BaseConfig {
        toml::from_str(
            r#"
            [cli]
            env = "dev"

            [vars]
            PUBLIC = "from-vars"
            SHARED = "base"

            [envs.dev]
            PUBLIC = "from-dev"

            [envs.prod]
            PUBLIC = "from-prod"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let config = create_test_config();

        assert_eq!(config.cli.env.as_deref(), Some("dev"));
        assert_eq!(config.cli.log, None);
        assert_eq!(config.vars["SHARED"], "base");
        assert_eq!(config.envs["prod"]["PUBLIC"], "from-prod");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: BaseConfig = toml::from_str("").unwrap();
        assert_eq!(config, BaseConfig::default());
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = create_test_config();
        let overlay: BaseConfig = toml::from_str(
            r#"
            [cli]
            log = true

            [vars]
            SHARED = "overlay"

            [envs.dev]
            EXTRA = "1"
            "#,
        )
        .unwrap();

        let merged = base.merge(overlay);

        assert_eq!(merged.cli.env.as_deref(), Some("dev"));
        assert_eq!(merged.cli.log, Some(true));
        assert_eq!(merged.vars["SHARED"], "overlay");
        assert_eq!(merged.vars["PUBLIC"], "from-vars");
        assert_eq!(merged.envs["dev"]["PUBLIC"], "from-dev");
        assert_eq!(merged.envs["dev"]["EXTRA"], "1");
    }

    #[test]
    fn test_resolve_env_precedence() {
        let config = create_test_config();
        let process = Env::from_iter([("PUBLIC", "from-process"), ("HOME", "/home/me")]);

        // [cli] env = "dev" selects [envs.dev]
        let resolved = resolve_env(&ResolveOptions::default(), &config, process.clone());
        assert_eq!(resolved.env.get("PUBLIC"), Some("from-dev"));
        assert_eq!(resolved.env.get("HOME"), Some("/home/me"));
        assert_eq!(resolved.selected.as_deref(), Some("dev"));

        // --env overrides the config default
        let options = ResolveOptions {
            env: Some("prod".to_string()),
            vars: vec![],
        };
        let resolved = resolve_env(&options, &config, process.clone());
        assert_eq!(resolved.env.get("PUBLIC"), Some("from-prod"));

        // --vars beats everything
        let options = ResolveOptions {
            env: Some("prod".to_string()),
            vars: vec![("PUBLIC".to_string(), "from-cli".to_string())],
        };
        let resolved = resolve_env(&options, &config, process);
        assert_eq!(resolved.env.get("PUBLIC"), Some("from-cli"));
    }

    #[test]
    fn test_resolve_env_without_config_is_process_env() {
        let process = Env::from_iter([("PUBLIC", "X")]);
        let resolved = resolve_env(&ResolveOptions::default(), &BaseConfig::default(), process);

        assert_eq!(resolved.env.get("PUBLIC"), Some("X"));
        assert!(resolved.contributed.is_empty());
        assert!(resolved.selected.is_none());
    }

    #[test]
    fn test_resolve_env_contributed_excludes_process() {
        let config = create_test_config();
        let process = Env::from_iter([("HOME", "/home/me")]);
        let resolved = resolve_env(&ResolveOptions::default(), &config, process);

        assert!(!resolved.contributed.contains("HOME"));
        assert_eq!(resolved.contributed.get("SHARED"), Some("base"));
    }

    #[test]
    fn test_resolve_env_reports_missing_env() {
        let options = ResolveOptions {
            env: Some("staging".to_string()),
            vars: vec![],
        };
        let resolved = resolve_env(&options, &create_test_config(), Env::new());

        assert_eq!(resolved.missing_env.as_deref(), Some("staging"));
        assert_eq!(resolved.env.get("PUBLIC"), Some("from-vars"));
    }

    #[tokio::test]
    async fn test_find_project_config_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "").unwrap();

        let found = find_project_config(&nested).await.unwrap();
        assert_eq!(found, Some(temp_dir.path().join(CONFIG_FILE_NAME)));
    }

    #[tokio::test]
    async fn test_find_project_config_prefers_nearest() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        fs::write(nested.join(CONFIG_FILE_NAME), "").unwrap();

        let found = find_project_config(&nested).await.unwrap();
        assert_eq!(found, Some(nested.join(CONFIG_FILE_NAME)));
    }

    #[tokio::test]
    async fn test_load_missing_files_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::new(
            Some(temp_dir.path().join("user.toml")),
            Some(temp_dir.path().join("project.toml")),
        );

        let config = manager.load().await.unwrap();
        assert_eq!(config, BaseConfig::default());
    }

    #[tokio::test]
    async fn test_load_project_overrides_user() {
        let temp_dir = TempDir::new().unwrap();
        let user = temp_dir.path().join("user.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&user, "[vars]\nPUBLIC = \"user\"\nONLY_USER = \"u\"\n").unwrap();
        fs::write(&project, "[vars]\nPUBLIC = \"project\"\n").unwrap();

        let manager = ConfigManager::new(Some(user), Some(project));
        let config = manager.load().await.unwrap();

        assert_eq!(config.vars["PUBLIC"], "project");
        assert_eq!(config.vars["ONLY_USER"], "u");
    }

    #[tokio::test]
    async fn test_load_malformed_config_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&project, "[vars\nbroken").unwrap();

        let manager = ConfigManager::new(None, Some(project));
        let err = manager.load().await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse config file"));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
