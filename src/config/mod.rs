//! Configuration file management and variable layering.

mod manager;

pub use manager::{
    BaseConfig, CONFIG_FILE_NAME, CliDefaults, ConfigManager, ResolveOptions, ResolvedEnv,
    find_project_config, resolve_env,
};
