//! XDG-style path utilities for the user configuration directory.
//!
//! Prefers XDG Base Directory conventions over OS-specific locations so the
//! config lives in the same place on every platform.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::PathBuf;

/// Directory name used under the config root.
const APP_DIR: &str = "getdotenv";

/// Returns the user configuration directory.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/getdotenv` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/getdotenv` otherwise
pub fn config_dir() -> Result<PathBuf> {
    config_dir_from(std::env::var_os("XDG_CONFIG_HOME"))
}

fn config_dir_from(xdg_config_home: Option<OsString>) -> Result<PathBuf> {
    match xdg_config_home {
        Some(xdg) if !xdg.is_empty() => Ok(PathBuf::from(xdg).join(APP_DIR)),
        _ => Ok(home_dir()?.join(".config").join(APP_DIR)),
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Failed to determine home directory")
}
