//! Configuration file discovery and loading
//!
//! The viewer merges settings from several places, highest priority first:
//! 1. CLI arguments
//! 2. Environment variables (handled by clap)
//! 3. A TOML config file found by [`find_config_file`]
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Path given on the command line or through the config env var
    Explicit(PathBuf),
    /// File in the current working directory
    CurrentDir(PathBuf),
    /// File under `$XDG_CONFIG_HOME/damage-map/`
    XdgConfig(PathBuf),
    /// File under `/etc/damage-map/`
    System(PathBuf),
    /// Nothing found
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Locate a configuration file
///
/// Search order:
/// 1. `env_var` (e.g. `DAMAGE_MAP_CONFIG`), when it points at an existing file
/// 2. `filename` in the current directory
/// 3. `$XDG_CONFIG_HOME/damage-map/<filename>` (or `~/.config/damage-map/`)
/// 4. `/etc/damage-map/<filename>`
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Ok(path) = env::var(env_var) {
        let p = PathBuf::from(path);
        if p.exists() {
            return ConfigSource::Explicit(p);
        }
    }

    let local = PathBuf::from(filename);
    if local.exists() {
        return ConfigSource::CurrentDir(local);
    }

    let xdg = xdg_dir("XDG_CONFIG_HOME", ".config").join(filename);
    if xdg.exists() {
        return ConfigSource::XdgConfig(xdg);
    }

    let system = PathBuf::from("/etc").join(APP_NAME).join(filename);
    if system.exists() {
        return ConfigSource::System(system);
    }

    ConfigSource::Defaults
}

/// Resolve `$<var>/damage-map`, falling back to `$HOME/<home_relative>/damage-map`
fn xdg_dir(var: &str, home_relative: &str) -> PathBuf {
    if let Ok(base) = env::var(var) {
        PathBuf::from(base).join(APP_NAME)
    } else if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(home_relative).join(APP_NAME)
    } else {
        PathBuf::from(home_relative).join(APP_NAME)
    }
}

/// Read and parse a TOML config file, or return `T::default()` for [`ConfigSource::Defaults`]
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
