// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, ConfigOverrides, RawConfigFile};
use crate::errors::{DeployError, Result};
use crate::fs::FileSystem;

/// File name looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "deployagent.toml";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path).map_err(|e| {
        DeployError::ConfigError(format!("cannot read config {}: {e:#}", path.display()))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, apply CLI overrides and validate.
pub fn load_and_validate(
    fs: &dyn FileSystem,
    path: impl AsRef<Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    let mut raw = load_from_path(fs, path)?;
    raw.apply_overrides(overrides);
    ConfigFile::try_from(raw)
}

/// Resolve the configuration for a project.
///
/// - `explicit = Some(path)`: that file must exist.
/// - `explicit = None`: `<project_root>/deployagent.toml` is used if present,
///   otherwise built-in defaults (plus overrides) apply.
pub fn load_for_project(
    fs: &dyn FileSystem,
    project_root: &Path,
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(fs, path, overrides);
    }

    let candidate = default_config_path(project_root);
    if fs.is_file(&candidate) {
        debug!(path = %candidate.display(), "using project config file");
        return load_and_validate(fs, &candidate, overrides);
    }

    debug!("no project config file; using built-in defaults");
    let mut raw = RawConfigFile::default();
    raw.apply_overrides(overrides);
    ConfigFile::try_from(raw)
}

pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(DEFAULT_CONFIG_FILE)
}
