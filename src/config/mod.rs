// src/config/mod.rs

//! Configuration loading and validation for deployagent.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file through the [`FileSystem`](crate::fs::FileSystem)
//!   abstraction (`loader.rs`).
//! - Validate it into a typed [`ConfigFile`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_for_project, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{
    ConfigFile, ConfigOverrides, EnvironmentSection, EnvironmentSettings, PipelineSection,
    RawConfigFile, RepositorySection, RepositorySpec, ScriptSection, ScriptSettings,
    StageTimeouts,
};
