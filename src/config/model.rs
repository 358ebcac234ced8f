// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::PipelineMode;

/// Top-level configuration as read from `deployagent.toml`.
///
/// ```toml
/// [repository]
/// url = "https://example.com/org/ai-hackathon-25.git"
/// name = "ai-hackathon-25"
/// branch = "master"
///
/// [pipeline]
/// clone = true
/// script_timeout = "30m"
///
/// [environment]
/// dir = "venv"
/// manifest = "requirements.txt"
///
/// [script]
/// path = "pipeline.py"
/// required_env = ["PINECONE_API_KEY"]
///
/// [script.env]
/// PINECONE_INDEX = "terraform-docs"
/// ```
///
/// Every section is optional; only `repository.url` has no default and must
/// come from either the file or `--repo-url`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub repository: RepositorySection,

    #[serde(default)]
    pub pipeline: PipelineSection,

    #[serde(default)]
    pub environment: EnvironmentSection,

    #[serde(default)]
    pub script: ScriptSection,
}

/// `[repository]` section: which automation repository to fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySection {
    #[serde(default)]
    pub url: Option<String>,

    /// Directory name of the checkout under the project root.
    #[serde(default = "default_repo_name")]
    pub name: String,

    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_repo_name() -> String {
    "ai-hackathon-25".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            url: None,
            name: default_repo_name(),
            branch: default_branch(),
        }
    }
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// `true`: fresh clone every run. `false`: reuse an existing checkout
    /// (in-place variant).
    #[serde(default = "default_clone")]
    pub clone: bool,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: String,

    #[serde(default = "default_provision_timeout")]
    pub provision_timeout: String,

    #[serde(default = "default_script_timeout")]
    pub script_timeout: String,
}

fn default_clone() -> bool {
    true
}

fn default_acquire_timeout() -> String {
    "10m".to_string()
}

fn default_provision_timeout() -> String {
    "15m".to_string()
}

fn default_script_timeout() -> String {
    "30m".to_string()
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            clone: default_clone(),
            acquire_timeout: default_acquire_timeout(),
            provision_timeout: default_provision_timeout(),
            script_timeout: default_script_timeout(),
        }
    }
}

/// `[environment]` section: the isolated runtime inside the checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSection {
    /// Environment directory, relative to the checkout.
    #[serde(default = "default_env_dir")]
    pub dir: String,

    /// Dependency manifest, relative to the checkout.
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Interpreter used to create the environment. Defaults per platform.
    #[serde(default)]
    pub interpreter: Option<String>,
}

fn default_env_dir() -> String {
    "venv".to_string()
}

fn default_manifest() -> String {
    "requirements.txt".to_string()
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            dir: default_env_dir(),
            manifest: default_manifest(),
            interpreter: None,
        }
    }
}

/// `[script]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptSection {
    /// Script path relative to the checkout; defaults depend on the mode.
    #[serde(default)]
    pub path: Option<String>,

    /// Pass `--exclude <repository.name>`; defaults depend on the mode.
    #[serde(default)]
    pub exclude_self: Option<bool>,

    /// Variables that must be non-empty in the merged environment.
    #[serde(default)]
    pub required_env: Vec<String>,

    /// Deployment-specific values layered over the ambient environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Command-line overrides applied to the raw file before validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub in_place: bool,
}

impl RawConfigFile {
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.repo_url {
            self.repository.url = Some(url.clone());
        }
        if let Some(branch) = &overrides.branch {
            self.repository.branch = branch.clone();
        }
        if overrides.in_place {
            self.pipeline.clone = false;
        }
    }
}

/// The automation repository to fetch. Immutable for the life of a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    pub remote_url: String,
    pub local_name: String,
    pub branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub acquire: Duration,
    pub provision: Duration,
    pub script: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSettings {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub interpreter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSettings {
    pub path: PathBuf,
    pub exclude_self: bool,
    pub required_env: Vec<String>,
    pub env: BTreeMap<String, String>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub repository: RepositorySpec,
    pub mode: PipelineMode,
    pub timeouts: StageTimeouts,
    pub environment: EnvironmentSettings,
    pub script: ScriptSettings,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        repository: RepositorySpec,
        mode: PipelineMode,
        timeouts: StageTimeouts,
        environment: EnvironmentSettings,
        script: ScriptSettings,
    ) -> Self {
        Self {
            repository,
            mode,
            timeouts,
            environment,
            script,
        }
    }
}
