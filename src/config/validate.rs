// src/config/validate.rs

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::config::model::{
    ConfigFile, EnvironmentSettings, RawConfigFile, RepositorySpec, ScriptSettings,
    StageTimeouts,
};
use crate::errors::{DeployError, Result};
use crate::types::{parse_duration, PipelineMode};

static BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._/-]+$").expect("static regex"));

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DeployError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let repository = validate_repository(&raw)?;
        let mode = PipelineMode::from_clone_flag(raw.pipeline.clone);
        let timeouts = validate_timeouts(&raw)?;
        let environment = validate_environment(&raw)?;
        let script = validate_script(&raw, mode)?;
        Ok(ConfigFile::new_unchecked(
            repository,
            mode,
            timeouts,
            environment,
            script,
        ))
    }
}

fn config_error(msg: impl Into<String>) -> DeployError {
    DeployError::ConfigError(msg.into())
}

fn validate_repository(cfg: &RawConfigFile) -> Result<RepositorySpec> {
    let url = cfg
        .repository
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            config_error("[repository].url is required (set it in the config file or pass --repo-url)")
        })?;

    if url.starts_with('-') {
        return Err(config_error(format!(
            "[repository].url must not start with '-' (got {url:?})"
        )));
    }

    let name = cfg.repository.name.trim();
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {}
        _ => {
            return Err(config_error(format!(
                "[repository].name must be a single directory name (got {name:?})"
            )));
        }
    }

    let branch = cfg.repository.branch.trim();
    if branch.starts_with('-') || !BRANCH_RE.is_match(branch) {
        return Err(config_error(format!(
            "[repository].branch is not a valid ref name: {branch:?}"
        )));
    }

    Ok(RepositorySpec {
        remote_url: url.to_string(),
        local_name: name.to_string(),
        branch: branch.to_string(),
    })
}

fn validate_timeouts(cfg: &RawConfigFile) -> Result<StageTimeouts> {
    Ok(StageTimeouts {
        acquire: timeout_field("acquire_timeout", &cfg.pipeline.acquire_timeout)?,
        provision: timeout_field("provision_timeout", &cfg.pipeline.provision_timeout)?,
        script: timeout_field("script_timeout", &cfg.pipeline.script_timeout)?,
    })
}

fn timeout_field(field: &str, value: &str) -> Result<Duration> {
    let d = parse_duration(value)
        .map_err(|e| config_error(format!("[pipeline].{field}: {e}")))?;
    if d.is_zero() {
        return Err(config_error(format!("[pipeline].{field} must be > 0")));
    }
    Ok(d)
}

fn validate_environment(cfg: &RawConfigFile) -> Result<EnvironmentSettings> {
    let interpreter = match cfg.environment.interpreter.as_deref().map(str::trim) {
        Some("") => {
            return Err(config_error("[environment].interpreter must not be empty"));
        }
        other => other.map(str::to_string),
    };

    Ok(EnvironmentSettings {
        dir: relative_path("[environment].dir", &cfg.environment.dir)?,
        manifest: relative_path("[environment].manifest", &cfg.environment.manifest)?,
        interpreter,
    })
}

fn validate_script(cfg: &RawConfigFile, mode: PipelineMode) -> Result<ScriptSettings> {
    let path = cfg
        .script
        .path
        .as_deref()
        .unwrap_or_else(|| mode.default_script());

    for key in cfg.script.env.keys().chain(cfg.script.required_env.iter()) {
        if key.trim().is_empty() || key.contains('=') || key.contains('\0') {
            return Err(config_error(format!(
                "[script] environment variable name {key:?} is invalid"
            )));
        }
    }

    Ok(ScriptSettings {
        path: relative_path("[script].path", path)?,
        exclude_self: cfg
            .script
            .exclude_self
            .unwrap_or_else(|| mode.default_exclude_self()),
        required_env: cfg.script.required_env.clone(),
        env: cfg.script.env.clone(),
    })
}

/// A non-empty path that stays inside the checkout.
fn relative_path(field: &str, value: &str) -> Result<PathBuf> {
    let path = Path::new(value.trim());
    let mut saw_normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => saw_normal = true,
            Component::CurDir => {}
            _ => {
                return Err(config_error(format!(
                    "{field} must be a relative path inside the repository (got {value:?})"
                )));
            }
        }
    }
    if !saw_normal {
        return Err(config_error(format!("{field} must not be empty")));
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_url() -> RawConfigFile {
        let mut raw = RawConfigFile::default();
        raw.repository.url = Some("https://example.com/org/ai-hackathon-25.git".to_string());
        raw
    }

    #[test]
    fn defaults_validate_to_clone_variant() {
        let cfg = ConfigFile::try_from(raw_with_url()).unwrap();
        assert_eq!(cfg.repository.local_name, "ai-hackathon-25");
        assert_eq!(cfg.repository.branch, "master");
        assert_eq!(cfg.mode, PipelineMode::Clone);
        assert_eq!(cfg.script.path, PathBuf::from("pipeline.py"));
        assert!(!cfg.script.exclude_self);
        assert_eq!(cfg.environment.dir, PathBuf::from("venv"));
        assert_eq!(cfg.timeouts.acquire, Duration::from_secs(600));
    }

    #[test]
    fn in_place_variant_defaults_to_deploy_with_exclude() {
        let mut raw = raw_with_url();
        raw.pipeline.clone = false;
        let cfg = ConfigFile::try_from(raw).unwrap();
        assert_eq!(cfg.mode, PipelineMode::InPlace);
        assert_eq!(cfg.script.path, PathBuf::from("deploy.py"));
        assert!(cfg.script.exclude_self);
    }

    #[test]
    fn missing_url_is_config_error() {
        let err = ConfigFile::try_from(RawConfigFile::default()).unwrap_err();
        match err {
            DeployError::ConfigError(msg) => assert!(msg.contains("url is required")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_option_like_branch() {
        let mut raw = raw_with_url();
        raw.repository.branch = "--upload-pack=evil".to_string();
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(DeployError::ConfigError(_))
        ));
    }

    #[test]
    fn rejects_nested_repo_name() {
        let mut raw = raw_with_url();
        raw.repository.name = "../elsewhere".to_string();
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn rejects_paths_escaping_checkout() {
        let mut raw = raw_with_url();
        raw.script.path = Some("../../bin/evil.py".to_string());
        assert!(ConfigFile::try_from(raw).is_err());

        let mut raw = raw_with_url();
        raw.environment.manifest = "/etc/requirements.txt".to_string();
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut raw = raw_with_url();
        raw.pipeline.script_timeout = "0s".to_string();
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn rejects_bad_env_key() {
        let mut raw = raw_with_url();
        raw.script.env.insert("A=B".to_string(), "x".to_string());
        assert!(ConfigFile::try_from(raw).is_err());
    }
}
