// src/errors.rs

//! Crate-wide error types.
//!
//! Two families live here:
//! - [`DeployError`]: problems that prevent a pipeline run from starting at
//!   all (bad config, invalid project root, concurrent run, ...). These are
//!   returned as `Err`.
//! - Stage errors ([`AcquisitionError`], [`ProvisionError`],
//!   [`ScriptExecutionError`]): a stage of an otherwise valid run failed.
//!   These are folded into a [`StageFailure`] and reported through
//!   `PipelineOutcome::Failure`, never as `Err`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid deployment request: {0}")]
    InvalidRequest(String),

    #[error("A deployment is already running for {}", .0.display())]
    Busy(PathBuf),

    #[error("Invalid pipeline transition: {event} while {state}")]
    InvalidTransition { state: String, event: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DeployError>;

/// Stage tag carried by a failed run.
///
/// Provisioning is split in two tags so callers can tell a missing
/// interpreter apart from a broken dependency manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    Acquisition,
    Environment,
    Dependencies,
    Script,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Acquisition => "acquisition",
            FailureStage::Environment => "environment",
            FailureStage::Dependencies => "dependencies",
            FailureStage::Script => "script",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consolidated failure report for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: FailureStage,
    pub cause: String,
}

impl StageFailure {
    pub fn new(stage: FailureStage, cause: impl Into<String>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.cause)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionErrorKind {
    /// A stale checkout could not be removed.
    Cleanup,
    /// The remote fetch failed (network, auth, unknown repository, timeout).
    Transport,
    /// The requested branch/ref could not be checked out.
    Ref,
    /// In-place mode: the automation checkout is not there.
    Missing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AcquisitionError {
    pub kind: AcquisitionErrorKind,
    pub message: String,
}

impl AcquisitionError {
    pub fn new(kind: AcquisitionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_ref_error(&self) -> bool {
        self.kind == AcquisitionErrorKind::Ref
    }
}

impl From<AcquisitionError> for StageFailure {
    fn from(err: AcquisitionError) -> Self {
        StageFailure::new(FailureStage::Acquisition, err.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    Environment,
    Dependencies,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProvisionError {
    pub step: ProvisionStep,
    pub message: String,
}

impl ProvisionError {
    pub fn environment(message: impl Into<String>) -> Self {
        Self {
            step: ProvisionStep::Environment,
            message: message.into(),
        }
    }

    pub fn dependencies(message: impl Into<String>) -> Self {
        Self {
            step: ProvisionStep::Dependencies,
            message: message.into(),
        }
    }
}

impl From<ProvisionError> for StageFailure {
    fn from(err: ProvisionError) -> Self {
        let stage = match err.step {
            ProvisionStep::Environment => FailureStage::Environment,
            ProvisionStep::Dependencies => FailureStage::Dependencies,
        };
        StageFailure::new(stage, err.message)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ScriptExecutionError {
    /// `None` when the process never started or was killed.
    pub exit_code: Option<i32>,
    pub message: String,
}

impl From<ScriptExecutionError> for StageFailure {
    fn from(err: ScriptExecutionError) -> Self {
        StageFailure::new(FailureStage::Script, err.message)
    }
}
