// src/stages/mod.rs

//! The three side-effecting pipeline stages.
//!
//! - [`acquire`]: ensure a fresh checkout of the automation repository.
//! - [`provision`]: create the isolated environment and install dependencies.
//! - [`script`]: run the generation script inside that environment.
//!
//! Each stage only talks to the outside world through a
//! [`CommandRunner`](crate::exec::CommandRunner) and a
//! [`FileSystem`](crate::fs::FileSystem), and reports its own typed error.
//! Every child process is bounded by a per-stage timeout.

use std::fmt;
use std::time::Duration;

use crate::exec::{CapturedOutput, CommandRunner, CommandSpec};

pub mod acquire;
pub mod provision;
pub mod script;

pub use acquire::RepositoryAcquirer;
pub use provision::{EnvironmentProvisioner, ProvisionReport};
pub use script::{script_arguments, script_command, ScriptRunner};

/// Why a child process did not produce a [`CapturedOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StepError {
    /// The process could not be started or waited on.
    Spawn(String),
    /// The time limit elapsed; the child has been killed.
    TimedOut(Duration),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Spawn(msg) => f.write_str(msg),
            StepError::TimedOut(limit) => write!(f, "timed out after {limit:?}"),
        }
    }
}

/// Run one process to completion under `limit`.
pub(crate) async fn run_step<R>(
    runner: &R,
    spec: &CommandSpec,
    limit: Duration,
) -> Result<CapturedOutput, StepError>
where
    R: CommandRunner + ?Sized,
{
    match tokio::time::timeout(limit, runner.run(spec)).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(StepError::Spawn(format!("{err:#}"))),
        Err(_elapsed) => {
            tracing::warn!(command = %spec, ?limit, "process timed out; killed");
            Err(StepError::TimedOut(limit))
        }
    }
}
