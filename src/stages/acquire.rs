// src/stages/acquire.rs

//! Repository acquisition: stale checkout out, fresh clone in, branch checked
//! out as a separate step.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::RepositorySpec;
use crate::errors::{AcquisitionError, AcquisitionErrorKind};
use crate::exec::{CommandRunner, CommandSpec};
use crate::fs::{ensure_absent, FileSystem};

use super::run_step;

pub const GIT_PROGRAM: &str = "git";

pub struct RepositoryAcquirer<'a, R: ?Sized> {
    runner: &'a R,
    fs: &'a dyn FileSystem,
    timeout: Duration,
}

impl<'a, R> RepositoryAcquirer<'a, R>
where
    R: CommandRunner + ?Sized,
{
    pub fn new(runner: &'a R, fs: &'a dyn FileSystem, timeout: Duration) -> Self {
        Self { runner, fs, timeout }
    }

    /// Leave `target` holding a working copy of `spec.remote_url` at
    /// `spec.branch`.
    ///
    /// Whatever was at `target` before is removed first, so the call is safe
    /// to repeat after a failed or completed run.
    pub async fn acquire(&self, spec: &RepositorySpec, target: &Path) -> Result<(), AcquisitionError> {
        ensure_absent(self.fs, target).map_err(|e| {
            AcquisitionError::new(
                AcquisitionErrorKind::Cleanup,
                format!("could not remove stale checkout: {e:#}"),
            )
        })?;
        debug!(target_path = %target.display(), "stale checkout absent");

        let clone = clone_command(spec, target);
        let out = run_step(self.runner, &clone, self.timeout)
            .await
            .map_err(|e| AcquisitionError::new(AcquisitionErrorKind::Transport, e.to_string()))?;
        if !out.success() {
            return Err(AcquisitionError::new(
                AcquisitionErrorKind::Transport,
                out.diagnostic(|| format!("git clone failed with {}", out.describe_status())),
            ));
        }
        info!(url = %spec.remote_url, target_path = %target.display(), "repository cloned");

        let checkout = checkout_command(spec, target);
        let out = run_step(self.runner, &checkout, self.timeout)
            .await
            .map_err(|e| AcquisitionError::new(AcquisitionErrorKind::Ref, e.to_string()))?;
        if !out.success() {
            return Err(AcquisitionError::new(
                AcquisitionErrorKind::Ref,
                out.diagnostic(|| {
                    format!(
                        "git checkout {} failed with {}",
                        spec.branch,
                        out.describe_status()
                    )
                }),
            ));
        }
        info!(branch = %spec.branch, "branch checked out");

        Ok(())
    }

    /// In-place variant: the checkout must already be there.
    pub fn verify_existing(&self, target: &Path) -> Result<(), AcquisitionError> {
        if self.fs.is_dir(target) {
            info!(target_path = %target.display(), "using existing checkout");
            Ok(())
        } else {
            Err(AcquisitionError::new(
                AcquisitionErrorKind::Missing,
                format!("automation checkout not found at {}", target.display()),
            ))
        }
    }
}

/// `git clone <url> <target>`, run from the target's parent directory.
pub fn clone_command(spec: &RepositorySpec, target: &Path) -> CommandSpec {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    git(parent)
        .arg("clone")
        .arg(&spec.remote_url)
        .arg(target)
}

/// `git checkout <branch>`, run inside the fresh checkout.
pub fn checkout_command(spec: &RepositorySpec, target: &Path) -> CommandSpec {
    git(target).arg("checkout").arg(&spec.branch)
}

/// `git` with credential prompts disabled, so an auth problem fails instead
/// of waiting on a terminal nobody is watching.
fn git(cwd: &Path) -> CommandSpec {
    CommandSpec::new(GIT_PROGRAM, cwd).extra_env("GIT_TERMINAL_PROMPT", "0")
}
