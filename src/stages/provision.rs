// src/stages/provision.rs

//! Isolated environment provisioning.
//!
//! Two sequential sub-steps: create the environment (skipped when its
//! interpreter is already there), then install the dependency manifest. The
//! install always runs so manifest changes are picked up on every run.

use std::time::Duration;

use tracing::info;

use crate::errors::ProvisionError;
use crate::exec::{CommandRunner, PlatformCommands};
use crate::fs::FileSystem;
use crate::paths::ResolvedPaths;

use super::run_step;

/// What provisioning actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionReport {
    /// `false` when an existing environment was reused.
    pub created: bool,
}

pub struct EnvironmentProvisioner<'a, R: ?Sized> {
    runner: &'a R,
    fs: &'a dyn FileSystem,
    commands: &'a PlatformCommands,
    timeout: Duration,
}

impl<'a, R> EnvironmentProvisioner<'a, R>
where
    R: CommandRunner + ?Sized,
{
    pub fn new(
        runner: &'a R,
        fs: &'a dyn FileSystem,
        commands: &'a PlatformCommands,
        timeout: Duration,
    ) -> Self {
        Self {
            runner,
            fs,
            commands,
            timeout,
        }
    }

    pub async fn provision(&self, paths: &ResolvedPaths) -> Result<ProvisionReport, ProvisionError> {
        let repo = &paths.clone_path;
        let env_python = self.commands.env_python(&paths.env_path);

        let created = if self.fs.is_file(&env_python) {
            info!(env = %paths.env_path.display(), "reusing existing environment");
            false
        } else {
            let create = self.commands.create_env(&paths.env_path, repo);
            let out = run_step(self.runner, &create, self.timeout)
                .await
                .map_err(|e| {
                    ProvisionError::environment(format!(
                        "could not run {}: {e}",
                        self.commands.interpreter()
                    ))
                })?;
            if !out.success() {
                return Err(ProvisionError::environment(out.diagnostic(|| {
                    format!("environment creation failed with {}", out.describe_status())
                })));
            }
            info!(env = %paths.env_path.display(), "environment created");
            true
        };

        if !self.fs.is_file(&paths.manifest_path) {
            return Err(ProvisionError::dependencies(format!(
                "dependency manifest not found at {}",
                paths.manifest_path.display()
            )));
        }

        let install = self
            .commands
            .install_manifest(&paths.env_path, &paths.manifest_path, repo);
        let out = run_step(self.runner, &install, self.timeout)
            .await
            .map_err(|e| ProvisionError::dependencies(e.to_string()))?;
        if !out.success() {
            return Err(ProvisionError::dependencies(out.diagnostic(|| {
                format!("dependency install failed with {}", out.describe_status())
            })));
        }
        info!(manifest = %paths.manifest_path.display(), "dependencies installed");

        Ok(ProvisionReport { created })
    }
}
