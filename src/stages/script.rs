// src/stages/script.rs

//! Generation script execution.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::config::ConfigFile;
use crate::env::EnvironmentVariables;
use crate::errors::ScriptExecutionError;
use crate::exec::{CapturedOutput, CommandRunner, CommandSpec, PlatformCommands};
use crate::paths::ResolvedPaths;

use super::run_step;

pub struct ScriptRunner<'a, R: ?Sized> {
    runner: &'a R,
    timeout: Duration,
}

impl<'a, R> ScriptRunner<'a, R>
where
    R: CommandRunner + ?Sized,
{
    pub fn new(runner: &'a R, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Run `executable args...` in `working_dir` with exactly `env`.
    pub async fn run<I, S>(
        &self,
        executable: &Path,
        working_dir: &Path,
        args: I,
        env: EnvironmentVariables,
    ) -> Result<CapturedOutput, ScriptExecutionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let spec = CommandSpec::new(executable, working_dir).args(args).env(env);
        self.execute(&spec).await
    }

    /// Run a prepared script command.
    ///
    /// Exit status 0 yields the captured output; anything else is a
    /// [`ScriptExecutionError`] carrying stderr when there is any. A command
    /// that never started has no exit code.
    pub async fn execute(&self, spec: &CommandSpec) -> Result<CapturedOutput, ScriptExecutionError> {
        let out = run_step(self.runner, spec, self.timeout)
            .await
            .map_err(|e| ScriptExecutionError {
                exit_code: None,
                message: e.to_string(),
            })?;

        if !out.success() {
            return Err(ScriptExecutionError {
                exit_code: out.exit_code,
                message: out.diagnostic(|| format!("script exited with {}", out.describe_status())),
            });
        }

        info!(
            program = %spec.program.display(),
            stdout_bytes = out.stdout.len(),
            "script finished"
        );
        Ok(out)
    }
}

/// Arguments passed after the script path: the project root as the caller
/// gave it, then `--exclude <repo>` when configured.
pub fn script_arguments(paths: &ResolvedPaths, config: &ConfigFile) -> Vec<OsString> {
    let mut args = vec![paths.project_root.clone().into_os_string()];
    if config.script.exclude_self {
        args.push("--exclude".into());
        args.push(config.repository.local_name.clone().into());
    }
    args
}

/// The full script command for a resolved deployment.
pub fn script_command(
    commands: &PlatformCommands,
    paths: &ResolvedPaths,
    config: &ConfigFile,
) -> CommandSpec {
    commands.run_script(
        &paths.env_path,
        &paths.script_path,
        script_arguments(paths, config),
        &paths.clone_path,
    )
}
