// src/engine/runtime.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::env::EnvironmentVariables;
use crate::errors::{DeployError, Result, StageFailure};
use crate::exec::{CommandRunner, CommandSpec, HostPlatform, PlatformCommands};
use crate::fs::{FileSystem, RealFileSystem};
use crate::lock::DeployLock;
use crate::paths::{DeploymentRequest, ResolvedPaths};
use crate::stages::acquire::{checkout_command, clone_command};
use crate::stages::{script_command, EnvironmentProvisioner, RepositoryAcquirer, ScriptRunner};
use crate::types::PipelineMode;

use super::core::CorePipeline;
use super::notify::{Notifier, TracingNotifier};
use super::{CoreCommand, CoreEvent, PipelineOutcome, PipelineState};

/// Result of one `deploy` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub outcome: PipelineOutcome,
    /// States visited, `Idle` first, terminal state last.
    pub history: Vec<PipelineState>,
    pub paths: ResolvedPaths,
}

/// What a run would do, without doing it.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub paths: ResolvedPaths,
    pub mode: PipelineMode,
    pub commands: Vec<CommandSpec>,
    /// Names from `[script.env]` and `required_env`; values may be secrets.
    pub env_keys: Vec<String>,
}

/// Drives the acquisition, provisioning and script stages through
/// [`CorePipeline`], stopping at the first failure.
///
/// One orchestrator can serve many sequential runs; every run resolves its
/// paths and builds its environment map afresh. Concurrent runs against the
/// same checkout are rejected with [`DeployError::Busy`].
pub struct DeployOrchestrator<R: CommandRunner> {
    config: ConfigFile,
    runner: R,
    fs: Arc<dyn FileSystem>,
    platform: HostPlatform,
    ambient_env: Option<EnvironmentVariables>,
    notifier: Arc<dyn Notifier>,
    lock_dir: Option<PathBuf>,
}

impl<R: CommandRunner> fmt::Debug for DeployOrchestrator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployOrchestrator")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl<R: CommandRunner> DeployOrchestrator<R> {
    pub fn new(config: ConfigFile, runner: R) -> Self {
        Self {
            config,
            runner,
            fs: Arc::new(RealFileSystem),
            platform: HostPlatform::detect(),
            ambient_env: None,
            notifier: Arc::new(TracingNotifier),
            lock_dir: None,
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Use this map instead of snapshotting the process environment.
    pub fn with_ambient_env(mut self, env: EnvironmentVariables) -> Self {
        self.ambient_env = Some(env);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Directory for single-flight lock files (default: system temp dir).
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Run the whole pipeline once for `project_root`.
    ///
    /// `Err` means the run never started (bad project root, missing required
    /// environment variable, another run in flight). A stage failure is an
    /// `Ok(PipelineRun)` whose outcome is `Failure`.
    pub async fn deploy(&self, project_root: impl AsRef<Path>) -> Result<PipelineRun> {
        let request = DeploymentRequest::new(self.fs.as_ref(), project_root)?;
        let paths = ResolvedPaths::resolve(&request, &self.config);

        let _lock = match &self.lock_dir {
            Some(dir) => DeployLock::acquire_in(dir, &paths.clone_path)?,
            None => DeployLock::acquire(&paths.clone_path)?,
        };

        let env = self.build_env()?;
        let commands = self.platform_commands();

        info!(
            project = %paths.project_root.display(),
            checkout = %paths.clone_path.display(),
            mode = ?self.config.mode,
            "deployment started"
        );

        let mut core = CorePipeline::new();
        let mut env = Some(env);
        let mut command = core.step(CoreEvent::Start)?;

        let outcome = loop {
            let event = match command {
                CoreCommand::RunAcquisition => self.run_acquisition(&paths).await,
                CoreCommand::RunProvisioning => self.run_provisioning(&paths, &commands).await,
                CoreCommand::RunScript => {
                    let env = env.take().unwrap_or_default();
                    self.run_script(&paths, &commands, env).await
                }
                CoreCommand::Finish(outcome) => break outcome,
            };
            command = core.step(event)?;
        };

        match &outcome {
            PipelineOutcome::Success { .. } => {
                self.notifier.info(&format!(
                    "Deployment completed for {}",
                    paths.project_root.display()
                ));
            }
            PipelineOutcome::Failure(failure) => {
                warn!(stage = %failure.stage, cause = %failure.cause, "deployment failed");
                self.notifier.error(&failure.to_string());
            }
        }

        Ok(PipelineRun {
            outcome,
            history: core.history().to_vec(),
            paths,
        })
    }

    /// Resolve paths and commands for `project_root` without running anything.
    pub fn plan(&self, project_root: impl AsRef<Path>) -> Result<DeployPlan> {
        let request = DeploymentRequest::new(self.fs.as_ref(), project_root)?;
        let paths = ResolvedPaths::resolve(&request, &self.config);
        // Fails the plan the same way a run would if required keys are unset.
        self.build_env()?;
        let commands = self.platform_commands();
        let repo = &self.config.repository;

        let mut specs = Vec::new();
        if self.config.mode == PipelineMode::Clone {
            specs.push(clone_command(repo, &paths.clone_path));
            specs.push(checkout_command(repo, &paths.clone_path));
        }
        specs.push(commands.create_env(&paths.env_path, &paths.clone_path));
        specs.push(commands.install_manifest(
            &paths.env_path,
            &paths.manifest_path,
            &paths.clone_path,
        ));
        specs.push(script_command(&commands, &paths, &self.config));

        Ok(DeployPlan {
            paths,
            mode: self.config.mode,
            commands: specs,
            env_keys: self.deployment_env_keys(),
        })
    }

    /// Keys the config adds or requires; the ambient environment is not listed.
    fn deployment_env_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .config
            .script
            .env
            .keys()
            .chain(self.config.script.required_env.iter())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn platform_commands(&self) -> PlatformCommands {
        self.platform
            .commands(self.config.environment.interpreter.as_deref())
    }

    /// Ambient snapshot plus `[script.env]`, checked against `required_env`.
    fn build_env(&self) -> Result<EnvironmentVariables> {
        let ambient = self
            .ambient_env
            .clone()
            .unwrap_or_else(EnvironmentVariables::from_ambient);
        let env = ambient.merged_with(&self.config.script.env);

        let missing = env.missing(&self.config.script.required_env);
        if !missing.is_empty() {
            return Err(DeployError::ConfigError(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        Ok(env)
    }

    async fn run_acquisition(&self, paths: &ResolvedPaths) -> CoreEvent {
        let timeouts = self.config.timeouts;
        let acquirer = RepositoryAcquirer::new(&self.runner, self.fs.as_ref(), timeouts.acquire);

        let result = match self.config.mode {
            PipelineMode::Clone => {
                acquirer
                    .acquire(&self.config.repository, &paths.clone_path)
                    .await
            }
            PipelineMode::InPlace => acquirer.verify_existing(&paths.clone_path),
        };

        match result {
            Ok(()) => {
                self.notifier.info(&format!(
                    "Repository {} ready at {}",
                    self.config.repository.local_name,
                    paths.clone_path.display()
                ));
                CoreEvent::StageSucceeded { stdout: None }
            }
            Err(e) => CoreEvent::StageFailed(StageFailure::from(e)),
        }
    }

    async fn run_provisioning(
        &self,
        paths: &ResolvedPaths,
        commands: &PlatformCommands,
    ) -> CoreEvent {
        let provisioner = EnvironmentProvisioner::new(
            &self.runner,
            self.fs.as_ref(),
            commands,
            self.config.timeouts.provision,
        );

        match provisioner.provision(paths).await {
            Ok(report) => {
                let verb = if report.created { "created" } else { "updated" };
                self.notifier.info(&format!(
                    "Environment {verb} at {}",
                    paths.env_path.display()
                ));
                CoreEvent::StageSucceeded { stdout: None }
            }
            Err(e) => CoreEvent::StageFailed(StageFailure::from(e)),
        }
    }

    async fn run_script(
        &self,
        paths: &ResolvedPaths,
        commands: &PlatformCommands,
        env: EnvironmentVariables,
    ) -> CoreEvent {
        let runner = ScriptRunner::new(&self.runner, self.config.timeouts.script);
        let spec = script_command(commands, paths, &self.config).env(env);

        match runner.execute(&spec).await {
            Ok(out) => {
                self.notifier.info("Generation script finished");
                CoreEvent::StageSucceeded {
                    stdout: Some(out.stdout),
                }
            }
            Err(e) => CoreEvent::StageFailed(StageFailure::from(e)),
        }
    }
}
