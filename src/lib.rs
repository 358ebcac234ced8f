// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod lock;
pub mod logging;
pub mod paths;
pub mod stages;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::load_for_project;
use crate::engine::{DeployOrchestrator, DeployPlan, Notifier, PipelineOutcome};
use crate::exec::TokioCommandRunner;
use crate::fs::RealFileSystem;
use crate::paths::resolve_project_root;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project root + config resolution
/// - the orchestrator with the real process runner and filesystem
/// - console reporting
///
/// Returns `Ok(false)` when the pipeline ran and a stage failed.
pub async fn run(args: CliArgs) -> Result<bool> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let project_root = resolve_project_root(args.project.as_deref(), &cwd);

    let fs = RealFileSystem;
    let cfg = load_for_project(
        &fs,
        &project_root,
        args.config.as_deref(),
        &args.overrides(),
    )?;

    let orchestrator = DeployOrchestrator::new(cfg, TokioCommandRunner::new())
        .with_fs(Arc::new(fs))
        .with_notifier(Arc::new(ConsoleNotifier));

    if args.dry_run {
        let plan = orchestrator.plan(&project_root)?;
        print_dry_run(&plan);
        return Ok(true);
    }

    let run = orchestrator.deploy(&project_root).await?;
    match run.outcome {
        PipelineOutcome::Success { stdout } => {
            if !stdout.is_empty() {
                print!("{stdout}");
            }
            Ok(true)
        }
        PipelineOutcome::Failure(_) => Ok(false),
    }
}

/// Operator messages on the terminal: progress on stdout, the failure on
/// stderr.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("deployagent: {message}");
    }
}

/// Simple dry-run output: print paths, commands and env keys.
fn print_dry_run(plan: &DeployPlan) {
    println!("deployagent dry-run");
    println!("  mode = {:?}", plan.mode);
    println!("  project = {}", plan.paths.project_root.display());
    println!("  checkout = {}", plan.paths.clone_path.display());
    println!("  environment = {}", plan.paths.env_path.display());
    println!("  manifest = {}", plan.paths.manifest_path.display());
    println!("  script = {}", plan.paths.script_path.display());
    println!();

    println!("commands ({}):", plan.commands.len());
    for spec in &plan.commands {
        println!("  - {spec}");
        println!("      cwd: {}", spec.cwd.display());
    }
    println!();

    println!("script environment keys ({}):", plan.env_keys.len());
    for key in &plan.env_keys {
        println!("  - {key}");
    }

    debug!("dry-run complete (no execution)");
}
