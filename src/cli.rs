// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ConfigOverrides;

/// Command-line arguments for `deployagent`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "deployagent",
    version,
    about = "Fetch the automation repository, provision its environment and run the generation script against a project.",
    long_about = None
)]
pub struct CliArgs {
    /// Project root to deploy. Default: current working directory.
    #[arg(long, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `deployagent.toml` in the project root, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override `[repository].url`.
    #[arg(long, value_name = "URL")]
    pub repo_url: Option<String>,

    /// Override `[repository].branch`.
    #[arg(long, value_name = "REF")]
    pub branch: Option<String>,

    /// Reuse the existing checkout instead of cloning (sets `[pipeline].clone = false`).
    #[arg(long)]
    pub in_place: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEPLOYAGENT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and paths, print the commands, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            repo_url: self.repo_url.clone(),
            branch: self.branch.clone(),
            in_place: self.in_place,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
