// src/logging.rs

//! Diagnostic logging via `tracing` + `tracing-subscriber`, written to
//! stderr so stdout carries only operator messages and the script's output.
//!
//! Filter resolution:
//! 1. `--log-level` (applies to every target)
//! 2. `DEPLOYAGENT_LOG`, full `EnvFilter` syntax, e.g.
//!    `deployagent::stages=debug,info`
//! 3. `info`

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "DEPLOYAGENT_LOG";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level.as_directive()));
    }
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV_VAR} value {directives:?}")),
        None => Ok(EnvFilter::new("info")),
    }
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins_over_env() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error")).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn env_directives_are_used_verbatim() {
        let filter = build_filter(None, Some("deployagent::stages=trace,warn")).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("deployagent::stages=trace"));
        assert!(rendered.contains("warn"));
    }

    #[test]
    fn blank_env_falls_back_to_info() {
        assert_eq!(build_filter(None, Some("  ")).unwrap().to_string(), "info");
        assert_eq!(build_filter(None, None).unwrap().to_string(), "info");
    }

    #[test]
    fn malformed_env_is_an_error() {
        assert!(build_filter(None, Some("deployagent=notalevel")).is_err());
    }
}
