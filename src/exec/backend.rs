// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! Pipeline stages talk to a `CommandRunner` instead of spawning processes
//! themselves. Production code uses [`TokioCommandRunner`]; tests provide a
//! fake that records every [`CommandSpec`] and answers with canned output.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::Result;

use super::command::{CapturedOutput, CommandSpec};

/// Trait abstracting how a child process is run to completion.
///
/// `Err` means the process could not be started (or waited on). A process
/// that ran and exited non-zero is an `Ok` with a failing
/// [`CapturedOutput`]; interpreting the exit status is up to the caller.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CapturedOutput>> + Send + 'a>>;
}

/// Runner backed by `tokio::process::Command`.
///
/// Children are spawned with `kill_on_drop(true)`, so dropping the returned
/// future (e.g. when a step timeout elapses) kills the process.
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for TokioCommandRunner {
    fn run<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CapturedOutput>> + Send + 'a>> {
        Box::pin(async move {
            info!(
                program = %spec.program.display(),
                args = ?spec.args,
                cwd = %spec.cwd.display(),
                "starting process"
            );

            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args)
                .current_dir(&spec.cwd)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            if let Some(env) = &spec.env {
                cmd.env_clear();
                cmd.envs(env.iter());
            }
            for (k, v) in &spec.extra_env {
                cmd.env(k, v);
            }

            let mut child = cmd
                .spawn()
                .with_context(|| format!("failed to start '{}'", spec.program.display()))?;

            let mut stdout = child.stdout.take();
            let mut stderr = child.stderr.take();

            // Drain both pipes concurrently with waiting so a chatty child
            // cannot block on a full pipe buffer.
            let read_stdout = async {
                let mut buf = Vec::new();
                if let Some(out) = stdout.as_mut() {
                    out.read_to_end(&mut buf).await?;
                }
                Ok::<_, std::io::Error>(buf)
            };
            let read_stderr = async {
                let mut buf = Vec::new();
                if let Some(err) = stderr.as_mut() {
                    err.read_to_end(&mut buf).await?;
                }
                Ok::<_, std::io::Error>(buf)
            };

            let (status, out, err) = tokio::join!(child.wait(), read_stdout, read_stderr);
            let status = status
                .with_context(|| format!("waiting for '{}'", spec.program.display()))?;

            let captured = CapturedOutput {
                exit_code: status.code(),
                stdout: String::from_utf8_lossy(&out?).into_owned(),
                stderr: String::from_utf8_lossy(&err?).into_owned(),
            };

            debug!(
                program = %spec.program.display(),
                exit_code = ?captured.exit_code,
                stdout_bytes = captured.stdout.len(),
                stderr_bytes = captured.stderr.len(),
                "process exited"
            );

            Ok(captured)
        })
    }
}
