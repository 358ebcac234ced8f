// src/exec/command.rs

//! Structured description of a child process and what it produced.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use crate::env::EnvironmentVariables;

/// A single process invocation: program, arguments, working directory and
/// (optionally) the exact environment to give it.
///
/// No shell is involved; arguments are passed as-is to the program. They
/// are kept as `OsString` so non-UTF-8 paths reach the child unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    /// `Some` replaces the child's environment entirely; `None` inherits.
    pub env: Option<EnvironmentVariables>,
    /// Extra variables layered on top of the inherited environment.
    pub extra_env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: None,
            extra_env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn env(mut self, env: EnvironmentVariables) -> Self {
        self.env = Some(env);
        self
    }

    pub fn extra_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push((key.into(), value.into()));
        self
    }

    /// Program name without directories, handy for matching in tests/logs.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Arguments rendered for logs and assertions (lossy on non-UTF-8).
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best-available diagnostic: stderr verbatim when it has content,
    /// otherwise `fallback`.
    pub fn diagnostic(&self, fallback: impl FnOnce() -> String) -> String {
        if self.stderr.trim().is_empty() {
            fallback()
        } else {
            self.stderr.clone()
        }
    }

    pub fn describe_status(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_prefers_stderr() {
        let out = CapturedOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "ERROR: No matching distribution found\n".to_string(),
        };
        assert_eq!(
            out.diagnostic(|| "unused".to_string()),
            "ERROR: No matching distribution found\n"
        );
    }

    #[test]
    fn diagnostic_falls_back_on_blank_stderr() {
        let out = CapturedOutput {
            exit_code: Some(2),
            stdout: "noise".to_string(),
            stderr: " \n".to_string(),
        };
        assert_eq!(out.diagnostic(|| out.describe_status()), "exit status 2");
    }

    #[test]
    fn display_renders_program_and_args() {
        let spec = CommandSpec::new("git", "/work")
            .arg("checkout")
            .arg("master");
        assert_eq!(spec.to_string(), "git checkout master");
        assert_eq!(spec.program_name(), "git");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_arguments_are_kept_byte_for_byte() {
        use std::os::unix::ffi::OsStrExt;
        use std::path::Path;

        let raw = OsStr::from_bytes(b"/work/proj\xff");
        let spec = CommandSpec::new("python", "/work").arg(Path::new(raw));

        assert_eq!(spec.args[0].as_bytes(), b"/work/proj\xff");
        assert_eq!(spec.arg_strings()[0], "/work/proj\u{fffd}");
    }
}
