// src/exec/platform.rs

//! Host-platform strategy table.
//!
//! Every OS-dependent command used by the pipeline is produced here as a
//! structured [`CommandSpec`]. The platform is resolved once (usually via
//! [`HostPlatform::detect`]) and the resulting [`PlatformCommands`] is used
//! for every invocation that needs the isolated environment.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::command::CommandSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Unix,
    Windows,
}

impl HostPlatform {
    pub fn detect() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Unix
        }
    }

    /// Interpreter used to create the environment when the config does not
    /// name one.
    pub fn default_interpreter(&self) -> &'static str {
        match self {
            HostPlatform::Unix => "python3",
            HostPlatform::Windows => "python",
        }
    }

    /// Directory inside the environment that holds its executables.
    pub fn env_bin_dir(&self) -> &'static str {
        match self {
            HostPlatform::Unix => "bin",
            HostPlatform::Windows => "Scripts",
        }
    }

    pub fn env_python_name(&self) -> &'static str {
        match self {
            HostPlatform::Unix => "python",
            HostPlatform::Windows => "python.exe",
        }
    }

    pub fn commands(self, interpreter: Option<&str>) -> PlatformCommands {
        PlatformCommands {
            platform: self,
            interpreter: interpreter
                .map(str::to_string)
                .unwrap_or_else(|| self.default_interpreter().to_string()),
        }
    }
}

/// Structured command builders for one host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommands {
    platform: HostPlatform,
    interpreter: String,
}

impl PlatformCommands {
    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Interpreter inside the isolated environment rooted at `env_dir`.
    pub fn env_python(&self, env_dir: &Path) -> PathBuf {
        env_dir
            .join(self.platform.env_bin_dir())
            .join(self.platform.env_python_name())
    }

    /// `<interpreter> -m venv <env_dir>`
    pub fn create_env(&self, env_dir: &Path, cwd: &Path) -> CommandSpec {
        CommandSpec::new(&self.interpreter, cwd)
            .args(["-m", "venv"])
            .arg(env_dir)
    }

    /// `<env python> -m pip install -r <manifest>`
    ///
    /// Pip is invoked through the environment's interpreter rather than a
    /// `pip` shim so the same layout works on every platform.
    pub fn install_manifest(&self, env_dir: &Path, manifest: &Path, cwd: &Path) -> CommandSpec {
        CommandSpec::new(self.env_python(env_dir), cwd)
            .args(["-m", "pip", "install", "--disable-pip-version-check", "-r"])
            .arg(manifest)
    }

    /// `<env python> <script> <args...>`
    pub fn run_script<I, S>(&self, env_dir: &Path, script: &Path, args: I, cwd: &Path) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        CommandSpec::new(self.env_python(env_dir), cwd)
            .arg(script)
            .args(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_layout_uses_bin_python() {
        let cmds = HostPlatform::Unix.commands(None);
        assert_eq!(cmds.interpreter(), "python3");
        assert_eq!(
            cmds.env_python(Path::new("/w/repo/venv")),
            PathBuf::from("/w/repo/venv/bin/python")
        );
    }

    #[test]
    fn windows_layout_uses_scripts_python_exe() {
        let cmds = HostPlatform::Windows.commands(None);
        assert_eq!(cmds.interpreter(), "python");
        let py = cmds.env_python(Path::new("venv"));
        assert!(py.ends_with(Path::new("venv").join("Scripts").join("python.exe")));
    }

    #[test]
    fn configured_interpreter_overrides_default() {
        let cmds = HostPlatform::Unix.commands(Some("/opt/python3.12/bin/python3"));
        let spec = cmds.create_env(Path::new("/w/repo/venv"), Path::new("/w/repo"));
        assert_eq!(spec.program, PathBuf::from("/opt/python3.12/bin/python3"));
        assert_eq!(spec.args, vec!["-m", "venv", "/w/repo/venv"]);
    }

    #[test]
    fn install_uses_env_interpreter_and_manifest() {
        let cmds = HostPlatform::Unix.commands(None);
        let spec = cmds.install_manifest(
            Path::new("/w/repo/venv"),
            Path::new("/w/repo/requirements.txt"),
            Path::new("/w/repo"),
        );
        assert_eq!(spec.program, PathBuf::from("/w/repo/venv/bin/python"));
        let args = spec.arg_strings();
        assert_eq!(args.last().map(String::as_str), Some("/w/repo/requirements.txt"));
        assert!(args.starts_with(&["-m".to_string(), "pip".to_string(), "install".to_string()]));
    }

    #[test]
    fn run_script_keeps_argument_order() {
        let cmds = HostPlatform::Unix.commands(None);
        let spec = cmds.run_script(
            Path::new("/w/repo/venv"),
            Path::new("/w/repo/deploy.py"),
            ["/w", "--exclude", "repo"],
            Path::new("/w/repo"),
        );
        assert_eq!(spec.args, vec!["/w/repo/deploy.py", "/w", "--exclude", "repo"]);
    }
}
