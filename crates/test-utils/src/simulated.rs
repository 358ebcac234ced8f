#![allow(dead_code)]

//! A fake host where `git`, the Python interpreter, pip and the generation
//! script act on a `MockFileSystem` the way the real tools would act on
//! disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use deployagent::env::EnvironmentVariables;
use deployagent::errors::DeployError;
use deployagent::exec::{CapturedOutput, CommandSpec};
use deployagent::fs::mock::MockFileSystem;
use deployagent::fs::FileSystem;

use crate::fake_runner::{failed, ok, FakeCommandRunner};

/// Files the default `master` branch of the simulated remote contains.
pub fn master_tree() -> Vec<(String, String)> {
    vec![
        ("README.md".to_string(), "# automation\n".to_string()),
        ("requirements.txt".to_string(), "requests>=2.31\npinecone-client\n".to_string()),
        ("pipeline.py".to_string(), "import sys\nprint(sys.argv[1])\n".to_string()),
        ("deploy.py".to_string(), "import sys\n".to_string()),
    ]
}

#[derive(Clone)]
pub struct SimulatedHost {
    fs: MockFileSystem,
    branches: BTreeMap<String, Vec<(String, String)>>,
    clone_error: Option<String>,
    venv_error: Option<CapturedOutput>,
    spawn_error_for: Option<String>,
    script_spawn_error: Option<String>,
    script_result: CapturedOutput,
    script_env: Arc<Mutex<Option<EnvironmentVariables>>>,
}

impl SimulatedHost {
    pub fn new(fs: MockFileSystem) -> Self {
        let mut branches = BTreeMap::new();
        branches.insert("master".to_string(), master_tree());
        Self {
            fs,
            branches,
            clone_error: None,
            venv_error: None,
            spawn_error_for: None,
            script_spawn_error: None,
            script_result: ok("terraform templates generated\n"),
            script_env: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_branch(mut self, name: &str, files: Vec<(String, String)>) -> Self {
        self.branches.insert(name.to_string(), files);
        self
    }

    /// `git clone` exits 128 with this stderr.
    pub fn failing_clone(mut self, stderr: &str) -> Self {
        self.clone_error = Some(stderr.to_string());
        self
    }

    pub fn failing_venv(mut self, out: CapturedOutput) -> Self {
        self.venv_error = Some(out);
        self
    }

    /// Spawning a program with this file name fails like a missing binary.
    pub fn missing_program(mut self, program_name: &str) -> Self {
        self.spawn_error_for = Some(program_name.to_string());
        self
    }

    /// Only the script invocation fails to start, with this error text.
    pub fn unstartable_script(mut self, message: &str) -> Self {
        self.script_spawn_error = Some(message.to_string());
        self
    }

    pub fn script_result(mut self, out: CapturedOutput) -> Self {
        self.script_result = out;
        self
    }

    /// Environment the script was started with, if it ran.
    pub fn script_env_handle(&self) -> Arc<Mutex<Option<EnvironmentVariables>>> {
        Arc::clone(&self.script_env)
    }

    pub fn into_runner(self) -> FakeCommandRunner {
        FakeCommandRunner::new(move |spec| self.respond(spec))
    }

    fn respond(&self, spec: &CommandSpec) -> deployagent::errors::Result<CapturedOutput> {
        let program = spec.program_name();
        if self.spawn_error_for.as_deref() == Some(program.as_str()) {
            return Err(DeployError::Other(anyhow::anyhow!(
                "failed to start '{}': No such file or directory (os error 2)",
                spec.program.display()
            )));
        }

        let arg_strings = spec.arg_strings();
        let args: Vec<&str> = arg_strings.iter().map(String::as_str).collect();
        let out = match (program.as_str(), args.as_slice()) {
            ("git", ["clone", _url, target]) => self.git_clone(Path::new(target)),
            ("git", ["checkout", branch]) => self.git_checkout(&spec.cwd, branch),
            (_, ["-m", "venv", dir]) => self.create_venv(Path::new(dir)),
            (_, ["-m", "pip", "install", .., manifest]) => self.pip_install(Path::new(manifest)),
            _ => {
                if let Some(message) = &self.script_spawn_error {
                    return Err(DeployError::Other(anyhow::anyhow!("{message}")));
                }
                *self.script_env.lock().unwrap() = spec.env.clone();
                self.script_result.clone()
            }
        };
        Ok(out)
    }

    fn git_clone(&self, target: &Path) -> CapturedOutput {
        if let Some(stderr) = &self.clone_error {
            return failed(128, stderr);
        }
        if self.fs.exists(target) {
            return failed(
                128,
                &format!(
                    "fatal: destination path '{}' already exists and is not an empty directory.\n",
                    target.display()
                ),
            );
        }
        self.fs.add_file(target.join(".git/HEAD"), "ref: refs/heads/master\n");
        self.write_tree(target, "master");
        ok("")
    }

    fn git_checkout(&self, repo: &Path, branch: &str) -> CapturedOutput {
        if !self.branches.contains_key(branch) {
            return failed(
                1,
                &format!("error: pathspec '{branch}' did not match any file(s) known to git\n"),
            );
        }
        let git_dir = repo.join(".git");
        for entry in self.fs.read_dir(repo).unwrap_or_default() {
            if entry != git_dir {
                let _ = self.fs.remove_path(&entry);
            }
        }
        self.fs
            .add_file(git_dir.join("HEAD"), format!("ref: refs/heads/{branch}\n"));
        self.write_tree(repo, branch);
        ok("")
    }

    fn write_tree(&self, root: &Path, branch: &str) {
        if let Some(files) = self.branches.get(branch) {
            for (rel, content) in files {
                self.fs.add_file(root.join(rel), content.as_bytes());
            }
        }
    }

    fn create_venv(&self, dir: &Path) -> CapturedOutput {
        if let Some(out) = &self.venv_error {
            return out.clone();
        }
        self.fs.add_file(dir.join("bin/python"), "#!python");
        self.fs.add_file(dir.join("pyvenv.cfg"), "home = /usr/bin\n");
        ok("")
    }

    fn pip_install(&self, manifest: &Path) -> CapturedOutput {
        let contents = match self.fs.read_to_string(manifest) {
            Ok(c) => c,
            Err(_) => {
                return failed(
                    1,
                    &format!(
                        "ERROR: Could not open requirements file: [Errno 2] No such file or directory: '{}'\n",
                        manifest.display()
                    ),
                );
            }
        };
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                continue;
            }
            if line.contains(' ') {
                return failed(1, &format!("ERROR: Invalid requirement: '{line}'\n"));
            }
        }
        ok("Successfully installed requests\n")
    }
}

/// Convenience: absolute path helper for readability in tests.
pub fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}
