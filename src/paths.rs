// src/paths.rs

//! Project-root resolution and the paths derived from it.

use std::path::{Path, PathBuf};

use crate::config::{ConfigFile, RepositorySpec};
use crate::errors::{DeployError, Result};
use crate::fs::FileSystem;

/// The single input of a deployment: an existing project directory.
///
/// Constructed only through [`DeploymentRequest::new`], which checks the
/// directory exists. The path is kept exactly as given; its canonical form
/// is kept alongside for locations that must not depend on symlinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    project_root: PathBuf,
    canonical_root: PathBuf,
}

impl DeploymentRequest {
    pub fn new(fs: &dyn FileSystem, project_root: impl AsRef<Path>) -> Result<Self> {
        let root = project_root.as_ref();
        if !fs.is_dir(root) {
            return Err(DeployError::InvalidRequest(format!(
                "project root {} does not exist or is not a directory",
                root.display()
            )));
        }
        let canonical_root = fs.canonicalize(root).map_err(|e| {
            DeployError::InvalidRequest(format!("cannot resolve {}: {e:#}", root.display()))
        })?;
        Ok(Self {
            project_root: root.to_path_buf(),
            canonical_root,
        })
    }

    /// The project root as the caller passed it.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }
}

/// Locations used by one run. Recomputed every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Untouched; this is what the script receives.
    pub project_root: PathBuf,
    /// `<canonical project root>/<repository.name>`; also the lock key.
    pub clone_path: PathBuf,
    /// `<clone_path>/<environment.dir>`
    pub env_path: PathBuf,
    /// `<clone_path>/<environment.manifest>`
    pub manifest_path: PathBuf,
    /// `<clone_path>/<script.path>`
    pub script_path: PathBuf,
}

impl ResolvedPaths {
    pub fn resolve(request: &DeploymentRequest, config: &ConfigFile) -> Self {
        let project_root = request.project_root().to_path_buf();
        let clone_path = clone_path(request.canonical_root(), &config.repository);
        Self {
            env_path: clone_path.join(&config.environment.dir),
            manifest_path: clone_path.join(&config.environment.manifest),
            script_path: clone_path.join(&config.script.path),
            clone_path,
            project_root,
        }
    }
}

pub fn clone_path(project_root: &Path, repo: &RepositorySpec) -> PathBuf {
    project_root.join(&repo.local_name)
}

/// Pick the project root: the explicit `--project` value, else `cwd`.
pub fn resolve_project_root(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => cwd.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;
    use crate::fs::mock::MockFileSystem;

    fn config() -> ConfigFile {
        let mut raw = RawConfigFile::default();
        raw.repository.url = Some("https://example.com/org/ai-hackathon-25.git".to_string());
        ConfigFile::try_from(raw).unwrap()
    }

    #[test]
    fn request_requires_existing_directory() {
        let fs = MockFileSystem::new();
        fs.add_file("/work/file.txt", "x");

        assert!(matches!(
            DeploymentRequest::new(&fs, "/work/missing"),
            Err(DeployError::InvalidRequest(_))
        ));
        assert!(matches!(
            DeploymentRequest::new(&fs, "/work/file.txt"),
            Err(DeployError::InvalidRequest(_))
        ));
        assert!(DeploymentRequest::new(&fs, "/work").is_ok());
    }

    #[test]
    fn paths_derive_from_root_and_config() {
        let fs = MockFileSystem::new();
        fs.add_dir("/work/myproj");
        let request = DeploymentRequest::new(&fs, "/work/myproj").unwrap();

        let paths = ResolvedPaths::resolve(&request, &config());

        assert_eq!(paths.clone_path, PathBuf::from("/work/myproj/ai-hackathon-25"));
        assert_eq!(paths.env_path, PathBuf::from("/work/myproj/ai-hackathon-25/venv"));
        assert_eq!(
            paths.manifest_path,
            PathBuf::from("/work/myproj/ai-hackathon-25/requirements.txt")
        );
        assert_eq!(
            paths.script_path,
            PathBuf::from("/work/myproj/ai-hackathon-25/pipeline.py")
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_root_keeps_given_path_and_checks_out_under_target() {
        use crate::fs::RealFileSystem;

        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let linked = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &linked).unwrap();

        let request = DeploymentRequest::new(&RealFileSystem, &linked).unwrap();
        let paths = ResolvedPaths::resolve(&request, &config());

        let canonical = std::fs::canonicalize(&real).unwrap();
        assert_eq!(request.project_root(), linked.as_path());
        assert_eq!(request.canonical_root(), canonical.as_path());
        assert_eq!(paths.project_root, linked);
        assert_eq!(paths.clone_path, canonical.join("ai-hackathon-25"));
    }

    #[test]
    fn relative_project_is_joined_to_cwd() {
        let cwd = Path::new("/home/dev");
        assert_eq!(resolve_project_root(None, cwd), PathBuf::from("/home/dev"));
        assert_eq!(
            resolve_project_root(Some(Path::new("proj")), cwd),
            PathBuf::from("/home/dev/proj")
        );
        assert_eq!(
            resolve_project_root(Some(Path::new("/abs")), cwd),
            PathBuf::from("/abs")
        );
    }
}
