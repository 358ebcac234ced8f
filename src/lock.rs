// src/lock.rs

//! Single-flight guard per automation checkout.
//!
//! Two runs against the same clone path would race on delete/clone, so a run
//! holds an exclusive advisory lock for its whole duration. The lock file
//! lives in the system temp dir (named by a hash of the clone path) so the
//! generation script never sees it inside the project.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::errors::{DeployError, Result};

/// Held for the duration of one run; released on drop.
#[derive(Debug)]
pub struct DeployLock {
    file: File,
    lock_path: PathBuf,
    target: PathBuf,
}

impl DeployLock {
    /// Try to take the lock for `clone_path` without blocking.
    ///
    /// Fails with [`DeployError::Busy`] if another run holds it.
    pub fn acquire(clone_path: &Path) -> Result<Self> {
        Self::acquire_in(&std::env::temp_dir(), clone_path)
    }

    /// Same as [`acquire`](Self::acquire) with an explicit lock directory.
    pub fn acquire_in(lock_dir: &Path, clone_path: &Path) -> Result<Self> {
        let lock_path = lock_dir.join(lock_file_name(clone_path));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        if let Err(err) = file.try_lock_exclusive() {
            return Err(lock_failure(err, clone_path));
        }

        debug!(
            target_path = %clone_path.display(),
            lock = %lock_path.display(),
            "acquired deployment lock"
        );

        Ok(Self {
            file,
            lock_path,
            target: clone_path.to_path_buf(),
        })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        // The file itself stays; deleting it would let a waiter lock a
        // different inode than a newcomer.
        let _ = FileExt::unlock(&self.file);
        debug!(target_path = %self.target.display(), "released deployment lock");
    }
}

/// Contention means another run; anything else is a real IO problem.
fn lock_failure(err: io::Error, clone_path: &Path) -> DeployError {
    if err.kind() == fs2::lock_contended_error().kind() {
        DeployError::Busy(clone_path.to_path_buf())
    } else {
        DeployError::IoError(err)
    }
}

fn lock_file_name(clone_path: &Path) -> String {
    let hash = blake3::hash(clone_path.to_string_lossy().as_bytes());
    let hex = hash.to_hex();
    format!("deployagent-{}.lock", &hex.as_str()[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_on_same_path_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let target = Path::new("/work/myproj/ai-hackathon-25");

        let first = DeployLock::acquire_in(dir.path(), target).unwrap();
        match DeployLock::acquire_in(dir.path(), target) {
            Err(DeployError::Busy(p)) => assert_eq!(p, target),
            other => panic!("expected Busy, got {other:?}"),
        }

        drop(first);
        assert!(DeployLock::acquire_in(dir.path(), target).is_ok());
    }

    #[test]
    fn only_contention_is_reported_as_busy() {
        let target = Path::new("/work/myproj/ai-hackathon-25");

        assert!(matches!(
            lock_failure(fs2::lock_contended_error(), target),
            DeployError::Busy(_)
        ));
        match lock_failure(io::Error::from(io::ErrorKind::PermissionDenied), target) {
            DeployError::IoError(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("expected IoError, got {other:?}"),
        }
    }

    #[test]
    fn different_paths_do_not_contend() {
        let dir = tempfile::tempdir().unwrap();
        let a = DeployLock::acquire_in(dir.path(), Path::new("/work/a/repo")).unwrap();
        let b = DeployLock::acquire_in(dir.path(), Path::new("/work/b/repo")).unwrap();
        assert_ne!(a.lock_path(), b.lock_path());
    }
}
