//! Lifecycle of the on-disk working directory.

use crate::error::WorkspaceCleanupFailure;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// The on-disk directory acquisition fetches into.
pub trait WorkspaceStore: Send + Sync {
    /// Fixed for the lifetime of the store.
    fn path(&self) -> &Path;

    fn exists(&self) -> bool;

    /// Removes the workspace and everything under it. On success the path
    /// no longer exists.
    fn ensure_clean(&self) -> Result<(), WorkspaceCleanupFailure>;
}

/// Owns the single workspace directory used by one run.
///
/// The path is fixed at construction and never changes for the lifetime
/// of the manager.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn force_remove(&self) -> Result<(), WorkspaceCleanupFailure> {
        // Directories must be writable before their children can go.
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| walk_failure(&self.root, e))?;
            if entry.file_type().is_dir() {
                if let Err(e) = make_writable(entry.path()) {
                    debug!(path = %entry.path().display(), error = %e, "Could not unlock directory");
                }
            }
        }

        for entry in WalkDir::new(&self.root).follow_links(false).contents_first(true) {
            let entry = entry.map_err(|e| walk_failure(&self.root, e))?;
            let path = entry.path();

            if let Err(first) = remove_entry(path, entry.file_type().is_dir()) {
                if first.kind() == io::ErrorKind::NotFound {
                    continue;
                }
                warn!(path = %path.display(), error = %first, "Forcing write permission");
                make_writable(path)
                    .and_then(|()| remove_entry(path, entry.file_type().is_dir()))
                    .map_err(|source| WorkspaceCleanupFailure {
                        path: path.to_path_buf(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

impl WorkspaceStore for WorkspaceManager {
    fn path(&self) -> &Path {
        &self.root
    }

    fn exists(&self) -> bool {
        fs::symlink_metadata(&self.root).is_ok()
    }

    /// Read-only entries are made writable and removed again, bottom-up.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceCleanupFailure`] for the first entry that cannot
    /// be removed even after forcing write permission.
    fn ensure_clean(&self) -> Result<(), WorkspaceCleanupFailure> {
        if !self.exists() {
            return Ok(());
        }

        match remove_path(&self.root) {
            Ok(()) => {
                debug!(path = %self.root.display(), "Workspace removed");
                return Ok(());
            }
            Err(e) => {
                debug!(path = %self.root.display(), error = %e, "Plain removal failed, forcing");
            }
        }

        self.force_remove()?;

        if self.exists() {
            return Err(WorkspaceCleanupFailure {
                path: self.root.clone(),
                source: io::Error::other("workspace still present after removal"),
            });
        }
        Ok(())
    }
}

fn remove_path(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    remove_entry(path, meta.is_dir())
}

fn remove_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn walk_failure(root: &Path, e: walkdir::Error) -> WorkspaceCleanupFailure {
    let path = e.path().unwrap_or(root).to_path_buf();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop"));
    WorkspaceCleanupFailure { path, source }
}

#[cfg(unix)]
fn make_writable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        return Ok(());
    }
    let mode = meta.permissions().mode();
    fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o700))
}

#[cfg(not(unix))]
fn make_writable(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    let mut perms = meta.permissions();
    #[allow(clippy::permissions_set_readonly_false)]
    perms.set_readonly(false);
    fs::set_permissions(path, perms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_readonly(path: &Path) {
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(path, perms).unwrap();
    }

    #[test]
    fn test_ensure_clean_absent_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(dir.path().join("missing"));

        assert!(!manager.exists());
        manager.ensure_clean().unwrap();
        assert!(!manager.exists());
    }

    #[test]
    fn test_ensure_clean_removes_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ws");
        fs::create_dir_all(root.join("src/pkg")).unwrap();
        fs::write(root.join("src/pkg/mod.py"), "import os\n").unwrap();
        fs::write(root.join("README.md"), "# sample\n").unwrap();

        let manager = WorkspaceManager::new(&root);
        assert!(manager.exists());
        manager.ensure_clean().unwrap();
        assert!(!manager.exists());
    }

    #[test]
    fn test_ensure_clean_removes_read_only_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ws");
        let objects = root.join(".git").join("objects").join("ab");
        fs::create_dir_all(&objects).unwrap();

        let packed = objects.join("cdef0123");
        fs::write(&packed, "blob").unwrap();
        fs::write(root.join("setup.py"), "from setuptools import setup\n").unwrap();
        set_readonly(&packed);
        set_readonly(&root.join("setup.py"));

        let manager = WorkspaceManager::new(&root);
        manager.ensure_clean().unwrap();
        assert!(!root.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_clean_removes_read_only_directories() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ws");
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("data.txt"), "x").unwrap();
        set_readonly(&locked.join("data.txt"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let manager = WorkspaceManager::new(&root);
        manager.ensure_clean().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_ensure_clean_removes_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ws");
        fs::write(&root, "not a directory").unwrap();
        set_readonly(&root);

        let manager = WorkspaceManager::new(&root);
        manager.ensure_clean().unwrap();
        assert!(!manager.exists());
    }
}
