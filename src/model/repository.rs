use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// URL of the remote repository to analyze. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RepositoryReference(String);

impl RepositoryReference {
    /// Accepts any non-blank string. Whether it names a reachable
    /// repository is left to the version-control client.
    pub fn parse(url: &str) -> Result<Self, String> {
        let url = url.trim();
        if url.is_empty() {
            return Err("repository URL must not be empty".to_string());
        }
        Ok(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment of the URL, without a trailing `/` or `.git`.
    pub fn project_name(&self) -> &str {
        let trimmed = self.0.trim_end_matches('/');
        let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
        last.strip_suffix(".git").unwrap_or(last)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A populated workspace: the fetched repository tree on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn join(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}
