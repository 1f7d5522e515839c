//! Repository retrieval with a bounded retry budget.

use crate::error::{describe_exit, AcquisitionFailure};
use crate::model::{AttemptFailure, FetchHistory, RepositoryReference, Workspace};
use crate::tools::VersionControl;
use crate::workspace::WorkspaceStore;
use tracing::{info, warn};

/// Fetch attempts made before giving up.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;

/// A successful acquisition.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub workspace: Workspace,
    pub history: FetchHistory,
}

pub struct RepositoryAcquirer {
    vcs: Box<dyn VersionControl>,
    workspace: Box<dyn WorkspaceStore>,
}

impl RepositoryAcquirer {
    pub fn new(vcs: Box<dyn VersionControl>, workspace: Box<dyn WorkspaceStore>) -> Self {
        Self { vcs, workspace }
    }

    pub fn workspace(&self) -> &dyn WorkspaceStore {
        self.workspace.as_ref()
    }

    /// Fetches `reference` into the workspace.
    ///
    /// A workspace left over from an earlier run is removed first. After
    /// every failed attempt any partial clone is removed before retrying,
    /// so a failed acquisition never leaves content behind.
    ///
    /// # Errors
    ///
    /// - [`AcquisitionFailure::CleanupFailed`] as soon as a removal fails.
    /// - [`AcquisitionFailure::ExhaustedRetries`] after
    ///   [`MAX_FETCH_ATTEMPTS`] failed attempts.
    ///
    /// Both carry the [`FetchHistory`] accumulated so far.
    pub fn acquire(
        &self,
        reference: &RepositoryReference,
    ) -> Result<Acquisition, AcquisitionFailure> {
        let destination = self.workspace.path();
        let mut history = FetchHistory::default();

        if self.workspace.exists() {
            warn!(path = %destination.display(), "Removing stale workspace");
            if let Err(source) = self.workspace.ensure_clean() {
                return Err(AcquisitionFailure::CleanupFailed { history, source });
            }
            history.stale_workspace_removed = true;
        }

        for attempt in 1..=MAX_FETCH_ATTEMPTS {
            info!(
                attempt,
                max_attempts = MAX_FETCH_ATTEMPTS,
                url = %reference,
                vcs = self.vcs.name(),
                "Fetching repository"
            );
            history.attempts = attempt;

            let reason = match self.vcs.fetch(reference, destination) {
                Ok(output) if output.success() => {
                    info!(attempt, path = %destination.display(), "Repository fetched");
                    return Ok(Acquisition {
                        workspace: Workspace::new(destination),
                        history,
                    });
                }
                Ok(output) => {
                    let stderr = output.stderr.trim();
                    if stderr.is_empty() {
                        format!("{} exited with {}", self.vcs.name(), describe_exit(output.exit_code))
                    } else {
                        format!(
                            "{} exited with {}: {}",
                            self.vcs.name(),
                            describe_exit(output.exit_code),
                            stderr
                        )
                    }
                }
                Err(e) => e.to_string(),
            };
            warn!(attempt, reason = %reason, "Fetch attempt failed");

            let mut failure = AttemptFailure {
                attempt,
                reason,
                workspace_removed: false,
            };
            if self.workspace.exists() {
                if let Err(source) = self.workspace.ensure_clean() {
                    history.failures.push(failure);
                    return Err(AcquisitionFailure::CleanupFailed { history, source });
                }
                failure.workspace_removed = true;
                info!(attempt, "Partial clone removed");
            }
            history.failures.push(failure);
        }

        Err(AcquisitionFailure::ExhaustedRetries { history })
    }
}
