//! External tools the pipeline drives as black boxes.
//!
//! Each collaborator exposes a single operation and is backed by a
//! [`ProcessRunner`], so any of them can be swapped for a fake in tests.
//!
//! | Trait | Default backend | Invocation |
//! |-------|-----------------|------------|
//! | [`VersionControl`] | [`GitClient`] | `git clone <url> <dest>` |
//! | [`DependencyExtractor`] | [`Pipreqs`] | `pipreqs <dir> --force` |
//! | [`VulnerabilityChecker`] | [`SafetyCheck`] | `safety check -r <file>` |

mod git;
mod pipreqs;
mod safety;

pub use git::GitClient;
pub use pipreqs::Pipreqs;
pub use safety::SafetyCheck;

use crate::error::ExecutionFailure;
use crate::model::RepositoryReference;
use crate::process::ProcessOutput;
use std::path::Path;

/// Fetches a remote repository into a local directory.
pub trait VersionControl: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetches `reference` into `destination`, which must not exist yet.
    fn fetch(
        &self,
        reference: &RepositoryReference,
        destination: &Path,
    ) -> Result<ProcessOutput, ExecutionFailure>;
}

/// Writes a dependency declaration file into a project directory.
pub trait DependencyExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scans `project_dir`, overwriting any existing declaration file.
    fn extract_dependencies(&self, project_dir: &Path) -> Result<ProcessOutput, ExecutionFailure>;
}

/// Checks a declaration file for known vulnerabilities.
///
/// Exit status 0 means no known issues; anything else means findings were
/// printed on standard output.
pub trait VulnerabilityChecker: Send + Sync {
    fn name(&self) -> &'static str;

    /// `declaration_file` is relative to `working_dir`.
    fn scan(
        &self,
        declaration_file: &str,
        working_dir: &Path,
    ) -> Result<ProcessOutput, ExecutionFailure>;
}
