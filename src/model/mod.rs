//! Core data types for a single analysis run.
//!
//! - [`RepositoryReference`] - The remote repository being analyzed
//! - [`Workspace`] - The local directory holding the fetched tree
//! - [`DependencySet`] - Deduplicated dependency declarations
//! - [`FetchHistory`] - Attempts, failures and cleanups during acquisition
//! - [`VulnerabilityReport`] - Outcome of the vulnerability check
//! - [`PipelineReport`] - Everything one run produced
//!
//! # Example
//!
//! ```
//! use repoaudit::model::{DependencySet, RepositoryReference};
//!
//! let reference = RepositoryReference::parse("https://example.com/org/sample-repo.git").unwrap();
//! assert_eq!(reference.project_name(), "sample-repo");
//!
//! let deps = DependencySet::from_lines(["numpy", "pandas", "numpy"]);
//! assert_eq!(deps.len(), 2);
//! ```

mod dependency;
mod report;
mod repository;

pub use dependency::*;
pub use report::*;
pub use repository::*;
