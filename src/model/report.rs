use super::{DependencySet, RepositoryReference};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Outcome of one vulnerability check.
///
/// Exactly one of the two states holds; findings are the checker's
/// standard output, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VulnerabilityReport {
    NoKnownIssues,
    IssuesDetected { findings: String },
}

impl VulnerabilityReport {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::NoKnownIssues)
    }

    /// Empty when no issues were reported.
    pub fn findings(&self) -> &str {
        match self {
            Self::NoKnownIssues => "",
            Self::IssuesDetected { findings } => findings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Acquisition,
    Extraction,
    Scan,
}

/// Why one fetch attempt did not produce a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptFailure {
    pub attempt: u32,
    pub reason: String,
    /// A partial clone was found and removed after this attempt.
    pub workspace_removed: bool,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt {}: {}", self.attempt, self.reason)
    }
}

/// Everything acquisition did, whether or not it ended with a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchHistory {
    /// Fetch attempts made, including a successful one.
    pub attempts: u32,
    /// Failed attempts, oldest first.
    pub failures: Vec<AttemptFailure>,
    /// A workspace left by an earlier run was removed before fetching.
    pub stale_workspace_removed: bool,
}

impl FetchHistory {
    /// Number of workspace removals performed.
    pub fn cleanups(&self) -> u32 {
        let after_failures = self.failures.iter().filter(|f| f.workspace_removed).count() as u32;
        after_failures + u32::from(self.stale_workspace_removed)
    }
}

/// A failure that halted the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

/// Everything one pipeline run produced, in the order it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub repository: RepositoryReference,
    pub project_name: String,
    pub workspace: PathBuf,
    pub scan_time: DateTime<Utc>,
    pub declaration_file: String,
    pub fetch: FetchHistory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractor_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<DependencySet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vulnerabilities: Option<VulnerabilityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StageFailure>,
}

impl PipelineReport {
    pub fn new(
        repository: RepositoryReference,
        workspace: PathBuf,
        declaration_file: impl Into<String>,
    ) -> Self {
        let project_name = repository.project_name().to_string();
        Self {
            repository,
            project_name,
            workspace,
            scan_time: Utc::now(),
            declaration_file: declaration_file.into(),
            fetch: FetchHistory::default(),
            extractor_output: None,
            dependencies: None,
            vulnerabilities: None,
            scan_error: None,
            failure: None,
        }
    }

    pub fn failed_at(&self) -> Option<Stage> {
        self.failure.as_ref().map(|f| f.stage)
    }

    pub fn has_findings(&self) -> bool {
        self.vulnerabilities
            .as_ref()
            .map(|v| !v.is_clean())
            .unwrap_or(false)
    }
}
