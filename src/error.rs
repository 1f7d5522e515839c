//! Error types for each pipeline stage.
//!
//! Every stage detects and reports its own failures. Which of them halt a
//! run is decided by [`Pipeline`](crate::pipeline::Pipeline), not here.

use crate::model::FetchHistory;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// An external tool could not be started at all.
///
/// A non-zero exit is *not* an `ExecutionFailure`; it is returned as a
/// normal [`ProcessOutput`](crate::process::ProcessOutput).
#[derive(Debug, Error)]
#[error("failed to start `{program}`: {source}")]
pub struct ExecutionFailure {
    pub program: String,
    #[source]
    pub source: io::Error,
}

impl ExecutionFailure {
    pub fn new(program: impl Into<String>, source: io::Error) -> Self {
        Self {
            program: program.into(),
            source,
        }
    }
}

/// The workspace could not be removed, even after forcing write permission.
#[derive(Debug, Error)]
#[error("failed to remove workspace entry {}: {source}", .path.display())]
pub struct WorkspaceCleanupFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Acquisition gave up. Both variants keep the history of what was tried.
#[derive(Debug, Error)]
pub enum AcquisitionFailure {
    /// A partial or stale workspace could not be removed. No further
    /// attempts are made once this happens.
    #[error("could not clean workspace {}: {source}", describe_progress(.history))]
    CleanupFailed {
        history: FetchHistory,
        #[source]
        source: WorkspaceCleanupFailure,
    },

    #[error("repository fetch failed {}", describe_progress(.history))]
    ExhaustedRetries { history: FetchHistory },
}

fn describe_progress(history: &FetchHistory) -> String {
    match (history.attempts, history.failures.last()) {
        (0, _) => "before the first fetch attempt".to_string(),
        (n, Some(last)) => format!("after {} attempt(s) (last {})", n, last),
        (n, None) => format!("after {} attempt(s)", n),
    }
}

impl AcquisitionFailure {
    pub fn history(&self) -> &FetchHistory {
        match self {
            Self::CleanupFailed { history, .. } | Self::ExhaustedRetries { history } => history,
        }
    }

    /// Number of fetch attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        self.history().attempts
    }
}

#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("dependency extraction exited with {}: {diagnostics}", describe_exit(.exit_code.as_ref().copied()))]
    ToolFailed {
        exit_code: Option<i32>,
        diagnostics: String,
    },

    #[error("dependency extraction could not run: {0}")]
    ToolUnavailable(#[from] ExecutionFailure),

    #[error("declaration file {} was not produced", .path.display())]
    MissingDeclarationFile { path: PathBuf },

    #[error("failed to read declaration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The vulnerability checker could not be started. Says nothing about
/// whether vulnerabilities exist.
#[derive(Debug, Error)]
#[error("vulnerability scan unavailable: {0}")]
pub struct ScanUnavailable(#[from] pub ExecutionFailure);

pub(crate) fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}
