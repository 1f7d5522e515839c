//! Vulnerability check over the workspace's declaration file.

use crate::error::ScanUnavailable;
use crate::model::{VulnerabilityReport, Workspace};
use crate::tools::VulnerabilityChecker;
use tracing::info;

pub struct VulnerabilityScanner {
    checker: Box<dyn VulnerabilityChecker>,
    declaration_file: String,
}

impl VulnerabilityScanner {
    pub fn new(checker: Box<dyn VulnerabilityChecker>, declaration_file: impl Into<String>) -> Self {
        Self {
            checker,
            declaration_file: declaration_file.into(),
        }
    }

    /// Runs the checker against the declaration file inside `workspace`.
    ///
    /// Exit status 0 yields [`VulnerabilityReport::NoKnownIssues`]; any
    /// other status yields [`VulnerabilityReport::IssuesDetected`] with the
    /// checker's standard output as-is. The workspace is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`ScanUnavailable`] only if the checker could not be started.
    pub fn scan(&self, workspace: &Workspace) -> Result<VulnerabilityReport, ScanUnavailable> {
        info!(
            tool = self.checker.name(),
            file = %self.declaration_file,
            "Checking dependencies for known vulnerabilities"
        );

        let output = self.checker.scan(&self.declaration_file, workspace.root())?;

        let report = if output.success() {
            VulnerabilityReport::NoKnownIssues
        } else {
            VulnerabilityReport::IssuesDetected {
                findings: output.stdout,
            }
        };

        info!(clean = report.is_clean(), exit_code = ?output.exit_code, "Vulnerability check finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use crate::process::ProcessOutput;
    use crate::test_support::{not_found, FakeRunner};
    use crate::tools::SafetyCheck;
    use std::sync::Arc;

    const SAFETY_FINDINGS: &str = "\
+==============================================================================+
 REPORT
  Safety is using PyUp's free open-source vulnerability database.
 -> Vulnerability found in flask version 0.12
    Vulnerability ID: 38654
+==============================================================================+
";

    fn scanner(runner: Arc<FakeRunner>) -> VulnerabilityScanner {
        VulnerabilityScanner::new(
            Box::new(SafetyCheck::new(runner, ToolConfig::new("safety"))),
            "requirements.txt",
        )
    }

    #[test]
    fn test_zero_exit_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ProcessOutput::exited(0, "No known security vulnerabilities found.\n", "")));

        let report = scanner(runner.clone())
            .scan(&Workspace::new(dir.path()))
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.findings(), "");

        let call = &runner.calls()[0];
        assert_eq!(call.program, "safety");
        assert_eq!(call.args, vec!["check", "-r", "requirements.txt"]);
        assert_eq!(call.working_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_non_zero_exit_passes_findings_through() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ProcessOutput::exited(64, SAFETY_FINDINGS, "warning\n")));

        let report = scanner(runner)
            .scan(&Workspace::new(dir.path()))
            .unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.findings().as_bytes(), SAFETY_FINDINGS.as_bytes());
    }

    #[test]
    fn test_missing_checker_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Err(not_found("safety")));

        let err = scanner(runner)
            .scan(&Workspace::new(dir.path()))
            .unwrap_err();
        assert_eq!(err.0.program, "safety");
    }

    #[test]
    fn test_workspace_untouched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask==0.12\n").unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ProcessOutput::exited(64, SAFETY_FINDINGS, "")));

        scanner(runner).scan(&Workspace::new(dir.path())).unwrap();

        let content = std::fs::read_to_string(dir.path().join("requirements.txt")).unwrap();
        assert_eq!(content, "flask==0.12\n");
    }
}
