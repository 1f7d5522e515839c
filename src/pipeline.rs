//! Sequencing of acquisition, extraction and scanning.

use crate::acquire::RepositoryAcquirer;
use crate::config::Config;
use crate::dependencies::DependencySetExtractor;
use crate::model::{PipelineReport, RepositoryReference, Stage, StageFailure};
use crate::process::ProcessRunner;
use crate::scan::VulnerabilityScanner;
use crate::tools::{GitClient, Pipreqs, SafetyCheck};
use crate::workspace::WorkspaceManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const ACQUISITION_FAILED: u8 = 2;
    pub const EXTRACTION_FAILED: u8 = 3;
    pub const VULNERABILITIES_FOUND: u8 = 4;
    pub const SCAN_UNAVAILABLE: u8 = 5;
}

/// Notified as each stage starts and finishes, so console output can follow
/// the run instead of waiting for it.
///
/// `report` holds everything produced so far.
pub trait RunObserver {
    fn stage_started(&mut self, _stage: Stage, _report: &PipelineReport) {}

    fn stage_finished(&mut self, _stage: Stage, _report: &PipelineReport) {}
}

impl RunObserver for () {}

/// Runs the three stages strictly in order.
///
/// Acquisition and extraction failures halt the run: nothing downstream is
/// attempted on a workspace that is missing or whose declaration file
/// cannot be trusted.
pub struct Pipeline {
    acquirer: RepositoryAcquirer,
    extractor: DependencySetExtractor,
    scanner: VulnerabilityScanner,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(
        acquirer: RepositoryAcquirer,
        extractor: DependencySetExtractor,
        scanner: VulnerabilityScanner,
    ) -> Self {
        Self {
            acquirer,
            extractor,
            scanner,
            show_progress: false,
        }
    }

    /// Wires the default git / pipreqs / safety backends to `runner`.
    pub fn from_config(config: &Config, runner: Arc<dyn ProcessRunner>) -> Self {
        let acquirer = RepositoryAcquirer::new(
            Box::new(GitClient::new(runner.clone(), config.tools.git.clone())),
            Box::new(WorkspaceManager::new(&config.workspace_dir)),
        );
        let extractor = DependencySetExtractor::new(
            Box::new(Pipreqs::new(runner.clone(), config.tools.extractor.clone())),
            config.declaration_file.clone(),
        );
        let scanner = VulnerabilityScanner::new(
            Box::new(SafetyCheck::new(runner, config.tools.checker.clone())),
            config.declaration_file.clone(),
        );
        Self::new(acquirer, extractor, scanner)
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self, reference: &RepositoryReference) -> PipelineReport {
        self.run_observed(reference, &mut ())
    }

    pub fn run_observed(
        &self,
        reference: &RepositoryReference,
        observer: &mut dyn RunObserver,
    ) -> PipelineReport {
        let mut report = PipelineReport::new(
            reference.clone(),
            self.acquirer.workspace().path().to_path_buf(),
            self.extractor.declaration_file(),
        );

        observer.stage_started(Stage::Acquisition, &report);
        let pb = self.spinner(format!("Cloning {}...", reference));
        let acquired = self.acquirer.acquire(reference);
        finish(pb);

        let acquisition = match acquired {
            Ok(acquisition) => acquisition,
            Err(e) => {
                error!(error = %e, "Repository acquisition failed");
                report.fetch = e.history().clone();
                report.failure = Some(StageFailure {
                    stage: Stage::Acquisition,
                    message: e.to_string(),
                });
                observer.stage_finished(Stage::Acquisition, &report);
                return report;
            }
        };
        report.fetch = acquisition.history;
        observer.stage_finished(Stage::Acquisition, &report);

        observer.stage_started(Stage::Extraction, &report);
        let pb = self.spinner("Extracting dependencies...".to_string());
        let extracted = self.extractor.extract(&acquisition.workspace);
        finish(pb);

        match extracted {
            Ok(extraction) => {
                report.extractor_output = Some(extraction.tool_output);
                report.dependencies = Some(extraction.dependencies);
            }
            Err(e) => {
                error!(error = %e, "Dependency extraction failed");
                report.failure = Some(StageFailure {
                    stage: Stage::Extraction,
                    message: e.to_string(),
                });
            }
        }
        observer.stage_finished(Stage::Extraction, &report);
        if report.failure.is_some() {
            return report;
        }

        observer.stage_started(Stage::Scan, &report);
        let pb = self.spinner("Checking for vulnerabilities...".to_string());
        let scanned = self.scanner.scan(&acquisition.workspace);
        finish(pb);

        match scanned {
            Ok(vulnerabilities) => report.vulnerabilities = Some(vulnerabilities),
            Err(e) => {
                warn!(error = %e, "Vulnerability check could not run");
                report.scan_error = Some(e.to_string());
            }
        }
        observer.stage_finished(Stage::Scan, &report);

        report
    }

    fn spinner(&self, message: String) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(message);
        Some(pb)
    }
}

fn finish(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

/// Maps a finished run to the process exit code.
///
/// Vulnerability findings only affect the exit code when
/// `fail_on_findings` is set; otherwise they are display-only.
pub fn exit_code(report: &PipelineReport, fail_on_findings: bool) -> u8 {
    match report.failed_at() {
        Some(Stage::Acquisition) => return exit_codes::ACQUISITION_FAILED,
        Some(Stage::Extraction) => return exit_codes::EXTRACTION_FAILED,
        Some(Stage::Scan) | None => {}
    }

    if !fail_on_findings {
        return exit_codes::SUCCESS;
    }
    if report.has_findings() {
        exit_codes::VULNERABILITIES_FOUND
    } else if report.scan_error.is_some() {
        exit_codes::SCAN_UNAVAILABLE
    } else {
        exit_codes::SUCCESS
    }
}
