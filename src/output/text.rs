use crate::acquire::MAX_FETCH_ATTEMPTS;
use crate::model::{PipelineReport, Stage, VulnerabilityReport};
use crate::pipeline::RunObserver;
use anyhow::Result;
use std::io::Write;

/// Renders a finished run.
pub fn write_text<W: Write>(out: &mut W, report: &PipelineReport) -> Result<()> {
    for stage in [Stage::Acquisition, Stage::Extraction, Stage::Scan] {
        write_stage_started(out, stage, report)?;
        write_stage_finished(out, stage, report)?;
        if report.failed_at() == Some(stage) {
            break;
        }
    }
    Ok(())
}

/// Writes each stage's section as soon as the pipeline reaches it.
///
/// The first write error stops further output and is returned by
/// [`TextReporter::finish`].
pub struct TextReporter<W: Write> {
    out: W,
    error: Option<anyhow::Error>,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn finish(mut self) -> Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(())
    }

    fn record(&mut self, written: Result<()>) {
        if let Err(e) = written.and_then(|()| self.out.flush().map_err(Into::into)) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> RunObserver for TextReporter<W> {
    fn stage_started(&mut self, stage: Stage, report: &PipelineReport) {
        if self.error.is_none() {
            let written = write_stage_started(&mut self.out, stage, report);
            self.record(written);
        }
    }

    fn stage_finished(&mut self, stage: Stage, report: &PipelineReport) {
        if self.error.is_none() {
            let written = write_stage_finished(&mut self.out, stage, report);
            self.record(written);
        }
    }
}

fn write_stage_started<W: Write>(out: &mut W, stage: Stage, report: &PipelineReport) -> Result<()> {
    match stage {
        Stage::Acquisition => {
            writeln!(out, "Processing URL: {}", report.repository)?;
            writeln!(
                out,
                "Cloning repository from {} into {}...",
                report.repository,
                report.workspace.display()
            )?;
        }
        Stage::Extraction => {
            writeln!(
                out,
                "Generating {} for project at {}...",
                report.declaration_file,
                report.workspace.display()
            )?;
        }
        Stage::Scan => {}
    }
    Ok(())
}

fn write_stage_finished<W: Write>(out: &mut W, stage: Stage, report: &PipelineReport) -> Result<()> {
    match stage {
        Stage::Acquisition => write_acquisition(out, report),
        Stage::Extraction => write_extraction(out, report),
        Stage::Scan => write_scan(out, report),
    }
}

fn write_acquisition<W: Write>(out: &mut W, report: &PipelineReport) -> Result<()> {
    let fetch = &report.fetch;
    if fetch.stale_workspace_removed {
        writeln!(out, "Directory deleted successfully.")?;
    }
    for failure in &fetch.failures {
        writeln!(out, "Error: {}. Failed to clone repository.", failure)?;
        if failure.workspace_removed {
            writeln!(out, "Directory deleted successfully.")?;
        }
    }

    if report.failed_at() == Some(Stage::Acquisition) {
        if let Some(failure) = &report.failure {
            writeln!(out, "Error: {}", failure.message)?;
        }
        writeln!(out, "Cloning failed. Number of attempts: {}", fetch.attempts)?;
    } else {
        writeln!(
            out,
            "Repository cloned successfully (attempt {} of {})",
            fetch.attempts, MAX_FETCH_ATTEMPTS
        )?;
    }
    Ok(())
}

fn write_extraction<W: Write>(out: &mut W, report: &PipelineReport) -> Result<()> {
    if report.failed_at() == Some(Stage::Extraction) {
        if let Some(failure) = &report.failure {
            writeln!(out, "Error during dependency extraction: {}", failure.message)?;
        }
        writeln!(out, "Skipping vulnerability check.")?;
        return Ok(());
    }

    if let Some(tool_output) = report.extractor_output.as_deref() {
        if !tool_output.trim().is_empty() {
            writeln!(out, "{}", tool_output.trim_end())?;
        }
    }
    writeln!(out, "{} generated successfully!", report.declaration_file)?;

    writeln!(out)?;
    writeln!(out, "\tThe imported libraries used in {}", report.project_name)?;
    writeln!(out)?;
    match &report.dependencies {
        Some(deps) if !deps.is_empty() => {
            for declaration in deps.iter() {
                writeln!(out, "{}", declaration)?;
            }
        }
        _ => writeln!(out, "No third-party libraries found.")?,
    }
    writeln!(out)?;
    Ok(())
}

fn write_scan<W: Write>(out: &mut W, report: &PipelineReport) -> Result<()> {
    match (&report.vulnerabilities, &report.scan_error) {
        (Some(VulnerabilityReport::NoKnownIssues), _) => {
            writeln!(out, "No security issues found in the project.")?;
        }
        (Some(VulnerabilityReport::IssuesDetected { findings }), _) => {
            writeln!(out, "Security issues detected:")?;
            out.write_all(findings.as_bytes())?;
            if !findings.is_empty() && !findings.ends_with('\n') {
                writeln!(out)?;
            }
        }
        (None, Some(error)) => {
            writeln!(out, "Security check unavailable: {}", error)?;
        }
        (None, None) => {}
    }
    Ok(())
}
