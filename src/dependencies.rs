//! Dependency-set derivation from the extractor's declaration file.

use crate::error::ExtractionFailure;
use crate::model::{DependencySet, Workspace};
use crate::tools::DependencyExtractor;
use std::fs::File;
use std::io::{self, BufReader};
use tracing::{debug, info, warn};

/// Result of a successful extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub dependencies: DependencySet,
    /// Standard output of the extraction tool.
    pub tool_output: String,
}

pub struct DependencySetExtractor {
    extractor: Box<dyn DependencyExtractor>,
    declaration_file: String,
}

impl DependencySetExtractor {
    pub fn new(extractor: Box<dyn DependencyExtractor>, declaration_file: impl Into<String>) -> Self {
        Self {
            extractor,
            declaration_file: declaration_file.into(),
        }
    }

    pub fn declaration_file(&self) -> &str {
        &self.declaration_file
    }

    /// Runs the extraction tool over `workspace` and loads the declaration
    /// file it wrote.
    ///
    /// # Errors
    ///
    /// - [`ExtractionFailure::ToolUnavailable`] if the tool cannot start.
    /// - [`ExtractionFailure::ToolFailed`] on a non-zero exit, carrying stderr.
    /// - [`ExtractionFailure::MissingDeclarationFile`] if the tool reported
    ///   success but wrote nothing.
    pub fn extract(&self, workspace: &Workspace) -> Result<Extraction, ExtractionFailure> {
        info!(
            tool = self.extractor.name(),
            path = %workspace.root().display(),
            "Extracting dependencies"
        );

        let output = self.extractor.extract_dependencies(workspace.root())?;
        if !output.success() {
            warn!(exit_code = ?output.exit_code, "Dependency extraction failed");
            return Err(ExtractionFailure::ToolFailed {
                exit_code: output.exit_code,
                diagnostics: output.stderr.trim().to_string(),
            });
        }

        let path = workspace.join(&self.declaration_file);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ExtractionFailure::MissingDeclarationFile { path });
            }
            Err(source) => return Err(ExtractionFailure::Read { path, source }),
        };

        let dependencies = DependencySet::from_reader(BufReader::new(file))
            .map_err(|source| ExtractionFailure::Read {
                path: path.clone(),
                source,
            })?;

        debug!(count = dependencies.len(), path = %path.display(), "Declaration file loaded");

        Ok(Extraction {
            dependencies,
            tool_output: output.stdout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolConfig;
    use crate::process::ProcessOutput;
    use crate::test_support::{not_found, FakeRunner};
    use crate::tools::Pipreqs;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn extractor(runner: Arc<FakeRunner>) -> DependencySetExtractor {
        DependencySetExtractor::new(
            Box::new(Pipreqs::new(runner, ToolConfig::new("pipreqs"))),
            "requirements.txt",
        )
    }

    fn write_requirements(call_args: &[String], content: &str) {
        let dir = PathBuf::from(&call_args[0]);
        fs::write(dir.join("requirements.txt"), content).unwrap();
    }

    #[test]
    fn test_extracts_deduplicated_set() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|call, _| {
            write_requirements(&call.args, "flask==2.0\n  \nrequests\nflask==2.0\n");
            Ok(ProcessOutput::exited(
                0,
                "INFO: Successfully saved requirements file\n",
                "",
            ))
        });

        let extraction = extractor(runner.clone())
            .extract(&Workspace::new(dir.path()))
            .unwrap();

        assert_eq!(extraction.dependencies.len(), 2);
        assert!(extraction.dependencies.contains("flask==2.0"));
        assert!(extraction.dependencies.contains("requests"));
        assert!(extraction.tool_output.contains("Successfully saved"));

        let call = &runner.calls()[0];
        assert_eq!(call.program, "pipreqs");
        assert_eq!(
            call.args,
            vec![dir.path().to_string_lossy().into_owned(), "--force".to_string()]
        );
    }

    #[test]
    fn test_rerun_overwrites_previous_declarations() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "old==1.0\n").unwrap();
        let runner = FakeRunner::new(|call, _| {
            write_requirements(&call.args, "numpy\n");
            Ok(ProcessOutput::exited(0, "", ""))
        });

        let extractor = extractor(runner);
        let first = extractor.extract(&Workspace::new(dir.path())).unwrap();
        let second = extractor.extract(&Workspace::new(dir.path())).unwrap();

        assert_eq!(first.dependencies, second.dependencies);
        assert!(!first.dependencies.contains("old==1.0"));
    }

    #[test]
    fn test_tool_failure_carries_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| {
            Ok(ProcessOutput::exited(
                1,
                "",
                "SyntaxError: invalid syntax in setup.py\n",
            ))
        });

        let err = extractor(runner)
            .extract(&Workspace::new(dir.path()))
            .unwrap_err();

        match err {
            ExtractionFailure::ToolFailed {
                exit_code,
                diagnostics,
            } => {
                assert_eq!(exit_code, Some(1));
                assert_eq!(diagnostics, "SyntaxError: invalid syntax in setup.py");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stale_file_ignored_when_tool_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "stale==0.1\n").unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ProcessOutput::exited(2, "", "boom")));

        let err = extractor(runner)
            .extract(&Workspace::new(dir.path()))
            .unwrap_err();
        assert!(matches!(err, ExtractionFailure::ToolFailed { .. }));
    }

    #[test]
    fn test_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Err(not_found("pipreqs")));

        let err = extractor(runner)
            .extract(&Workspace::new(dir.path()))
            .unwrap_err();
        assert!(matches!(err, ExtractionFailure::ToolUnavailable(_)));
    }

    #[test]
    fn test_missing_declaration_file_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(|_, _| Ok(ProcessOutput::exited(0, "", "")));

        let err = extractor(runner)
            .extract(&Workspace::new(dir.path()))
            .unwrap_err();

        match err {
            ExtractionFailure::MissingDeclarationFile { path } => {
                assert_eq!(path, Path::new(dir.path()).join("requirements.txt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
