//! Synchronous execution of external tools.
//!
//! Every external collaborator (version control, dependency extraction,
//! vulnerability checking) goes through a [`ProcessRunner`], so tests can
//! substitute a scripted runner for the real one.

use crate::error::ExecutionFailure;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Captured result of one finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn exited(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external command to completion.
///
/// Implementations block until the process exits. No timeout is applied;
/// a hung tool blocks the caller indefinitely.
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args`, optionally inside `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionFailure`] only if the process could not be
    /// started. A non-zero exit status is a normal `Ok` result.
    fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<ProcessOutput, ExecutionFailure>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<ProcessOutput, ExecutionFailure> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        debug!(program, ?args, cwd = ?working_dir, "Spawning process");

        let output = cmd
            .output()
            .map_err(|e| ExecutionFailure::new(program, e))?;

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(program, exit_code = ?result.exit_code, "Process finished");
        Ok(result)
    }
}
