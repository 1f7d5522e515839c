//! Scripted [`ProcessRunner`] for unit tests.

use crate::error::ExecutionFailure;
use crate::process::{ProcessOutput, ProcessRunner};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

type Handler = dyn Fn(&Invocation, usize) -> Result<ProcessOutput, ExecutionFailure> + Send + Sync;

/// Records every invocation and answers with `handler(invocation, n)`,
/// where `n` counts earlier calls to the same program.
pub(crate) struct FakeRunner {
    handler: Box<Handler>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Invocation, usize) -> Result<ProcessOutput, ExecutionFailure> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.calls().iter().filter(|c| c.program == program).count()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<ProcessOutput, ExecutionFailure> {
        let invocation = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            working_dir: working_dir.map(Path::to_path_buf),
        };
        let previous = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.iter().filter(|c| c.program == program).count();
            calls.push(invocation.clone());
            n
        };
        (self.handler)(&invocation, previous)
    }
}

pub(crate) fn not_found(program: &str) -> ExecutionFailure {
    ExecutionFailure::new(program, io::Error::from(io::ErrorKind::NotFound))
}
