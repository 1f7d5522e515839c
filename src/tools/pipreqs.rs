use crate::config::ToolConfig;
use crate::error::ExecutionFailure;
use crate::process::{ProcessOutput, ProcessRunner};
use std::path::Path;
use std::sync::Arc;

/// Infers imported Python libraries and writes `requirements.txt`.
pub struct Pipreqs {
    runner: Arc<dyn ProcessRunner>,
    tool: ToolConfig,
}

impl Pipreqs {
    pub fn new(runner: Arc<dyn ProcessRunner>, tool: ToolConfig) -> Self {
        Self { runner, tool }
    }
}

impl super::DependencyExtractor for Pipreqs {
    fn name(&self) -> &'static str {
        "pipreqs"
    }

    fn extract_dependencies(&self, project_dir: &Path) -> Result<ProcessOutput, ExecutionFailure> {
        let mut args = vec![project_dir.to_string_lossy().into_owned(), "--force".to_string()];
        args.extend(self.tool.extra_args.iter().cloned());

        self.runner.run(&self.tool.program, &args, None)
    }
}
