use crate::config::ToolConfig;
use crate::error::ExecutionFailure;
use crate::model::RepositoryReference;
use crate::process::{ProcessOutput, ProcessRunner};
use std::path::Path;
use std::sync::Arc;

pub struct GitClient {
    runner: Arc<dyn ProcessRunner>,
    tool: ToolConfig,
}

impl GitClient {
    pub fn new(runner: Arc<dyn ProcessRunner>, tool: ToolConfig) -> Self {
        Self { runner, tool }
    }
}

impl super::VersionControl for GitClient {
    fn name(&self) -> &'static str {
        "git"
    }

    fn fetch(
        &self,
        reference: &RepositoryReference,
        destination: &Path,
    ) -> Result<ProcessOutput, ExecutionFailure> {
        let mut args = vec!["clone".to_string()];
        args.extend(self.tool.extra_args.iter().cloned());
        args.push(reference.as_str().to_string());
        args.push(destination.to_string_lossy().into_owned());

        self.runner.run(&self.tool.program, &args, None)
    }
}
