use crate::config::ToolConfig;
use crate::error::ExecutionFailure;
use crate::process::{ProcessOutput, ProcessRunner};
use std::path::Path;
use std::sync::Arc;

/// `safety check`, which needs no account or API key, unlike `safety scan`.
pub struct SafetyCheck {
    runner: Arc<dyn ProcessRunner>,
    tool: ToolConfig,
}

impl SafetyCheck {
    pub fn new(runner: Arc<dyn ProcessRunner>, tool: ToolConfig) -> Self {
        Self { runner, tool }
    }
}

impl super::VulnerabilityChecker for SafetyCheck {
    fn name(&self) -> &'static str {
        "safety"
    }

    fn scan(
        &self,
        declaration_file: &str,
        working_dir: &Path,
    ) -> Result<ProcessOutput, ExecutionFailure> {
        let mut args = vec![
            "check".to_string(),
            "-r".to_string(),
            declaration_file.to_string(),
        ];
        args.extend(self.tool.extra_args.iter().cloned());

        self.runner.run(&self.tool.program, &args, Some(working_dir))
    }
}
