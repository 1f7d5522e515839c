pub mod acquire;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod scan;
pub mod tools;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use model::{
    DependencySet, FetchHistory, PipelineReport, RepositoryReference, VulnerabilityReport, Workspace,
};
pub use pipeline::{Pipeline, RunObserver};
pub use process::{ProcessOutput, ProcessRunner, SystemRunner};
