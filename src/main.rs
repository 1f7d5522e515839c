use anyhow::{Context, Result};
use clap::Parser;
use repoaudit::{
    config::Config,
    model::RepositoryReference,
    output::{write_report, OutputFormat, TextReporter},
    pipeline::{exit_code, exit_codes, Pipeline},
    process::SystemRunner,
};
use std::io::{self, Write};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repoaudit")]
#[command(
    author,
    version,
    about = "Clone a repository, list the libraries it uses, and check them for known vulnerabilities"
)]
struct Cli {
    /// URL of the repository to analyze
    #[arg(value_parser = RepositoryReference::parse)]
    url: RepositoryReference,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        Config::default()
    });
    debug!(?config, "Configuration loaded");

    let format = OutputFormat::from_str(&config.default_format).map_err(|e| anyhow::anyhow!(e))?;
    let show_progress = config.show_progress && format == OutputFormat::Text;

    let pipeline = Pipeline::from_config(&config, Arc::new(SystemRunner)).with_progress(show_progress);

    let stdout = io::stdout();
    let report = match format {
        OutputFormat::Text => {
            let mut reporter = TextReporter::new(stdout.lock());
            let report = pipeline.run_observed(&cli.url, &mut reporter);
            reporter.finish().context("Failed to write report")?;
            report
        }
        OutputFormat::Json => {
            let report = pipeline.run(&cli.url);
            let mut out = stdout.lock();
            write_report(&mut out, &report, format).context("Failed to write report")?;
            out.flush()?;
            report
        }
    };

    Ok(exit_code(&report, config.fail_on_findings))
}
