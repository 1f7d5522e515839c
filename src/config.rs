//! Configuration file handling.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/repoaudit/config.toml`
//! - macOS: `~/Library/Application Support/repoaudit/config.toml`
//! - Windows: `%APPDATA%\repoaudit\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! workspace_dir = "./ProjectsFromGithub"
//! declaration_file = "requirements.txt"
//! fail_on_findings = true
//! default_format = "json"
//! show_progress = false
//!
//! [tools.git]
//! program = "git"
//! extra_args = ["--depth", "1"]
//!
//! [tools.checker]
//! program = "/opt/venv/bin/safety"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration.
///
/// Every field has a default, so a partial file (or none at all) is valid.
///
/// # Example
///
/// ```no_run
/// use repoaudit::Config;
///
/// let config = Config::load().unwrap();
/// println!("Workspace: {}", config.workspace_dir.display());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the repository is cloned. Removed and recreated on every run.
    ///
    /// Default: `./ProjectsFromGithub`
    pub workspace_dir: PathBuf,

    /// Name of the declaration file the extractor writes into the workspace.
    ///
    /// Default: `requirements.txt`
    pub declaration_file: String,

    /// Exit non-zero when the checker reports vulnerabilities or cannot run.
    ///
    /// Default: false (findings are display-only)
    pub fail_on_findings: bool,

    /// Output format: "text" or "json".
    ///
    /// Default: "text"
    pub default_format: String,

    /// Show spinners while external tools run (text output only).
    ///
    /// Default: true
    pub show_progress: bool,

    pub tools: ToolsConfig,
}

/// Programs used for each external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub git: ToolConfig,
    pub extractor: ToolConfig,
    pub checker: ToolConfig,
}

/// An executable plus arguments appended to every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub program: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl ToolConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: ToolConfig::new("git"),
            extractor: ToolConfig::new("pipreqs"),
            checker: ToolConfig::new("safety"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("./ProjectsFromGithub"),
            declaration_file: "requirements.txt".to_string(),
            fail_on_findings: false,
            default_format: "text".to_string(),
            show_progress: true,
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("repoaudit")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.workspace_dir, PathBuf::from("./ProjectsFromGithub"));
        assert_eq!(config.declaration_file, "requirements.txt");
        assert_eq!(config.default_format, "text");
        assert!(!config.fail_on_findings);
        assert!(config.show_progress);
        assert_eq!(config.tools.git.program, "git");
        assert_eq!(config.tools.extractor.program, "pipreqs");
        assert_eq!(config.tools.checker.program, "safety");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.tools.checker.program, "safety");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
fail_on_findings = true
workspace_dir = "/tmp/audit-ws"

[tools.git]
program = "git"
extra_args = ["--depth", "1"]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.fail_on_findings);
        assert_eq!(config.workspace_dir, PathBuf::from("/tmp/audit-ws"));
        assert_eq!(config.tools.git.extra_args, vec!["--depth", "1"]);
        assert_eq!(config.tools.extractor.program, "pipreqs");
        assert_eq!(config.declaration_file, "requirements.txt");
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "fail_on_findings = \"sometimes\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
