//! Configuration management with YAML support

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::render::OutputFormat;
use crate::scan::ScanOptions;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root holding one directory per project
    #[serde(default = "default_projects_dir")]
    pub projects_dir: String,

    /// Default output format (json, markdown, text)
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,

    #[serde(default = "default_max_tool_result_chars")]
    pub max_tool_result_chars: usize,

    /// Also list `agent-*.jsonl` subagent transcripts
    #[serde(default)]
    pub include_agent_transcripts: bool,
}

// Default value functions
fn default_projects_dir() -> String {
    "~/.claude/projects".to_string()
}

fn default_output() -> String {
    OutputFormat::default().as_str().to_string()
}

fn default_summary_max_chars() -> usize {
    ScanOptions::default().summary_max_chars
}

fn default_max_tool_result_chars() -> usize {
    ScanOptions::default().max_tool_result_chars
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
            output: default_output(),
            summary_max_chars: default_summary_max_chars(),
            max_tool_result_chars: default_max_tool_result_chars(),
            include_agent_transcripts: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    /// Searches in order:
    /// 1. Provided path
    /// 2. ./session-chronicle.yaml (current directory)
    /// 3. ~/.config/session-chronicle/config.yaml
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut search_paths = vec![];
        if let Some(path) = path {
            search_paths.push(shellexpand::tilde(path).to_string());
        }
        search_paths.push("session-chronicle.yaml".to_string());
        search_paths.push(shellexpand::tilde("~/.config/session-chronicle/config.yaml").to_string());

        for search_path in &search_paths {
            if std::path::Path::new(search_path).exists() {
                let content = std::fs::read_to_string(search_path)?;
                let config: Config = serde_yaml::from_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", search_path, e)))?;
                return Ok(config);
            }
        }

        // No config file found, use defaults
        Ok(Config::default())
    }

    /// Get the projects directory, expanding ~ to the home directory
    pub fn projects_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.projects_dir).to_string())
    }

    /// Configured output format; an unknown name is an error
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.output.parse()
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            summary_max_chars: self.summary_max_chars,
            max_tool_result_chars: self.max_tool_result_chars,
            include_agent_transcripts: self.include_agent_transcripts,
        }
    }
}
