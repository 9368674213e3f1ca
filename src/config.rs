//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.courtconnect.toml` files.

use crate::analysis::ReadinessTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".courtconnect.toml";

/// Position key used when a player's position has no skill list.
pub const DEFAULT_POSITION: &str = "Default";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Readiness thresholds per target level.
    #[serde(default)]
    pub readiness: ReadinessTable,

    /// Roster scanning settings.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Skills coaches rate for each position.
    #[serde(default = "default_positions")]
    pub positions: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            model: ModelConfig::default(),
            readiness: ReadinessTable::default(),
            roster: RosterConfig::default(),
            report: ReportConfig::default(),
            positions: default_positions(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of concurrent AI requests in roster mode.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "readiness_report.md".to_string()
}

fn default_concurrency() -> usize {
    2
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of retries on transient failure.
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout() -> u64 {
    300
}

fn default_retries() -> usize {
    2
}

/// Roster directory scanning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Maximum profiles to load from a directory.
    #[serde(default = "default_max_profiles")]
    pub max_profiles: usize,

    /// Directory or file names to skip.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_profiles: default_max_profiles(),
            excludes: default_excludes(),
        }
    }
}

fn default_max_profiles() -> usize {
    500
}

fn default_excludes() -> Vec<String> {
    vec!["node_modules", "target", "archive"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the per-coach rating matrix.
    #[serde(default = "default_true")]
    pub include_matrix: bool,

    /// Include each coach's narrative feedback.
    #[serde(default = "default_true")]
    pub include_feedback: bool,

    /// Number of strongest / weakest skills to highlight.
    #[serde(default = "default_highlight_count")]
    pub highlight_count: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_matrix: true,
            include_feedback: true,
            highlight_count: default_highlight_count(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_highlight_count() -> usize {
    2
}

fn default_positions() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, [&str; 5]); 8] = [
        (
            "Setter",
            ["Setting Technique", "Footwork", "Decision Making", "Defense", "Serving"],
        ),
        (
            "Outside Hitter",
            ["Attacking", "Passing / Serve Receive", "Defense", "Blocking", "Serving"],
        ),
        (
            "Middle Blocker",
            ["Blocking", "Attacking", "Footwork", "Serving", "Court Vision"],
        ),
        (
            "Libero",
            [
                "Passing / Serve Receive",
                "Digging",
                "Court Awareness",
                "Setting (Out of System)",
                "Communication",
            ],
        ),
        (
            "Defensive Specialist",
            [
                "Passing / Serve Receive",
                "Digging",
                "Court Awareness",
                "Setting (Out of System)",
                "Communication",
            ],
        ),
        (
            "Opposite",
            ["Attacking", "Blocking", "Defense", "Serving", "Backup Setting"],
        ),
        (
            "Right Side Hitter",
            ["Attacking", "Blocking", "Defense", "Serving", "Backup Setting"],
        ),
        (
            DEFAULT_POSITION,
            ["Overall Technique", "Athleticism", "Court Awareness", "Hustle", "Teamwork"],
        ),
    ];

    table
        .into_iter()
        .map(|(position, skills)| {
            (
                position.to_string(),
                skills.into_iter().map(String::from).collect(),
            )
        })
        .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check settings that serde cannot enforce.
    pub fn validate(&self) -> Result<()> {
        self.readiness.validate()?;

        if self.general.concurrency == 0 {
            anyhow::bail!("general.concurrency must be at least 1");
        }

        Ok(())
    }

    /// Skills coaches rate for a position, falling back to the default list.
    pub fn skills_for_position(&self, position: &str) -> &[String] {
        let position = position.trim();

        self.positions
            .get(position)
            .or_else(|| {
                self.positions
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(position))
                    .map(|(_, skills)| skills)
            })
            .or_else(|| self.positions.get(DEFAULT_POSITION))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
