//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// CourtConnect - coach assessment aggregation for volleyball players
///
/// Aggregates coach skill ratings into per-skill averages, an overall
/// score and a readiness tier against the player's target level, and can
/// ask a local LLM for a personalised training plan.
///
/// Examples:
///   courtconnect --input players/jamie.json
///   courtconnect --input players/jamie.json --target-level d1 --format json
///   courtconnect --input players/ --output roster.md
///   courtconnect --input players/jamie.json --training-plan --model llama3.2:latest
///   courtconnect --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Player profile JSON file, or a directory of profiles
    #[arg(short, long, value_name = "PATH", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Evaluate against this level instead of the profile's target
    #[arg(short, long, value_name = "LEVEL")]
    pub target_level: Option<LevelArg>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .courtconnect.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ollama model used for training plans and footage analysis
    #[arg(short, long, env = "COURTCONNECT_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent AI requests in roster mode
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Generate an AI training plan from the coaches' feedback
    #[arg(long)]
    pub training_plan: bool,

    /// Ask the AI for an assessment of the player's highlight footage
    #[arg(long)]
    pub analyze_footage: bool,

    /// Exit with code 2 if any player's readiness is below this tier
    ///
    /// Values: needs-development, approaching, meeting, exceeding
    #[arg(long, value_name = "TIER")]
    pub fail_below: Option<TierArg>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .courtconnect.toml in the current directory
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Default output file name for this format.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "readiness_report.md",
            OutputFormat::Json => "readiness_report.json",
        }
    }
}

/// Target level for --target-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LevelArg {
    D1,
    D2,
    D3,
}

/// Readiness tier for --fail-below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum TierArg {
    NeedsDevelopment,
    Approaching,
    Meeting,
    Exceeding,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input path does not exist: {}", input.display()));
            }
        }

        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the config file's `general.verbose`; `--quiet`
    /// wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether any AI flow was requested.
    pub fn wants_ai(&self) -> bool {
        self.training_plan || self.analyze_footage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            target_level: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            model: None,
            ollama_url: None,
            temperature: None,
            timeout: None,
            concurrency: None,
            training_plan: false,
            analyze_footage: false,
            fail_below: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "courtconnect",
            "--input",
            "player.json",
            "--target-level",
            "d1",
            "--fail-below",
            "meeting",
            "--format",
            "json",
            "--training-plan",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("player.json")));
        assert_eq!(args.target_level, Some(LevelArg::D1));
        assert_eq!(args.fail_below, Some(TierArg::Meeting));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.training_plan);
        assert!(args.wants_ai());
    }

    #[test]
    fn test_input_required_without_init_config() {
        assert!(Args::try_parse_from(["courtconnect"]).is_err());
        assert!(Args::try_parse_from(["courtconnect", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_ranges() {
        let mut args = make_args();
        args.temperature = Some(1.5);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
