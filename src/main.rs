//! CourtConnect - coach assessment aggregation for volleyball players
//!
//! A CLI tool that aggregates coach skill ratings from player profile
//! documents into per-skill averages, an overall score and a readiness
//! tier, and can ask a local Ollama model for a training plan.
//!
//! Exit codes:
//!   0 - Success (or no --fail-below set)
//!   1 - Runtime error (unreadable profile, bad config, AI failure, etc.)
//!   2 - A player's readiness is below the --fail-below tier

mod analysis;
mod cli;
mod coach;
mod config;
mod models;
mod profile;
mod report;
mod roster;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, LevelArg, OutputFormat, TierArg};
use coach::{CoachClient, CoachConfig, CoachError};
use config::Config;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use models::{
    PlayerProfile, PlayerReport, ReadinessTier, ReportMetadata, RosterEntry, TargetLevel,
    TrainingPlan,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is loaded first so `general.verbose` can set the log level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(args.log_level(config.general.verbose));

    info!("CourtConnect v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(args, config).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .courtconnect.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to customize readiness bands, position skills, model and more.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the requested workflow. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    config.validate().context("Invalid configuration")?;

    let input = args
        .input
        .clone()
        .context("--input is required unless --init-config is given")?;

    let tiers = if input.is_dir() {
        run_roster(&args, &config, &input).await?
    } else {
        vec![run_player(&args, &config, &input).await?]
    };

    if let Some(threshold) = args.fail_below {
        let threshold_tier = tier_arg_to_tier(threshold);
        if tiers.iter().any(|tier| *tier < threshold_tier) {
            eprintln!(
                "\n⛔ Readiness below {} found. Failing (exit code 2).",
                threshold_tier
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Score one profile and write its report.
async fn run_player(args: &Args, config: &Config, path: &Path) -> Result<ReadinessTier> {
    println!("📥 Loading profile: {}", path.display());
    let profile = profile::load_profile(path)?;

    let target = args
        .target_level
        .map(level_arg_to_target)
        .unwrap_or(profile.target_level);
    let mut report = build_report(&profile, &path.display().to_string(), target, config);

    if args.wants_ai() {
        let client = coach_client(config)?;
        report.metadata.model_used = Some(client.model_name().to_string());

        println!("🤖 Model: {} ({})", config.model.name, config.model.ollama_url);

        if args.training_plan {
            let progress = spinner("Generating training plan...", args.quiet);
            let result = request_training_plan(&client, &profile).await;
            finish_spinner(progress);

            match result.context("Training plan generation failed")? {
                Some(plan) => report.training_plan = Some(plan),
                None => warn!("{} has no coach feedback yet; no training plan", profile.name),
            }
        }

        if args.analyze_footage {
            match profile.highlight_video_url.as_deref() {
                Some(url) => {
                    let progress = spinner("Analyzing highlight footage...", args.quiet);
                    let result = client
                        .analyze_footage(url, target, &profile.preferred_schools)
                        .await;
                    finish_spinner(progress);

                    report.footage_analysis =
                        Some(result.context("Footage analysis failed")?);
                }
                None => warn!(
                    "{} has no highlight video; skipping footage analysis",
                    profile.name
                ),
            }
        }
    }

    let output_path = output_path(args, config);
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };
    write_output(&output_path, &output)?;

    if !args.quiet {
        print_player_summary(&report);
    }
    println!("\n✅ Report saved to: {}", output_path.display());

    Ok(report.readiness.tier)
}

/// Score every profile in a directory and write the roster report.
async fn run_roster(args: &Args, config: &Config, dir: &Path) -> Result<Vec<ReadinessTier>> {
    println!("📂 Scanning roster: {}", dir.display());

    let scanner = roster::RosterScanner::new(
        dir.to_path_buf(),
        roster::ScanConfig::from(&config.roster),
    );
    let members = scanner.load_roster()?;

    if members.is_empty() {
        warn!("No player profiles found in {}", dir.display());
    }
    info!("Loaded {} profiles", members.len());

    let target_override = args.target_level.map(level_arg_to_target);
    let mut entries: Vec<RosterEntry> = members
        .iter()
        .map(|member| {
            let target = target_override.unwrap_or(member.profile.target_level);
            let report = build_report(
                &member.profile,
                &member.path.display().to_string(),
                target,
                config,
            );
            RosterEntry::from(&report)
        })
        .collect();

    if args.analyze_footage {
        warn!("Footage analysis runs for a single profile only; ignoring in roster mode");
    }

    if args.training_plan && !members.is_empty() {
        let client = coach_client(config)?;
        println!(
            "🤖 Generating training plans with {} ({} at a time)",
            client.model_name(),
            config.general.concurrency
        );

        let progress = spinner("Generating training plans...", args.quiet);
        let client = &client;
        let plans: Vec<(usize, Option<TrainingPlan>)> = stream::iter(members.iter().enumerate())
            .map(|(index, member)| async move {
                match request_training_plan(client, &member.profile).await {
                    Ok(plan) => (index, plan),
                    Err(e) => {
                        warn!("Training plan for {} failed: {}", member.profile.name, e);
                        (index, None)
                    }
                }
            })
            .buffer_unordered(config.general.concurrency)
            .collect()
            .await;
        finish_spinner(progress);

        for (index, plan) in plans {
            entries[index].training_plan = plan;
        }
    }

    let output_path = output_path(args, config);
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&entries)?,
        OutputFormat::Markdown => report::generate_roster_report(&entries, Utc::now()),
    };
    write_output(&output_path, &output)?;

    if !args.quiet {
        print_roster_summary(&entries);
    }
    println!("\n✅ Roster report saved to: {}", output_path.display());

    Ok(entries.iter().map(|entry| entry.tier).collect())
}

/// Aggregate a profile's assessments into a report.
fn build_report(
    profile: &PlayerProfile,
    source: &str,
    target: TargetLevel,
    config: &Config,
) -> PlayerReport {
    let skills = analysis::compute_average_skills(&profile.assessments);
    let overall_score = analysis::compute_overall_score(&skills);
    let readiness = analysis::classify_readiness(overall_score, target, &config.readiness);
    let unrated_skills =
        analysis::unrated_skills(config.skills_for_position(&profile.position), &skills);
    let skill_matrix = analysis::skill_matrix(&profile.assessments);
    let matrix_coaches = profile
        .assessments
        .iter()
        .map(|a| a.coach_id.clone())
        .collect();
    let assessments = analysis::sort_by_recency(&profile.assessments);

    debug!(
        "{}: {} skills, overall {:.2}, {}",
        profile.name,
        skills.len(),
        overall_score,
        readiness.tier
    );

    PlayerReport {
        metadata: ReportMetadata {
            source: source.to_string(),
            generated_at: Utc::now(),
            model_used: None,
            assessments: profile.assessments.len(),
            malformed_ratings: analysis::count_malformed(&profile.assessments),
        },
        player_id: profile.id.clone(),
        player_name: profile.name.clone(),
        position: profile.position.clone(),
        target_level: target,
        overall_score,
        readiness,
        skills,
        skill_matrix,
        matrix_coaches,
        unrated_skills,
        assessments,
        training_plan: profile.training_plan.clone(),
        footage_analysis: profile.ai_analysis.clone(),
    }
}

/// Request a plan from the combined feedback. `Ok(None)` when there is none.
async fn request_training_plan(
    client: &CoachClient,
    profile: &PlayerProfile,
) -> Result<Option<TrainingPlan>, CoachError> {
    let feedback = analysis::combined_feedback(&profile.assessments);

    match client.generate_training_plan(&feedback, &profile.position).await {
        Ok(plan) => Ok(Some(plan)),
        Err(CoachError::NoFeedback) => Ok(None),
        Err(e) => Err(e),
    }
}

fn coach_client(config: &Config) -> Result<CoachClient> {
    CoachClient::new(CoachConfig::from(&config.model)).context("Failed to create AI client")
}

fn spinner(message: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
    {
        progress.set_style(style);
    }
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    Some(progress)
}

fn finish_spinner(progress: Option<ProgressBar>) {
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
}

fn output_path(args: &Args, config: &Config) -> PathBuf {
    if let Some(ref output) = args.output {
        return output.clone();
    }

    match args.format {
        OutputFormat::Markdown => PathBuf::from(&config.general.output),
        OutputFormat::Json => PathBuf::from(args.format.default_file_name()),
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

fn print_player_summary(report: &PlayerReport) {
    let readiness = &report.readiness;

    println!("\n📊 Readiness Summary: {}", report.player_name);
    println!("   Assessments: {}", report.metadata.assessments);
    println!("   Skills rated: {}", report.skills.len());
    println!("   Overall score: {:.1} / 10", report.overall_score);
    println!(
        "   {} {} for {} (currently {})",
        readiness.tier.emoji(),
        readiness.label,
        readiness.target_level,
        readiness.level_label
    );
    if !report.unrated_skills.is_empty() {
        println!("   Not yet rated: {}", report.unrated_skills.join(", "));
    }
}

fn print_roster_summary(entries: &[RosterEntry]) {
    let count = |tier: ReadinessTier| entries.iter().filter(|e| e.tier == tier).count();

    println!("\n📊 Roster Summary: {} players", entries.len());
    println!(
        "   🔵 Exceeding: {} | 🟢 Meeting: {} | 🟠 Approaching: {} | 🔴 Needs Development: {}",
        count(ReadinessTier::ExceedingTarget),
        count(ReadinessTier::MeetingTarget),
        count(ReadinessTier::ApproachingTarget),
        count(ReadinessTier::NeedsDevelopment)
    );
}

/// Convert LevelArg to TargetLevel.
fn level_arg_to_target(level: LevelArg) -> TargetLevel {
    match level {
        LevelArg::D1 => TargetLevel::D1,
        LevelArg::D2 => TargetLevel::D2,
        LevelArg::D3 => TargetLevel::D3,
    }
}

/// Convert TierArg to ReadinessTier for comparison.
fn tier_arg_to_tier(tier: TierArg) -> ReadinessTier {
    match tier {
        TierArg::NeedsDevelopment => ReadinessTier::NeedsDevelopment,
        TierArg::Approaching => ReadinessTier::ApproachingTarget,
        TierArg::Meeting => ReadinessTier::MeetingTarget,
        TierArg::Exceeding => ReadinessTier::ExceedingTarget,
    }
}

/// Where the active configuration came from.
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Builtin,
    Unreadable(anyhow::Error),
}

impl ConfigSource {
    /// Report the source once logging is up.
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", config::CONFIG_FILE),
            ConfigSource::Builtin => debug!("No config file found, using defaults"),
            ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Builtin)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(e))),
    }
}
