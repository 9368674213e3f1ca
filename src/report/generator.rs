//! Markdown and JSON report generation.
//!
//! This module renders readiness reports for a single player and
//! summary tables for a whole roster.

use crate::analysis::{strongest_skills, weakest_skills};
use crate::config::ReportConfig;
use crate::models::{
    AggregateSkillScore, Assessment, FootageAnalysis, PlayerReport, Readiness, ReportMetadata,
    RosterEntry, SkillRow, TrainingPlan,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generate a complete Markdown report for one player.
pub fn generate_markdown_report(report: &PlayerReport, config: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!(
        "# CourtConnect Readiness Report: {}\n\n",
        report.player_name
    ));

    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_readiness_section(&report.readiness));
    output.push_str(&generate_skills_section(&report.skills, config.highlight_count));

    if config.include_matrix {
        output.push_str(&generate_matrix_section(
            &report.skill_matrix,
            &report.matrix_coaches,
        ));
    }

    output.push_str(&generate_unrated_section(&report.unrated_skills));

    if config.include_feedback {
        output.push_str(&generate_feedback_section(&report.assessments));
    }

    if let Some(ref plan) = report.training_plan {
        output.push_str(&generate_training_plan_section(plan));
    }

    if let Some(ref analysis) = report.footage_analysis {
        output.push_str(&generate_footage_section(analysis));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &PlayerReport) -> String {
    let metadata: &ReportMetadata = &report.metadata;
    let mut section = String::new();

    section.push_str("## Player\n\n");
    section.push_str(&format!("- **Name:** {}\n", report.player_name));
    if !report.position.is_empty() {
        section.push_str(&format!("- **Position:** {}\n", report.position));
    }
    section.push_str(&format!("- **Target Level:** {}\n", report.target_level));
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Assessments:** {}\n", metadata.assessments));
    if metadata.malformed_ratings > 0 {
        section.push_str(&format!(
            "- **Skipped Ratings:** {} (malformed)\n",
            metadata.malformed_ratings
        ));
    }
    if let Some(ref model) = metadata.model_used {
        section.push_str(&format!("- **Model Used:** `{}`\n", model));
    }
    section.push('\n');

    section
}

/// Generate the overall readiness section.
fn generate_readiness_section(readiness: &Readiness) -> String {
    let mut section = String::new();

    section.push_str("## Overall Readiness\n\n");
    section.push_str(&format!(
        "**{} {}** vs. {} target\n\n",
        readiness.tier.emoji(),
        readiness.label,
        readiness.target_level
    ));
    section.push_str("| Overall Score | Current Level | Gap to Target |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| **{:.1}** / 10 | {} | {} |\n\n",
        readiness.score,
        readiness.level_label,
        format_gap(readiness)
    ));

    section
}

fn format_gap(readiness: &Readiness) -> String {
    if readiness.gap >= 0.0 {
        format!("+{:.1} above {}", readiness.gap, readiness.target_level)
    } else {
        format!("{:.1} below {}", readiness.gap, readiness.target_level)
    }
}

/// Generate the average skill ratings section.
fn generate_skills_section(skills: &[AggregateSkillScore], highlight_count: usize) -> String {
    let mut section = String::new();

    section.push_str("## Average Skill Ratings\n\n");

    if skills.is_empty() {
        section.push_str("Coaches' feedback pending.\n\n");
        return section;
    }

    section.push_str("| Skill | Average | Ratings | Band |\n");
    section.push_str("|:---|:---:|:---:|:---|\n");
    for score in skills {
        let band = score.band();
        section.push_str(&format!(
            "| {} | {:.1} | {} | {} {} |\n",
            score.skill,
            score.average,
            score.ratings,
            band.emoji(),
            band
        ));
    }
    section.push('\n');

    if highlight_count > 0 && skills.len() > 1 {
        let strongest = strongest_skills(skills, highlight_count);
        let weakest = weakest_skills(skills, highlight_count);

        section.push_str(&format!(
            "**Strongest:** {}\n\n",
            join_skill_names(&strongest)
        ));
        section.push_str(&format!(
            "**Focus Areas:** {}\n\n",
            join_skill_names(&weakest)
        ));
    }

    section
}

fn join_skill_names(scores: &[&AggregateSkillScore]) -> String {
    scores
        .iter()
        .map(|s| format!("{} ({:.1})", s.skill, s.average))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate the per-coach rating matrix, one column per assessment.
fn generate_matrix_section(matrix: &[SkillRow], coaches: &[String]) -> String {
    let columns = matrix.first().map(|row| row.ratings.len()).unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Coaches' Evaluations\n\n");

    let mut header = String::from("| Skill |");
    let mut divider = String::from("|:---|");
    for column in 0..columns {
        match coaches.get(column) {
            Some(coach) => header.push_str(&format!(" {} |", coach)),
            None => header.push_str(&format!(" Coach {} |", column + 1)),
        }
        divider.push_str(":---:|");
    }
    section.push_str(&header);
    section.push('\n');
    section.push_str(&divider);
    section.push('\n');

    for row in matrix {
        section.push_str(&format!("| {} |", row.skill));
        for rating in &row.ratings {
            match rating {
                Some(value) => section.push_str(&format!(" {} |", value)),
                None => section.push_str(" - |"),
            }
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

/// Generate the list of position skills nobody has rated.
fn generate_unrated_section(unrated: &[String]) -> String {
    if unrated.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Not Yet Rated\n\n");
    for skill in unrated {
        section.push_str(&format!("- {}\n", skill));
    }
    section.push('\n');

    section
}

/// Generate the coach feedback section.
fn generate_feedback_section(assessments: &[Assessment]) -> String {
    let mut section = String::new();

    section.push_str("## Coach Feedback\n\n");

    if assessments.is_empty() {
        section.push_str("No coach feedback yet. Check back later!\n\n");
        return section;
    }

    for (index, assessment) in assessments.iter().enumerate() {
        section.push_str(&generate_assessment_block(index + 1, assessment));
    }

    section
}

/// Generate a block for a single assessment.
fn generate_assessment_block(number: usize, assessment: &Assessment) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {}. {}\n\n", number, assessment.coach_id));

    let when = assessment
        .created_at()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| assessment.timestamp.clone());
    if !when.is_empty() {
        block.push_str(&format!("*{}*\n\n", when));
    }

    if !assessment.feedback_text.trim().is_empty() {
        block.push_str(&format!("{}\n\n", assessment.feedback_text.trim()));
    }

    for (skill, value) in assessment.skill_ratings.iter() {
        match value.as_valid() {
            Some(rating) => block.push_str(&format!("- **{}:** {}/10\n", skill, rating)),
            None => block.push_str(&format!("- **{}:** (unreadable rating)\n", skill)),
        }
    }
    block.push('\n');

    block
}

/// Generate the training plan section.
fn generate_training_plan_section(plan: &TrainingPlan) -> String {
    let mut section = String::new();

    section.push_str("## Training Plan\n\n");
    section.push_str("### Actionable Steps\n\n");
    section.push_str(&generate_plan_steps(plan));

    if !plan.suggested_videos.is_empty() {
        section.push_str("### Suggested Videos\n\n");
        for video in &plan.suggested_videos {
            section.push_str(&format!("- [{}]({})\n", video.title, video.url));
        }
        section.push('\n');
    }

    section
}

fn generate_plan_steps(plan: &TrainingPlan) -> String {
    let mut steps = String::new();
    for (index, step) in plan.actionable_steps.iter().enumerate() {
        steps.push_str(&format!(
            "{}. **{}** - {}\n",
            index + 1,
            step.title,
            step.description
        ));
    }
    steps.push('\n');
    steps
}

/// Generate the footage analysis section.
fn generate_footage_section(analysis: &FootageAnalysis) -> String {
    let mut section = String::new();

    section.push_str("## Footage Analysis\n\n");
    section.push_str(&format!("**Strengths:** {}\n\n", analysis.strengths));
    section.push_str(&format!("**Areas to Improve:** {}\n\n", analysis.weaknesses));
    section.push_str(&format!(
        "**Overall Assessment:** {}\n\n",
        analysis.overall_assessment
    ));

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Averages are recomputed from all coach assessments on every run. ");
    footer.push_str("The overall score weighs every skill equally.*\n");

    footer
}

/// Generate a Markdown roster summary, highest score first.
pub fn generate_roster_report(entries: &[RosterEntry], generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    output.push_str("# CourtConnect Roster Readiness\n\n");
    output.push_str(&format!(
        "Generated {} for {} players.\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        entries.len()
    ));

    if entries.is_empty() {
        output.push_str("No player profiles found.\n");
        return output;
    }

    output.push_str("| Player | Position | Target | Score | Readiness | Assessments |\n");
    output.push_str("|:---|:---|:---:|:---:|:---|:---:|\n");

    for entry in sort_roster(entries) {
        output.push_str(&format!(
            "| {} | {} | {} | {:.1} | {} {} | {} |\n",
            entry.player_name,
            entry.position,
            entry.target_level,
            entry.overall_score,
            entry.tier.emoji(),
            entry.tier,
            entry.assessments
        ));
    }
    output.push('\n');

    let planned: Vec<&RosterEntry> = entries
        .iter()
        .filter(|entry| entry.training_plan.is_some())
        .collect();
    if !planned.is_empty() {
        output.push_str("## Training Plans\n\n");
        for entry in planned {
            if let Some(ref plan) = entry.training_plan {
                output.push_str(&format!("### {}\n\n", entry.player_name));
                output.push_str(&generate_plan_steps(plan));
            }
        }
    }

    output
}

/// Roster entries ordered by overall score, highest first.
pub fn sort_roster(entries: &[RosterEntry]) -> Vec<&RosterEntry> {
    let mut sorted: Vec<&RosterEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted
}

/// Generate a JSON report.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReadinessTier, TargetLevel, TrainingStep, VideoSuggestion};

    fn create_test_report() -> PlayerReport {
        let assessment = Assessment {
            coach_id: "coach-1".to_string(),
            feedback_text: "Fantastic hands.".to_string(),
            skill_ratings: [("Setting Technique", 8), ("Footwork", 6)].into_iter().collect(),
            timestamp: "2024-07-15T10:00:00Z".to_string(),
        };

        PlayerReport {
            metadata: ReportMetadata {
                source: "players/jamie.json".to_string(),
                generated_at: Utc::now(),
                model_used: None,
                assessments: 1,
                malformed_ratings: 0,
            },
            player_id: "mock-player-2".to_string(),
            player_name: "Jamie Tree".to_string(),
            position: "Setter".to_string(),
            target_level: TargetLevel::D3,
            overall_score: 7.0,
            readiness: Readiness {
                tier: ReadinessTier::ExceedingTarget,
                label: "Exceeding Target".to_string(),
                target_level: TargetLevel::D3,
                score: 7.0,
                gap: 1.5,
                level_label: "D2 Ready".to_string(),
            },
            skills: vec![
                AggregateSkillScore {
                    skill: "Setting Technique".to_string(),
                    average: 8.0,
                    ratings: 1,
                },
                AggregateSkillScore {
                    skill: "Footwork".to_string(),
                    average: 6.0,
                    ratings: 1,
                },
            ],
            skill_matrix: vec![
                SkillRow {
                    skill: "Setting Technique".to_string(),
                    ratings: vec![Some(8)],
                },
                SkillRow {
                    skill: "Footwork".to_string(),
                    ratings: vec![Some(6)],
                },
            ],
            matrix_coaches: vec!["coach-1".to_string()],
            unrated_skills: vec!["Serving".to_string()],
            assessments: vec![assessment],
            training_plan: Some(TrainingPlan {
                actionable_steps: vec![TrainingStep {
                    title: "Improve Footwork Consistency".to_string(),
                    description: "Out-of-system footwork drills.".to_string(),
                }],
                suggested_videos: vec![VideoSuggestion {
                    title: "Setter Footwork Patterns".to_string(),
                    url: "https://youtu.be/EXsMFJa-AEM".to_string(),
                }],
            }),
            footage_analysis: None,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, &ReportConfig::default());

        assert!(markdown.contains("# CourtConnect Readiness Report: Jamie Tree"));
        assert!(markdown.contains("## Overall Readiness"));
        assert!(markdown.contains("Exceeding Target"));
        assert!(markdown.contains("+1.5 above D3"));
        assert!(markdown.contains("| Setting Technique | 8.0 | 1 | 🔵 Solid |"));
        assert!(markdown.contains("**Strongest:** Setting Technique (8.0), Footwork (6.0)"));
        assert!(markdown.contains("| Skill | coach-1 |"));
        assert!(markdown.contains("| Footwork | 6 |"));
        assert!(markdown.contains("### 1. coach-1"));
        assert!(markdown.contains("## Not Yet Rated\n\n- Serving"));
        assert!(markdown.contains("- **Footwork:** 6/10"));
        assert!(markdown.contains("[Setter Footwork Patterns](https://youtu.be/EXsMFJa-AEM)"));
        assert!(!markdown.contains("## Footage Analysis"));
    }

    #[test]
    fn test_optional_sections_can_be_disabled() {
        let report = create_test_report();
        let config = ReportConfig {
            include_matrix: false,
            include_feedback: false,
            highlight_count: 0,
        };
        let markdown = generate_markdown_report(&report, &config);

        assert!(!markdown.contains("## Coaches' Evaluations"));
        assert!(!markdown.contains("## Coach Feedback"));
        assert!(!markdown.contains("**Strongest:**"));
    }

    #[test]
    fn test_pending_feedback() {
        let mut report = create_test_report();
        report.skills.clear();
        report.skill_matrix.clear();
        report.assessments.clear();

        let markdown = generate_markdown_report(&report, &ReportConfig::default());
        assert!(markdown.contains("Coaches' feedback pending."));
        assert!(markdown.contains("No coach feedback yet."));
        assert!(!markdown.contains("## Coaches' Evaluations"));
    }

    #[test]
    fn test_gap_below_target() {
        let mut readiness = create_test_report().readiness;
        readiness.gap = -0.75;
        readiness.target_level = TargetLevel::D2;
        assert_eq!(format_gap(&readiness), "-0.8 below D2");
    }

    #[test]
    fn test_roster_report_sorted_by_score() {
        let entries = vec![
            RosterEntry {
                player_name: "Avery".to_string(),
                position: "Libero".to_string(),
                target_level: TargetLevel::D2,
                overall_score: 6.2,
                tier: ReadinessTier::ApproachingTarget,
                assessments: 2,
                training_plan: None,
            },
            RosterEntry {
                player_name: "Blake".to_string(),
                position: "Setter".to_string(),
                target_level: TargetLevel::D1,
                overall_score: 8.9,
                tier: ReadinessTier::MeetingTarget,
                assessments: 3,
                training_plan: Some(TrainingPlan {
                    actionable_steps: vec![TrainingStep {
                        title: "Tempo Sets".to_string(),
                        description: "Quick sets to the middle.".to_string(),
                    }],
                    suggested_videos: Vec::new(),
                }),
            },
        ];

        let markdown = generate_roster_report(&entries, Utc::now());
        let blake = markdown.find("| Blake |").unwrap();
        let avery = markdown.find("| Avery |").unwrap();
        assert!(blake < avery);
        assert!(markdown.contains("for 2 players"));
        assert!(markdown.contains("## Training Plans\n\n### Blake\n\n1. **Tempo Sets**"));
        assert!(!markdown.contains("### Avery"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"player_name\""));
        assert!(json.contains("\"readiness\""));
        assert!(json.contains("\"exceeding_target\""));
        assert!(json.contains("\"skillRatings\""));
    }
}
