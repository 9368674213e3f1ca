//! Migration of legacy concatenated coach feedback.
//!
//! Older profiles stored every coach's feedback in one string. Entries are
//! separated by a `###` line and look like:
//!
//! ```text
//! Assessment - 07/15/2024, 10:00 AM
//! Assessment:
//! Great hands, work on footwork.
//! - Setting Technique: 8/10
//! - Footwork: 6/10
//! ```

use crate::models::{Assessment, RatingValue, SkillRatings};
use tracing::debug;

const ENTRY_SEPARATOR: &str = "###";
const HEADER_PREFIX: &str = "Assessment - ";
const BODY_MARKER: &str = "Assessment:";

/// Split legacy feedback text into structured assessments.
pub fn parse_legacy_feedback(text: &str) -> Vec<Assessment> {
    split_entries(text)
        .into_iter()
        .filter_map(|entry| parse_entry(&entry))
        .enumerate()
        .map(|(index, mut assessment)| {
            assessment.coach_id = format!("legacy-{}", index + 1);
            assessment
        })
        .collect()
}

fn split_entries(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim() == ENTRY_SEPARATOR {
            entries.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    entries.push(current.join("\n"));

    entries
}

fn parse_entry(entry: &str) -> Option<Assessment> {
    let mut timestamp = String::new();
    let mut narrative: Vec<&str> = Vec::new();
    let mut ratings = SkillRatings::new();

    for line in entry.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix(HEADER_PREFIX) {
            timestamp = rest.trim().to_string();
        } else if trimmed == BODY_MARKER {
            continue;
        } else if let Some((skill, value)) = parse_skill_line(trimmed) {
            ratings.insert(skill, value);
        } else if !trimmed.is_empty() {
            narrative.push(trimmed);
        }
    }

    if timestamp.is_empty() && narrative.is_empty() && ratings.is_empty() {
        return None;
    }

    debug!(
        "Parsed legacy entry with {} ratings (timestamp '{}')",
        ratings.len(),
        timestamp
    );

    Some(Assessment {
        coach_id: String::new(),
        feedback_text: narrative.join("\n"),
        skill_ratings: ratings,
        timestamp,
    })
}

/// Parse `- <Skill>: <n>/10`. The skill name ends at the last `": "`, so
/// names containing colons survive. A value that is not `<integer>/10`
/// is kept as malformed.
fn parse_skill_line(line: &str) -> Option<(String, RatingValue)> {
    let body = line.strip_prefix("- ")?;
    let (skill, value) = body.rsplit_once(": ")?;
    let skill = skill.trim();
    let value = value.trim();

    if skill.is_empty() || !value.ends_with("/10") {
        return None;
    }

    let rating = match value.trim_end_matches("/10").trim().parse::<i64>() {
        Ok(n) => RatingValue::Valid(n),
        Err(_) => RatingValue::Malformed(serde_json::Value::String(value.to_string())),
    };

    Some((skill.to_string(), rating))
}
