//! Skill aggregation across coach assessments.
//!
//! Averages are recomputed from the current assessment set on every call;
//! nothing here holds state or performs I/O.

use crate::models::{AggregateSkillScore, Assessment, SkillRow};
use std::collections::HashMap;
use tracing::warn;

/// Round to one decimal place, half away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Average each skill's ratings across all assessments.
///
/// Output follows the order in which each skill name first appears.
/// Malformed rating values are skipped.
pub fn compute_average_skills(assessments: &[Assessment]) -> Vec<AggregateSkillScore> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();

    for assessment in assessments {
        for (skill, value) in assessment.skill_ratings.iter() {
            let Some(rating) = value.as_valid() else {
                warn!(
                    "Skipping malformed rating for '{}' from coach {}",
                    skill, assessment.coach_id
                );
                continue;
            };

            let entry = totals.entry(skill).or_insert_with(|| {
                order.push(skill);
                (0.0, 0)
            });
            entry.0 += rating as f64;
            entry.1 += 1;
        }
    }

    order
        .into_iter()
        .map(|skill| {
            let (total, count) = totals[skill];
            AggregateSkillScore {
                skill: skill.to_string(),
                average: round_to_tenth(total / count as f64),
                ratings: count,
            }
        })
        .collect()
}

/// Unweighted mean of per-skill averages. Zero when there are no skills.
pub fn compute_overall_score(skill_scores: &[AggregateSkillScore]) -> f64 {
    if skill_scores.is_empty() {
        return 0.0;
    }

    let sum: f64 = skill_scores.iter().map(|s| s.average).sum();
    sum / skill_scores.len() as f64
}

/// Count rating entries that are not well-formed integers.
pub fn count_malformed(assessments: &[Assessment]) -> usize {
    assessments
        .iter()
        .flat_map(|a| a.skill_ratings.iter())
        .filter(|(_, value)| value.as_valid().is_none())
        .count()
}

/// Each coach's rating per skill, one column per assessment.
pub fn skill_matrix(assessments: &[Assessment]) -> Vec<SkillRow> {
    let mut rows: Vec<SkillRow> = Vec::new();

    for (column, assessment) in assessments.iter().enumerate() {
        for (skill, value) in assessment.skill_ratings.iter() {
            let Some(rating) = value.as_valid() else {
                continue;
            };

            let index = match rows.iter().position(|row| row.skill == skill) {
                Some(index) => index,
                None => {
                    rows.push(SkillRow {
                        skill: skill.to_string(),
                        ratings: vec![None; assessments.len()],
                    });
                    rows.len() - 1
                }
            };
            rows[index].ratings[column] = Some(rating);
        }
    }

    rows
}

/// Skills expected for the position that no coach has rated yet.
pub fn unrated_skills(position_skills: &[String], scores: &[AggregateSkillScore]) -> Vec<String> {
    position_skills
        .iter()
        .filter(|skill| !scores.iter().any(|s| &s.skill == *skill))
        .cloned()
        .collect()
}

/// The `n` highest-rated skills. Ties keep first-appearance order.
pub fn strongest_skills(scores: &[AggregateSkillScore], n: usize) -> Vec<&AggregateSkillScore> {
    let mut sorted: Vec<&AggregateSkillScore> = scores.iter().collect();
    sorted.sort_by(|a, b| {
        b.average
            .partial_cmp(&a.average)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// The `n` lowest-rated skills. Ties keep first-appearance order.
pub fn weakest_skills(scores: &[AggregateSkillScore], n: usize) -> Vec<&AggregateSkillScore> {
    let mut sorted: Vec<&AggregateSkillScore> = scores.iter().collect();
    sorted.sort_by(|a, b| {
        a.average
            .partial_cmp(&b.average)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// Join all coaches' narrative feedback, separated by blank lines.
pub fn combined_feedback(assessments: &[Assessment]) -> String {
    assessments
        .iter()
        .map(|a| a.feedback_text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assessments in display order: newest first, unparseable timestamps last.
pub fn sort_by_recency(assessments: &[Assessment]) -> Vec<Assessment> {
    let mut sorted = assessments.to_vec();
    sorted.sort_by(|a, b| match (a.created_at(), b.created_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted
}
