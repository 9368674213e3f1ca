//! Data models for coach assessments and readiness reports.
//!
//! This module contains the core data structures used throughout
//! the application for representing players, assessments, derived
//! scores and reports.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Competitive level a player is targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetLevel {
    D1,
    D2,
    D3,
}

impl fmt::Display for TargetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetLevel::D1 => write!(f, "D1"),
            TargetLevel::D2 => write!(f, "D2"),
            TargetLevel::D3 => write!(f, "D3"),
        }
    }
}

/// Qualitative readiness bucket relative to a target level.
///
/// Ordered from least to most ready, so tiers can be compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessTier {
    /// More than the approach margin below the target band
    NeedsDevelopment,
    /// Within the approach margin below the target band
    ApproachingTarget,
    /// Inside the target band
    MeetingTarget,
    /// Above the target band
    ExceedingTarget,
}

impl fmt::Display for ReadinessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl ReadinessTier {
    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ReadinessTier::NeedsDevelopment => "Needs Development",
            ReadinessTier::ApproachingTarget => "Approaching Target",
            ReadinessTier::MeetingTarget => "Meeting Target",
            ReadinessTier::ExceedingTarget => "Exceeding Target",
        }
    }

    /// Returns an emoji representation of the tier.
    pub fn emoji(&self) -> &'static str {
        match self {
            ReadinessTier::NeedsDevelopment => "🔴",
            ReadinessTier::ApproachingTarget => "🟠",
            ReadinessTier::MeetingTarget => "🟢",
            ReadinessTier::ExceedingTarget => "🔵",
        }
    }
}

/// Display band for a single (averaged) skill rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RatingBand {
    Developing,
    Solid,
    Strong,
}

impl RatingBand {
    /// Bucket a rating on the 1-10 scale.
    pub fn for_rating(rating: f64) -> Self {
        if rating >= 9.0 {
            RatingBand::Strong
        } else if rating >= 7.0 {
            RatingBand::Solid
        } else {
            RatingBand::Developing
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RatingBand::Strong => "🟢",
            RatingBand::Solid => "🔵",
            RatingBand::Developing => "🟠",
        }
    }
}

impl fmt::Display for RatingBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingBand::Strong => write!(f, "Strong"),
            RatingBand::Solid => write!(f, "Solid"),
            RatingBand::Developing => write!(f, "Developing"),
        }
    }
}

/// A single rating value as stored in an assessment document.
///
/// Anything that is not an integer is kept as `Malformed` so that one bad
/// record does not prevent the rest of the document from loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingValue {
    Valid(i64),
    Malformed(serde_json::Value),
}

impl RatingValue {
    /// Returns the integer rating, if well formed.
    pub fn as_valid(&self) -> Option<i64> {
        match self {
            RatingValue::Valid(v) => Some(*v),
            RatingValue::Malformed(_) => None,
        }
    }
}

/// Skill name to rating mapping that keeps document order.
///
/// Serialized as a JSON object. A repeated key replaces the earlier value
/// in place, matching object semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillRatings {
    entries: Vec<(String, RatingValue)>,
}

impl SkillRatings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rating value.
    pub fn insert(&mut self, skill: impl Into<String>, value: RatingValue) {
        let skill = skill.into();
        match self.entries.iter_mut().find(|(name, _)| *name == skill) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((skill, value)),
        }
    }

    /// Insert or replace a well-formed rating.
    pub fn rate(&mut self, skill: impl Into<String>, rating: i64) {
        self.insert(skill, RatingValue::Valid(rating));
    }

    /// Look up a skill's rating value.
    #[cfg(test)]
    pub fn get(&self, skill: &str) -> Option<&RatingValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == skill)
            .map(|(_, value)| value)
    }

    /// Iterate over all entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RatingValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for SkillRatings {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut ratings = SkillRatings::new();
        for (skill, rating) in iter {
            ratings.rate(skill, rating);
        }
        ratings
    }
}

impl Serialize for SkillRatings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (skill, value) in &self.entries {
            map.serialize_entry(skill, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SkillRatings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RatingsVisitor;

        impl<'de> Visitor<'de> for RatingsVisitor {
            type Value = SkillRatings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of skill names to ratings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut ratings = SkillRatings::new();
                while let Some((skill, value)) = access.next_entry::<String, RatingValue>()? {
                    ratings.insert(skill, value);
                }
                Ok(ratings)
            }
        }

        deserializer.deserialize_map(RatingsVisitor)
    }
}

/// One coach's evaluation of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Opaque identifier of the submitting coach.
    pub coach_id: String,
    /// Free-form narrative feedback.
    #[serde(default)]
    pub feedback_text: String,
    /// Per-skill ratings on the 1-10 scale.
    #[serde(default)]
    pub skill_ratings: SkillRatings,
    /// Creation time, used for display ordering only.
    #[serde(default)]
    pub timestamp: String,
}

impl Assessment {
    /// Parsed creation time, if the timestamp is RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Average rating of one skill across all coaches that rated it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSkillScore {
    /// Skill name as entered by the coach UI.
    pub skill: String,
    /// Mean rating, rounded to one decimal place.
    pub average: f64,
    /// Number of ratings that contributed to the average.
    pub ratings: usize,
}

impl AggregateSkillScore {
    pub fn band(&self) -> RatingBand {
        RatingBand::for_rating(self.average)
    }
}

/// Each coach's rating of one skill, indexed by assessment position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRow {
    pub skill: String,
    pub ratings: Vec<Option<i64>>,
}

/// Outcome of classifying an overall score against a target level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    /// Readiness tier relative to the target band.
    pub tier: ReadinessTier,
    /// Display label for the tier.
    pub label: String,
    /// The level the player is evaluated against.
    pub target_level: TargetLevel,
    /// Score after clamping to the 0-10 scale.
    pub score: f64,
    /// Points above (positive) or below (negative) the target's minimum.
    pub gap: f64,
    /// Highest level whose minimum the score reaches.
    pub level_label: String,
}

/// A single drill in a training plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStep {
    pub title: String,
    pub description: String,
}

/// A suggested instructional video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSuggestion {
    pub title: String,
    pub url: String,
}

/// AI-generated training plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
    #[serde(default)]
    pub actionable_steps: Vec<TrainingStep>,
    #[serde(default)]
    pub suggested_videos: Vec<VideoSuggestion>,
}

/// AI evaluation of highlight footage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootageAnalysis {
    pub strengths: String,
    pub weaknesses: String,
    pub overall_assessment: String,
}

/// A player profile document as exported from the hosted store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub grad_year: String,
    pub target_level: TargetLevel,
    #[serde(default)]
    pub preferred_schools: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_video_url: Option<String>,
    /// Deprecated concatenated free-text feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_feedback: Option<String>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_plan: Option<TrainingPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<FootageAnalysis>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Where the profile was loaded from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Name of the LLM model used, if any AI flow ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Number of assessments aggregated.
    pub assessments: usize,
    /// Rating entries skipped as malformed.
    pub malformed_ratings: usize,
}

/// The complete readiness report for one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerReport {
    pub metadata: ReportMetadata,
    pub player_id: String,
    pub player_name: String,
    pub position: String,
    pub target_level: TargetLevel,
    pub overall_score: f64,
    pub readiness: Readiness,
    pub skills: Vec<AggregateSkillScore>,
    pub skill_matrix: Vec<SkillRow>,
    /// Coach id heading each matrix column, in document order.
    #[serde(default)]
    pub matrix_coaches: Vec<String>,
    pub unrated_skills: Vec<String>,
    /// Assessments in display order (newest first).
    pub assessments: Vec<Assessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_plan: Option<TrainingPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footage_analysis: Option<FootageAnalysis>,
}

/// One line of a roster summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_name: String,
    pub position: String,
    pub target_level: TargetLevel,
    pub overall_score: f64,
    pub tier: ReadinessTier,
    pub assessments: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_plan: Option<TrainingPlan>,
}

impl From<&PlayerReport> for RosterEntry {
    fn from(report: &PlayerReport) -> Self {
        Self {
            player_name: report.player_name.clone(),
            position: report.position.clone(),
            target_level: report.target_level,
            overall_score: report.overall_score,
            tier: report.readiness.tier,
            assessments: report.metadata.assessments,
            training_plan: report.training_plan.clone(),
        }
    }
}
