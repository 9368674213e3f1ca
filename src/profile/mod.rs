//! Player profile loading.
//!
//! Reads exported profile documents and migrates legacy free-text
//! feedback into structured assessments.

pub mod legacy;

use crate::models::PlayerProfile;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Load a profile document from a JSON file.
pub fn load_profile(path: &Path) -> Result<PlayerProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile: {}", path.display()))?;

    let profile = parse_profile(&content)
        .with_context(|| format!("Failed to parse profile: {}", path.display()))?;

    debug!(
        "Loaded profile {} with {} assessments",
        profile.id,
        profile.assessments.len()
    );

    Ok(profile)
}

/// Parse a profile document and normalize its assessments.
pub fn parse_profile(content: &str) -> Result<PlayerProfile> {
    let mut profile: PlayerProfile = serde_json::from_str(content)?;
    migrate_legacy_feedback(&mut profile);
    Ok(profile)
}

/// Fill `assessments` from the deprecated `coachFeedback` text when a
/// profile has no structured assessments yet.
pub fn migrate_legacy_feedback(profile: &mut PlayerProfile) {
    if !profile.assessments.is_empty() {
        return;
    }

    let Some(text) = profile.coach_feedback.as_deref() else {
        return;
    };

    let migrated = legacy::parse_legacy_feedback(text);
    if !migrated.is_empty() {
        info!(
            "Migrated {} legacy feedback entries for {}",
            migrated.len(),
            profile.name
        );
        profile.assessments = migrated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TargetLevel;
    use std::io::Write;

    const STRUCTURED: &str = r#"{
        "id": "player-1",
        "name": "Riley Park",
        "position": "Libero",
        "targetLevel": "D2",
        "assessments": [
            {
                "coachId": "coach-1",
                "feedbackText": "Reads the hitter early.",
                "skillRatings": {"Digging": 8, "Communication": 7},
                "timestamp": "2024-07-15T10:00:00Z"
            }
        ],
        "coachFeedback": "Assessment:\n- Digging: 2/10"
    }"#;

    const LEGACY_ONLY: &str = r#"{
        "id": "player-2",
        "name": "Sam Ortiz",
        "position": "Opposite",
        "targetLevel": "D1",
        "coachFeedback": "Assessment - 07/01/2024\nAssessment:\nBig arm.\n- Attacking: 9/10\n###\nAssessment - 07/02/2024\nAssessment:\nBlock timing.\n- Blocking: 6/10"
    }"#;

    #[test]
    fn test_structured_assessments_take_precedence() {
        let profile = parse_profile(STRUCTURED).unwrap();
        assert_eq!(profile.assessments.len(), 1);
        assert_eq!(profile.assessments[0].coach_id, "coach-1");
    }

    #[test]
    fn test_legacy_feedback_is_migrated() {
        let profile = parse_profile(LEGACY_ONLY).unwrap();
        assert_eq!(profile.target_level, TargetLevel::D1);
        assert_eq!(profile.assessments.len(), 2);
        assert_eq!(profile.assessments[1].feedback_text, "Block timing.");
    }

    #[test]
    fn test_load_profile_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STRUCTURED.as_bytes()).unwrap();

        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.name, "Riley Park");
    }

    #[test]
    fn test_load_profile_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = load_profile(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse profile"));
    }

    #[test]
    fn test_fixture_profiles() {
        let jamie = parse_profile(include_str!("../../fixtures/players/jamie_tree.json")).unwrap();
        assert_eq!(jamie.assessments.len(), 3);
        assert_eq!(crate::analysis::count_malformed(&jamie.assessments), 1);

        let sam = parse_profile(include_str!("../../fixtures/players/sam_ortiz.json")).unwrap();
        assert_eq!(sam.assessments.len(), 2);
        assert_eq!(sam.assessments[0].coach_id, "legacy-1");
        assert_eq!(
            sam.assessments[1].skill_ratings.get("Defense").and_then(|v| v.as_valid()),
            Some(6)
        );
    }
}
