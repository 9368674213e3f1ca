//! Readiness classification against a target competitive level.
//!
//! Each target level owns a score band. A player's overall score is
//! compared against the band of the level they declared, never searched
//! across all bands.

use super::aggregator::round_to_tenth;
use crate::models::{Readiness, ReadinessTier, TargetLevel};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Lowest and highest possible overall score.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Score band for one target level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBand {
    pub min_score: f64,
    pub max_score: f64,
    pub label: String,
}

impl LevelBand {
    fn new(min_score: f64, max_score: f64, label: &str) -> Self {
        Self {
            min_score,
            max_score,
            label: label.to_string(),
        }
    }
}

/// Threshold table consulted by [`classify_readiness`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessTable {
    /// How far below a band's minimum still counts as approaching it.
    #[serde(default = "default_approach_margin")]
    pub approach_margin: f64,

    /// Label used when a score reaches no level's minimum.
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,

    #[serde(default = "default_d1")]
    pub d1: LevelBand,

    #[serde(default = "default_d2")]
    pub d2: LevelBand,

    #[serde(default = "default_d3")]
    pub d3: LevelBand,
}

impl Default for ReadinessTable {
    fn default() -> Self {
        Self {
            approach_margin: default_approach_margin(),
            fallback_label: default_fallback_label(),
            d1: default_d1(),
            d2: default_d2(),
            d3: default_d3(),
        }
    }
}

fn default_approach_margin() -> f64 {
    1.0
}

fn default_fallback_label() -> String {
    "Needs Development".to_string()
}

fn default_d1() -> LevelBand {
    LevelBand::new(8.5, 10.0, "D1 Ready")
}

fn default_d2() -> LevelBand {
    LevelBand::new(7.0, 8.4, "D2 Ready")
}

fn default_d3() -> LevelBand {
    LevelBand::new(5.5, 6.9, "D3 Ready")
}

impl ReadinessTable {
    /// Band for a target level.
    pub fn band(&self, level: TargetLevel) -> &LevelBand {
        match level {
            TargetLevel::D1 => &self.d1,
            TargetLevel::D2 => &self.d2,
            TargetLevel::D3 => &self.d3,
        }
    }

    /// Label of the highest level whose minimum the score reaches.
    pub fn level_for_score(&self, score: f64) -> &str {
        let mut bands = [&self.d1, &self.d2, &self.d3];
        bands.sort_by(|a, b| {
            b.min_score
                .partial_cmp(&a.min_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        bands
            .into_iter()
            .find(|band| score >= band.min_score)
            .map(|band| band.label.as_str())
            .unwrap_or(self.fallback_label.as_str())
    }

    /// Check that every band lies within the score scale.
    pub fn validate(&self) -> Result<()> {
        if !self.approach_margin.is_finite() || self.approach_margin < 0.0 {
            bail!(
                "Readiness approach_margin must be a non-negative number, got {}",
                self.approach_margin
            );
        }

        for level in [TargetLevel::D1, TargetLevel::D2, TargetLevel::D3] {
            let band = self.band(level);
            let in_scale = |v: f64| v.is_finite() && (SCORE_MIN..=SCORE_MAX).contains(&v);

            if !in_scale(band.min_score) || !in_scale(band.max_score) {
                bail!(
                    "Readiness band for {} must lie within {}-{}",
                    level,
                    SCORE_MIN,
                    SCORE_MAX
                );
            }
            if band.min_score > band.max_score {
                bail!(
                    "Readiness band for {} has min_score {} above max_score {}",
                    level,
                    band.min_score,
                    band.max_score
                );
            }
        }

        Ok(())
    }
}

/// Clamp a score onto the 0-10 scale. NaN counts as zero.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        SCORE_MIN
    } else {
        score.clamp(SCORE_MIN, SCORE_MAX)
    }
}

/// Classify an overall score against the declared target level.
///
/// Bands are compared against the score rounded to one decimal, the
/// precision reports display it at.
pub fn classify_readiness(score: f64, target: TargetLevel, table: &ReadinessTable) -> Readiness {
    let score = clamp_score(score);
    let shown = round_to_tenth(score);
    let band = table.band(target);

    let tier = if shown > band.max_score {
        ReadinessTier::ExceedingTarget
    } else if shown >= band.min_score {
        ReadinessTier::MeetingTarget
    } else if shown >= round_to_tenth(band.min_score - table.approach_margin) {
        ReadinessTier::ApproachingTarget
    } else {
        ReadinessTier::NeedsDevelopment
    };

    Readiness {
        tier,
        label: tier.label().to_string(),
        target_level: target,
        score,
        gap: round_to_tenth(shown - band.min_score),
        level_label: table.level_for_score(shown).to_string(),
    }
}
