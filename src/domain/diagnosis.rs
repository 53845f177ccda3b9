//! Risk classification and scoring result types.
//!
//! The rule pipeline here is deterministic: it takes the rounded predictor
//! percentage and applies the comorbidity penalty, the 99 cap, and the ordered
//! classification list.

use serde::{Deserialize, Serialize};

use super::patient::Condition;

/// Minimum score (and level) imposed when a comorbidity is present.
pub const CHRONIC_FLOOR: i64 = 45;

/// Scores above this are critical.
pub const CRITICAL_THRESHOLD: i64 = 75;

/// Scores above this (and not critical) are moderate.
pub const MODERATE_THRESHOLD: i64 = 45;

/// BMI below which an otherwise low-risk patient is flagged.
pub const UNDERWEIGHT_BMI: f64 = 18.5;

/// Highest reportable score.
pub const MAX_SCORE: i64 = 99;

/// Triage risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Healthy,
    Underweight,
    Moderate,
    /// Moderate because of a pre-existing condition, regardless of score
    ModerateChronic,
    Critical,
}

impl RiskLevel {
    /// Get the clinical recommendation shown alongside the level.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Healthy => "Patient stable. Maintain current habits.",
            Self::Underweight => "NUTRITIONAL ALERT: Potential malnutrition.",
            Self::Moderate => "Caution. Adjust medication and diet.",
            Self::ModerateChronic => "Pre-existing condition requires continuous monitoring.",
            Self::Critical => "HIGH METABOLIC RISK. Immediate medical intervention.",
        }
    }

    /// Get the associated display color (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Healthy => (16, 185, 129),                      // Emerald (#10B981)
            Self::Moderate | Self::ModerateChronic => (245, 158, 11), // Amber (#F59E0B)
            Self::Critical => (239, 68, 68),                      // Red (#EF4444)
            Self::Underweight => (234, 179, 8),                   // Yellow (#EAB308)
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Underweight => "UNDERWEIGHT",
            Self::Moderate => "MODERATE",
            Self::ModerateChronic => "MODERATE (CHRONIC)",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Final output of one scoring run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Integer risk percentage in [0, 99]
    pub score: u8,
    pub level: RiskLevel,
    pub recommendation: String,
    pub color: (u8, u8, u8),
}

impl ScoringResult {
    /// Apply penalty, cap and classification to a rounded base percentage.
    ///
    /// Rule order matters: the chronic floor is checked first and can only
    /// raise the score; the underweight check only runs when the score is at
    /// most 45. The floor also claims a score of exactly 45, so a patient with
    /// a comorbidity is never labelled healthy or underweight.
    #[must_use]
    pub fn classify(base_percentage: i64, condition: Condition, bmi: f64) -> Self {
        let mut percentage = base_percentage.saturating_add(i64::from(condition.penalty()));
        if percentage > MAX_SCORE {
            percentage = MAX_SCORE;
        }

        let level = if condition.is_present() && percentage <= CHRONIC_FLOOR {
            percentage = CHRONIC_FLOOR;
            RiskLevel::ModerateChronic
        } else if percentage > CRITICAL_THRESHOLD {
            RiskLevel::Critical
        } else if percentage > MODERATE_THRESHOLD {
            RiskLevel::Moderate
        } else if bmi < UNDERWEIGHT_BMI {
            RiskLevel::Underweight
        } else {
            RiskLevel::Healthy
        };

        // A negative model output can push the sum below zero.
        let score = percentage.clamp(0, MAX_SCORE) as u8;

        Self {
            score,
            level,
            recommendation: level.recommendation().to_string(),
            color: level.color(),
        }
    }
}

/// Convert a base fraction to a whole percentage, rounding halves up.
#[must_use]
pub fn to_percentage(fraction: f64) -> i64 {
    let scaled = (fraction * 100.0 + 0.5).floor();
    if scaled.is_nan() {
        0
    } else {
        // `as` saturates at the i64 bounds.
        scaled as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_happens_half_up() {
        assert_eq!(to_percentage(0.125), 13);
        assert_eq!(to_percentage(0.124), 12);
        assert_eq!(to_percentage(-0.125), -12);
        assert_eq!(to_percentage(-0.25), -25);
        assert_eq!(to_percentage(0.0), 0);
    }

    #[test]
    fn test_healthy_without_condition() {
        let r = ScoringResult::classify(0, Condition::None, 24.0);
        assert_eq!(r.level, RiskLevel::Healthy);
        assert_eq!(r.score, 0);
        assert_eq!(r.color, (16, 185, 129));
    }

    #[test]
    fn test_chronic_floor_forces_45() {
        let r = ScoringResult::classify(0, Condition::Asthma, 20.0);
        assert_eq!(r.score, 45);
        assert_eq!(r.level, RiskLevel::ModerateChronic);
        assert_eq!(r.recommendation, RiskLevel::ModerateChronic.recommendation());
    }

    #[test]
    fn test_chronic_floor_beats_underweight() {
        let r = ScoringResult::classify(5, Condition::Obesity, 15.0);
        assert_eq!(r.score, 45);
        assert_eq!(r.level, RiskLevel::ModerateChronic);
    }

    #[test]
    fn test_condition_landing_on_45_stays_chronic() {
        let r = ScoringResult::classify(10, Condition::DiabetesT2, 24.0);
        assert_eq!(r.score, 45);
        assert_eq!(r.level, RiskLevel::ModerateChronic);

        let r = ScoringResult::classify(35, Condition::Asthma, 16.0);
        assert_eq!(r.score, 45);
        assert_eq!(r.level, RiskLevel::ModerateChronic);
    }

    #[test]
    fn test_critical_above_75() {
        let r = ScoringResult::classify(50, Condition::DiabetesT2, 31.0);
        assert_eq!(r.score, 85);
        assert_eq!(r.level, RiskLevel::Critical);
    }

    #[test]
    fn test_score_capped_at_99() {
        let r = ScoringResult::classify(90, Condition::Arrhythmia, 31.0);
        assert_eq!(r.score, 99);
        assert_eq!(r.level, RiskLevel::Critical);
    }

    #[test]
    fn test_moderate_band() {
        assert_eq!(ScoringResult::classify(46, Condition::None, 24.0).level, RiskLevel::Moderate);
        assert_eq!(ScoringResult::classify(75, Condition::None, 24.0).level, RiskLevel::Moderate);
        assert_eq!(ScoringResult::classify(76, Condition::None, 24.0).level, RiskLevel::Critical);
    }

    #[test]
    fn test_underweight_only_at_low_scores() {
        assert_eq!(
            ScoringResult::classify(3, Condition::None, 17.0).level,
            RiskLevel::Underweight
        );
        assert_eq!(
            ScoringResult::classify(45, Condition::None, 17.0).level,
            RiskLevel::Underweight
        );
        assert_eq!(
            ScoringResult::classify(46, Condition::None, 17.0).level,
            RiskLevel::Moderate
        );
    }

    #[test]
    fn test_negative_base_clamped_to_zero() {
        let r = ScoringResult::classify(-40, Condition::None, 24.0);
        assert_eq!(r.score, 0);
        assert_eq!(r.level, RiskLevel::Healthy);
    }

    #[test]
    fn test_invariants_over_grid() {
        let conditions = Condition::ALL;
        for base in -150..=150 {
            for condition in conditions {
                for bmi in [10.0, 18.4, 18.5, 30.0] {
                    let r = ScoringResult::classify(base, condition, bmi);
                    assert!(r.score <= 99);
                    if condition.is_present() && base + i64::from(condition.penalty()) < 45 {
                        assert_eq!(r.score, 45);
                        assert_eq!(r.level, RiskLevel::ModerateChronic);
                    }
                    if condition.is_present() {
                        assert!(r.score >= 45);
                        assert_ne!(r.level, RiskLevel::Healthy);
                        assert_ne!(r.level, RiskLevel::Underweight);
                    }
                    if r.score > 75 {
                        assert_eq!(r.level, RiskLevel::Critical);
                    }
                }
            }
        }
    }
}
