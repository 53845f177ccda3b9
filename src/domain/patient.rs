//! Patient intake types for triage scoring.
//!
//! Biometric inputs are kept as raw clinical units; the predictor only ever
//! sees the normalized [`FeatureVector`].

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::diagnosis::RiskLevel;
use crate::VitaliaError;

/// Patient gender as captured by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// The other option, for two-state selectors.
    #[must_use]
    pub fn toggled(&self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = VitaliaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(VitaliaError::UnknownGender(other.to_string())),
        }
    }
}

/// Pre-existing condition (comorbidity). Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    None,
    DiabetesT2,
    Hypertension,
    Arrhythmia,
    Obesity,
    Asthma,
}

impl Condition {
    /// Selector order used by the intake form.
    pub const ALL: [Condition; 6] = [
        Condition::None,
        Condition::DiabetesT2,
        Condition::Hypertension,
        Condition::Obesity,
        Condition::Asthma,
        Condition::Arrhythmia,
    ];

    /// Additive risk penalty in percentage points.
    #[must_use]
    pub fn penalty(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::DiabetesT2 => 35,
            Self::Hypertension => 30,
            Self::Arrhythmia => 40,
            Self::Obesity => 20,
            Self::Asthma => 10,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::DiabetesT2 => "Diabetes T2",
            Self::Hypertension => "Hypertension",
            Self::Arrhythmia => "Arrhythmia",
            Self::Obesity => "Obesity",
            Self::Asthma => "Asthma",
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Next entry in selector order, wrapping around.
    #[must_use]
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous entry in selector order, wrapping around.
    #[must_use]
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = VitaliaError;

    /// Accepts the display label (case-insensitive) or the snake_case name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| {
                c.label().eq_ignore_ascii_case(needle)
                    || c.label().replace(' ', "_").eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| VitaliaError::UnknownCondition(needle.to_string()))
    }
}

/// Normalized predictor input: age/100, glucose/200, BMI/50, pressure/200.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; 4]);

/// Axis labels, in feature order.
pub const FEATURE_NAMES: [&str; 4] = ["Age", "Glucose", "BMI", "Pressure"];

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Radar-chart points: each feature scaled to a 0-100 axis.
    #[must_use]
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        FEATURE_NAMES
            .iter()
            .zip(self.0.iter())
            .map(|(label, v)| ChartPoint::new(*label, v * 100.0))
            .collect()
    }
}

/// A labelled value for chart rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// One scoring request, built fresh from the form for each run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringInput {
    /// Age in years
    pub age: f64,
    /// Fasting glucose in mg/dL
    pub glucose: f64,
    /// Body-mass index in kg/m²
    pub bmi: f64,
    /// Systolic pressure in mmHg
    pub pressure: f64,
    pub gender: Gender,
    pub condition: Condition,
}

impl ScoringInput {
    /// Build an input, rejecting non-finite numbers.
    ///
    /// # Errors
    /// Returns `VitaliaError::Validation` naming the first non-finite field.
    pub fn new(
        age: f64,
        glucose: f64,
        bmi: f64,
        pressure: f64,
        gender: Gender,
        condition: Condition,
    ) -> Result<Self, VitaliaError> {
        for (name, v) in FEATURE_NAMES.iter().zip([age, glucose, bmi, pressure]) {
            if !v.is_finite() {
                return Err(VitaliaError::Validation(format!("{name}: not a finite number")));
            }
        }
        Ok(Self {
            age,
            glucose,
            bmi,
            pressure,
            gender,
            condition,
        })
    }

    #[must_use]
    pub fn features(&self) -> FeatureVector {
        FeatureVector([
            self.age / 100.0,
            self.glucose / 200.0,
            self.bmi / 50.0,
            self.pressure / 200.0,
        ])
    }
}

/// An entry in the in-memory patient log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub date: NaiveDate,
    pub age: f64,
    pub gender: Gender,
    pub condition: Condition,
    pub glucose: f64,
    pub bmi: f64,
    pub pressure: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

impl PatientRecord {
    /// Record a completed scoring run under a fresh `PT-NNNN` identifier.
    #[must_use]
    pub fn from_run(input: &ScoringInput, risk_score: u8, risk_level: RiskLevel) -> Self {
        Self {
            id: patient_id(),
            date: chrono::Local::now().date_naive(),
            age: input.age,
            gender: input.gender,
            condition: input.condition,
            glucose: input.glucose,
            bmi: input.bmi,
            pressure: input.pressure,
            risk_score,
            risk_level,
        }
    }
}

/// `PT-` followed by four random digits (1000-9999).
fn patient_id() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    format!("PT-{}", rng.gen_range(1000..=9999))
}

/// Demonstration records shown before any run, most recent first.
#[must_use]
pub fn seed_history() -> Vec<PatientRecord> {
    let rows: [(&str, (i32, u32, u32), f64, Gender, Condition, f64, f64, f64, u8, RiskLevel); 5] = [
        ("PT-1001", (2025, 12, 8), 45.0, Gender::Male, Condition::None, 90.0, 24.0, 120.0, 15, RiskLevel::Healthy),
        ("PT-1002", (2025, 12, 8), 62.0, Gender::Female, Condition::DiabetesT2, 180.0, 31.0, 150.0, 95, RiskLevel::Critical),
        ("PT-1003", (2025, 12, 7), 35.0, Gender::Male, Condition::Hypertension, 110.0, 28.0, 140.0, 65, RiskLevel::Moderate),
        ("PT-1004", (2025, 12, 6), 28.0, Gender::Female, Condition::Asthma, 85.0, 20.0, 110.0, 45, RiskLevel::ModerateChronic),
        ("PT-1005", (2025, 12, 5), 55.0, Gender::Male, Condition::Obesity, 130.0, 36.0, 135.0, 58, RiskLevel::Moderate),
    ];

    rows.into_iter()
        .map(
            |(id, (y, m, d), age, gender, condition, glucose, bmi, pressure, risk_score, risk_level)| {
                PatientRecord {
                    id: id.to_string(),
                    date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
                    age,
                    gender,
                    condition,
                    glucose,
                    bmi,
                    pressure,
                    risk_score,
                    risk_level,
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_are_normalized() {
        let input = ScoringInput::new(50.0, 100.0, 25.0, 100.0, Gender::Male, Condition::None)
            .expect("valid input");
        let f = input.features();
        assert!((f.0[0] - 0.5).abs() < f64::EPSILON);
        assert!((f.0[1] - 0.5).abs() < f64::EPSILON);
        assert!((f.0[2] - 0.5).abs() < f64::EPSILON);
        assert!((f.0[3] - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chart_points_scale_to_hundred() {
        let input = ScoringInput::new(45.0, 90.0, 24.0, 120.0, Gender::Male, Condition::None)
            .expect("valid input");
        let points = input.features().chart_points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].label, "Age");
        assert!((points[0].value - 45.0).abs() < 1e-9);
        assert!((points[1].value - 45.0).abs() < 1e-9);
        assert!((points[2].value - 48.0).abs() < 1e-9);
        assert!((points[3].value - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let err = ScoringInput::new(f64::NAN, 90.0, 24.0, 120.0, Gender::Male, Condition::None);
        assert!(matches!(err, Err(VitaliaError::Validation(_))));
    }

    #[test]
    fn test_condition_parsing() {
        assert_eq!("Diabetes T2".parse::<Condition>().ok(), Some(Condition::DiabetesT2));
        assert_eq!("diabetes_t2".parse::<Condition>().ok(), Some(Condition::DiabetesT2));
        assert_eq!(" asthma ".parse::<Condition>().ok(), Some(Condition::Asthma));
        assert!(matches!(
            "Gout".parse::<Condition>(),
            Err(VitaliaError::UnknownCondition(_))
        ));
    }

    #[test]
    fn test_condition_penalties() {
        assert_eq!(Condition::None.penalty(), 0);
        assert_eq!(Condition::DiabetesT2.penalty(), 35);
        assert_eq!(Condition::Hypertension.penalty(), 30);
        assert_eq!(Condition::Arrhythmia.penalty(), 40);
        assert_eq!(Condition::Obesity.penalty(), 20);
        assert_eq!(Condition::Asthma.penalty(), 10);
    }

    #[test]
    fn test_condition_cycle_wraps() {
        let mut c = Condition::None;
        for _ in 0..Condition::ALL.len() {
            c = c.next();
        }
        assert_eq!(c, Condition::None);
        assert_eq!(Condition::None.prev(), Condition::Arrhythmia);
    }

    #[test]
    fn test_patient_id_format() {
        let id = patient_id();
        assert!(id.starts_with("PT-"));
        let n: u32 = id[3..].parse().expect("numeric suffix");
        assert!((1000..=9999).contains(&n));
    }

    #[test]
    fn test_seed_history_respects_invariants() {
        let seed = seed_history();
        assert_eq!(seed.len(), 5);
        assert_eq!(seed[0].id, "PT-1001");
        for record in &seed {
            assert!(record.risk_score <= 99);
            if record.condition.is_present() {
                assert!(record.risk_score >= 45);
                assert_ne!(record.risk_level, RiskLevel::Healthy);
            }
        }
    }
}
