//! Domain layer: Core triage types and scoring rules.
//!
//! Pure Rust types with no I/O. Everything here is deterministic; randomness
//! only enters through patient identifiers.

mod diagnosis;
mod patient;

pub use diagnosis::{
    to_percentage, RiskLevel, ScoringResult, CHRONIC_FLOOR, CRITICAL_THRESHOLD, MAX_SCORE,
    MODERATE_THRESHOLD, UNDERWEIGHT_BMI,
};
pub use patient::{
    seed_history, ChartPoint, Condition, FeatureVector, Gender, PatientRecord, ScoringInput,
    FEATURE_NAMES,
};
