//! Scoring service: Runs one triage assessment.
//!
//! Pipeline:
//! 1. Normalize the biometrics into a feature vector
//! 2. Ask the predictor for a base fraction
//! 3. Round, add the comorbidity penalty, cap and classify
//!
//! Predictor failures never reach the caller. An error or a non-finite
//! output is logged and replaced by a random base in [0, 0.5).

use crate::adapters::RandomBase;
use crate::domain::{to_percentage, FeatureVector, ScoringInput, ScoringResult};
use crate::ports::{Predictor, PredictorKind};

/// Everything produced by one scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutcome {
    pub input: ScoringInput,
    pub features: FeatureVector,
    /// Fraction actually used (after any substitution)
    pub base_fraction: f64,
    /// Rounded base before the penalty
    pub base_percentage: i64,
    pub penalty: i32,
    pub predictor: PredictorKind,
    /// True when the predictor failed and a random base was used
    pub substituted: bool,
    pub result: ScoringResult,
}

/// Service for scoring patients against the loaded predictor.
pub struct ScoringService {
    predictor: Box<dyn Predictor>,
    substitute: RandomBase,
}

impl ScoringService {
    #[must_use]
    pub fn new(predictor: Box<dyn Predictor>) -> Self {
        Self::with_substitute(predictor, RandomBase::new())
    }

    /// Use a specific random source for evaluation failures.
    #[must_use]
    pub fn with_substitute(predictor: Box<dyn Predictor>, substitute: RandomBase) -> Self {
        Self {
            predictor,
            substitute,
        }
    }

    #[must_use]
    pub fn predictor_kind(&self) -> PredictorKind {
        self.predictor.kind()
    }

    #[must_use]
    pub fn predictor_fingerprint(&self) -> Option<String> {
        self.predictor.fingerprint()
    }

    /// Score one patient.
    #[must_use]
    pub fn score(&self, input: &ScoringInput) -> ScoringOutcome {
        let features = input.features();

        let (base_fraction, substituted) = match self.predictor.predict(&features) {
            Ok(v) if v.is_finite() => (v, false),
            Ok(v) => {
                tracing::warn!("Predictor returned non-finite value {}; using random base", v);
                (self.substitute.sample(), true)
            }
            Err(e) => {
                tracing::warn!("Prediction failed ({}); using random base", e);
                (self.substitute.sample(), true)
            }
        };

        let base_percentage = to_percentage(base_fraction);
        let penalty = input.condition.penalty();
        let result = ScoringResult::classify(base_percentage, input.condition, input.bmi);

        tracing::debug!(
            "Scored: base={} penalty={} final={} level={}",
            base_percentage,
            penalty,
            result.score,
            result.level
        );

        ScoringOutcome {
            input: *input,
            features,
            base_fraction,
            base_percentage,
            penalty,
            predictor: self.predictor.kind(),
            substituted,
            result,
        }
    }
}

impl std::fmt::Debug for ScoringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringService")
            .field("predictor", &self.predictor.kind())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fallback::{FallbackPredictor, RANDOM_BASE_MAX};
    use crate::config::FallbackMode;
    use crate::domain::{Condition, Gender, RiskLevel};
    use crate::ports::PredictorError;

    /// Predictor returning a fixed fraction.
    struct Fixed(f64);

    impl Predictor for Fixed {
        fn predict(&self, _: &FeatureVector) -> Result<f64, PredictorError> {
            Ok(self.0)
        }
        fn kind(&self) -> PredictorKind {
            PredictorKind::Model
        }
    }

    struct Failing;

    impl Predictor for Failing {
        fn predict(&self, _: &FeatureVector) -> Result<f64, PredictorError> {
            Err(PredictorError::Evaluation("boom".into()))
        }
        fn kind(&self) -> PredictorKind {
            PredictorKind::Model
        }
    }

    /// Weighted sum of the features, like a linear model.
    struct Linear([f64; 4]);

    impl Predictor for Linear {
        fn predict(&self, f: &FeatureVector) -> Result<f64, PredictorError> {
            Ok(self.0.iter().zip(f.as_slice()).map(|(w, x)| w * x).sum())
        }
        fn kind(&self) -> PredictorKind {
            PredictorKind::Model
        }
    }

    fn input(
        age: f64,
        glucose: f64,
        bmi: f64,
        pressure: f64,
        condition: Condition,
    ) -> ScoringInput {
        ScoringInput::new(age, glucose, bmi, pressure, Gender::Male, condition)
            .expect("valid input")
    }

    fn untrained() -> ScoringService {
        ScoringService::new(Box::new(FallbackPredictor::from_mode(
            FallbackMode::Untrained,
        )))
    }

    #[test]
    fn test_healthy_scenario_with_untrained_fallback() {
        let outcome = untrained().score(&input(45.0, 90.0, 24.0, 120.0, Condition::None));
        assert_eq!(outcome.result.level, RiskLevel::Healthy);
        assert!(outcome.result.score <= 45);
        assert_eq!(outcome.penalty, 0);
        assert_eq!(outcome.predictor, PredictorKind::UntrainedFallback);
        assert!(!outcome.substituted);
    }

    #[test]
    fn test_diabetes_scenario_goes_critical() {
        // Linear model whose base alone exceeds 40% on these features.
        let service = ScoringService::new(Box::new(Linear([0.25, 0.25, 0.25, 0.25])));
        let outcome = service.score(&input(62.0, 180.0, 31.0, 150.0, Condition::DiabetesT2));
        assert_eq!(outcome.penalty, 35);
        assert!(outcome.base_percentage + 35 > 75);
        assert_eq!(outcome.result.level, RiskLevel::Critical);
    }

    #[test]
    fn test_asthma_scenario_hits_chronic_floor() {
        let outcome = untrained().score(&input(28.0, 85.0, 20.0, 110.0, Condition::Asthma));
        assert_eq!(outcome.base_percentage, 0);
        assert_eq!(outcome.penalty, 10);
        assert_eq!(outcome.result.score, 45);
        assert_eq!(outcome.result.level, RiskLevel::ModerateChronic);
    }

    #[test]
    fn test_rounding_before_penalty() {
        let service = ScoringService::new(Box::new(Fixed(0.3125)));
        let outcome = service.score(&input(50.0, 100.0, 25.0, 120.0, Condition::Hypertension));
        assert_eq!(outcome.base_percentage, 31);
        assert_eq!(outcome.result.score, 61);
        assert_eq!(outcome.result.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_underweight_with_low_score() {
        let service = ScoringService::new(Box::new(Fixed(0.2)));
        let outcome = service.score(&input(30.0, 80.0, 16.5, 110.0, Condition::None));
        assert_eq!(outcome.result.level, RiskLevel::Underweight);
        assert_eq!(outcome.result.score, 20);
    }

    #[test]
    fn test_evaluation_failure_substitutes_random_base() {
        let service =
            ScoringService::with_substitute(Box::new(Failing), RandomBase::with_seed([3u8; 32]));
        let outcome = service.score(&input(50.0, 100.0, 25.0, 120.0, Condition::None));
        assert!(outcome.substituted);
        assert!((0.0..RANDOM_BASE_MAX).contains(&outcome.base_fraction));
        assert!(outcome.result.score <= 50);
    }

    #[test]
    fn test_non_finite_output_substituted() {
        let service = ScoringService::new(Box::new(Fixed(f64::NAN)));
        let outcome = service.score(&input(50.0, 100.0, 25.0, 120.0, Condition::None));
        assert!(outcome.substituted);
        assert!(outcome.base_fraction.is_finite());
    }

    #[test]
    fn test_negative_base_stays_in_range() {
        let service = ScoringService::new(Box::new(Fixed(-3.0)));
        let outcome = service.score(&input(50.0, 100.0, 25.0, 120.0, Condition::None));
        assert_eq!(outcome.result.score, 0);
    }

    #[test]
    fn test_idempotent_with_deterministic_predictor() {
        let service = ScoringService::new(Box::new(Linear([0.4, 0.3, 0.2, 0.1])));
        let patient = input(70.0, 150.0, 29.0, 145.0, Condition::Obesity);
        let a = service.score(&patient);
        let b = service.score(&patient);
        assert_eq!(a.result, b.result);
        assert_eq!(a, b);
    }
}
