//! Fallback predictors used when no model artifact is available.
//!
//! Neither predictor carries clinical meaning. They exist so the rule-based
//! part of scoring (penalties, floor, classification) keeps working.
//!
//! # Mutex Behavior
//!
//! The random source sits behind a `Mutex`. A poisoned mutex (from a panic in
//! another thread) is recovered: the RNG state cannot be left inconsistent by
//! a panic, so there is nothing to fail closed on.

use std::sync::Mutex;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::config::FallbackMode;
use crate::domain::FeatureVector;
use crate::ports::{Predictor, PredictorError, PredictorKind};

/// Upper bound (exclusive) of the random base fraction.
pub const RANDOM_BASE_MAX: f64 = 0.5;

/// A linear unit that was never trained: zero weights, zero bias.
#[derive(Debug, Clone, Default)]
pub struct UntrainedLinearUnit {
    weights: [f64; 4],
    bias: f64,
}

impl UntrainedLinearUnit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn evaluate(&self, features: &FeatureVector) -> f64 {
        self.weights
            .iter()
            .zip(features.as_slice())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }
}

/// Uniform random base fractions in [0, 0.5).
pub struct RandomBase {
    rng: Mutex<ChaCha20Rng>,
}

impl RandomBase {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Deterministic source for tests.
    #[must_use]
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::from_seed(seed)),
        }
    }

    /// Draw one base fraction.
    pub fn sample(&self) -> f64 {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.gen_range(0.0..RANDOM_BASE_MAX)
    }
}

impl Default for RandomBase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RandomBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomBase").finish_non_exhaustive()
    }
}

/// Degraded-mode predictor.
#[derive(Debug)]
pub enum FallbackPredictor {
    Untrained(UntrainedLinearUnit),
    Random(RandomBase),
}

impl FallbackPredictor {
    #[must_use]
    pub fn from_mode(mode: FallbackMode) -> Self {
        match mode {
            FallbackMode::Untrained => Self::Untrained(UntrainedLinearUnit::new()),
            FallbackMode::Random => Self::Random(RandomBase::new()),
        }
    }
}

impl Predictor for FallbackPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        Ok(match self {
            Self::Untrained(unit) => unit.evaluate(features),
            Self::Random(random) => random.sample(),
        })
    }

    fn kind(&self) -> PredictorKind {
        match self {
            Self::Untrained(_) => PredictorKind::UntrainedFallback,
            Self::Random(_) => PredictorKind::RandomFallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector([0.45, 0.45, 0.48, 0.6])
    }

    #[test]
    fn test_untrained_unit_predicts_zero() {
        let p = FallbackPredictor::from_mode(FallbackMode::Untrained);
        assert_eq!(p.kind(), PredictorKind::UntrainedFallback);
        let v = p.predict(&features()).expect("predict");
        assert!(v.abs() < f64::EPSILON);
    }

    #[test]
    fn test_random_base_stays_in_range() {
        let random = RandomBase::with_seed([7u8; 32]);
        for _ in 0..1000 {
            let v = random.sample();
            assert!((0.0..RANDOM_BASE_MAX).contains(&v));
        }
    }

    #[test]
    fn test_random_base_is_reproducible_with_seed() {
        let a = RandomBase::with_seed([1u8; 32]);
        let b = RandomBase::with_seed([1u8; 32]);
        for _ in 0..10 {
            assert!((a.sample() - b.sample()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_random_mode_kind() {
        let p = FallbackPredictor::from_mode(FallbackMode::Random);
        assert_eq!(p.kind(), PredictorKind::RandomFallback);
        assert!(p.kind().is_fallback());
        let v = p.predict(&features()).expect("predict");
        assert!((0.0..RANDOM_BASE_MAX).contains(&v));
    }
}
