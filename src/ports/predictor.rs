//! Predictor port: Trait for base risk estimation.
//!
//! This trait abstracts where the base risk fraction comes from (a loaded
//! model artifact or a fallback) from the scoring rules.

use crate::domain::FeatureVector;

/// Errors raised while loading or evaluating a predictor.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    #[error("Model artifact not found: {0}")]
    ArtifactMissing(String),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Expected {expected} input features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Prediction failed: {0}")]
    Evaluation(String),
}

/// Which kind of predictor produced a base score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorKind {
    /// Weights loaded from a model artifact
    Model,
    /// Untrained linear unit (always predicts zero)
    UntrainedFallback,
    /// Uniform random base in [0, 0.5)
    RandomFallback,
}

impl PredictorKind {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::Model)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::UntrainedFallback => "untrained fallback",
            Self::RandomFallback => "random fallback",
        }
    }
}

impl std::fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trait for base-score predictors.
///
/// Implementations map the normalized feature vector to a risk fraction
/// nominally in [0, 1]. Callers must treat the output as best-effort: a
/// fallback predictor carries no clinical meaning.
pub trait Predictor: Send + Sync {
    /// Predict the base risk fraction.
    ///
    /// # Errors
    /// Returns `PredictorError::Evaluation` if the prediction cannot be made.
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError>;

    /// Describe which predictor this is.
    fn kind(&self) -> PredictorKind;

    /// Short fingerprint of the underlying artifact, if any.
    fn fingerprint(&self) -> Option<String> {
        None
    }
}
