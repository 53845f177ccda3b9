//! Adapters layer: Concrete implementations of ports.
//!
//! - `model`: dense predictor loaded from a JSON artifact
//! - `fallback`: degraded-mode predictors
//! - `export`: PDF clinical report
//! - `sanitize`: identifier filtering for logs

pub mod export;
pub mod fallback;
pub mod model;
pub mod sanitize;

use crate::config::AppConfig;
use crate::domain::FeatureVector;
use crate::ports::{Predictor, PredictorError, PredictorKind};

pub use fallback::{FallbackPredictor, RandomBase};
pub use model::DenseModel;

/// The predictor chosen at startup.
#[derive(Debug)]
pub enum PredictorHandle {
    Model(DenseModel),
    Fallback(FallbackPredictor),
}

impl PredictorHandle {
    /// Load the model artifact, or select the configured fallback.
    ///
    /// Never fails: a missing or invalid artifact is logged and replaced.
    #[must_use]
    pub fn load(config: &AppConfig) -> Self {
        match DenseModel::load(&config.model_path) {
            Ok(model) => Self::Model(model),
            Err(e) => {
                tracing::warn!(
                    "Predictor unavailable ({}); using {:?} fallback",
                    e,
                    config.fallback
                );
                Self::Fallback(FallbackPredictor::from_mode(config.fallback))
            }
        }
    }
}

impl Predictor for PredictorHandle {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        match self {
            Self::Model(m) => m.predict(features),
            Self::Fallback(f) => f.predict(features),
        }
    }

    fn kind(&self) -> PredictorKind {
        match self {
            Self::Model(m) => m.kind(),
            Self::Fallback(f) => f.kind(),
        }
    }

    fn fingerprint(&self) -> Option<String> {
        match self {
            Self::Model(m) => m.fingerprint(),
            Self::Fallback(f) => f.fingerprint(),
        }
    }
}
