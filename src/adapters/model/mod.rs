//! Model adapter: dense-layer predictor loaded from a JSON artifact.
//!
//! The artifact is a single dense unit over the four normalized features:
//!
//! ```json
//! {"input_dim": 4, "weights": [1.2, 0.8, 0.9, 1.1], "bias": -2.0, "activation": "sigmoid"}
//! ```
//!
//! The SHA-256 of the artifact bytes is kept as a fingerprint so the loaded
//! model can be identified in logs and on screen.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::FeatureVector;
use crate::ports::{Predictor, PredictorError, PredictorKind};

/// File name looked up when the model path is a directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Number of input features every artifact must accept.
pub const INPUT_DIM: usize = 4;

/// Output activation of the dense unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    #[default]
    Sigmoid,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// On-disk artifact layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub input_dim: usize,
    pub weights: Vec<f64>,
    pub bias: f64,
    #[serde(default)]
    pub activation: Activation,
}

impl ModelArtifact {
    fn validate(&self) -> Result<(), PredictorError> {
        if self.input_dim != INPUT_DIM {
            return Err(PredictorError::DimensionMismatch {
                expected: INPUT_DIM,
                got: self.input_dim,
            });
        }
        if self.weights.len() != self.input_dim {
            return Err(PredictorError::InvalidArtifact(format!(
                "weights length {} does not match input_dim {}",
                self.weights.len(),
                self.input_dim
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(PredictorError::InvalidArtifact(
                "weights and bias must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// A loaded, validated dense model.
#[derive(Debug, Clone)]
pub struct DenseModel {
    weights: [f64; INPUT_DIM],
    bias: f64,
    activation: Activation,
    fingerprint: String,
    source: PathBuf,
}

impl DenseModel {
    /// Load a model from a directory containing `model.json`, or from the
    /// file itself.
    ///
    /// # Errors
    /// Returns `ArtifactMissing` when no file exists at the resolved path,
    /// `InvalidArtifact`/`DimensionMismatch` when it cannot be used.
    pub fn load(model_path: &Path) -> Result<Self, PredictorError> {
        let path = if model_path.is_dir() {
            model_path.join(MODEL_FILE_NAME)
        } else {
            model_path.to_path_buf()
        };

        if !path.is_file() {
            return Err(PredictorError::ArtifactMissing(path.display().to_string()));
        }

        let bytes = std::fs::read(&path)
            .map_err(|e| PredictorError::InvalidArtifact(format!("{}: {e}", path.display())))?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| PredictorError::InvalidArtifact(format!("{}: {e}", path.display())))?;

        let model = Self::from_artifact(&artifact, sha256_hex(&bytes), path)?;
        tracing::info!(
            "Loaded model from {:?} (activation={:?}, fingerprint={})",
            model.source,
            model.activation,
            model.short_fingerprint()
        );
        Ok(model)
    }

    /// Build a model from an in-memory artifact.
    ///
    /// # Errors
    /// Returns an error if the artifact fails validation.
    pub fn from_artifact(
        artifact: &ModelArtifact,
        fingerprint: String,
        source: PathBuf,
    ) -> Result<Self, PredictorError> {
        artifact.validate()?;
        let mut weights = [0.0; INPUT_DIM];
        weights.copy_from_slice(&artifact.weights);
        Ok(Self {
            weights,
            bias: artifact.bias,
            activation: artifact.activation,
            fingerprint,
            source,
        })
    }

    /// First 12 hex characters of the artifact digest.
    #[must_use]
    pub fn short_fingerprint(&self) -> &str {
        let end = self.fingerprint.len().min(12);
        &self.fingerprint[..end]
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl Predictor for DenseModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        let z: f64 = self
            .weights
            .iter()
            .zip(features.as_slice())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        let y = self.activation.apply(z);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(PredictorError::Evaluation(format!(
                "non-finite output for features {:?}",
                features.as_slice()
            )))
        }
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::Model
    }

    fn fingerprint(&self) -> Option<String> {
        Some(self.short_fingerprint().to_string())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
