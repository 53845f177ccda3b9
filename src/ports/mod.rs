//! Ports layer: Trait definitions for external operations.
//!
//! The scoring rules only ever talk to a `Predictor`; where its numbers come
//! from is an adapter concern.

mod predictor;

pub use predictor::{Predictor, PredictorError, PredictorKind};
