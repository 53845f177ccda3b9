//! Application layer: Use cases and services.
//!
//! This module wires the domain rules to the predictor port and holds the
//! session state the TUI drives.

mod analytics;
mod scoring;
mod session;

pub use analytics::{BmiBucket, HistoryStats};
pub use scoring::{ScoringOutcome, ScoringService};
pub use session::{
    Field, IntakeForm, PredictorDescriptor, StatusLog, SystemState, TriageSession, View,
    STATUS_CAPACITY,
};
