//! # VitalIA
//!
//! Clinical triage dashboard with rule-based risk scoring.
//!
//! This crate provides:
//! - Risk scoring: predictor base score plus comorbidity rules
//! - An in-memory patient log with aggregate statistics
//! - PDF export of a single diagnosis
//! - Terminal UI
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types and the scoring rules
//! - `ports`: The `Predictor` trait
//! - `adapters`: Model artifact, fallbacks, PDF export, log sanitizing
//! - `application`: Scoring service, session state, analytics
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{RiskLevel, ScoringInput, ScoringResult};

/// Result type for VitalIA operations
pub type Result<T> = std::result::Result<T, VitaliaError>;

/// Main error type for VitalIA
#[derive(Debug, thiserror::Error)]
pub enum VitaliaError {
    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Unknown comorbidity: {0:?}")]
    UnknownCondition(String),

    #[error("Unknown gender: {0:?}")]
    UnknownGender(String),

    #[error("System is still booting")]
    NotReady,

    #[error("A scoring run is already in progress")]
    RunInFlight,

    #[error("No diagnosis available")]
    NoResult,

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
