//! TUI module: Terminal User Interface using Ratatui.
//!
//! Three views share one session:
//! - Diagnosis: intake form and live risk assessment
//! - Patients: the intake log
//! - Analytics: aggregate statistics

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::ClinicalTheme;
pub use worker::{BootWorker, Poll, ScoringWorker, WorkerHandle};
