//! Triage session: all state behind the dashboard.
//!
//! The session is owned by the UI thread and only changes through the
//! action methods below. Background workers never touch it directly; their
//! results are handed back through `predictor_ready` and `complete_run`.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use zeroize::Zeroize;

use crate::adapters::export::{write_report, ClinicalReport};
use crate::domain::{seed_history, Condition, Gender, PatientRecord, ScoringInput};
use crate::ports::PredictorKind;
use crate::{Result, VitaliaError};

use super::analytics::HistoryStats;
use super::scoring::ScoringOutcome;

/// Maximum number of status lines kept.
pub const STATUS_CAPACITY: usize = 4;

/// Which dashboard view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Diagnosis,
    Patients,
    Analytics,
}

impl View {
    pub const ALL: [View; 3] = [View::Diagnosis, View::Patients, View::Analytics];

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Diagnosis => "Diagnosis",
            Self::Patients => "Patients",
            Self::Analytics => "Analytics",
        }
    }
}

/// Lifecycle of the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemState {
    #[default]
    Booting,
    Ready,
    Processing,
    Done,
}

/// Which predictor the engine ended up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorDescriptor {
    pub kind: PredictorKind,
    pub fingerprint: Option<String>,
}

/// Bounded list of status messages, oldest first.
#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    entries: VecDeque<String>,
}

impl StatusLog {
    pub fn push(&mut self, message: impl AsRef<str>) {
        if self.entries.len() == STATUS_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(format!("> {}", message.as_ref()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Intake form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Age,
    Glucose,
    Bmi,
    Pressure,
    Gender,
    Condition,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Age,
        Field::Glucose,
        Field::Bmi,
        Field::Pressure,
        Field::Gender,
        Field::Condition,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Glucose => "Glucose",
            Self::Bmi => "BMI",
            Self::Pressure => "Pressure",
            Self::Gender => "Gender",
            Self::Condition => "Comorbidity",
        }
    }

    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Age => "years",
            Self::Glucose => "mg/dL",
            Self::Bmi => "kg/m²",
            Self::Pressure => "mmHg systolic",
            Self::Gender => "←/→ to change",
            Self::Condition => "←/→ to change",
        }
    }

    /// True for free-text numeric fields.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Gender | Self::Condition)
    }

    #[must_use]
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Raw form values. Numeric fields stay as text until a run starts.
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    age: String,
    glucose: String,
    bmi: String,
    pressure: String,
    pub gender: Gender,
    pub condition: Condition,
}

impl IntakeForm {
    fn slot(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Age => Some(&mut self.age),
            Field::Glucose => Some(&mut self.glucose),
            Field::Bmi => Some(&mut self.bmi),
            Field::Pressure => Some(&mut self.pressure),
            Field::Gender | Field::Condition => None,
        }
    }

    /// Text shown for a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Age => &self.age,
            Field::Glucose => &self.glucose,
            Field::Bmi => &self.bmi,
            Field::Pressure => &self.pressure,
            Field::Gender => self.gender.label(),
            Field::Condition => self.condition.label(),
        }
    }

    /// Replace a field's text. Selector fields are parsed.
    ///
    /// # Errors
    /// Returns `UnknownGender`/`UnknownCondition` for unrecognized selector text.
    pub fn set_field(&mut self, field: Field, text: &str) -> Result<()> {
        match field {
            Field::Gender => self.gender = text.parse()?,
            Field::Condition => self.condition = text.parse()?,
            _ => {
                if let Some(slot) = self.slot(field) {
                    slot.zeroize();
                    slot.push_str(text);
                }
            }
        }
        Ok(())
    }

    /// Append one character typed into a numeric field.
    pub fn push_char(&mut self, field: Field, c: char) {
        if !(c.is_ascii_digit() || c == '.') {
            return;
        }
        if let Some(slot) = self.slot(field) {
            slot.push(c);
        }
    }

    pub fn pop_char(&mut self, field: Field) {
        if let Some(slot) = self.slot(field) {
            slot.pop();
        }
    }

    /// All numeric fields have text.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        Field::ALL
            .iter()
            .filter(|f| f.is_numeric())
            .all(|f| !self.value(*f).trim().is_empty())
    }

    /// Parse the form into a scoring request.
    ///
    /// # Errors
    /// Returns `Validation` naming the first empty or unparsable field.
    pub fn parse(&self) -> Result<ScoringInput> {
        let number = |field: Field| -> Result<f64> {
            let text = self.value(field).trim();
            if text.is_empty() {
                return Err(VitaliaError::Validation(format!("{} is required", field.label())));
            }
            text.parse::<f64>()
                .map_err(|_| VitaliaError::Validation(format!("{}: invalid number", field.label())))
        };
        ScoringInput::new(
            number(Field::Age)?,
            number(Field::Glucose)?,
            number(Field::Bmi)?,
            number(Field::Pressure)?,
            self.gender,
            self.condition,
        )
    }

    /// Fill every field with a typical outpatient profile.
    pub fn load_sample(&mut self) {
        let sample = [
            (Field::Age, "58"),
            (Field::Glucose, "145"),
            (Field::Bmi, "29.5"),
            (Field::Pressure, "138"),
        ];
        for (field, value) in sample {
            if let Some(slot) = self.slot(field) {
                slot.zeroize();
                slot.push_str(value);
            }
        }
        self.gender = Gender::Female;
        self.condition = Condition::Hypertension;
    }

    /// Wipe all text buffers and restore defaults.
    pub fn reset(&mut self) {
        self.zeroize_buffers();
        self.gender = Gender::default();
        self.condition = Condition::default();
    }

    fn zeroize_buffers(&mut self) {
        self.age.zeroize();
        self.glucose.zeroize();
        self.bmi.zeroize();
        self.pressure.zeroize();
    }
}

impl Drop for IntakeForm {
    fn drop(&mut self) {
        self.zeroize_buffers();
    }
}

/// Dashboard session state.
#[derive(Debug)]
pub struct TriageSession {
    view: View,
    form: IntakeForm,
    state: SystemState,
    predictor: Option<PredictorDescriptor>,
    outcome: Option<ScoringOutcome>,
    history: Vec<PatientRecord>,
    status: StatusLog,
}

impl Default for TriageSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TriageSession {
    /// Start a session with the demonstration history.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history(seed_history())
    }

    #[must_use]
    pub fn with_history(history: Vec<PatientRecord>) -> Self {
        let mut status = StatusLog::default();
        status.push("Initializing VitalIA Kernel v7.0...");
        Self {
            view: View::default(),
            form: IntakeForm::default(),
            state: SystemState::Booting,
            predictor: None,
            outcome: None,
            history,
            status,
        }
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    #[must_use]
    pub fn form(&self) -> &IntakeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut IntakeForm {
        &mut self.form
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.form.gender = gender;
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.form.condition = condition;
    }

    pub fn cycle_gender(&mut self) {
        self.form.gender = self.form.gender.toggled();
    }

    pub fn cycle_condition(&mut self, forward: bool) {
        self.form.condition = if forward {
            self.form.condition.next()
        } else {
            self.form.condition.prev()
        };
    }

    #[must_use]
    pub fn state(&self) -> SystemState {
        self.state
    }

    #[must_use]
    pub fn predictor(&self) -> Option<&PredictorDescriptor> {
        self.predictor.as_ref()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&ScoringOutcome> {
        self.outcome.as_ref()
    }

    /// Patient log, most recent first.
    #[must_use]
    pub fn history(&self) -> &[PatientRecord] {
        &self.history
    }

    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        HistoryStats::from_history(&self.history)
    }

    #[must_use]
    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    /// Add a line to the status log.
    pub fn log_status(&mut self, message: impl AsRef<str>) {
        self.status.push(message);
    }

    /// The predictor finished loading.
    pub fn predictor_ready(&mut self, descriptor: PredictorDescriptor) {
        if descriptor.kind.is_fallback() {
            self.status.push("Using simulator (model not found)");
        } else {
            self.status.push("Neural engine loaded.");
        }
        tracing::info!(
            "Predictor ready: {} {}",
            descriptor.kind,
            descriptor.fingerprint.as_deref().unwrap_or("")
        );
        self.predictor = Some(descriptor);
        if self.state == SystemState::Booting {
            self.state = SystemState::Ready;
        }
    }

    /// Whether a run could start right now.
    #[must_use]
    pub fn can_run(&self) -> bool {
        matches!(self.state, SystemState::Ready | SystemState::Done) && self.form.is_complete()
    }

    /// Validate the form and move to `Processing`.
    ///
    /// # Errors
    /// `NotReady` while booting, `RunInFlight` while processing, `Validation`
    /// when a numeric field is missing or malformed.
    pub fn begin_run(&mut self) -> Result<ScoringInput> {
        match self.state {
            SystemState::Booting => return Err(VitaliaError::NotReady),
            SystemState::Processing => return Err(VitaliaError::RunInFlight),
            SystemState::Ready | SystemState::Done => {}
        }
        let input = self.form.parse()?;

        self.state = SystemState::Processing;
        self.outcome = None;
        self.status.push("Processing biometric data...");
        Ok(input)
    }

    /// Store a finished run and prepend it to the history.
    pub fn complete_run(&mut self, outcome: ScoringOutcome) {
        if outcome.penalty > 0 {
            self.status.push(format!(
                "Pre-existing condition detected: +{}% risk",
                outcome.penalty
            ));
        }
        if outcome.substituted {
            self.status.push("Prediction failed; simulated base used");
        }

        let record = PatientRecord::from_run(
            &outcome.input,
            outcome.result.score,
            outcome.result.level,
        );
        tracing::info!(
            "Diagnosis complete for {}: {} ({}%)",
            record.id,
            outcome.result.level,
            outcome.result.score
        );
        self.history.insert(0, record);
        self.outcome = Some(outcome);
        self.state = SystemState::Done;
    }

    /// A run was lost (worker died). Return to `Ready`.
    pub fn fail_run(&mut self, message: &str) {
        tracing::warn!("Scoring run failed: {}", message);
        self.status.push(format!("Error: {message}"));
        if self.state == SystemState::Processing {
            self.state = SystemState::Ready;
        }
    }

    /// Write the current diagnosis as a PDF under `dir`.
    ///
    /// # Errors
    /// `NoResult` when no run has completed, otherwise export/IO errors.
    pub fn export_report(&mut self, dir: &Path) -> Result<PathBuf> {
        let outcome = self.outcome.as_ref().ok_or(VitaliaError::NoResult)?;
        let report = ClinicalReport::new(
            &outcome.input,
            &outcome.result,
            chrono::Local::now().date_naive(),
        );
        let path = write_report(&report, dir)?;
        self.status.push("Report exported.");
        Ok(path)
    }

    /// Clear the form and the current result.
    pub fn reset_form(&mut self) {
        self.form.reset();
        self.outcome = None;
        if self.state == SystemState::Done {
            self.state = SystemState::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FallbackPredictor;
    use crate::application::ScoringService;
    use crate::config::FallbackMode;
    use crate::domain::RiskLevel;
    use tempfile::tempdir;

    fn ready_session() -> TriageSession {
        let mut session = TriageSession::new();
        session.predictor_ready(PredictorDescriptor {
            kind: PredictorKind::UntrainedFallback,
            fingerprint: None,
        });
        session
    }

    fn fill(session: &mut TriageSession, values: [&str; 4]) {
        let form = session.form_mut();
        for (field, value) in [Field::Age, Field::Glucose, Field::Bmi, Field::Pressure]
            .into_iter()
            .zip(values)
        {
            form.set_field(field, value).expect("numeric field");
        }
    }

    fn service() -> ScoringService {
        ScoringService::new(Box::new(FallbackPredictor::from_mode(
            FallbackMode::Untrained,
        )))
    }

    #[test]
    fn test_starts_booting_with_seed_history() {
        let session = TriageSession::new();
        assert_eq!(session.state(), SystemState::Booting);
        assert_eq!(session.view(), View::Diagnosis);
        assert_eq!(session.history().len(), 5);
        assert!(!session.can_run());
    }

    #[test]
    fn test_cannot_run_while_booting() {
        let mut session = TriageSession::new();
        fill(&mut session, ["45", "90", "24", "120"]);
        assert!(!session.can_run());
        assert!(matches!(session.begin_run(), Err(VitaliaError::NotReady)));
    }

    #[test]
    fn test_cannot_run_with_empty_field() {
        let mut session = ready_session();
        fill(&mut session, ["45", "90", "", "120"]);
        assert!(!session.can_run());
        assert!(matches!(session.begin_run(), Err(VitaliaError::Validation(_))));
        assert_eq!(session.state(), SystemState::Ready);
    }

    #[test]
    fn test_full_run_prepends_history() {
        let mut session = ready_session();
        fill(&mut session, ["28", "85", "20", "110"]);
        session.set_condition(Condition::Asthma);
        assert!(session.can_run());

        let input = session.begin_run().expect("run starts");
        assert_eq!(session.state(), SystemState::Processing);
        assert!(!session.can_run());
        assert!(matches!(session.begin_run(), Err(VitaliaError::RunInFlight)));

        session.complete_run(service().score(&input));
        assert_eq!(session.state(), SystemState::Done);
        assert_eq!(session.history().len(), 6);

        let newest = &session.history()[0];
        assert!(newest.id.starts_with("PT-"));
        assert_eq!(newest.risk_score, 45);
        assert_eq!(newest.risk_level, RiskLevel::ModerateChronic);
        assert!(session
            .status()
            .iter()
            .any(|l| l == "> Pre-existing condition detected: +10% risk"));
    }

    #[test]
    fn test_status_log_is_bounded() {
        let mut session = ready_session();
        for i in 0..10 {
            session.log_status(format!("message {i}"));
        }
        assert_eq!(session.status().len(), STATUS_CAPACITY);
        let lines: Vec<&str> = session.status().iter().collect();
        assert_eq!(lines.first(), Some(&"> message 6"));
        assert_eq!(lines.last(), Some(&"> message 9"));
    }

    #[test]
    fn test_set_field_replaces_text() {
        let mut form = IntakeForm::default();
        form.set_field(Field::Age, "45").expect("set");
        form.set_field(Field::Age, "7").expect("set");
        assert_eq!(form.value(Field::Age), "7");

        form.set_field(Field::Condition, "diabetes_t2").expect("set");
        assert_eq!(form.condition, Condition::DiabetesT2);
        assert!(matches!(
            form.set_field(Field::Condition, "Gout"),
            Err(VitaliaError::UnknownCondition(_))
        ));
        assert!(matches!(
            form.set_field(Field::Gender, "other"),
            Err(VitaliaError::UnknownGender(_))
        ));
    }

    #[test]
    fn test_push_char_filters_input() {
        let mut form = IntakeForm::default();
        for c in "2a4.-5".chars() {
            form.push_char(Field::Bmi, c);
        }
        assert_eq!(form.value(Field::Bmi), "24.5");
        form.pop_char(Field::Bmi);
        assert_eq!(form.value(Field::Bmi), "24.");
        form.push_char(Field::Gender, '1');
        assert_eq!(form.value(Field::Gender), "Male");
    }

    #[test]
    fn test_malformed_number_rejected() {
        let mut session = ready_session();
        fill(&mut session, ["4.5.1", "90", "24", "120"]);
        assert!(session.can_run());
        assert!(matches!(session.begin_run(), Err(VitaliaError::Validation(_))));
    }

    #[test]
    fn test_fail_run_returns_to_ready() {
        let mut session = ready_session();
        fill(&mut session, ["45", "90", "24", "120"]);
        session.begin_run().expect("run starts");
        session.fail_run("worker disconnected");
        assert_eq!(session.state(), SystemState::Ready);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_cycle_selectors() {
        let mut session = ready_session();
        session.cycle_gender();
        assert_eq!(session.form().gender, Gender::Female);
        session.cycle_condition(true);
        assert_eq!(session.form().condition, Condition::DiabetesT2);
        session.cycle_condition(false);
        session.cycle_condition(false);
        assert_eq!(session.form().condition, Condition::Arrhythmia);
    }

    #[test]
    fn test_export_requires_result() {
        let temp = tempdir().expect("tempdir");
        let mut session = ready_session();
        assert!(matches!(
            session.export_report(temp.path()),
            Err(VitaliaError::NoResult)
        ));

        fill(&mut session, ["45", "90", "24", "120"]);
        let input = session.begin_run().expect("run starts");
        session.complete_run(service().score(&input));
        let path = session.export_report(temp.path()).expect("export");
        assert!(path.exists());
    }

    #[test]
    fn test_reset_form_clears_result() {
        let mut session = ready_session();
        session.form_mut().load_sample();
        assert!(session.form().is_complete());
        let input = session.begin_run().expect("run starts");
        session.complete_run(service().score(&input));

        session.reset_form();
        assert!(!session.form().is_complete());
        assert!(session.outcome().is_none());
        assert_eq!(session.state(), SystemState::Ready);
        assert_eq!(session.form().condition, Condition::None);
    }
}
