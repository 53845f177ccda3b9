//! Main TUI application state machine.
//!
//! Handles:
//! - View navigation
//! - Input event handling
//! - Background predictor boot and scoring runs

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::FallbackPredictor;
use crate::application::{
    Field, PredictorDescriptor, ScoringOutcome, ScoringService, TriageSession, View,
};
use crate::config::AppConfig;

use super::ui::{
    analytics::render_analytics,
    diagnosis::{render_diagnosis, DiagnosisViewState},
    patients::render_patients,
    render_disclaimer, render_header,
};
use super::worker::{BootWorker, Poll, ScoringWorker, WorkerHandle};

/// Main application state
pub struct App {
    config: AppConfig,
    session: TriageSession,

    /// Scoring service, present once the boot worker finished
    service: Option<Arc<ScoringService>>,

    boot_worker: Option<WorkerHandle<Arc<ScoringService>>>,
    scoring_worker: Option<WorkerHandle<ScoringOutcome>>,

    /// Focused intake field
    focus: Field,

    /// Selected row in the patient table
    patient_row: usize,

    /// One-line message under the form (errors, export path)
    notice: Option<String>,

    /// Frame counter for spinners
    tick: usize,

    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: TriageSession::new(),
            service: None,
            boot_worker: None,
            scoring_worker: None,
            focus: Field::Age,
            patient_row: 0,
            notice: None,
            tick: 0,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn session(&self) -> &TriageSession {
        &self.session
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        self.boot_worker = Some(BootWorker::spawn(self.config.clone())?);

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_workers();
            self.tick = self.tick.wrapping_add(1);

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(2),
                        Constraint::Min(0),
                        Constraint::Length(2),
                    ])
                    .split(f.area());

                render_header(f, chunks[0], &self.session);
                match self.session.view() {
                    View::Diagnosis => render_diagnosis(
                        f,
                        chunks[1],
                        &self.session,
                        &DiagnosisViewState {
                            focus: self.focus,
                            notice: self.notice.as_deref(),
                            tick: self.tick / 4,
                        },
                    ),
                    View::Patients => {
                        render_patients(f, chunks[1], self.session.history(), self.patient_row)
                    }
                    View::Analytics => render_analytics(f, chunks[1], &self.session.stats()),
                }
                render_disclaimer(f, chunks[2]);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Collect results from background workers.
    fn poll_workers(&mut self) {
        if let Some(worker) = &self.boot_worker {
            match worker.poll() {
                Poll::Pending => {}
                Poll::Ready(service) => {
                    self.boot_worker = None;
                    self.attach_service(service);
                }
                Poll::Lost => {
                    self.boot_worker = None;
                    tracing::error!("Boot worker stopped; starting with fallback predictor");
                    let fallback = FallbackPredictor::from_mode(self.config.fallback);
                    self.attach_service(Arc::new(ScoringService::new(Box::new(fallback))));
                }
            }
        }

        if let Some(worker) = &self.scoring_worker {
            match worker.poll() {
                Poll::Pending => {}
                Poll::Ready(outcome) => {
                    self.scoring_worker = None;
                    self.session.complete_run(outcome);
                }
                Poll::Lost => {
                    self.scoring_worker = None;
                    self.session.fail_run("scoring worker stopped unexpectedly");
                }
            }
        }
    }

    fn attach_service(&mut self, service: Arc<ScoringService>) {
        self.session.predictor_ready(PredictorDescriptor {
            kind: service.predictor_kind(),
            fingerprint: service.predictor_fingerprint(),
        });
        self.service = Some(service);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, ctrl) {
            (KeyCode::Char('q'), true) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::F(n @ 1..=3), _) => {
                self.switch_view(usize::from(n - 1));
                return;
            }
            (KeyCode::Char('e'), true) => {
                self.export();
                return;
            }
            _ => {}
        }

        match self.session.view() {
            View::Diagnosis => self.handle_form_key(key.code, ctrl),
            View::Patients => self.handle_patients_key(key.code),
            View::Analytics => self.handle_analytics_key(key.code),
        }
    }

    fn switch_view(&mut self, idx: usize) {
        if let Some(view) = View::ALL.get(idx) {
            self.session.set_view(*view);
        }
    }

    fn handle_form_key(&mut self, key: KeyCode, ctrl: bool) {
        let field = self.focus;
        match key {
            KeyCode::Char('s') if ctrl => {
                self.session.form_mut().load_sample();
                self.notice = None;
            }
            KeyCode::Up | KeyCode::BackTab => self.focus = field.prev(),
            KeyCode::Down | KeyCode::Tab => self.focus = field.next(),
            KeyCode::Left | KeyCode::Right => {
                let forward = key == KeyCode::Right;
                match field {
                    Field::Gender => self.session.cycle_gender(),
                    Field::Condition => self.session.cycle_condition(forward),
                    _ => {}
                }
            }
            KeyCode::Char(c) if !ctrl => {
                self.session.form_mut().push_char(field, c);
                self.notice = None;
            }
            KeyCode::Backspace => self.session.form_mut().pop_char(field),
            KeyCode::Delete => {
                if field.is_numeric() {
                    let _ = self.session.form_mut().set_field(field, "");
                }
            }
            KeyCode::Enter => self.start_run(),
            KeyCode::Esc => {
                if self.scoring_worker.is_none() {
                    self.session.reset_form();
                    self.focus = Field::Age;
                    self.notice = None;
                }
            }
            _ => {}
        }
    }

    fn handle_patients_key(&mut self, key: KeyCode) {
        let len = self.session.history().len();
        match key {
            KeyCode::Up => self.patient_row = self.patient_row.saturating_sub(1),
            KeyCode::Down => {
                if self.patient_row + 1 < len {
                    self.patient_row += 1;
                }
            }
            KeyCode::Char(c @ '1'..='3') => self.switch_view(usize::from(c as u8 - b'1')),
            KeyCode::Esc => self.session.set_view(View::Diagnosis),
            _ => {}
        }
    }

    fn handle_analytics_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c @ '1'..='3') => self.switch_view(usize::from(c as u8 - b'1')),
            KeyCode::Esc => self.session.set_view(View::Diagnosis),
            _ => {}
        }
    }

    fn start_run(&mut self) {
        let Some(service) = self.service.clone() else {
            self.notice = Some("Engine is still booting".to_string());
            return;
        };

        let input = match self.session.begin_run() {
            Ok(input) => input,
            Err(e) => {
                self.notice = Some(e.to_string());
                return;
            }
        };
        self.notice = None;

        match ScoringWorker::spawn(service, input, self.config.scoring_delay) {
            Ok(worker) => self.scoring_worker = Some(worker),
            Err(e) => self.session.fail_run(&format!("cannot start scoring: {e}")),
        }
    }

    fn export(&mut self) {
        match self.session.export_report(&self.config.export_dir) {
            Ok(path) => self.notice = Some(format!("Saved {}", path.display())),
            Err(e) => {
                tracing::warn!("Export failed: {}", e);
                self.notice = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SystemState;
    use crate::config::FallbackMode;
    use crate::domain::{Condition, Gender};
    use std::time::Instant;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn booted_app(export_dir: &std::path::Path) -> App {
        let config = AppConfig {
            scoring_delay: Duration::ZERO,
            export_dir: export_dir.to_path_buf(),
            ..AppConfig::default()
        };
        let mut app = App::new(config);
        let fallback = FallbackPredictor::from_mode(FallbackMode::Untrained);
        app.attach_service(Arc::new(ScoringService::new(Box::new(fallback))));
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn wait_for_result(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.session.state() == SystemState::Processing {
            assert!(Instant::now() < deadline, "run did not finish");
            std::thread::sleep(Duration::from_millis(5));
            app.poll_workers();
        }
    }

    #[test]
    fn test_function_keys_switch_views() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = booted_app(temp.path());
        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.session.view(), View::Patients);
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.session.view(), View::Analytics);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.session.view(), View::Diagnosis);
    }

    #[test]
    fn test_digits_edit_form_not_views() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = booted_app(temp.path());
        type_text(&mut app, "2");
        assert_eq!(app.session.view(), View::Diagnosis);
        assert_eq!(app.session.form().value(Field::Age), "2");
    }

    #[test]
    fn test_selectors_cycle_with_arrows() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = booted_app(temp.path());
        for _ in 0..4 {
            app.handle_key(key(KeyCode::Down));
        }
        assert_eq!(app.focus, Field::Gender);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.form().gender, Gender::Female);

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.session.form().condition, Condition::DiabetesT2);
    }

    #[test]
    fn test_enter_runs_and_records_patient() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = booted_app(temp.path());
        for value in ["45", "90", "24", "120"] {
            type_text(&mut app, value);
            app.handle_key(key(KeyCode::Down));
        }
        app.handle_key(key(KeyCode::Enter));
        wait_for_result(&mut app);

        assert_eq!(app.session.state(), SystemState::Done);
        assert_eq!(app.session.history().len(), 6);
        let outcome = app.session.outcome().expect("outcome");
        assert_eq!(outcome.result.score, 0);
    }

    #[test]
    fn test_enter_with_missing_fields_shows_notice() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = booted_app(temp.path());
        app.handle_key(key(KeyCode::Enter));
        assert!(app.notice.is_some());
        assert_eq!(app.session.state(), SystemState::Ready);
    }

    #[test]
    fn test_sample_then_export() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = booted_app(temp.path());

        app.handle_key(ctrl('e'));
        assert!(app.notice.is_some());

        app.handle_key(ctrl('s'));
        assert!(app.session.can_run());
        app.handle_key(key(KeyCode::Enter));
        wait_for_result(&mut app);

        app.handle_key(ctrl('e'));
        assert!(temp
            .path()
            .join(crate::adapters::export::REPORT_FILENAME)
            .exists());
    }

    #[test]
    fn test_ctrl_q_quits() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = booted_app(temp.path());
        app.handle_key(ctrl('q'));
        assert!(app.should_quit);
    }
}
