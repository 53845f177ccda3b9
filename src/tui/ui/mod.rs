//! UI module: View components for the TUI.

pub mod analytics;
pub mod diagnosis;
pub mod patients;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::application::{SystemState, TriageSession, View};
use crate::tui::styles::ClinicalTheme;

/// Title bar with view tabs and the engine state badge.
pub fn render_header(f: &mut Frame, area: Rect, session: &TriageSession) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(24),
            Constraint::Min(0),
            Constraint::Length(30),
        ])
        .split(area);

    let brand = Paragraph::new(Line::from(vec![
        Span::styled(" Vital", ClinicalTheme::title()),
        Span::styled("IA", ClinicalTheme::focused()),
        Span::styled(" │ Triage", ClinicalTheme::text_secondary()),
    ]))
    .block(bottom_border());
    f.render_widget(brand, chunks[0]);

    let selected = View::ALL
        .iter()
        .position(|v| *v == session.view())
        .unwrap_or(0);
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("F{} {}", i + 1, v.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(ClinicalTheme::text_secondary())
        .highlight_style(ClinicalTheme::selected())
        .divider(Span::styled(" │ ", ClinicalTheme::text_muted()))
        .block(bottom_border());
    f.render_widget(tabs, chunks[1]);

    let (label, detail) = match session.state() {
        SystemState::Booting => ("● BOOTING", String::new()),
        SystemState::Processing => ("● PROCESSING", String::new()),
        SystemState::Ready | SystemState::Done => (
            "● ONLINE",
            session
                .predictor()
                .map(|p| format!(" {}", p.kind))
                .unwrap_or_default(),
        ),
    };
    let badge = Paragraph::new(Line::from(vec![
        Span::styled(label, ClinicalTheme::system_state(session.state())),
        Span::styled(detail, ClinicalTheme::text_muted()),
    ]))
    .block(bottom_border());
    f.render_widget(badge, chunks[2]);
}

/// The last few status messages.
pub fn render_status_log(f: &mut Frame, area: Rect, session: &TriageSession) {
    let lines: Vec<Line> = session
        .status()
        .iter()
        .map(|l| Line::from(Span::styled(l.to_string(), ClinicalTheme::accent())))
        .collect();

    let log = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" System Log ", ClinicalTheme::text_secondary()))
            .borders(Borders::ALL)
            .border_style(ClinicalTheme::border()),
    );
    f.render_widget(log, area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "DISCLAIMER: Indicative triage estimate only. It does not replace professional medical evaluation.",
        ClinicalTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ClinicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

fn bottom_border() -> Block<'static> {
    Block::default()
        .borders(Borders::BOTTOM)
        .border_style(ClinicalTheme::border())
}

/// Key hint footer line: pairs of (key, description).
pub(crate) fn key_hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, desc) in pairs {
        spans.push(Span::styled(format!("[{key}] "), ClinicalTheme::key_hint()));
        spans.push(Span::styled(format!("{desc}  "), ClinicalTheme::key_desc()));
    }
    Line::from(spans)
}
