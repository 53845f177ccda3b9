//! Patients view: the in-memory intake log.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::domain::PatientRecord;
use crate::tui::styles::ClinicalTheme;

use super::key_hints;

pub fn render_patients(f: &mut Frame, area: Rect, history: &[PatientRecord], selected: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);

    let header = Row::new(
        ["ID", "Date", "Age", "Gender", "Comorbidity", "Glucose", "BMI", "Pressure", "Risk", "Level"]
            .into_iter()
            .map(|h| Cell::from(h).style(ClinicalTheme::focused())),
    )
    .height(1)
    .bottom_margin(1);

    let rows = history.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.id.clone()).style(ClinicalTheme::text_secondary()),
            Cell::from(r.date.format("%Y-%m-%d").to_string()),
            Cell::from(format!("{}", r.age)),
            Cell::from(r.gender.label()),
            Cell::from(r.condition.label()),
            Cell::from(format!("{}", r.glucose)),
            Cell::from(format!("{}", r.bmi)),
            Cell::from(format!("{}", r.pressure)),
            Cell::from(format!("{}%", r.risk_score)),
            Cell::from(r.risk_level.label()).style(ClinicalTheme::risk_level(r.risk_level)),
        ])
        .style(ClinicalTheme::text())
    });

    let widths = [
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(13),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Min(18),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" Patient Log ({}) ", history.len()),
                    ClinicalTheme::title(),
                ))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .row_highlight_style(ClinicalTheme::selected())
        .highlight_symbol("› ");

    let mut state = TableState::default();
    if !history.is_empty() {
        state.select(Some(selected.min(history.len() - 1)));
    }
    f.render_stateful_widget(table, chunks[0], &mut state);

    let footer = Paragraph::new(key_hints(&[
        ("↑↓", "Scroll"),
        ("F1", "Diagnosis"),
        ("F3", "Analytics"),
        ("Esc", "Back"),
    ]));
    f.render_widget(footer, chunks[1]);

    if history.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No patients recorded yet.",
            ClinicalTheme::text_muted(),
        )));
        f.render_widget(empty, chunks[0].inner(ratatui::layout::Margin::new(2, 3)));
    }
}
