//! Diagnosis view: intake form on the left, live result on the right.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::{Field, SystemState, TriageSession};
use crate::tui::styles::ClinicalTheme;

use super::{key_hints, render_status_log};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Per-frame UI state that is not part of the session.
pub struct DiagnosisViewState<'a> {
    pub focus: Field,
    pub notice: Option<&'a str>,
    pub tick: usize,
}

pub fn render_diagnosis(
    f: &mut Frame,
    area: Rect,
    session: &TriageSession,
    view: &DiagnosisViewState<'_>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Fields
            Constraint::Length(6), // Status log
            Constraint::Length(3), // Footer
        ])
        .split(columns[0]);

    render_form(f, left[0], session, view.focus);
    render_status_log(f, left[1], session);
    render_footer(f, left[2], session, view.notice);
    render_result(f, columns[1], session, view.tick);
}

fn render_form(f: &mut Frame, area: Rect, session: &TriageSession, focus: Field) {
    let block = Block::default()
        .title(Span::styled(" Patient Intake ", ClinicalTheme::title()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let constraints: Vec<Constraint> = Field::ALL
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let form = session.form();
    for (i, field) in Field::ALL.iter().enumerate() {
        let is_focused = *field == focus;
        let (border_style, title_style) = if is_focused {
            (ClinicalTheme::border_focused(), ClinicalTheme::focused())
        } else {
            (ClinicalTheme::border(), ClinicalTheme::text_secondary())
        };

        let value = form.value(*field);
        let mut spans = vec![Span::raw(" ")];
        if field.is_numeric() {
            if value.is_empty() {
                spans.push(Span::styled(field.hint(), ClinicalTheme::text_muted()));
            } else {
                spans.push(Span::styled(value.to_string(), ClinicalTheme::text()));
            }
            if is_focused {
                spans.push(Span::styled("▌", ClinicalTheme::accent()));
            }
        } else {
            spans.push(Span::styled(
                if is_focused { "◀ " } else { "  " },
                ClinicalTheme::accent(),
            ));
            spans.push(Span::styled(value.to_string(), ClinicalTheme::text()));
            spans.push(Span::styled(
                if is_focused { " ▶" } else { "" },
                ClinicalTheme::accent(),
            ));
        }

        let widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(Span::styled(format!(" {} ", field.label()), title_style))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        f.render_widget(widget, rows[i]);
    }
}

fn render_footer(f: &mut Frame, area: Rect, session: &TriageSession, notice: Option<&str>) {
    let content = match notice {
        Some(msg) => Line::from(vec![
            Span::styled("! ", ClinicalTheme::warning()),
            Span::styled(msg.to_string(), ClinicalTheme::warning()),
        ]),
        None if session.can_run() => key_hints(&[
            ("Enter", "Run"),
            ("↑↓", "Field"),
            ("^S", "Sample"),
            ("^E", "Export"),
            ("Esc", "Clear"),
        ]),
        None => key_hints(&[("↑↓", "Field"), ("←→", "Select"), ("^S", "Sample"), ("^Q", "Quit")]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicalTheme::border()),
    );
    f.render_widget(footer, area);
}

fn render_result(f: &mut Frame, area: Rect, session: &TriageSession, tick: usize) {
    let block = Block::default()
        .title(Span::styled(" Risk Assessment ", ClinicalTheme::title()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(outcome) = session.outcome() else {
        let message = match session.state() {
            SystemState::Booting => Line::from(Span::styled(
                format!("{} Loading neural engine...", SPINNER[tick % SPINNER.len()]),
                ClinicalTheme::warning(),
            )),
            SystemState::Processing => Line::from(Span::styled(
                format!("{} Analyzing biometrics...", SPINNER[tick % SPINNER.len()]),
                ClinicalTheme::accent(),
            )),
            SystemState::Ready | SystemState::Done => Line::from(Span::styled(
                "Fill in the intake form and press Enter.",
                ClinicalTheme::text_muted(),
            )),
        };
        let waiting = Paragraph::new(vec![Line::from(""), Line::from(""), message])
            .alignment(Alignment::Center);
        f.render_widget(waiting, inner);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Score + level
            Constraint::Length(3), // Recommendation
            Constraint::Min(8),    // Feature bars
            Constraint::Length(1), // Predictor
        ])
        .margin(1)
        .split(inner);

    let result = &outcome.result;
    let level_style = ClinicalTheme::risk_level(result.level);
    let headline = Paragraph::new(vec![
        Line::from(Span::styled(format!("{}%", result.score), level_style)),
        Line::from(Span::styled(result.level.label(), level_style)),
        Line::from(Span::styled(
            format!(
                "base {}% + penalty {}%",
                outcome.base_percentage, outcome.penalty
            ),
            ClinicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(headline, rows[0]);

    let recommendation = Paragraph::new(Line::from(Span::styled(
        result.recommendation.clone(),
        ClinicalTheme::text(),
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(recommendation, rows[1]);

    let bar_color = ClinicalTheme::risk_color(result.level);
    let bars: Vec<Bar> = outcome
        .features
        .chart_points()
        .into_iter()
        .map(|p| {
            let value = p.value.clamp(0.0, 100.0).round() as u64;
            Bar::default()
                .value(value)
                .label(Line::from(p.label))
                .text_value(format!("{value}"))
                .style(Style::default().fg(bar_color))
        })
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Biometric Profile (% of scale) ",
                    ClinicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(ClinicalTheme::border()),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2)
        .max(100)
        .value_style(ClinicalTheme::title());
    f.render_widget(chart, rows[2]);

    let predictor = Paragraph::new(Line::from(vec![
        Span::styled("Predictor: ", ClinicalTheme::text_muted()),
        Span::styled(outcome.predictor.label(), ClinicalTheme::text_secondary()),
        Span::styled(
            if outcome.substituted {
                " (simulated base)"
            } else {
                ""
            },
            ClinicalTheme::warning(),
        ),
    ]));
    f.render_widget(predictor, rows[3]);
}
