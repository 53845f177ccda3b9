//! Analytics view: aggregate statistics over the patient log.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Sparkline},
    Frame,
};

use crate::application::{BmiBucket, HistoryStats};
use crate::tui::styles::ClinicalTheme;

use super::key_hints;

pub fn render_analytics(f: &mut Frame, area: Rect, stats: &HistoryStats) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // KPIs
            Constraint::Min(8),    // Charts
            Constraint::Length(7), // Gauges + trend
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_kpis(f, chunks[0], stats);
    render_charts(f, chunks[1], stats);
    render_bottom_row(f, chunks[2], stats);

    let footer = Paragraph::new(key_hints(&[
        ("F1", "Diagnosis"),
        ("F2", "Patients"),
        ("Esc", "Back"),
    ]));
    f.render_widget(footer, chunks[3]);
}

fn render_kpis(f: &mut Frame, area: Rect, stats: &HistoryStats) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let kpis = [
        ("Total Patients", stats.total.to_string(), ClinicalTheme::text()),
        ("Average Age", format!("{} yrs", stats.average_age), ClinicalTheme::text()),
        ("Critical Cases", stats.critical.to_string(), ClinicalTheme::danger()),
        ("Avg Risk", format!("{:.1}%", stats.average_risk), ClinicalTheme::warning()),
    ];

    for (cell, (title, value, style)) in cells.iter().zip(kpis) {
        let widget = Paragraph::new(Line::from(Span::styled(value, style)))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(Span::styled(format!(" {title} "), ClinicalTheme::text_secondary()))
                    .borders(Borders::ALL)
                    .border_style(ClinicalTheme::border()),
            );
        f.render_widget(widget, *cell);
    }
}

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(format!(" {title} "), ClinicalTheme::text_secondary()))
        .borders(Borders::ALL)
        .border_style(ClinicalTheme::border())
}

fn bars<'a>(data: &'a [(String, u64)], style: Style) -> Vec<Bar<'a>> {
    data.iter()
        .map(|(label, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.as_str()))
                .style(style)
        })
        .collect()
}

fn render_charts(f: &mut Frame, area: Rect, stats: &HistoryStats) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(45),
            Constraint::Percentage(30),
        ])
        .split(area);

    let gender = vec![
        ("Male".to_string(), stats.male as u64),
        ("Female".to_string(), stats.female as u64),
    ];
    let gender_bars = bars(&gender, ClinicalTheme::accent());
    f.render_widget(
        BarChart::default()
            .block(chart_block("Gender"))
            .data(BarGroup::default().bars(&gender_bars))
            .bar_width(7)
            .bar_gap(2),
        columns[0],
    );

    let comorbidity: Vec<(String, u64)> = stats
        .comorbidities
        .iter()
        .map(|(c, n)| (short_label(c.label()), *n as u64))
        .collect();
    let comorbidity_bars = bars(&comorbidity, ClinicalTheme::warning());
    f.render_widget(
        BarChart::default()
            .block(chart_block("Comorbidities"))
            .data(BarGroup::default().bars(&comorbidity_bars))
            .bar_width(6)
            .bar_gap(1),
        columns[1],
    );

    let bmi: Vec<(String, u64)> = BmiBucket::ALL
        .iter()
        .zip(stats.bmi_distribution)
        .map(|(b, n)| (b.label().to_string(), n as u64))
        .collect();
    let bmi_bars = bars(&bmi, ClinicalTheme::success());
    f.render_widget(
        BarChart::default()
            .block(chart_block("BMI Distribution"))
            .data(BarGroup::default().bars(&bmi_bars))
            .bar_width(6)
            .bar_gap(1),
        columns[2],
    );
}

fn render_bottom_row(f: &mut Frame, area: Rect, stats: &HistoryStats) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let gauges = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(columns[0]);

    let critical_pct = (stats.critical_ratio() * 100.0).clamp(0.0, 100.0);
    f.render_widget(
        Gauge::default()
            .block(chart_block("Critical Share"))
            .gauge_style(ClinicalTheme::danger())
            .percent(critical_pct.round() as u16)
            .label(format!("{critical_pct:.0}%")),
        gauges[0],
    );

    let risk_pct = stats.average_risk.clamp(0.0, 100.0);
    f.render_widget(
        Gauge::default()
            .block(chart_block("Average Risk"))
            .gauge_style(ClinicalTheme::warning())
            .percent(risk_pct.round() as u16)
            .label(format!("{risk_pct:.1}%")),
        gauges[1],
    );

    let counts: Vec<u64> = stats.trend.iter().map(|(_, n)| *n as u64).collect();
    let range = match (stats.trend.first(), stats.trend.last()) {
        (Some((first, _)), Some((last, _))) => {
            format!("Intake Trend {} → {}", first.format("%m-%d"), last.format("%m-%d"))
        }
        _ => "Intake Trend".to_string(),
    };
    f.render_widget(
        Sparkline::default()
            .block(chart_block(&range))
            .data(&counts)
            .style(ClinicalTheme::accent()),
        columns[1],
    );
}

/// Fit condition labels under narrow bars.
fn short_label(label: &str) -> String {
    label.chars().take(6).collect()
}
