//! Dashboard color palette and styles.
//!
//! Dark slate background with a cyan accent; risk colors come straight from
//! `RiskLevel::color` so the TUI and the exported report agree.

use ratatui::style::{Color, Modifier, Style};

use crate::application::SystemState;
use crate::domain::RiskLevel;

/// Dashboard theme.
pub struct ClinicalTheme;

impl ClinicalTheme {
    /// Cyan accent
    pub const ACCENT: Color = Color::Rgb(34, 211, 238); // #22D3EE

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(245, 158, 11); // #F59E0B
    pub const DANGER: Color = Color::Rgb(239, 68, 68); // #EF4444

    pub const BG_DARK: Color = Color::Rgb(2, 6, 23); // #020617
    pub const BORDER: Color = Color::Rgb(51, 65, 85); // #334155

    pub const TEXT_PRIMARY: Color = Color::Rgb(241, 245, 249); // #F1F5F9
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn accent() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Active tab / selected row
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Terminal color for a risk level.
    #[must_use]
    pub fn risk_color(level: RiskLevel) -> Color {
        let (r, g, b) = level.color();
        Color::Rgb(r, g, b)
    }

    #[must_use]
    pub fn risk_level(level: RiskLevel) -> Style {
        Style::default()
            .fg(Self::risk_color(level))
            .add_modifier(Modifier::BOLD)
    }

    /// Indicator style for the engine state badge.
    #[must_use]
    pub fn system_state(state: SystemState) -> Style {
        match state {
            SystemState::Booting => Self::warning(),
            SystemState::Ready | SystemState::Done => Self::success(),
            SystemState::Processing => Self::accent().add_modifier(Modifier::SLOW_BLINK),
        }
    }
}
