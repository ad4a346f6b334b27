//! Theme and styling for the Lectern TUI.
//!
//! A dark theme with a single blue accent. Locked content is rendered muted
//! and grades use the pass/fail colors.

use ratatui::style::{Color, Modifier, Style};

/// Accent color for highlights and focus indicators.
pub const ACCENT: Color = Color::Rgb(8, 171, 237);

/// Primary foreground color for normal text.
pub const FG: Color = Color::Rgb(224, 224, 230);

/// Muted foreground color for hints, labels and locked content.
pub const FG_MUTED: Color = Color::Rgb(168, 168, 175);

pub const BORDER: Color = Color::Rgb(72, 72, 80);
pub const BORDER_FOCUS: Color = ACCENT;

/// Failing grades, fetch errors and lock notices.
pub const WARN: Color = Color::Rgb(220, 96, 110);

/// Passing grades.
pub const OK: Color = Color::Rgb(92, 196, 132);

/// Border style based on focus state.
pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BORDER_FOCUS)
    } else {
        Style::default().fg(BORDER)
    }
}

/// Muted bold style for titles, headers and prominent labels.
pub fn title_style() -> Style {
    Style::default().fg(FG_MUTED).add_modifier(Modifier::BOLD)
}

pub fn text_style() -> Style {
    Style::default().fg(FG)
}

pub fn text_muted() -> Style {
    Style::default().fg(FG_MUTED)
}

/// Key names in the hint bar.
pub fn key_style() -> Style {
    title_style().fg(ACCENT)
}

pub fn warn_style() -> Style {
    Style::default().fg(WARN)
}

/// Selected list items: accent + bold, no fill.
pub fn list_highlight_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Score color for a grade.
pub fn grade_style(passing: bool) -> Style {
    Style::default().fg(if passing { OK } else { WARN })
}
