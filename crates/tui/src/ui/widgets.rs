//! Single-line strips around the main panes.

use lectern_types::Section;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::theme;

const THROBBER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    if app.executing || app.navigator.is_loading_module() {
        spans.push(Span::styled(
            format!("{} ", THROBBER[app.throbber_idx % THROBBER.len()]),
            theme::key_style(),
        ));
    }
    spans.push(Span::styled("Lectern", theme::key_style()));
    let title = app
        .navigator
        .course()
        .map(|course| course.course_title.clone())
        .unwrap_or_else(|| app.key().course_id.clone());
    spans.push(Span::styled(format!("  {title}"), theme::text_style()));
    spans.push(Span::styled(format!("  user {}", app.key().user_id), theme::text_muted()));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Prev/next labels for the displayed step.
pub fn draw_step_nav(f: &mut Frame, area: Rect, app: &App) {
    let navigator = &app.navigator;
    if !navigator.section().shows_step_navigation() {
        return;
    }
    let mut spans = Vec::new();
    match navigator.prev_step() {
        Some(step) => spans.push(Span::styled(format!("← {}", step.label()), theme::text_style())),
        None => spans.push(Span::styled("← start of course", theme::text_muted())),
    }
    if let Some(cursor) = navigator.cursor() {
        spans.push(Span::styled(
            format!("   [{}/{}]   ", cursor + 1, navigator.steps().len()),
            theme::text_muted(),
        ));
    }
    match navigator.next_step() {
        Some(step) if step.is_locked_overview() => {
            spans.push(Span::styled(format!("{} (locked)", step.label()), theme::text_muted()));
        }
        Some(step) => spans.push(Span::styled(format!("{} →", step.label()), theme::text_style())),
        None => spans.push(Span::styled("end of course", theme::text_muted())),
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Key hints for the current section, or the pending status message.
pub fn draw_hints(f: &mut Frame, area: Rect, app: &App) {
    if let Some(status) = &app.status {
        f.render_widget(Paragraph::new(Line::styled(status.clone(), theme::warn_style())), area);
        return;
    }
    let keys: &[(&str, &str)] = match app.navigator.section() {
        Section::Home => &[
            ("↑/↓", " move  "),
            ("Enter", " open  "),
            ("Space", " expand  "),
            ("g", " grades  "),
            ("r", " reload  "),
            ("q", " quit"),
        ],
        Section::Grades => &[
            ("↑/↓", " move  "),
            ("Enter", " open assignment  "),
            ("h", " home  "),
            ("r", " reload  "),
            ("q", " quit"),
        ],
        Section::Module | Section::Lecture | Section::Assignment => &[
            ("p/←", " prev  "),
            ("n/→", " next  "),
            ("↑/↓", " move  "),
            ("Enter", " open  "),
            ("h", " home  "),
            ("g", " grades  "),
            ("q", " quit"),
        ],
    };
    let mut spans = vec![Span::styled("Hints: ", theme::text_muted())];
    for (key, label) in keys {
        spans.push(Span::styled(*key, theme::key_style()));
        spans.push(Span::styled(*label, theme::text_muted()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(theme::text_muted()), area);
}
