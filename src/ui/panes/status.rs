//! Status bar rendering with keybindings and analysis state

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Summary of the session shown on the left of the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    /// Zero-based position in the history, with the history length
    pub position: Option<(usize, usize)>,
    /// Error category of the current submission, if it failed
    pub error_category: Option<&'static str>,
}

/// Render the status bar at the bottom.
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let position_text = match data.position {
        Some((current, total)) => format!(" Program {}/{} ", current + 1, total),
        None => " Program -/- ".to_string(),
    };

    let badge_bg = match (data.position, data.error_category) {
        (None, _) => DEFAULT_THEME.primary,
        (Some(_), Some(_)) => DEFAULT_THEME.error,
        (Some(_), None) => DEFAULT_THEME.success,
    };

    let mut left_spans = vec![
        Span::styled(
            position_text,
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
    ];
    if let Some(category) = data.error_category {
        left_spans.push(Span::styled(
            format!(" {} ", category.to_uppercase()),
            Style::default()
                .bg(DEFAULT_THEME.secondary)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }
    left_spans.push(Span::styled(
        format!(" {} ", data.message),
        Style::default()
            .bg(DEFAULT_THEME.current_line_bg)
            .fg(if data.error_category.is_some() {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.fg
            }),
    ));

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    // Right side: Keybinds with visual grouping
    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let right_spans = vec![
        Span::styled(" ↵ ", key_style),
        Span::styled(" analyze ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" history/scroll ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" ⇥ ", key_style),
        Span::styled(" focus ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ", desc_style),
        Span::styled(" esc ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
