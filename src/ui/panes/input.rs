//! Input pane rendering with per-token highlighting
//!
//! The buffer is coloured by running the classifier over it directly rather
//! than through the full tokenizer, so half-typed programs that break a rule
//! still highlight. Characters no pattern accepts are shown in the error
//! colour, and the location of the last analysis error is marked.

use crate::parser::{Classifier, SourceLocation, TokenKind};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::ops::Range;

/// What a stretch of the input buffer is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Token(TokenKind),
    Blank,
    Unknown,
}

/// Split `source` into highlighted stretches covering every byte
pub fn segments(source: &str, classifier: &Classifier) -> Vec<(Range<usize>, SegmentKind)> {
    let mut out = Vec::new();
    let mut offset = 0;

    while let Some(ch) = source[offset..].chars().next() {
        if ch.is_whitespace() {
            let len = source[offset..]
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(source.len() - offset);
            out.push((offset..offset + len, SegmentKind::Blank));
            offset += len;
            continue;
        }

        match classifier.classify(source, offset, SourceLocation::start()) {
            Some((token, end)) => {
                out.push((offset..end, SegmentKind::Token(token.kind)));
                offset = end;
            }
            None => {
                let end = offset + ch.len_utf8();
                out.push((offset..end, SegmentKind::Unknown));
                offset = end;
            }
        }
    }

    out
}

fn segment_style(kind: SegmentKind) -> Style {
    match kind {
        SegmentKind::Token(kind) => Style::default().fg(DEFAULT_THEME.token_color(kind)),
        SegmentKind::Blank => Style::default(),
        SegmentKind::Unknown => Style::default()
            .fg(DEFAULT_THEME.error)
            .add_modifier(Modifier::UNDERLINED),
    }
}

/// Build the highlighted lines; `error_at` is the byte offset to mark
fn highlight<'a>(source: &'a str, classifier: &Classifier, error_at: Option<usize>) -> Vec<Line<'a>> {
    let error_style = Style::default()
        .bg(DEFAULT_THEME.error)
        .fg(DEFAULT_THEME.current_line_bg)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![Vec::new()];
    for (range, kind) in segments(source, classifier) {
        let style = if error_at.is_some_and(|at| range.contains(&at)) {
            error_style
        } else {
            segment_style(kind)
        };

        let mut pieces = source[range].split('\n');
        if let Some(first) = pieces.next() {
            if !first.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.push(Span::styled(first, style));
                }
            }
        }
        for piece in pieces {
            let mut line = Vec::new();
            if !piece.is_empty() {
                line.push(Span::styled(piece, style));
            }
            lines.push(line);
        }
    }

    // Errors at end of input point one past the last character
    if error_at == Some(source.len()) {
        if let Some(line) = lines.last_mut() {
            line.push(Span::styled(" ", error_style));
        }
    }

    lines.into_iter().map(Line::from).collect()
}

/// Row and column (in characters) of byte offset `cursor`
fn cursor_position(source: &str, cursor: usize) -> (u16, u16) {
    let before = &source[..cursor.min(source.len())];
    let row = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let col = before[line_start..].chars().count();
    (row as u16, col as u16)
}

/// Render the input pane
pub fn render_input_pane(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    cursor: usize,
    classifier: &Classifier,
    error_at: Option<usize>,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let title = format!(" Program ({}) ", classifier.dialect().name());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let (row, col) = cursor_position(source, cursor);
    let visible_height = area.height.saturating_sub(2).max(1);
    let scroll = row.saturating_sub(visible_height - 1);

    let paragraph = Paragraph::new(highlight(source, classifier, error_at))
        .block(block)
        .style(Style::default().fg(DEFAULT_THEME.fg))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    if is_focused {
        frame.set_cursor_position(Position::new(
            area.x + 1 + col,
            area.y + 1 + row - scroll,
        ));
    }
}
