//! AST pane rendering
//!
//! Shows the indented dump of the current tree, or the error that stopped
//! the analysis.

use crate::parser::print::{node_label, TreeStyle};
use crate::parser::{AnalysisError, AstNode};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

const INDENT: &str = "  ";

fn tree_lines(root: &AstNode, style: TreeStyle) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(root.node_count());
    root.walk(&mut |node, depth| {
        let label_style = Style::default().fg(DEFAULT_THEME.token_color(node.kind));
        let label_style = if node.is_leaf() {
            label_style
        } else {
            label_style.add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::styled(INDENT.repeat(depth), Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(node_label(node, style), label_style),
        ]));
    });
    lines
}

fn error_lines(error: &AnalysisError) -> Vec<Line<'static>> {
    let location = error.location();
    vec![
        Line::from(Span::styled(
            format!("{} error", error.category()),
            Style::default()
                .fg(DEFAULT_THEME.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(DEFAULT_THEME.fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "at line {}, column {} (offset {})",
                location.line, location.column, location.offset
            ),
            Style::default().fg(DEFAULT_THEME.comment),
        )),
    ]
}

/// Render the AST pane
pub fn render_tree_pane(
    frame: &mut Frame,
    area: Rect,
    outcome: Option<Result<&AstNode, &AnalysisError>>,
    style: TreeStyle,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Syntax Tree ")
        .borders(Borders::ALL)
        .border_style(border_style)
        .padding(Padding::new(1, 0, 0, 0));

    let lines = match outcome {
        None => {
            let paragraph = Paragraph::new("(press Enter to analyze)")
                .block(block)
                .style(Style::default().fg(DEFAULT_THEME.comment));
            frame.render_widget(paragraph, area);
            return;
        }
        Some(Ok(root)) => tree_lines(root, style),
        Some(Err(error)) => {
            *scroll_offset = 0;
            let paragraph = Paragraph::new(error_lines(error))
                .block(block)
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if lines.len() > visible_height {
        *scroll_offset = (*scroll_offset).min(lines.len() - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((*scroll_offset as u16, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::{scan, Dialect};
    use crate::parser::parse::parse;

    #[test]
    fn test_tree_lines_match_printer() {
        let root = parse(scan("{ x = y * 2 ; }", Dialect::Scheme).unwrap()).unwrap();
        let rendered: Vec<String> = tree_lines(&root, TreeStyle::KindValue)
            .iter()
            .map(|line| line.to_string())
            .collect();

        assert_eq!(
            rendered,
            crate::parser::print::render_tree(&root, TreeStyle::KindValue)
        );
    }
}
