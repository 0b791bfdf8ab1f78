//! Token list pane rendering

use crate::parser::print::{token_line, TokenStyle};
use crate::parser::Token;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// What the token pane shows for the current submission
pub struct TokensRenderData<'a> {
    pub tokens: &'a [Token],
    /// True when the tokens were only classified, because analysis failed
    pub unvalidated: bool,
    pub style: TokenStyle,
}

/// Render the token pane
pub fn render_tokens_pane(
    frame: &mut Frame,
    area: Rect,
    data: Option<TokensRenderData>,
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

    let title = match &data {
        Some(data) if data.unvalidated => " Tokens (unvalidated) ",
        _ => " Tokens ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let placeholder = match &data {
        None => Some("(nothing analyzed yet)"),
        Some(d) if d.tokens.is_empty() => Some("(no tokens before the error)"),
        Some(_) => None,
    };
    let (Some(data), None) = (data, placeholder) else {
        let paragraph = Paragraph::new(placeholder.unwrap_or_default())
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    };

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let total_items = data.tokens.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let items: Vec<ListItem> = data
        .tokens
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|token| {
            let style = Style::default().fg(DEFAULT_THEME.token_color(token.kind));
            let style = if data.unvalidated {
                style.add_modifier(Modifier::DIM)
            } else {
                style
            };
            ListItem::new(token_line(token, data.style)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
