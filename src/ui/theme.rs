use crate::parser::TokenKind;
use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub identifier: Color,
    pub operator: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub symbol: Color, // Cyan for symbols
}

impl Theme {
    /// Foreground used for a token of the given kind
    pub fn token_color(&self, kind: TokenKind) -> Color {
        match kind {
            TokenKind::Keyword => self.keyword,
            TokenKind::Constant => self.number,
            TokenKind::Identifier => self.identifier,
            TokenKind::Literal => self.string,
            TokenKind::Symbol => self.symbol,
            TokenKind::Operator => self.operator,
            TokenKind::Separator => self.primary,
        }
    }
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    keyword: Color::Rgb(203, 166, 247),        // Mauve for keywords
    string: Color::Rgb(166, 227, 161),         // Green for literals
    number: Color::Rgb(250, 179, 135),         // Orange for constants
    identifier: Color::Rgb(205, 214, 244),     // Plain for identifiers
    operator: Color::Rgb(249, 226, 175),       // Yellow for operators
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for current line
    symbol: Color::Rgb(148, 226, 213),         // Cyan/teal for symbols
};
