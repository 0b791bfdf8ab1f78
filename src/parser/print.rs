//! Text renderings of token sequences and trees
//!
//! Used by `--print` mode and by the TUI panes.

use super::ast::AstNode;
use super::lexer::Token;

/// Layout of a token listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TokenStyle {
    /// `KIND<text>`
    #[default]
    Inline,
    /// `KIND        text`, kinds padded to a column
    Table,
}

/// Layout of one tree dump line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TreeStyle {
    /// `<kind> <value>`
    #[default]
    KindValue,
    /// `<value>:<kind>`
    ValueKind,
}

const INDENT: &str = "  ";

// Width of the longest kind name, "IDENTIFIER"
const KIND_WIDTH: usize = 10;

pub fn token_line(token: &Token, style: TokenStyle) -> String {
    match style {
        TokenStyle::Inline => token.to_string(),
        TokenStyle::Table => format!("{:<width$}  {}", token.kind, token.text, width = KIND_WIDTH),
    }
}

pub fn render_tokens(tokens: &[Token], style: TokenStyle) -> Vec<String> {
    tokens.iter().map(|t| token_line(t, style)).collect()
}

pub fn node_label(node: &AstNode, style: TreeStyle) -> String {
    match style {
        TreeStyle::KindValue => format!("{} {}", node.kind, node.value),
        TreeStyle::ValueKind => format!("{}:{}", node.value, node.kind),
    }
}

/// Depth-first dump, parents before children, two spaces per level
pub fn render_tree(root: &AstNode, style: TreeStyle) -> Vec<String> {
    let mut lines = Vec::with_capacity(root.node_count());
    root.walk(&mut |node, depth| {
        lines.push(format!("{}{}", INDENT.repeat(depth), node_label(node, style)));
    });
    lines
}
