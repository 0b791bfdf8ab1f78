//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and its cursor helpers. The
//! grammar itself lives in `expressions`, which extends [`Parser`] with an
//! `impl` block:
//!
//! ```text
//! Program    := Expression <end>
//! Expression := Term (Operator Term)*          every operator except * / %
//! Term       := Factor (Operator Factor)*      * / %
//! Factor     := Constant | Identifier | Block | Group
//! Block      := '{' Sequence '}'
//! Sequence   := Expression (';' Expression)* ';'?
//! Group      := '(' Expression ')'
//! ```
//!
//! The cursor only moves forward; one token of lookahead is enough for every
//! decision, so the parser never backtracks.

use crate::parser::ast::{AstNode, SourceLocation};
use crate::parser::errors::{AnalysisError, Expected, Found};
use crate::parser::lexer::{Classifier, Lexer, Token, TokenKind};
use tracing::debug;

/// Deepest run of `{` and `(` a factor may open. Every level costs several
/// stack frames across Factor, Sequence, Expression and Term.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Recursive descent parser over a validated token sequence
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Blocks and groups currently open
    nesting_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            nesting_depth: 0,
        }
    }

    /// Tokenize and validate `source`, then prepare to parse it
    pub fn from_source(source: &str, classifier: &Classifier) -> Result<Self, AnalysisError> {
        let tokens = Lexer::new(source, classifier).tokenize()?;
        Ok(Self::new(tokens))
    }

    /// Parse the entire token sequence into a single tree
    pub fn parse_program(&mut self) -> Result<AstNode, AnalysisError> {
        let root = self.parse_expression()?;

        if !self.is_at_end() {
            return Err(self.error(Expected::EndOfInput));
        }

        debug!(nodes = root.node_count(), depth = root.depth(), "parsed program");
        Ok(root)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub(crate) fn check_separator(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is_separator(text))
    }

    pub(crate) fn match_separator(&mut self, text: &str) -> Option<Token> {
        if self.check_separator(text) {
            self.advance()
        } else {
            None
        }
    }

    /// Consume the next token if it is an operator accepted by `level`
    pub(crate) fn match_operator(&mut self, level: fn(&str) -> bool) -> Option<Token> {
        let is_match = self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Operator && level(&t.text));
        if is_match {
            self.advance()
        } else {
            None
        }
    }

    pub(crate) fn expect_separator(&mut self, text: &'static str) -> Result<Token, AnalysisError> {
        self.match_separator(text)
            .ok_or_else(|| self.error(Expected::Separator(text)))
    }

    /// Count one more open block or group, failing at the bracket that goes
    /// past [`MAX_NESTING_DEPTH`]. Pair every `Ok` with [`Self::leave_nesting`].
    pub(crate) fn enter_nesting(&mut self) -> Result<(), AnalysisError> {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            return Err(self.error(Expected::ShallowerNesting));
        }
        self.nesting_depth += 1;
        Ok(())
    }

    pub(crate) fn leave_nesting(&mut self) {
        debug_assert!(self.nesting_depth > 0, "leave_nesting without enter_nesting");
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    /// Syntax error at the cursor
    pub(crate) fn error(&self, expected: Expected) -> AnalysisError {
        let (found, location) = match self.peek() {
            Some(token) => (
                Found::Token {
                    kind: token.kind,
                    text: token.text.clone(),
                },
                token.location,
            ),
            None => (Found::EndOfInput, self.end_location()),
        };
        debug!(index = self.position, %expected, %found, "syntax error");
        AnalysisError::Syntax {
            expected,
            found,
            index: self.position,
            location,
        }
    }

    /// Location just past the last token
    fn end_location(&self) -> SourceLocation {
        match self.tokens.last() {
            Some(last) => SourceLocation::new(
                last.location.offset + last.text.len(),
                last.location.line,
                last.location.column + last.text.chars().count(),
            ),
            None => SourceLocation::start(),
        }
    }
}

/// Parse an already tokenized sequence
pub fn parse(tokens: Vec<Token>) -> Result<AstNode, AnalysisError> {
    Parser::new(tokens).parse_program()
}
