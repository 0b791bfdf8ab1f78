//! Expression parsing implementation
//!
//! Three mutually recursive levels, each a left fold: every `Operator X`
//! repetition wraps the tree built so far as the left child of a new binary
//! node, so `a - b - c` becomes `((a - b) - c)`.
//!
//! - Expression: every operator that is not multiplicative, bound uniformly
//! - Term: `*`, `/`, `%`
//! - Factor: constants, identifiers, `{ ... }` blocks, `( ... )` groups
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::AstNode;
use crate::parser::errors::{AnalysisError, Expected};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use tracing::trace;

fn is_multiplicative(op: &str) -> bool {
    matches!(op, "*" | "/" | "%")
}

fn is_additive_or_relational(op: &str) -> bool {
    !is_multiplicative(op)
}

impl Parser {
    /// Expression := Term (Operator Term)*
    pub(crate) fn parse_expression(&mut self) -> Result<AstNode, AnalysisError> {
        let mut left = self.parse_term()?;

        while let Some(op) = self.match_operator(is_additive_or_relational) {
            let right = self.parse_term()?;
            trace!(op = %op.text, "expression node");
            left = AstNode::binary(&op, left, right);
        }

        Ok(left)
    }

    /// Term := Factor (Operator Factor)*
    fn parse_term(&mut self) -> Result<AstNode, AnalysisError> {
        let mut left = self.parse_factor()?;

        while let Some(op) = self.match_operator(is_multiplicative) {
            let right = self.parse_factor()?;
            trace!(op = %op.text, "term node");
            left = AstNode::binary(&op, left, right);
        }

        Ok(left)
    }

    /// Factor := Constant | Identifier | '{' Sequence '}' | '(' Expression ')'
    fn parse_factor(&mut self) -> Result<AstNode, AnalysisError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error(Expected::Factor));
        };

        match token.kind {
            TokenKind::Constant | TokenKind::Identifier => {
                self.advance();
                Ok(AstNode::leaf(&token))
            }
            TokenKind::Separator if token.text == "{" => {
                self.enter_nesting()?;
                self.advance();
                let inner = self
                    .parse_sequence()
                    .and_then(|inner| self.expect_separator("}").map(|_| inner));
                self.leave_nesting();
                inner
            }
            TokenKind::Separator if token.text == "(" => {
                self.enter_nesting()?;
                self.advance();
                let inner = self
                    .parse_expression()
                    .and_then(|inner| self.expect_separator(")").map(|_| inner));
                self.leave_nesting();
                inner
            }
            _ => Err(self.error(Expected::Factor)),
        }
    }

    /// Sequence := Expression (';' Expression)* ';'?
    ///
    /// Statements fold into `;` nodes; a lone statement is returned unwrapped.
    fn parse_sequence(&mut self) -> Result<AstNode, AnalysisError> {
        let mut left = self.parse_expression()?;

        while let Some(semicolon) = self.match_separator(";") {
            if self.check_separator("}") {
                break;
            }
            let right = self.parse_expression()?;
            left = AstNode::binary(&semicolon, left, right);
        }

        Ok(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_levels() {
        for op in ["*", "/", "%"] {
            assert!(is_multiplicative(op));
            assert!(!is_additive_or_relational(op));
        }
        for op in ["+", "-", "=", "==", "!=", "<", "<=", ">", ">="] {
            assert!(is_additive_or_relational(op));
        }
    }
}
