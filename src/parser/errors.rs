//! Error types for the analysis pipeline
//!
//! Every stage is fail-fast: the first problem ends the pass and is reported
//! as a single [`AnalysisError`]. None of these are fatal to the process; the
//! caller decides whether to ask for new input.

use super::ast::SourceLocation;
use super::lexer::TokenKind;
use std::fmt;
use thiserror::Error;

/// The six lexical well-formedness rules enforced around tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    OperatorPlacement,
    NoStutter,
    LiteralPlacement,
    TrailingTerminator,
    BracketBalance,
    Envelope,
}

impl Rule {
    pub fn number(self) -> u8 {
        match self {
            Rule::OperatorPlacement => 1,
            Rule::NoStutter => 2,
            Rule::LiteralPlacement => 3,
            Rule::TrailingTerminator => 4,
            Rule::BracketBalance => 5,
            Rule::Envelope => 6,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Rule::OperatorPlacement => {
                "an operator must sit between identifiers or constants"
            }
            Rule::NoStutter => "consecutive tokens may not share a kind",
            Rule::LiteralPlacement => {
                "literals and constants must open the input, follow a separator, \
                 or follow an operator or 'return'"
            }
            Rule::TrailingTerminator => {
                "the last statement must end with ';' before the closing '}'"
            }
            Rule::BracketBalance => "brackets must be balanced",
            Rule::Envelope => "source must start with '{' and end with '}'",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} ({})", self.number(), self.description())
    }
}

/// What the parser was looking for when it failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// A constant, identifier, or opening bracket
    Factor,
    /// A specific separator such as `}` or `)`
    Separator(&'static str),
    /// Nothing: all tokens should have been consumed
    EndOfInput,
    /// Fewer open blocks and groups than the parser allows
    ShallowerNesting,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Factor => write!(f, "CONSTANT, IDENTIFIER, '{{' or '('"),
            Expected::Separator(s) => write!(f, "SEPARATOR '{}'", s),
            Expected::EndOfInput => write!(f, "end of input"),
            Expected::ShallowerNesting => write!(
                f,
                "at most {} nested blocks or groups",
                super::parse::MAX_NESTING_DEPTH
            ),
        }
    }
}

/// The token the parser found instead, or the end of the sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Token { kind: TokenKind, text: String },
    EndOfInput,
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Token { kind, text } => write!(f, "{} '{}'", kind, text),
            Found::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// Errors produced while turning source text into an AST
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Start/end brace or bracket balance pre-check failed (rules 6 and 5)
    #[error("Envelope error at line {}, column {}: {rule}: {message}", .location.line, .location.column)]
    Envelope {
        rule: Rule,
        message: String,
        location: SourceLocation,
    },

    /// A character that matches none of the token patterns
    #[error("Lexical error at line {}, column {} (offset {}): unexpected character '{ch}'", .location.line, .location.column, .location.offset)]
    Lexical { ch: char, location: SourceLocation },

    /// One of the token-level rules (1 to 4) failed
    #[error("Rule violation at line {}, column {}: {rule}: {message}", .location.line, .location.column)]
    Rule {
        rule: Rule,
        message: String,
        location: SourceLocation,
    },

    /// The token sequence is not derivable from the grammar
    #[error("Syntax error at token {index} (line {}, column {}): expected {expected}, found {found}", .location.line, .location.column)]
    Syntax {
        expected: Expected,
        found: Found,
        index: usize,
        location: SourceLocation,
    },
}

impl AnalysisError {
    pub fn location(&self) -> SourceLocation {
        match self {
            AnalysisError::Envelope { location, .. }
            | AnalysisError::Lexical { location, .. }
            | AnalysisError::Rule { location, .. }
            | AnalysisError::Syntax { location, .. } => *location,
        }
    }

    /// The violated rule, if this error comes from one of the six rules
    pub fn rule(&self) -> Option<Rule> {
        match self {
            AnalysisError::Envelope { rule, .. } | AnalysisError::Rule { rule, .. } => {
                Some(*rule)
            }
            AnalysisError::Lexical { .. } | AnalysisError::Syntax { .. } => None,
        }
    }

    /// Short category name used by the status bar
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::Envelope { .. } => "envelope",
            AnalysisError::Lexical { .. } => "lexical",
            AnalysisError::Rule { .. } => "rule",
            AnalysisError::Syntax { .. } => "syntax",
        }
    }
}
