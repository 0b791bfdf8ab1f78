//! Expression language front end
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Classification and tokenization (source text → tokens)
//! - [`rules`]: The six lexical well-formedness rules
//! - [`parse`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//! - [`print`]: Token and tree dumps
//! - [`errors`]: The error taxonomy shared by every stage
//!
//! # Language
//!
//! A program is a `{ ... }` block of `;`-terminated expressions built from
//! identifiers, decimal constants, and binary operators. Keywords, string
//! literals, and symbols are recognised by the lexer but the parser only
//! builds trees from operands and operators.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, Expression → Term → Factor.
//! No external parser generator dependencies.

pub mod ast;
pub mod errors;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod print;
pub mod rules;

#[cfg(test)]
mod property_tests;

pub use ast::{AstNode, SourceLocation};
pub use errors::{AnalysisError, Rule};
pub use lexer::{Classifier, Dialect, Lexer, Token, TokenKind};
pub use parse::Parser;

/// A program that made it through every stage
#[derive(Debug, Clone)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub ast: AstNode,
}

/// Run the whole pipeline: envelope checks, tokenization with rule
/// validation, then parsing.
pub fn analyze(source: &str, classifier: &Classifier) -> Result<Analysis, AnalysisError> {
    let tokens = Lexer::new(source, classifier).tokenize()?;
    let mut parser = Parser::new(tokens);
    let ast = parser.parse_program()?;
    Ok(Analysis {
        tokens: parser.into_tokens(),
        ast,
    })
}
