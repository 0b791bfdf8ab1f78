//! # Introduction
//!
//! bracelang checks and parses programs in a small bracket-delimited
//! expression language. Source text is classified into tokens, every token is
//! validated against a fixed set of placement rules, and the token stream is
//! parsed into a binary syntax tree of operator applications.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Envelope checks → Classifier → Rules → Tokens → Parser → AST
//! ```
//!
//! 1. [`parser`]: classification, rule validation, parsing and printing.
//! 2. [`session`]: runs the pipeline for each submitted program and keeps a
//!    history of results.
//! 3. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Language
//!
//! A program is a `{ ... }` block whose statements end in `;`. Statements are
//! built from identifiers, decimal constants, `( ... )` groups and nested
//! blocks joined by binary operators (`+ - * / % = == != < <= > >=`).
//! Keywords come from the selected [`parser::Dialect`].

pub mod parser;
pub mod session;
pub mod ui;
