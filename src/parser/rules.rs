//! Lexical well-formedness rules
//!
//! Six context rules sit between classification and parsing:
//!
//! 1. An operator sits between identifiers or constants.
//! 2. Two consecutive tokens never share a kind, except separators.
//! 3. Literals and constants follow an operator or the `return` keyword,
//!    unless they open the input or follow a separator.
//! 4. The last `;` comes before the last `}`.
//! 5. Brackets are balanced (checked on raw characters).
//! 6. The trimmed source starts with `{` and ends with `}`.
//!
//! Rules 6 and 5 run before tokenization, rules 1 to 3 once per emitted token,
//! and rule 4 after the last token. They are heuristics: they reject a superset
//! of malformed programs and some well-formed ones too.

use super::ast::SourceLocation;
use super::errors::{AnalysisError, Rule};
use super::lexer::{Token, TokenKind};
use tracing::debug;

fn violation(rule: Rule, message: String, location: SourceLocation) -> AnalysisError {
    debug!(rule = rule.number(), %message, "rule violated");
    AnalysisError::Rule {
        rule,
        message,
        location,
    }
}

fn is_operand(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::Constant)
}

/// Check rules 1 to 3 for `token`.
///
/// `previous` is the last accepted token (carried between calls by the
/// caller), `lookahead` the kind of the token that follows an operator.
pub fn check_token(
    token: &Token,
    previous: Option<&Token>,
    lookahead: Option<TokenKind>,
) -> Result<(), AnalysisError> {
    check_operator_placement(token, previous, lookahead)?;
    check_no_stutter(token, previous)?;
    check_literal_placement(token, previous)
}

/// Rule 1
fn check_operator_placement(
    token: &Token,
    previous: Option<&Token>,
    lookahead: Option<TokenKind>,
) -> Result<(), AnalysisError> {
    if token.kind != TokenKind::Operator {
        return Ok(());
    }

    match previous {
        Some(prev) if is_operand(prev.kind) => {}
        Some(prev) => {
            return Err(violation(
                Rule::OperatorPlacement,
                format!("operator '{}' follows {}", token.text, prev),
                token.location,
            ));
        }
        None => {
            return Err(violation(
                Rule::OperatorPlacement,
                format!("operator '{}' has no left operand", token.text),
                token.location,
            ));
        }
    }

    match lookahead {
        Some(kind) if is_operand(kind) => Ok(()),
        Some(kind) => Err(violation(
            Rule::OperatorPlacement,
            format!("operator '{}' is followed by {}", token.text, kind),
            token.location,
        )),
        None => Err(violation(
            Rule::OperatorPlacement,
            format!("operator '{}' has no right operand", token.text),
            token.location,
        )),
    }
}

/// Rule 2
fn check_no_stutter(token: &Token, previous: Option<&Token>) -> Result<(), AnalysisError> {
    match previous {
        Some(prev) if prev.kind == token.kind && token.kind != TokenKind::Separator => {
            Err(violation(
                Rule::NoStutter,
                format!("{} directly follows {}", token, prev),
                token.location,
            ))
        }
        _ => Ok(()),
    }
}

/// Rule 3. The `return` exemption compares the keyword's text as well as its
/// kind, so a dialect that spelled it differently would lose the exemption.
fn check_literal_placement(token: &Token, previous: Option<&Token>) -> Result<(), AnalysisError> {
    if !matches!(token.kind, TokenKind::Literal | TokenKind::Constant) {
        return Ok(());
    }

    let Some(prev) = previous else {
        return Ok(());
    };

    let allowed = match prev.kind {
        TokenKind::Separator | TokenKind::Operator => true,
        TokenKind::Keyword => prev.text == "return",
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(violation(
            Rule::LiteralPlacement,
            format!("{} cannot follow {}", token, prev),
            token.location,
        ))
    }
}

/// Rule 4. Only the last `;` and the last `}` are compared, so earlier
/// statements may still be unterminated.
pub fn check_terminator(tokens: &[Token], end: SourceLocation) -> Result<(), AnalysisError> {
    let last_semicolon = tokens.iter().rposition(|t| t.is_separator(";"));
    let last_brace = tokens.iter().rposition(|t| t.is_separator("}"));

    match (last_semicolon, last_brace) {
        (None, _) => Err(violation(
            Rule::TrailingTerminator,
            "missing ';'".to_string(),
            last_brace.map_or(end, |idx| tokens[idx].location),
        )),
        (Some(semi), Some(brace)) if semi > brace => Err(violation(
            Rule::TrailingTerminator,
            "last ';' comes after the closing '}'".to_string(),
            tokens[semi].location,
        )),
        _ => Ok(()),
    }
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// Rule 5: bracket balance over raw characters, string contents included.
pub fn check_balance(source: &str) -> Result<(), AnalysisError> {
    let mut stack: Vec<(char, usize)> = Vec::new();

    for (offset, ch) in source.char_indices() {
        match ch {
            '(' | '[' | '{' => stack.push((ch, offset)),
            ')' | ']' | '}' => match stack.pop() {
                Some((open, _)) if closing_for(open) == ch => {}
                Some((open, _)) => {
                    return Err(envelope(
                        Rule::BracketBalance,
                        format!("'{}' closed by '{}'", open, ch),
                        source,
                        offset,
                    ));
                }
                None => {
                    return Err(envelope(
                        Rule::BracketBalance,
                        format!("unmatched '{}'", ch),
                        source,
                        offset,
                    ));
                }
            },
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, offset)) => Err(envelope(
            Rule::BracketBalance,
            format!("'{}' is never closed", open),
            source,
            offset,
        )),
        None => Ok(()),
    }
}

/// Rule 5 as a predicate
pub fn is_balanced(source: &str) -> bool {
    check_balance(source).is_ok()
}

/// Rule 6: the trimmed source is wrapped in `{` ... `}`.
pub fn check_envelope(source: &str) -> Result<(), AnalysisError> {
    let trimmed = source.trim();
    let start = source.len() - source.trim_start().len();

    if !trimmed.starts_with('{') {
        return Err(envelope(
            Rule::Envelope,
            "source must start with '{'".to_string(),
            source,
            start,
        ));
    }
    if !trimmed.ends_with('}') {
        let last = start + trimmed.len().saturating_sub(1);
        return Err(envelope(
            Rule::Envelope,
            "source must end with '}'".to_string(),
            source,
            last,
        ));
    }
    Ok(())
}

fn envelope(rule: Rule, message: String, source: &str, offset: usize) -> AnalysisError {
    debug!(rule = rule.number(), %message, "envelope check failed");
    AnalysisError::Envelope {
        rule,
        message,
        location: SourceLocation::of_offset(source, offset),
    }
}
