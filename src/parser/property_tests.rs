//! Property-based tests for the lexer, rules, and parser.
//!
//! 1. **Tokenization never panics** on arbitrary input
//! 2. **Lossless tokenization**: accepted token texts rebuild the non-whitespace source
//! 3. **One check per token**: the per-token rules see every token once, in order,
//!    with the previously accepted token
//! 4. **Idempotence**: re-tokenizing the texts joined by spaces gives the same tokens
//! 5. **Binary trees**: every parsed tree is a full binary tree
//! 6. **Balance symmetry**: a string is balanced iff its mirror image is

use proptest::prelude::*;

use super::lexer::{Classifier, Dialect, Lexer, Token, TokenKind};
use super::rules::{check_token, is_balanced};
use super::{analyze, AnalysisError};

// ============================================================================
// Generators
// ============================================================================

const OPERATORS: &[&str] = &["+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">="];

const WHITESPACE: &[&str] = &[" ", "  ", "\n", "\t", " \n "];

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
        .prop_filter("keywords are not identifiers", |s| {
            !Classifier::default().is_keyword(s)
        })
}

fn operand() -> impl Strategy<Value = String> {
    prop_oneof![identifier(), "[0-9]{1,4}".prop_map(|s| s)]
}

fn whitespace() -> impl Strategy<Value = String> {
    prop::sample::select(WHITESPACE).prop_map(str::to_string)
}

/// `name = operand (op operand)* ;`
fn statement() -> impl Strategy<Value = String> {
    (
        identifier(),
        operand(),
        prop::collection::vec((prop::sample::select(OPERATORS), operand()), 0..4),
        whitespace(),
    )
        .prop_map(|(name, first, rest, ws)| {
            let mut out = format!("{name}{ws}={ws}{first}");
            for (op, rhs) in rest {
                out.push_str(&format!("{ws}{op}{ws}{rhs}"));
            }
            out.push_str(&format!("{ws};"));
            out
        })
}

fn program() -> impl Strategy<Value = String> {
    (prop::collection::vec(statement(), 1..5), whitespace())
        .prop_map(|(statements, ws)| format!("{{{ws}{}{ws}}}", statements.join(ws.as_str())))
}

fn mirror(source: &str) -> String {
    source
        .chars()
        .rev()
        .map(|c| match c {
            '(' => ')',
            ')' => '(',
            '[' => ']',
            ']' => '[',
            '{' => '}',
            '}' => '{',
            other => other,
        })
        .collect()
}

fn kinds_and_texts(tokens: &[Token]) -> Vec<(TokenKind, String)> {
    tokens.iter().map(|t| (t.kind, t.text.clone())).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: arbitrary input yields tokens or an error, never a panic.
    #[test]
    fn tokenize_never_panics(input in "\\PC{0,200}") {
        let classifier = Classifier::new(Dialect::Scheme);
        let _ = Lexer::new(&input, &classifier).tokenize();
        let _ = Lexer::new(&input, &classifier).scan();
    }

    /// Property 2: concatenated token texts equal the source minus whitespace.
    #[test]
    fn tokenization_is_lossless(source in program()) {
        let classifier = Classifier::default();
        let tokens = Lexer::new(&source, &classifier).tokenize();
        prop_assert!(tokens.is_ok(), "rejected {:?}: {:?}", source, tokens);

        let joined: String = tokens.unwrap().iter().map(|t| t.text.as_str()).collect();
        let expected: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(joined, expected);
    }

    /// Property 3: the per-token check runs once per token, in emission order.
    #[test]
    fn check_runs_once_per_token(source in program()) {
        let classifier = Classifier::default();
        let mut calls: Vec<(String, Option<String>)> = Vec::new();
        let mut recording = |token: &Token, previous: Option<&Token>, next: Option<TokenKind>| {
            calls.push((token.text.clone(), previous.map(|p| p.text.clone())));
            check_token(token, previous, next)
        };

        let tokens = Lexer::new(&source, &classifier)
            .tokenize_with(&mut recording)
            .unwrap();

        prop_assert_eq!(calls.len(), tokens.len());
        for (idx, (text, previous)) in calls.iter().enumerate() {
            prop_assert_eq!(text, &tokens[idx].text);
            let expected_previous = idx.checked_sub(1).map(|p| tokens[p].text.clone());
            prop_assert_eq!(previous, &expected_previous);
        }
    }

    /// Property 4: joining token texts with single spaces re-tokenizes identically.
    #[test]
    fn retokenizing_is_idempotent(source in program()) {
        let classifier = Classifier::default();
        let first = Lexer::new(&source, &classifier).tokenize().unwrap();
        let respaced = first.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
        let second = Lexer::new(&respaced, &classifier).tokenize().unwrap();

        prop_assert_eq!(kinds_and_texts(&first), kinds_and_texts(&second));
    }

    /// Property 5: a parsed tree with n leaves has exactly 2n - 1 nodes.
    #[test]
    fn parsed_trees_are_full_binary(source in program()) {
        let analysis = analyze(&source, &Classifier::default());
        prop_assert!(analysis.is_ok(), "rejected {:?}: {:?}", source, analysis.as_ref().err());

        let ast = analysis.unwrap().ast;
        let mut leaves = 0;
        ast.walk(&mut |node, _| {
            if node.is_leaf() {
                leaves += 1;
            }
        });
        prop_assert_eq!(ast.node_count(), 2 * leaves - 1);
    }

    /// Property 6: balance is preserved by mirroring the string.
    #[test]
    fn balance_is_mirror_symmetric(input in "[(){}\\[\\]a ]{0,40}") {
        prop_assert_eq!(is_balanced(&input), is_balanced(&mirror(&input)));
    }

    /// Rule errors always point inside the source.
    #[test]
    fn error_locations_within_input(input in "[{}();=+a-c0-9 \"#]{0,60}") {
        if let Err(err) = analyze(&input, &Classifier::default()) {
            prop_assert!(err.location().offset <= input.len());
            if let AnalysisError::Lexical { ch, location } = err {
                prop_assert_eq!(input[location.offset..].chars().next(), Some(ch));
            }
        }
    }
}
