//! Lexer (tokenizer) for the expression language
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Classification is an ordered table of patterns, tried in precedence order at
//! the current offset; the first one that matches decides the token kind.
//! Every emitted token is checked against the rules in [`super::rules`]
//! before it is accepted.

use super::ast::SourceLocation;
use super::errors::AnalysisError;
use super::rules;
use rustc_hash::FxHashSet;
use std::fmt;
use tracing::{debug, trace};

/// The seven token categories, in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Constant,
    Identifier,
    Literal,
    Symbol,
    Operator,
    Separator,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Constant => "CONSTANT",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Literal => "LITERAL",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Separator => "SEPARATOR",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A classified lexical unit with its exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_separator(&self, text: &str) -> bool {
        self.is(TokenKind::Separator, text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.kind, self.text)
    }
}

/// Language variant selecting the keyword set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Dialect {
    /// Scheme-flavoured keywords (`define`, `lambda`, `set!`, ...)
    #[default]
    Scheme,
    /// C-flavoured keywords (`int`, `float`, `return`, ...)
    C,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Scheme => "scheme",
            Dialect::C => "c",
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Dialect::Scheme => &[
                "define", "if", "else", "while", "for", "return", "lambda", "let", "cond", "and",
                "or", "not", "begin", "quote", "set!",
            ],
            Dialect::C => &["int", "float", "double", "if", "else", "while", "for", "return"],
        }
    }
}

const SYMBOLS: &[char] = &['#', '&', '$', '@'];

// Longest spellings first so `<=` is never split into `<` `=`.
const OPERATORS: &[&str] = &[
    "==", "!=", "<=", ">=", "+", "-", "*", "/", "%", "<", ">", "=",
];

const SEPARATORS: &[char] = &['(', ')', '{', '}', ';', ',', ':', '_'];

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length of the run of ASCII word characters starting at `offset`
fn word_len(source: &str, offset: usize) -> usize {
    source.as_bytes()[offset..]
        .iter()
        .take_while(|b| is_word_byte(**b))
        .count()
}

fn starts_word(source: &str, offset: usize) -> bool {
    offset == 0 || !is_word_byte(source.as_bytes()[offset - 1])
}

fn ends_word(source: &str, end: usize) -> bool {
    source.as_bytes().get(end).map_or(true, |b| !is_word_byte(*b))
}

/// Returns the byte length of the match at `offset`, if any.
type Matcher = fn(&Classifier, &str, usize) -> Option<usize>;

/// Ordered (kind, matcher) table; the first entry that matches wins.
const PATTERNS: [(TokenKind, Matcher); 7] = [
    (TokenKind::Keyword, Classifier::match_keyword),
    (TokenKind::Constant, Classifier::match_constant),
    (TokenKind::Identifier, Classifier::match_identifier),
    (TokenKind::Literal, Classifier::match_literal),
    (TokenKind::Symbol, Classifier::match_symbol),
    (TokenKind::Operator, Classifier::match_operator),
    (TokenKind::Separator, Classifier::match_separator),
];

/// Decides which token kind the text at a given offset belongs to.
#[derive(Debug, Clone)]
pub struct Classifier {
    dialect: Dialect,
    keywords: FxHashSet<&'static str>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl Classifier {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            keywords: dialect.keywords().iter().copied().collect(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    /// Classify the text starting at `offset`.
    ///
    /// `offset` must sit on a character boundary with no leading whitespace.
    /// Returns the token (located at `location`) and the offset just past it,
    /// or `None` when no pattern matches.
    pub fn classify(
        &self,
        source: &str,
        offset: usize,
        location: SourceLocation,
    ) -> Option<(Token, usize)> {
        PATTERNS.iter().find_map(|(kind, matcher)| {
            matcher(self, source, offset).map(|len| {
                let end = offset + len;
                (Token::new(*kind, &source[offset..end], location), end)
            })
        })
    }

    /// Kind of the token at `offset`, if the text there classifies at all
    pub fn kind_at(&self, source: &str, offset: usize) -> Option<TokenKind> {
        PATTERNS
            .iter()
            .find(|(_, matcher)| matcher(self, source, offset).is_some())
            .map(|(kind, _)| *kind)
    }

    fn match_keyword(&self, source: &str, offset: usize) -> Option<usize> {
        if !starts_word(source, offset) {
            return None;
        }
        let len = word_len(source, offset);
        if len == 0 {
            return None;
        }
        // `set!` style keywords carry a trailing bang
        if source.as_bytes().get(offset + len) == Some(&b'!') {
            let with_bang = &source[offset..offset + len + 1];
            if self.is_keyword(with_bang) && ends_word(source, offset + len + 1) {
                return Some(len + 1);
            }
        }
        if self.is_keyword(&source[offset..offset + len]) && ends_word(source, offset + len) {
            Some(len)
        } else {
            None
        }
    }

    fn match_constant(&self, source: &str, offset: usize) -> Option<usize> {
        let len = source.as_bytes()[offset..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        (len > 0 && starts_word(source, offset) && ends_word(source, offset + len)).then_some(len)
    }

    fn match_identifier(&self, source: &str, offset: usize) -> Option<usize> {
        let first = *source.as_bytes().get(offset)?;
        if !first.is_ascii_alphabetic() || !starts_word(source, offset) {
            return None;
        }
        let len = word_len(source, offset);
        if self.is_keyword(&source[offset..offset + len]) {
            return None;
        }
        // A word is never split, so the run always ends on a boundary
        Some(len)
    }

    fn match_literal(&self, source: &str, offset: usize) -> Option<usize> {
        let rest = source[offset..].strip_prefix('"')?;
        rest.find('"').map(|close| close + 2)
    }

    fn match_symbol(&self, source: &str, offset: usize) -> Option<usize> {
        source[offset..]
            .chars()
            .next()
            .filter(|c| SYMBOLS.contains(c))
            .map(char::len_utf8)
    }

    fn match_operator(&self, source: &str, offset: usize) -> Option<usize> {
        let rest = &source[offset..];
        OPERATORS
            .iter()
            .find(|op| rest.starts_with(**op))
            .map(|op| op.len())
    }

    fn match_separator(&self, source: &str, offset: usize) -> Option<usize> {
        source[offset..]
            .chars()
            .next()
            .filter(|c| SEPARATORS.contains(c))
            .map(char::len_utf8)
    }
}

/// Per-token check run by [`Lexer::tokenize_with`]: the new token, the
/// previously accepted token, and the kind of the token that follows an
/// operator.
pub type TokenCheck<'c> =
    dyn FnMut(&Token, Option<&Token>, Option<TokenKind>) -> Result<(), AnalysisError> + 'c;

/// Lexer for the expression language
pub struct Lexer<'a> {
    source: &'a str,
    classifier: &'a Classifier,
    position: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source string.
    pub fn new(source: &'a str, classifier: &'a Classifier) -> Self {
        Self {
            source,
            classifier,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Check the envelope, then tokenize and validate the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, AnalysisError> {
        self.tokenize_with(&mut rules::check_token)
    }

    /// Tokenize with a caller supplied per-token check in place of
    /// [`rules::check_token`]. The envelope, bracket balance, and trailing
    /// terminator checks still apply.
    pub fn tokenize_with(
        &mut self,
        check: &mut TokenCheck<'_>,
    ) -> Result<Vec<Token>, AnalysisError> {
        rules::check_envelope(self.source)?;
        rules::check_balance(self.source)?;

        let mut tokens: Vec<Token> = Vec::new();
        while let Some(token) = self.next_token()? {
            let lookahead = if token.kind == TokenKind::Operator {
                self.peek_kind()
            } else {
                None
            };
            check(&token, tokens.last(), lookahead)?;
            trace!(token = %token, "accepted token");
            tokens.push(token);
        }

        rules::check_terminator(&tokens, self.current_location())?;
        debug!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }

    /// Classify the whole input without applying any rule
    pub fn scan(&mut self) -> Result<Vec<Token>, AnalysisError> {
        match self.scan_prefix() {
            (tokens, None) => Ok(tokens),
            (_, Some(err)) => Err(err),
        }
    }

    /// Classify as far as possible: the tokens before the first character no
    /// pattern accepts, and the lexical error there if there is one
    pub fn scan_prefix(&mut self) -> (Vec<Token>, Option<AnalysisError>) {
        let mut tokens = Vec::new();
        loop {
            match self.next_token() {
                Ok(Some(token)) => tokens.push(token),
                Ok(None) => return (tokens, None),
                Err(err) => return (tokens, Some(err)),
            }
        }
    }

    /// Get next token, or `None` at end of input
    fn next_token(&mut self) -> Result<Option<Token>, AnalysisError> {
        self.skip_whitespace();
        if self.is_at_end() {
            return Ok(None);
        }

        let loc = self.current_location();
        match self.classifier.classify(self.source, self.position, loc) {
            Some((token, end)) => {
                self.advance_to(end);
                Ok(Some(token))
            }
            None => {
                let ch = self.peek().unwrap_or_default();
                debug!(%ch, offset = loc.offset, "no pattern matches");
                Err(AnalysisError::Lexical { ch, location: loc })
            }
        }
    }

    /// Kind of the next token after whitespace, without consuming anything
    fn peek_kind(&self) -> Option<TokenKind> {
        let rest = &self.source[self.position..];
        let skipped = rest.len() - rest.trim_start().len();
        let offset = self.position + skipped;
        if offset >= self.source.len() {
            return None;
        }
        self.classifier.kind_at(self.source, offset)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn advance_to(&mut self, end: usize) {
        while self.position < end {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.position, self.line, self.column)
    }
}

/// Classify `source` with the given dialect, without applying any rule
pub fn scan(source: &str, dialect: Dialect) -> Result<Vec<Token>, AnalysisError> {
    let classifier = Classifier::new(dialect);
    Lexer::new(source, &classifier).scan()
}

/// Envelope check, classification and rule validation in one call
pub fn tokenize(source: &str, dialect: Dialect) -> Result<Vec<Token>, AnalysisError> {
    let classifier = Classifier::new(dialect);
    Lexer::new(source, &classifier).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_texts(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
        tokens.iter().map(|t| (t.kind, t.text.as_str())).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = scan("{ x = 1 ; }", Dialect::Scheme).unwrap();

        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Separator, "{"),
                (TokenKind::Identifier, "x"),
                (TokenKind::Operator, "="),
                (TokenKind::Constant, "1"),
                (TokenKind::Separator, ";"),
                (TokenKind::Separator, "}"),
            ]
        );
        assert_eq!(tokens[3].to_string(), "CONSTANT<1>");
    }

    #[test]
    fn test_operators_longest_first() {
        let tokens = scan("== != <= >= < > = + - * / %", Dialect::Scheme).unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();

        assert_eq!(
            texts,
            vec!["==", "!=", "<=", ">=", "<", ">", "=", "+", "-", "*", "/", "%"]
        );
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Operator));
    }

    #[test]
    fn test_keywords_never_identifiers() {
        let tokens = scan("define defined lambda set! x1 if_", Dialect::Scheme).unwrap();

        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Keyword, "define"),
                (TokenKind::Identifier, "defined"),
                (TokenKind::Keyword, "lambda"),
                (TokenKind::Keyword, "set!"),
                (TokenKind::Identifier, "x1"),
                (TokenKind::Identifier, "if_"),
            ]
        );
    }

    #[test]
    fn test_dialect_keyword_sets() {
        let scheme = scan("int lambda", Dialect::Scheme).unwrap();
        assert_eq!(scheme[0].kind, TokenKind::Identifier);
        assert_eq!(scheme[1].kind, TokenKind::Keyword);

        let c = scan("int lambda", Dialect::C).unwrap();
        assert_eq!(c[0].kind, TokenKind::Keyword);
        assert_eq!(c[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_literal_symbol_separator() {
        let tokens = scan(r#""hello world" # $ ( ) , : _"#, Dialect::Scheme).unwrap();

        assert_eq!(
            kinds_and_texts(&tokens),
            vec![
                (TokenKind::Literal, "\"hello world\""),
                (TokenKind::Symbol, "#"),
                (TokenKind::Symbol, "$"),
                (TokenKind::Separator, "("),
                (TokenKind::Separator, ")"),
                (TokenKind::Separator, ","),
                (TokenKind::Separator, ":"),
                (TokenKind::Separator, "_"),
            ]
        );
    }

    #[test]
    fn test_constant_must_end_on_word_boundary() {
        let err = scan("5x", Dialect::Scheme).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Lexical {
                ch: '5',
                location: SourceLocation::new(0, 1, 1),
            }
        );
    }

    #[test]
    fn test_scan_prefix_stops_at_lexical_error() {
        let classifier = Classifier::default();
        let (tokens, err) = Lexer::new("{ x = 1 ? ; }", &classifier).scan_prefix();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["{", "x", "=", "1"]);
        assert!(matches!(err, Some(AnalysisError::Lexical { ch: '?', .. })));

        let (tokens, err) = Lexer::new("{ x ; }", &classifier).scan_prefix();
        assert_eq!(tokens.len(), 4);
        assert!(err.is_none());
    }

    #[test]
    fn test_lexical_error_location() {
        let err = scan("{ x\n  ? }", Dialect::Scheme).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Lexical {
                ch: '?',
                location: SourceLocation::new(6, 2, 3),
            }
        );
    }

    #[test]
    fn test_unterminated_literal_is_lexical_error() {
        let err = scan("\"open", Dialect::Scheme).unwrap_err();
        assert!(matches!(err, AnalysisError::Lexical { ch: '"', .. }));
    }

    #[test]
    fn test_token_locations() {
        let tokens = scan("{\n  abc }", Dialect::Scheme).unwrap();
        assert_eq!(tokens[1].location, SourceLocation::new(4, 2, 3));
        assert_eq!(tokens[2].location, SourceLocation::new(8, 2, 7));
    }

    #[test]
    fn test_classifier_precedence() {
        let classifier = Classifier::default();
        let loc = SourceLocation::start();

        let (token, end) = classifier.classify("return1 ", 0, loc).unwrap();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(end, 7);

        assert_eq!(classifier.kind_at("42)", 0), Some(TokenKind::Constant));
        assert_eq!(classifier.kind_at("?", 0), None);
    }

    #[test]
    fn test_tokenize_with_sees_previous_accepted_token() {
        let classifier = Classifier::default();
        let mut seen: Vec<(String, Option<String>)> = Vec::new();
        let mut record = |token: &Token, previous: Option<&Token>, _: Option<TokenKind>| {
            seen.push((token.text.clone(), previous.map(|p| p.text.clone())));
            Ok::<(), AnalysisError>(())
        };

        let tokens = Lexer::new("{ a b ; }", &classifier)
            .tokenize_with(&mut record)
            .unwrap();

        assert_eq!(tokens.len(), 5);
        assert_eq!(
            seen,
            vec![
                ("{".to_string(), None),
                ("a".to_string(), Some("{".to_string())),
                ("b".to_string(), Some("a".to_string())),
                (";".to_string(), Some("b".to_string())),
                ("}".to_string(), Some(";".to_string())),
            ]
        );
    }

    #[test]
    fn test_operator_lookahead_kind() {
        let classifier = Classifier::default();
        let mut lookaheads = Vec::new();
        let mut record = |token: &Token, _: Option<&Token>, next: Option<TokenKind>| {
            if token.kind == TokenKind::Operator {
                lookaheads.push(next);
            }
            Ok::<(), AnalysisError>(())
        };

        Lexer::new("{ a +  7 ; b - ; }", &classifier)
            .tokenize_with(&mut record)
            .unwrap();

        assert_eq!(
            lookaheads,
            vec![Some(TokenKind::Constant), Some(TokenKind::Separator)]
        );
    }
}
