//! Tokens and token sources consumed by the parsing engine.

use crate::config::EOF_NAME;
use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A lexical token. `kind` is the terminal name the grammar knows it by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: String,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: &str, text: &str, location: SourceLocation) -> Self {
        Token {
            kind: kind.to_string(),
            text: text.to_string(),
            location,
        }
    }

    /// The end-of-input token.
    pub fn eof(location: SourceLocation) -> Self {
        Token::new(EOF_NAME, "", location)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == EOF_NAME
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "end of input")
        } else if self.text == self.kind {
            write!(f, "'{}'", self.text)
        } else {
            write!(f, "{} '{}'", self.kind, self.text)
        }
    }
}

/// A restartable stream of tokens. Reading past the end yields the
/// end-of-input token forever.
pub trait TokenSource {
    /// The current lookahead.
    fn peek(&self) -> &Token;

    /// Consumes and returns the lookahead. At end of input this returns the
    /// end-of-input token and does not move.
    fn advance(&mut self) -> Token;

    /// Index of the lookahead.
    fn position(&self) -> usize;

    /// Moves back to the first token.
    fn rewind(&mut self);
}

/// A [`TokenSource`] over an in-memory token vector.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
    eof: Token,
}

impl TokenStream {
    /// Wraps `tokens`. A trailing end-of-input token, if present, becomes the
    /// stream's end marker; otherwise one is synthesized just after the last
    /// token.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        let eof = match tokens.last() {
            Some(last) if last.is_eof() => tokens.pop(),
            _ => None,
        }
        .unwrap_or_else(|| {
            let location = tokens
                .last()
                .map(|t| {
                    SourceLocation::new(
                        t.location.line,
                        t.location.column + t.text.chars().count(),
                    )
                })
                .unwrap_or(SourceLocation::new(1, 1));
            Token::eof(location)
        });

        TokenStream {
            tokens,
            cursor: 0,
            eof,
        }
    }

    /// Builds a stream from bare kinds, each token's text equal to its kind.
    /// Locations are `1:1, 1:2, ...`.
    pub fn from_kinds(kinds: &[&str]) -> Self {
        let tokens = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| Token::new(kind, kind, SourceLocation::new(1, i + 1)))
            .collect();
        TokenStream::new(tokens)
    }

    /// The tokens of the stream, without the end marker.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenSource for TokenStream {
    fn peek(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }
}
