//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream whose `kind` fields
//! are the terminal names of the C-subset grammar:
//!
//! - keywords (the C89 set plus `printf` and `include`) use the keyword itself
//! - identifiers are `ID`
//! - literals are `INT_CONST` (decimal, octal, hex), `FLOAT_CONST`,
//!   `CHAR_CONST` and `STRING_CONST`
//! - operators and punctuation use their spelling, matched longest-first
//!
//! Token text is the exact lexeme, so the token sequence can be compared
//! against the leaves of a parse tree. `#` is an ordinary token; includes are
//! parsed by the grammar rather than skipped.

use super::token::{SourceLocation, Token};
use rustc_hash::FxHashSet;

/// Keywords recognized by the lexer.
pub const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if", "include",
    "int", "long", "printf", "register", "return", "short", "signed", "sizeof",
    "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while",
];

/// Operators and punctuation, longest first.
const PUNCTUATORS: &[&str] = &[
    "...", ">>=", "<<=", "==", "!=", ">=", "<=", "++", "--", "&&", "||", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "->", ".", "+", "-",
    "*", "/", "%", "&", "|", "^", "~", "!", "=", "<", ">", "?", "(", ")", "[",
    "]", "{", "}", ";", ",", ":", "#",
];

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("lexical error at {location}: {message}")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. The last token is always `EOF`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::eof(self.current_location()));
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let start = self.position;
        let ch = self.peek().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' => self.string_literal(start, loc),
            '\'' => self.char_literal(start, loc),
            '0'..='9' => self.number_literal(start, loc),
            '.' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(start, loc)
            }
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(start, loc)),
            _ => self.punctuator(loc),
        }
    }

    fn punctuator(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        for punct in PUNCTUATORS {
            if self.lookahead_is(punct) {
                for _ in 0..punct.chars().count() {
                    self.advance();
                }
                return Ok(Token::new(punct, punct, loc));
            }
        }

        let ch = self.peek().unwrap_or('\0');
        Err(LexError {
            message: format!("Unexpected character: '{}'", ch),
            location: loc,
        })
    }

    /// Parse string literal
    fn string_literal(
        &mut self,
        start: usize,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        self.advance(); // opening quote

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(self.token_from("STRING_CONST", start, loc));
                }
                '\\' => {
                    self.advance();
                    self.escape_sequence()?;
                }
                '\n' => break,
                _ => {
                    self.advance();
                }
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse character literal
    fn char_literal(
        &mut self,
        start: usize,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        self.advance(); // opening quote

        match self.peek() {
            None | Some('\n') => {
                return Err(LexError {
                    message: "Unterminated character literal".to_string(),
                    location: loc,
                });
            }
            Some('\'') => {
                return Err(LexError {
                    message: "Empty character literal".to_string(),
                    location: loc,
                });
            }
            Some('\\') => {
                self.advance();
                self.escape_sequence()?;
            }
            Some(_) => {
                self.advance();
            }
        }

        if self.peek() != Some('\'') {
            return Err(LexError {
                message: "Expected closing quote in character literal".to_string(),
                location: self.current_location(),
            });
        }
        self.advance();

        Ok(self.token_from("CHAR_CONST", start, loc))
    }

    /// Consumes the character(s) after a backslash.
    fn escape_sequence(&mut self) -> Result<(), LexError> {
        let loc = self.current_location();
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in escape sequence".to_string(),
            location: loc,
        })?;

        match escaped {
            'n' | 't' | 'r' | 'a' | 'b' | 'f' | 'v' | '\\' | '\'' | '"' | '?' => Ok(()),
            '0'..='7' => {
                // Up to three octal digits in total
                for _ in 0..2 {
                    if self.peek().is_some_and(|c| ('0'..='7').contains(&c)) {
                        self.advance();
                    }
                }
                Ok(())
            }
            'x' => {
                let mut digits = 0;
                while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.advance();
                    digits += 1;
                }
                if digits == 0 {
                    return Err(LexError {
                        message: "Incomplete hex escape sequence".to_string(),
                        location: loc,
                    });
                }
                Ok(())
            }
            _ => Err(LexError {
                message: format!("Unknown escape sequence: \\{}", escaped),
                location: loc,
            }),
        }
    }

    /// Parse numeric literal: decimal, octal and hex integers, decimal floats
    fn number_literal(
        &mut self,
        start: usize,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        let kind = if self.peek() == Some('0')
            && matches!(self.peek_ahead(1), Some('x') | Some('X'))
        {
            self.advance();
            self.advance();
            let digits = self.consume_while(|c| c.is_ascii_hexdigit());
            if digits == 0 {
                return Err(self.malformed_number(start, loc, "Invalid hex literal"));
            }
            "INT_CONST"
        } else {
            self.consume_while(|c| c.is_ascii_digit());
            let mut is_float = false;

            if self.peek() == Some('.') {
                is_float = true;
                self.advance();
                self.consume_while(|c| c.is_ascii_digit());
            }

            if matches!(self.peek(), Some('e') | Some('E')) {
                let has_sign = matches!(self.peek_ahead(1), Some('+') | Some('-'));
                let digit_at = if has_sign { 2 } else { 1 };
                if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    is_float = true;
                    for _ in 0..digit_at {
                        self.advance();
                    }
                    self.consume_while(|c| c.is_ascii_digit());
                } else {
                    return Err(self.malformed_number(start, loc, "Invalid exponent"));
                }
            }

            if is_float {
                "FLOAT_CONST"
            } else {
                let digits: String = self.input[start..self.position].iter().collect();
                if digits.starts_with('0') && digits.contains(['8', '9']) {
                    return Err(self.malformed_number(
                        start,
                        loc,
                        "Invalid digit in octal literal",
                    ));
                }
                "INT_CONST"
            }
        };

        if self.peek().is_some_and(is_ident_continue) {
            return Err(self.malformed_number(start, loc, "Invalid suffix on numeric literal"));
        }

        Ok(self.token_from(kind, start, loc))
    }

    /// Consumes the rest of a bad numeric lexeme and builds the error.
    fn malformed_number(&mut self, start: usize, loc: SourceLocation, message: &str) -> LexError {
        self.consume_while(is_ident_continue);
        let lexeme: String = self.input[start..self.position].iter().collect();
        LexError {
            message: format!("{}: {}", message, lexeme),
            location: loc,
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, start: usize, loc: SourceLocation) -> Token {
        self.consume_while(is_ident_continue);
        let ident: String = self.input[start..self.position].iter().collect();

        if KEYWORDS.contains(&ident.as_str()) {
            Token::new(&ident, &ident, loc)
        } else {
            Token::new("ID", &ident, loc)
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn token_from(&self, kind: &str, start: usize, loc: SourceLocation) -> Token {
        let text: String = self.input[start..self.position].iter().collect();
        Token::new(kind, &text, loc)
    }

    fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while self.peek().is_some_and(&pred) {
            self.advance();
            count += 1;
        }
        count
    }

    fn lookahead_is(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_ahead(i) == Some(c))
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Reclassifies bare uses of `struct`/`union` tags as `TYPE_NAME`.
///
/// An identifier becomes `TYPE_NAME` when it was earlier introduced as a tag
/// (right after `struct` or `union`), is not itself preceded by one of those
/// keywords, and is followed by an identifier or `*`, i.e. sits where a type
/// specifier would.
pub fn classify_type_names(tokens: &mut [Token]) {
    let mut tags: FxHashSet<String> = FxHashSet::default();

    for i in 0..tokens.len() {
        if tokens[i].kind != "ID" {
            continue;
        }
        let after_tag_keyword = i > 0 && matches!(tokens[i - 1].kind.as_str(), "struct" | "union");
        if after_tag_keyword {
            tags.insert(tokens[i].text.clone());
            continue;
        }
        let next_is_declarator = tokens
            .get(i + 1)
            .is_some_and(|t| t.kind == "ID" || t.kind == "*");
        if next_is_declarator && tags.contains(&tokens[i].text) {
            tokens[i].kind = "TYPE_NAME".to_string();
        }
    }
}
