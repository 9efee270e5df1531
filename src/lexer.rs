//! Lexer for the Weft language
//!
//! Converts source code into a stream of tokens. Patterns are tried in
//! a fixed priority order at each position: keywords (which share the
//! identifier shape), identifiers, integers, binary operators, then
//! punctuation. A binary operator only lexes when it is immediately
//! followed by whitespace, which is what rules out unary minus.

use crate::error::{ErrorKind, Result, WeftError};
use crate::token::{lookup_keyword, SourceLocation, Token, TokenKind};

/// The lexer state
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    origin: Option<String>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from source code
    pub fn new(source: &'a str) -> Self {
        Self::with_origin(source, None)
    }

    /// Create a lexer whose tokens carry an origin label (e.g. a file name)
    pub fn with_origin(source: &'a str, origin: Option<&str>) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            origin: origin.map(|s| s.to_string()),
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token, or `None` at end of input
    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let Some(&(start_pos, ch)) = self.chars.peek() else {
            return Ok(None);
        };

        let location = self.location();

        let kind = match ch {
            '(' => { self.advance(); TokenKind::OpeningParen }
            ')' => { self.advance(); TokenKind::ClosingParen }
            '{' => { self.advance(); TokenKind::OpeningBrace }
            '}' => { self.advance(); TokenKind::ClosingBrace }
            ',' => { self.advance(); TokenKind::Comma }

            // `==` with trailing whitespace is a binary operator; a lone
            // `=` is assignment punctuation.
            '=' => {
                if self.peek_second() == Some('=') && self.whitespace_at(start_pos + 2) {
                    self.advance();
                    self.advance();
                    TokenKind::BinaryOperator
                } else {
                    self.advance();
                    TokenKind::Equals
                }
            }

            '!' => {
                if self.peek_second() == Some('=') && self.whitespace_at(start_pos + 2) {
                    self.advance();
                    self.advance();
                    TokenKind::BinaryOperator
                } else {
                    return Err(self.no_match(start_pos, location));
                }
            }

            '<' | '>' => {
                if self.peek_second() == Some('=') && self.whitespace_at(start_pos + 2) {
                    self.advance();
                    self.advance();
                    TokenKind::BinaryOperator
                } else if self.whitespace_at(start_pos + 1) {
                    self.advance();
                    TokenKind::BinaryOperator
                } else {
                    return Err(self.no_match(start_pos, location));
                }
            }

            '*' | '/' | '%' | '+' | '-' => {
                if self.whitespace_at(start_pos + 1) {
                    self.advance();
                    TokenKind::BinaryOperator
                } else {
                    return Err(self.no_match(start_pos, location));
                }
            }

            c if c.is_ascii_digit() => self.scan_integer(start_pos, &location)?,

            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            _ => return Err(self.no_match(start_pos, location)),
        };

        let text = self.source[start_pos..self.current_pos].to_string();

        Ok(Some(Token::new(kind, location, text)))
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.origin.clone(), self.line)
    }

    /// Advance past the current character
    fn advance(&mut self) -> Option<char> {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos + ch.len_utf8();
            Some(ch)
        } else {
            None
        }
    }

    /// Peek one character past the current one without advancing
    fn peek_second(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    /// Whether the byte at `pos` starts a whitespace character.
    ///
    /// Operators must be trailed by whitespace to lex at all; the
    /// whitespace itself is left in place for the next token's leading
    /// skip so that line counting stays exact.
    fn whitespace_at(&self, pos: usize) -> bool {
        self.source[pos.min(self.source.len())..]
            .chars()
            .next()
            .map_or(false, |c| c.is_whitespace())
    }

    /// Skip whitespace, counting newlines for line tracking
    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            match ch {
                '\n' => {
                    self.advance();
                    self.line += 1;
                }
                c if c.is_whitespace() => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Scan an integer literal; digits must end at a word boundary
    fn scan_integer(&mut self, start_pos: usize, location: &SourceLocation) -> Result<TokenKind> {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        // `123abc` matches neither the integer nor the identifier pattern
        if let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                return Err(self.no_match(start_pos, location.clone()));
            }
        }

        Ok(TokenKind::Integer)
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.current_pos;

        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[start..self.current_pos];
        lookup_keyword(text).unwrap_or(TokenKind::Identifier)
    }

    fn no_match(&self, pos: usize, location: SourceLocation) -> WeftError {
        let rest = &self.source[pos..];
        let near = rest.lines().next().unwrap_or(rest);
        WeftError::new(ErrorKind::UnrecognizedInput(near.to_string()), Some(location))
    }
}
