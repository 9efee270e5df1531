//! Token definitions for the Weft language
//!
//! Tokens are the atomic units of meaning in source code.

use std::fmt;

/// Location in source code for error reporting.
///
/// The origin is an optional label (usually a file name) supplied by
/// whoever fed the source text in; it is used only for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub origin: Option<String>,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(origin: Option<String>, line: usize) -> Self {
        Self { origin, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin.as_deref().unwrap_or("(none)"), self.line)
    }
}

/// Token types in Weft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Fun,
    Var,
    If,
    Else,
    While,
    Return,

    // Literals and names
    Identifier,
    Integer,

    // A binary operator glyph; the literal text says which one
    BinaryOperator,

    // Punctuation
    OpeningParen,  // (
    ClosingParen,  // )
    OpeningBrace,  // {
    ClosingBrace,  // }
    Comma,         // ,
    Equals,        // =
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Fun => write!(f, "fun"),
            TokenKind::Var => write!(f, "var"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::While => write!(f, "while"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::BinaryOperator => write!(f, "binary operator"),
            TokenKind::OpeningParen => write!(f, "("),
            TokenKind::ClosingParen => write!(f, ")"),
            TokenKind::OpeningBrace => write!(f, "{{"),
            TokenKind::ClosingBrace => write!(f, "}}"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Equals => write!(f, "="),
        }
    }
}

/// A token with its kind, location, and the exact matched lexeme
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation, text: String) -> Self {
        Self { kind, location, text }
    }
}

/// Check if an identifier is a keyword and return the corresponding kind
pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "fun" => Some(TokenKind::Fun),
        "var" => Some(TokenKind::Var),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "return" => Some(TokenKind::Return),
        _ => None,
    }
}
