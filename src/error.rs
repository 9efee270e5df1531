//! Error types for the Weft language
//!
//! One error family for every pipeline stage, each value carrying an
//! optional source location.

use crate::token::SourceLocation;
use std::fmt;

/// Error kinds in Weft
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Lexer errors
    UnrecognizedInput(String),

    // Parser errors
    ExpectedToken(String, String),
    ExpectedStatement(String),
    ExpectedExpression(String),
    UnexpectedEnd,
    InvalidInteger(String),

    // Compiler errors
    FunctionRedefined(String),

    // Runtime errors
    UnknownFunction(String),
    WrongArity {
        name: String,
        expected: usize,
        got: usize,
    },
    UndeclaredVariable(String),
    DivisionByZero,
    InvalidOperand(String),
    StackOverflow(usize),
    Io(String),
}

impl ErrorKind {
    /// Whether this kind is reported during execution rather than while
    /// building the program. Stack overflow counts as a runtime error.
    pub fn is_runtime(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnknownFunction(_)
                | ErrorKind::WrongArity { .. }
                | ErrorKind::UndeclaredVariable(_)
                | ErrorKind::DivisionByZero
                | ErrorKind::InvalidOperand(_)
                | ErrorKind::StackOverflow(_)
                | ErrorKind::Io(_)
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnrecognizedInput(near) => {
                write!(f, "could not match token near '{}'", near)
            }
            ErrorKind::ExpectedToken(expected, got) => {
                write!(f, "expected {}, got {}", expected, got)
            }
            ErrorKind::ExpectedStatement(got) => {
                write!(f, "expected a statement, got {}", got)
            }
            ErrorKind::ExpectedExpression(got) => {
                write!(f, "expected an expression, got {}", got)
            }
            ErrorKind::UnexpectedEnd => write!(f, "unexpected end of input"),
            ErrorKind::InvalidInteger(text) => {
                write!(f, "integer literal '{}' is out of range", text)
            }
            ErrorKind::FunctionRedefined(name) => {
                write!(f, "trying to redefine function '{}'", name)
            }
            ErrorKind::UnknownFunction(name) => {
                write!(f, "trying to call undefined function '{}'", name)
            }
            ErrorKind::WrongArity { name, expected, got } => {
                write!(f, "function '{}' takes {} arguments, got {}", name, expected, got)
            }
            ErrorKind::UndeclaredVariable(name) => {
                write!(f, "undeclared variable '{}'", name)
            }
            ErrorKind::DivisionByZero => write!(f, "division by zero"),
            ErrorKind::InvalidOperand(op) => {
                write!(f, "cannot apply '{}' to an uninitialized value", op)
            }
            ErrorKind::StackOverflow(depth) => {
                write!(f, "call stack exceeded the maximum depth of {}", depth)
            }
            ErrorKind::Io(message) => write!(f, "i/o error: {}", message),
        }
    }
}

/// A Weft error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct WeftError {
    pub kind: ErrorKind,
    pub location: Option<SourceLocation>,
    pub source_line: Option<String>,
}

impl WeftError {
    pub fn new(kind: ErrorKind, location: Option<SourceLocation>) -> Self {
        Self {
            kind,
            location,
            source_line: None,
        }
    }

    /// Attach the offending line of source text for nicer CLI reporting.
    pub fn with_source(mut self, source: &str) -> Self {
        if let Some(location) = &self.location {
            let lines: Vec<&str> = source.lines().collect();
            if location.line > 0 && location.line <= lines.len() {
                self.source_line = Some(lines[location.line - 1].to_string());
            }
        }
        self
    }
}

impl fmt::Display for WeftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "[{}] error: {}", location, self.kind)?;
            if let Some(ref line) = self.source_line {
                write!(f, "\n  | {}", line)?;
            }
        } else {
            write!(f, "error: {}", self.kind)?;
        }
        Ok(())
    }
}

impl std::error::Error for WeftError {}

/// Result type for Weft operations
pub type Result<T> = std::result::Result<T, WeftError>;
