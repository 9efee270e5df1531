//! Abstract Syntax Tree definitions for Weft
//!
//! The structure of programs after parsing and before threading.

use crate::token::SourceLocation;
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul, // *
    Div, // /
    Mod, // %
    Add, // +
    Sub, // -
    Lt,  // <
    Le,  // <=
    Gt,  // >
    Ge,  // >=
    Eq,  // ==
    Ne,  // !=
}

impl BinaryOp {
    /// Map an operator lexeme to its variant
    pub fn from_glyph(glyph: &str) -> Option<Self> {
        match glyph {
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "%" => Some(BinaryOp::Mod),
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "<" => Some(BinaryOp::Lt),
            "<=" => Some(BinaryOp::Le),
            ">" => Some(BinaryOp::Gt),
            ">=" => Some(BinaryOp::Ge),
            "==" => Some(BinaryOp::Eq),
            "!=" => Some(BinaryOp::Ne),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Le => write!(f, "<="),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Ge => write!(f, ">="),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::Ne => write!(f, "!="),
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone)]
pub enum Expr {
    /// Integer literal: 42
    Integer { value: i64, location: SourceLocation },

    /// Variable reference: foo
    Variable { name: String, location: SourceLocation },

    /// Function call: foo(a, b)
    Call {
        name: String,
        args: Vec<Expr>,
        location: SourceLocation,
    },

    /// Binary operation: a + b
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Expr::Integer { location, .. } => location,
            Expr::Variable { location, .. } => location,
            Expr::Call { location, .. } => location,
            Expr::Binary { location, .. } => location,
        }
    }
}

/// Statement nodes
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Variable declaration: var x
    VarDecl { name: String, location: SourceLocation },

    /// Assignment: x = expr
    Assign {
        name: String,
        value: Expr,
        location: SourceLocation,
    },

    /// Return from the enclosing function: return expr
    Return { value: Expr, location: SourceLocation },

    /// Conditional: if (cond) { } else { }
    If {
        condition: Expr,
        then_body: Block,
        else_body: Option<Block>,
        location: SourceLocation,
    },

    /// Loop: while (cond) { }
    While {
        condition: Expr,
        body: Block,
        location: SourceLocation,
    },

    /// Bare expression in statement position (usually a call)
    Expr { expr: Expr },
}

/// An ordered sequence of statements: { stmt* }
#[derive(Debug, Clone)]
pub struct Block {
    pub items: Vec<Stmt>,
    pub location: SourceLocation,
}

/// A function definition: fun name(params) { body }
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    pub location: SourceLocation,
}

/// A complete compilation unit: an ordered sequence of function definitions
#[derive(Debug, Clone)]
pub struct Definitions {
    pub items: Vec<FunctionDefinition>,
}

impl Definitions {
    pub fn new(items: Vec<FunctionDefinition>) -> Self {
        Self { items }
    }
}
