//! Runtime value types for Weft

use std::fmt;
use std::io;

/// Runtime values. The language only has 64-bit signed integers; `Unit`
/// doubles as the value of a declared-but-unassigned variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Unit,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Unit => "unit",
        }
    }

    /// Condition semantics: any non-zero integer is true
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Int(n) if *n != 0)
    }

    /// Comparison results are ordinary integers, usable as conditions
    pub fn from_bool(b: bool) -> Self {
        Value::Int(if b { 1 } else { 0 })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Unit => write!(f, "()"),
        }
    }
}

/// Native function type: primitives receive the executor's output writer
/// and the frame their declared parameters were bound into.
pub type PrimitiveFn =
    fn(&mut dyn io::Write, &crate::executor::Frame) -> crate::error::Result<Value>;

/// A native operation exposed to the language as an ordinary callable
/// function with declared formal parameters.
#[derive(Clone)]
pub struct Primitive {
    pub name: String,
    pub params: Vec<String>,
    pub func: PrimitiveFn,
}

impl Primitive {
    pub fn new(name: &str, params: &[&str], func: PrimitiveFn) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            func,
        }
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<primitive {}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(1).is_truthy());
        assert!(Value::Int(-3).is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Unit.is_truthy());
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(Value::from_bool(true), Value::Int(1));
        assert_eq!(Value::from_bool(false), Value::Int(0));
    }
}
