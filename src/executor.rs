//! Executor for threaded Weft programs
//!
//! A state machine over the compiled node graph: one current-node
//! pointer, one current frame, and an explicit frame stack. Calling a
//! function pushes a frame carrying the caller's continuation and moves
//! the pointer into the callee; returning pops the frame and resumes at
//! the stashed continuation. Host recursion only happens for calls in
//! expression position, and the depth bound fires long before the host
//! stack could, so overflow is always a reported error.

use crate::ast::BinaryOp;
use crate::error::{ErrorKind, Result, WeftError};
use crate::thread::{Callable, Node, NodeId, Program};
use crate::token::SourceLocation;
use crate::value::Value;
use std::collections::HashMap;
use std::io::{self, Write};

/// Default bound on the call-frame stack
pub const DEFAULT_MAX_DEPTH: usize = 1000;

// ==================== Frames ====================

/// One activation record: local bindings plus the node to resume in the
/// caller once this call returns. An empty continuation marks a frame
/// owned by the loop invocation that pushed it, not by a threaded call.
#[derive(Debug, Default)]
pub struct Frame {
    vars: HashMap<String, Value>,
    continuation: Option<NodeId>,
}

impl Frame {
    fn new(continuation: Option<NodeId>) -> Self {
        Self {
            vars: HashMap::new(),
            continuation,
        }
    }

    /// Bind a name to the uninitialized value. Re-declaration resets it.
    pub fn declare(&mut self, name: &str) {
        self.vars.insert(name.to_string(), Value::Unit);
    }

    /// Bind a name directly to a value, as for formal parameters
    pub fn bind(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }

    /// Current value of a binding; `None` if the name is undeclared
    pub fn get(&self, name: &str) -> Option<Value> {
        self.vars.get(name).copied()
    }

    /// Store into an existing binding; `false` if the name is undeclared
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.vars.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

// ==================== Executor ====================

pub struct Executor<W: Write> {
    frames: Vec<Frame>,
    max_depth: usize,
    out: W,
}

impl Executor<io::Stdout> {
    /// An executor printing to standard output
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Executor<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Executor<W> {
    /// An executor printing to the given writer
    pub fn with_output(out: W) -> Self {
        Self {
            frames: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            out,
        }
    }

    /// Override the frame-stack bound. A program whose call depth stays
    /// at or below the bound runs to completion; the first push that
    /// would exceed it fails with a stack overflow error.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Recover the output writer, e.g. to inspect captured output
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the program's `main` function and return its result
    pub fn run(&mut self, program: &Program) -> Result<Value> {
        let entry = match program.lookup("main") {
            Some(Callable::User { params, entry }) if params.is_empty() => *entry,
            Some(callable) => {
                return Err(WeftError::new(
                    ErrorKind::WrongArity {
                        name: "main".to_string(),
                        expected: callable.params().len(),
                        got: 0,
                    },
                    None,
                ))
            }
            None => {
                return Err(WeftError::new(
                    ErrorKind::UnknownFunction("main".to_string()),
                    None,
                ))
            }
        };

        self.run_entry(program, entry)
    }

    /// Run a compiled fragment starting at `entry` with a single empty
    /// frame. A return yields its value; walking off the end of the
    /// thread yields `Unit`. Compiled functions always end in a return,
    /// so the `Unit` case only arises for hand-assembled fragments.
    pub fn run_entry(&mut self, program: &Program, entry: NodeId) -> Result<Value> {
        self.frames.push(Frame::new(None));
        let result = self.run_thread(program, entry);
        // An error can leave callee frames behind
        self.frames.clear();
        result
    }

    // ==================== The threaded loop ====================

    /// Walk the node graph starting at `entry` until the frame that was
    /// active on entry is popped by a return. Calls push frames and
    /// redirect the current pointer; everything else falls through to
    /// its next link.
    fn run_thread(&mut self, program: &Program, entry: NodeId) -> Result<Value> {
        let mut current = Some(entry);

        while let Some(id) = current {
            match program.node(id) {
                Node::Sentinel => current = program.next(id),

                Node::Declare { name } => {
                    self.frame_mut().declare(name);
                    current = program.next(id);
                }

                Node::Assign { name, value, location } => {
                    let value = self.eval(program, *value)?;
                    if !self.frame_mut().assign(name, value) {
                        return Err(WeftError::new(
                            ErrorKind::UndeclaredVariable(name.clone()),
                            Some(location.clone()),
                        ));
                    }
                    current = program.next(id);
                }

                Node::Return { value } => {
                    let value = self.eval(program, *value)?;
                    match self.frames.pop() {
                        Some(frame) => match frame.continuation {
                            Some(resume) => current = Some(resume),
                            None => return Ok(value),
                        },
                        // Every compiled body is return-terminated, so a
                        // return always finds the frame its call pushed
                        None => unreachable!("return executed without an active frame"),
                    }
                }

                Node::If { condition, then_entry, else_entry, .. } => {
                    current = if self.eval(program, *condition)?.is_truthy() {
                        Some(*then_entry)
                    } else {
                        match else_entry {
                            Some(entry) => Some(*entry),
                            None => program.next(id),
                        }
                    };
                }

                Node::While { condition, body_entry } => {
                    current = if self.eval(program, *condition)?.is_truthy() {
                        Some(*body_entry)
                    } else {
                        program.next(id)
                    };
                }

                Node::Call { name, args, location } => {
                    match self.lookup(program, name, location)? {
                        Callable::User { params, entry } => {
                            self.check_depth(location)?;
                            let mut frame =
                                self.bind_arguments(program, name, &params, args, location)?;
                            frame.continuation = program.next(id);
                            self.frames.push(frame);
                            current = Some(entry);
                        }
                        Callable::Primitive(primitive) => {
                            let frame = self.bind_arguments(
                                program,
                                name,
                                &primitive.params,
                                args,
                                location,
                            )?;
                            (primitive.func)(&mut self.out, &frame)?;
                            current = program.next(id);
                        }
                    }
                }

                // An expression in statement position: evaluate for its
                // effect and discard the value
                Node::Integer { .. } | Node::Variable { .. } | Node::Binary { .. } => {
                    self.eval(program, id)?;
                    current = program.next(id);
                }
            }
        }

        // Only a hand-assembled fragment can get here; every compiled
        // function body is return-terminated
        Ok(Value::Unit)
    }

    // ==================== Expressions ====================

    fn eval(&mut self, program: &Program, id: NodeId) -> Result<Value> {
        match program.node(id) {
            Node::Integer { value } => Ok(Value::Int(*value)),

            Node::Variable { name, location } => match self.frame().get(name) {
                Some(value) => Ok(value),
                None => Err(WeftError::new(
                    ErrorKind::UndeclaredVariable(name.clone()),
                    Some(location.clone()),
                )),
            },

            Node::Binary { op, lhs, rhs, location } => {
                let lhs = self.eval(program, *lhs)?;
                let rhs = self.eval(program, *rhs)?;
                apply_operator(*op, lhs, rhs, location)
            }

            Node::Call { name, args, location } => {
                match self.lookup(program, name, location)? {
                    Callable::User { params, entry } => {
                        self.check_depth(location)?;
                        let frame =
                            self.bind_arguments(program, name, &params, args, location)?;
                        // Empty continuation: the nested loop run ends
                        // when this frame's return pops it
                        self.frames.push(frame);
                        self.run_thread(program, entry)
                    }
                    Callable::Primitive(primitive) => {
                        let frame = self.bind_arguments(
                            program,
                            name,
                            &primitive.params,
                            args,
                            location,
                        )?;
                        (primitive.func)(&mut self.out, &frame)
                    }
                }
            }

            // Statement nodes are never embedded as expression children
            node => unreachable!("evaluated non-expression node {:?}", node),
        }
    }

    // ==================== Call plumbing ====================

    fn lookup(
        &self,
        program: &Program,
        name: &str,
        location: &SourceLocation,
    ) -> Result<Callable> {
        program.lookup(name).cloned().ok_or_else(|| {
            WeftError::new(
                ErrorKind::UnknownFunction(name.to_string()),
                Some(location.clone()),
            )
        })
    }

    fn check_depth(&self, location: &SourceLocation) -> Result<()> {
        if self.frames.len() >= self.max_depth {
            return Err(WeftError::new(
                ErrorKind::StackOverflow(self.max_depth),
                Some(location.clone()),
            ));
        }
        Ok(())
    }

    /// Check arity, evaluate the actual arguments left to right in the
    /// caller's frame, and bind them into a fresh frame
    fn bind_arguments(
        &mut self,
        program: &Program,
        name: &str,
        params: &[String],
        args: &[NodeId],
        location: &SourceLocation,
    ) -> Result<Frame> {
        if args.len() != params.len() {
            return Err(WeftError::new(
                ErrorKind::WrongArity {
                    name: name.to_string(),
                    expected: params.len(),
                    got: args.len(),
                },
                Some(location.clone()),
            ));
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(program, *arg)?);
        }

        let mut frame = Frame::new(None);
        for (param, value) in params.iter().zip(values) {
            frame.bind(param, value);
        }
        Ok(frame)
    }

    fn frame(&self) -> &Frame {
        match self.frames.last() {
            Some(frame) => frame,
            None => unreachable!("no active frame"),
        }
    }

    fn frame_mut(&mut self) -> &mut Frame {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => unreachable!("no active frame"),
        }
    }
}

// ==================== Operators ====================

/// Apply a binary operator. Equality works on any pair of values;
/// arithmetic and ordering require integers on both sides. Arithmetic
/// wraps in two's complement; a zero divisor is a reported error.
fn apply_operator(
    op: BinaryOp,
    lhs: Value,
    rhs: Value,
    location: &SourceLocation,
) -> Result<Value> {
    match op {
        BinaryOp::Eq => return Ok(Value::from_bool(lhs == rhs)),
        BinaryOp::Ne => return Ok(Value::from_bool(lhs != rhs)),
        _ => {}
    }

    let (a, b) = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => (a, b),
        _ => {
            return Err(WeftError::new(
                ErrorKind::InvalidOperand(op.to_string()),
                Some(location.clone()),
            ))
        }
    };

    let value = match op {
        BinaryOp::Div | BinaryOp::Mod if b == 0 => {
            return Err(WeftError::new(
                ErrorKind::DivisionByZero,
                Some(location.clone()),
            ))
        }
        BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinaryOp::Div => Value::Int(a.wrapping_div(b)),
        BinaryOp::Mod => Value::Int(a.wrapping_rem(b)),
        BinaryOp::Add => Value::Int(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinaryOp::Lt => Value::from_bool(a < b),
        BinaryOp::Le => Value::from_bool(a <= b),
        BinaryOp::Gt => Value::from_bool(a > b),
        BinaryOp::Ge => Value::from_bool(a >= b),
        BinaryOp::Eq | BinaryOp::Ne => unreachable!(),
    };
    Ok(value)
}

// ==================== Primitives ====================

/// The `print` primitive: writes its single argument and a newline
pub fn native_print(out: &mut dyn Write, frame: &Frame) -> Result<Value> {
    let value = frame.get("value").unwrap_or(Value::Unit);
    writeln!(out, "{}", value)
        .map_err(|err| WeftError::new(ErrorKind::Io(err.to_string()), None))?;
    Ok(Value::Int(0))
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(source: &str) -> Result<(Value, String)> {
        let tokens = Lexer::new(source).tokenize()?;
        let definitions = Parser::new(tokens).parse()?;
        let program = Compiler::new().compile(&definitions)?;
        let mut executor = Executor::with_output(Vec::new());
        let value = executor.run(&program)?;
        let output = String::from_utf8(executor.into_output()).unwrap();
        Ok((value, output))
    }

    #[test]
    fn test_implicit_return_is_zero() {
        let (value, _) = run("fun main() { }").unwrap();
        assert_eq!(value, Value::Int(0));
    }

    #[test]
    fn test_explicit_return_value() {
        let (value, _) = run("fun main() { return 6 * 7 }").unwrap();
        assert_eq!(value, Value::Int(42));
    }

    #[test]
    fn test_print_writes_to_the_configured_output() {
        let (_, output) = run("fun main() { print(3) print(4) }").unwrap();
        assert_eq!(output, "3\n4\n");
    }

    #[test]
    fn test_call_in_expression_position() {
        let (value, _) = run(
            "fun double(n) { return n * 2 } \
             fun main() { var x x = double(21) return x }",
        )
        .unwrap();
        assert_eq!(value, Value::Int(42));
    }

    #[test]
    fn test_division_by_zero_is_reported() {
        let err = run("fun main() { return 1 / 0 }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_arithmetic_on_uninitialized_value_is_reported() {
        let err = run("fun main() { var x return x + 1 }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidOperand("+".to_string()));
    }

    #[test]
    fn test_missing_main_is_reported() {
        let err = run("fun helper() { }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownFunction("main".to_string()));
    }

    #[test]
    fn test_registered_primitives_are_callable() {
        fn native_seven(_out: &mut dyn Write, _frame: &Frame) -> Result<Value> {
            Ok(Value::Int(7))
        }

        let source = "fun main() { return seven() }";
        let tokens = Lexer::new(source).tokenize().unwrap();
        let definitions = Parser::new(tokens).parse().unwrap();

        let mut compiler = Compiler::new();
        compiler
            .register_primitive(crate::value::Primitive::new("seven", &[], native_seven))
            .unwrap();
        let program = compiler.compile(&definitions).unwrap();

        let mut executor = Executor::with_output(Vec::new());
        assert_eq!(executor.run(&program).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_registering_a_taken_name_fails() {
        fn noop(_out: &mut dyn Write, _frame: &Frame) -> Result<Value> {
            Ok(Value::Int(0))
        }

        let mut compiler = Compiler::new();
        let err = compiler
            .register_primitive(crate::value::Primitive::new("print", &["value"], noop))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FunctionRedefined("print".to_string()));
    }

    #[test]
    fn test_hand_assembled_fragments_run_standalone() {
        let mut program = Program::new();
        let value = program.add(Node::Integer { value: 42 });
        let ret = program.add(Node::Return { value });

        let mut executor = Executor::with_output(Vec::new());
        assert_eq!(executor.run_entry(&program, ret).unwrap(), Value::Int(42));

        // A fragment without a return just walks off the thread
        let declare = program.add(Node::Declare {
            name: "x".to_string(),
        });
        assert_eq!(
            executor.run_entry(&program, declare).unwrap(),
            Value::Unit
        );
    }

    #[test]
    fn test_overflow_respects_a_custom_depth() {
        let source = "fun loop() { loop() } fun main() { loop() }";
        let tokens = Lexer::new(source).tokenize().unwrap();
        let definitions = Parser::new(tokens).parse().unwrap();
        let program = Compiler::new().compile(&definitions).unwrap();

        let mut executor = Executor::with_output(Vec::new()).with_max_depth(8);
        let err = executor.run(&program).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StackOverflow(8));
        assert!(err.location.is_some());
    }
}
