//! Compiler for Weft
//!
//! Flattens the parsed tree into a threaded [`Program`]: every
//! statement becomes a node with a "next" link, so the executor can
//! run a whole function body as one pointer walk. Blocks compile to an
//! (entry, tail) pair; a loop body's tail is linked back to the loop
//! node, and each function body gets a fallback `return 0` chained
//! after its tail.

use crate::ast::{Block, Definitions, Expr, FunctionDefinition, Stmt};
use crate::error::{ErrorKind, Result, WeftError};
use crate::executor::native_print;
use crate::thread::{Callable, Node, NodeId, Program};
use crate::value::Primitive;

// ==================== Compiler ====================

pub struct Compiler {
    program: Program,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Create a compiler with the standard `print` primitive installed
    pub fn new() -> Self {
        let mut program = Program::new();
        // Fresh table, the insertion cannot collide
        program.define(
            "print",
            Callable::Primitive(Primitive::new("print", &["value"], native_print)),
        );
        Self { program }
    }

    /// Install an additional native function before compilation.
    /// Fails if the name is already taken, including by `print`.
    pub fn register_primitive(&mut self, primitive: Primitive) -> Result<()> {
        let name = primitive.name.clone();
        if !self.program.define(&name, Callable::Primitive(primitive)) {
            return Err(WeftError::new(ErrorKind::FunctionRedefined(name), None));
        }
        Ok(())
    }

    /// Compile all definitions into a runnable program
    pub fn compile(mut self, definitions: &Definitions) -> Result<Program> {
        for definition in &definitions.items {
            self.compile_function(definition)?;
        }
        Ok(self.program)
    }

    // ==================== Functions and blocks ====================

    fn compile_function(&mut self, definition: &FunctionDefinition) -> Result<()> {
        let (entry, tail) = self.compile_block(&definition.body)?;

        // Falling off the end of a function returns 0
        let zero = self.program.add(Node::Integer { value: 0 });
        let fallback = self.program.add(Node::Return { value: zero });
        self.program.set_next(tail, fallback);

        let callable = Callable::User {
            params: definition.params.clone(),
            entry,
        };
        if !self.program.define(&definition.name, callable) {
            return Err(WeftError::new(
                ErrorKind::FunctionRedefined(definition.name.clone()),
                Some(definition.location.clone()),
            ));
        }
        Ok(())
    }

    /// Compile a block into its entry and tail nodes. Consecutive
    /// statements are linked front to back; an empty block compiles to
    /// a single sentinel that just falls through.
    fn compile_block(&mut self, block: &Block) -> Result<(NodeId, NodeId)> {
        let mut entry = None;
        let mut tail: Option<NodeId> = None;

        for statement in &block.items {
            let (stmt_entry, stmt_tail) = self.compile_statement(statement)?;
            if let Some(previous) = tail {
                self.program.set_next(previous, stmt_entry);
            }
            entry.get_or_insert(stmt_entry);
            tail = Some(stmt_tail);
        }

        match (entry, tail) {
            (Some(entry), Some(tail)) => Ok((entry, tail)),
            _ => {
                let sentinel = self.program.add(Node::Sentinel);
                Ok((sentinel, sentinel))
            }
        }
    }

    // ==================== Statements ====================

    fn compile_statement(&mut self, statement: &Stmt) -> Result<(NodeId, NodeId)> {
        match statement {
            Stmt::VarDecl { name, .. } => {
                let id = self.program.add(Node::Declare { name: name.clone() });
                Ok((id, id))
            }

            Stmt::Assign { name, value, location } => {
                let value = self.compile_expression(value)?;
                let id = self.program.add(Node::Assign {
                    name: name.clone(),
                    value,
                    location: location.clone(),
                });
                Ok((id, id))
            }

            Stmt::Return { value, .. } => {
                let value = self.compile_expression(value)?;
                let id = self.program.add(Node::Return { value });
                Ok((id, id))
            }

            Stmt::Expr { expr } => {
                // An expression node doubles as a statement node; the
                // executor evaluates it and discards the value
                let id = self.compile_expression(expr)?;
                Ok((id, id))
            }

            Stmt::If { condition, then_body, else_body, .. } => {
                let condition = self.compile_expression(condition)?;
                let (then_entry, then_tail) = self.compile_block(then_body)?;
                let (else_entry, else_tail) = match else_body {
                    Some(block) => {
                        let (entry, tail) = self.compile_block(block)?;
                        (Some(entry), Some(tail))
                    }
                    None => (None, None),
                };
                let id = self.program.add(Node::If {
                    condition,
                    then_entry,
                    then_tail,
                    else_entry,
                    else_tail,
                });
                Ok((id, id))
            }

            Stmt::While { condition, body, .. } => {
                let condition = self.compile_expression(condition)?;
                let (body_entry, body_tail) = self.compile_block(body)?;
                let id = self.program.add(Node::While { condition, body_entry });
                // The body loops back to re-test the condition
                self.program.set_next(body_tail, id);
                Ok((id, id))
            }
        }
    }

    // ==================== Expressions ====================

    fn compile_expression(&mut self, expression: &Expr) -> Result<NodeId> {
        match expression {
            Expr::Integer { value, .. } => Ok(self.program.add(Node::Integer { value: *value })),

            Expr::Variable { name, location } => Ok(self.program.add(Node::Variable {
                name: name.clone(),
                location: location.clone(),
            })),

            Expr::Call { name, args, location } => {
                let args = args
                    .iter()
                    .map(|arg| self.compile_expression(arg))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.program.add(Node::Call {
                    name: name.clone(),
                    args,
                    location: location.clone(),
                }))
            }

            Expr::Binary { op, lhs, rhs, location } => {
                let lhs = self.compile_expression(lhs)?;
                let rhs = self.compile_expression(rhs)?;
                Ok(self.program.add(Node::Binary {
                    op: *op,
                    lhs,
                    rhs,
                    location: location.clone(),
                }))
            }
        }
    }
}

// ==================== Tests ====================
