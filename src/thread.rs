//! Threaded program representation for Weft
//!
//! The compiled form of a program: an arena of nodes indexed by stable
//! ids, with the "next to execute" relation kept as a side table from
//! id to optional id. Storing the links outside the nodes avoids
//! ownership cycles between a loop body and the loop node it jumps
//! back to, and between branches and their shared continuation.

use crate::ast::BinaryOp;
use crate::token::SourceLocation;
use crate::value::Primitive;
use std::collections::HashMap;
use std::fmt;

/// Stable index of a node in the program arena
pub type NodeId = usize;

/// A compiled node. Statement-level nodes are reached through the next
/// table; expression-level nodes are only reached as children
/// (condition, operands, arguments) and have no next link of their own.
#[derive(Debug, Clone)]
pub enum Node {
    /// Integer literal
    Integer { value: i64 },

    /// Variable reference
    Variable { name: String, location: SourceLocation },

    /// Binary operation; operands evaluate left before right
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
        location: SourceLocation,
    },

    /// Function call; arguments evaluate left to right in the caller's frame
    Call {
        name: String,
        args: Vec<NodeId>,
        location: SourceLocation,
    },

    /// Return from the current function with the value of `value`
    Return { value: NodeId },

    /// Bind a name to the uninitialized value in the current frame
    Declare { name: String },

    /// Store the value of `value` under an already-declared name
    Assign {
        name: String,
        value: NodeId,
        location: SourceLocation,
    },

    /// Conditional. The branch tails are recorded so that setting the
    /// if-node's next link can be propagated to both of them: whichever
    /// branch ran, control converges on the same continuation.
    If {
        condition: NodeId,
        then_entry: NodeId,
        then_tail: NodeId,
        else_entry: Option<NodeId>,
        else_tail: Option<NodeId>,
    },

    /// Loop. The body tail is linked back to the while node itself; the
    /// while node's own next link is only taken once the condition is
    /// false.
    While { condition: NodeId, body_entry: NodeId },

    /// Compiled form of an empty block: falls through to its next link
    Sentinel,
}

/// A user-defined or native entry in the function table
#[derive(Debug, Clone)]
pub enum Callable {
    /// A compiled function body reachable at `entry`
    User { params: Vec<String>, entry: NodeId },

    /// A native operation callable like any function
    Primitive(Primitive),
}

impl Callable {
    pub fn params(&self) -> &[String] {
        match self {
            Callable::User { params, .. } => params,
            Callable::Primitive(p) => &p.params,
        }
    }
}

/// A compiled, threaded program plus its function table
#[derive(Debug, Clone, Default)]
pub struct Program {
    nodes: Vec<Node>,
    next: Vec<Option<NodeId>>,
    functions: HashMap<String, Callable>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the arena and return its id
    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.next.push(None);
        self.nodes.len() - 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The node to execute after `id` completes, if any
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.next[id]
    }

    /// Link `id` to its continuation. For an if-node the link is also
    /// written into both recorded branch tails, so that both branches
    /// converge after the conditional.
    pub fn set_next(&mut self, id: NodeId, target: NodeId) {
        self.next[id] = Some(target);

        let tails = match &self.nodes[id] {
            Node::If { then_tail, else_tail, .. } => Some((*then_tail, *else_tail)),
            _ => None,
        };

        if let Some((then_tail, else_tail)) = tails {
            self.set_next(then_tail, target);
            if let Some(else_tail) = else_tail {
                self.set_next(else_tail, target);
            }
        }
    }

    /// Insert into the function table; `false` if the name is taken
    pub fn define(&mut self, name: &str, callable: Callable) -> bool {
        if self.functions.contains_key(name) {
            return false;
        }
        self.functions.insert(name.to_string(), callable);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, node) in self.nodes.iter().enumerate() {
            let next = match self.next[id] {
                Some(n) => format!("-> {}", n),
                None => "-> .".to_string(),
            };
            let label = match node {
                Node::Integer { value } => format!("integer {}", value),
                Node::Variable { name, .. } => format!("variable {}", name),
                Node::Binary { op, lhs, rhs, .. } => format!("binary {} {} {}", op, lhs, rhs),
                Node::Call { name, args, .. } => format!("call {} {:?}", name, args),
                Node::Return { value } => format!("return {}", value),
                Node::Declare { name } => format!("declare {}", name),
                Node::Assign { name, value, .. } => format!("assign {} {}", name, value),
                Node::If { condition, then_entry, else_entry, .. } => {
                    format!("if {} then {} else {:?}", condition, then_entry, else_entry)
                }
                Node::While { condition, body_entry } => {
                    format!("while {} body {}", condition, body_entry)
                }
                Node::Sentinel => "sentinel".to_string(),
            };
            writeln!(f, "{:04} {:<24} {}", id, label, next)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_links_start_empty() {
        let mut program = Program::new();
        let a = program.add(Node::Sentinel);
        let b = program.add(Node::Sentinel);
        assert_eq!(program.next(a), None);

        program.set_next(a, b);
        assert_eq!(program.next(a), Some(b));
        assert_eq!(program.next(b), None);
    }

    #[test]
    fn test_if_next_propagates_to_branch_tails() {
        let mut program = Program::new();
        let condition = program.add(Node::Integer { value: 1 });
        let then_tail = program.add(Node::Sentinel);
        let else_tail = program.add(Node::Sentinel);
        let if_node = program.add(Node::If {
            condition,
            then_entry: then_tail,
            then_tail,
            else_entry: Some(else_tail),
            else_tail: Some(else_tail),
        });
        let continuation = program.add(Node::Sentinel);

        program.set_next(if_node, continuation);

        assert_eq!(program.next(if_node), Some(continuation));
        assert_eq!(program.next(then_tail), Some(continuation));
        assert_eq!(program.next(else_tail), Some(continuation));
    }

    #[test]
    fn test_define_rejects_duplicates() {
        let mut program = Program::new();
        let entry = program.add(Node::Sentinel);
        assert!(program.define("f", Callable::User { params: vec![], entry }));
        assert!(!program.define("f", Callable::User { params: vec![], entry }));
    }

    #[test]
    fn test_display_shows_links() {
        let mut program = Program::new();
        let a = program.add(Node::Declare { name: "x".to_string() });
        let b = program.add(Node::Sentinel);
        program.set_next(a, b);
        let dump = program.to_string();
        assert!(dump.contains("declare x"));
        assert!(dump.contains("-> 1"));
    }
}
