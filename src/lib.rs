//! Weft: a tiny imperative language interpreted as a threaded
//! instruction graph
//!
//! The pipeline is lexer -> parser -> compiler -> executor. The
//! compiler flattens the tree into nodes chained by "next" links, so
//! the executor runs a whole function body as a single pointer walk
//! over an explicit call-frame stack.
//!
//! ```
//! let value = weft::run("fun main() { return 2 + 2 }").unwrap();
//! assert_eq!(value, weft::Value::Int(4));
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod thread;
pub mod token;
pub mod value;

pub use compiler::Compiler;
pub use error::{ErrorKind, Result, WeftError};
pub use executor::{Executor, Frame, DEFAULT_MAX_DEPTH};
pub use lexer::Lexer;
pub use parser::Parser;
pub use thread::{Callable, Node, NodeId, Program};
pub use token::{SourceLocation, Token, TokenKind};
pub use value::{Primitive, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile source text into a runnable program
pub fn compile(source: &str) -> Result<Program> {
    compile_with_origin(source, None)
}

/// Compile source text, tagging locations with an origin such as a
/// file name
pub fn compile_with_origin(source: &str, origin: Option<&str>) -> Result<Program> {
    let tokens = Lexer::with_origin(source, origin).tokenize()?;
    let definitions = Parser::new(tokens).parse()?;
    Compiler::new().compile(&definitions)
}

/// Compile and run a program, printing to standard output. Returns the
/// value `main` returned.
pub fn run(source: &str) -> Result<Value> {
    let program = compile(source)?;
    Executor::new().run(&program)
}
