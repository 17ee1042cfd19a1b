//! MediScript tree-walking evaluator.
//!
//! Executes a parsed program directly from the AST against a chain of
//! [`Scope`] frames. The evaluator performs no I/O of its own; the host
//! installs built-ins as [`NativeFunction`] values.

mod env;
mod error;
mod evaluator;
mod value;

pub use env::Scope;
pub use error::{EvalResult, RuntimeError, RuntimeErrorKind};
pub use evaluator::{Flow, Interpreter, InterpreterOptions};
pub use value::{Function, Instance, NativeFunction, StructDef, Value};

use mediscript_types::ast::Stmt;

/// Run `program` against `scope` with default options and return the
/// mutated scope.
pub fn evaluate(program: &[Stmt], scope: Scope) -> EvalResult<Scope> {
    Interpreter::new().run(program, scope)
}
