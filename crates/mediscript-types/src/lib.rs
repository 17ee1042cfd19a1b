//! Shared types for MediScript.
//!
//! This crate defines the AST node types, source spans and the source
//! printer used across the lexer, parser, evaluator and driver.

mod span;
mod stack;
pub mod ast;
pub mod printer;

pub use span::{SourceFile, Span};
pub use stack::ensure_sufficient_stack;
