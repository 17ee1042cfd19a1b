//! MediScript parser: converts a token stream into an AST.
//!
//! Recursive descent over the tokens produced by `mediscript-lexer`.
//! Binary operators group by precedence tier and associate to the left, so
//! `a - b * c - d` groups as `(a - (b * c)) - d`. Expression height and
//! block nesting are capped by [`MAX_EXPR_DEPTH`] and [`MAX_BLOCK_DEPTH`].

mod error;
mod parse_expr;
mod parse_stmt;
mod parser;

pub use error::{ParseError, ParseResult};
pub use parse_expr::MAX_EXPR_DEPTH;
pub use parse_stmt::MAX_BLOCK_DEPTH;
pub use parser::Parser;

use mediscript_lexer::Token;
use mediscript_types::ast::Program;

/// Parse a complete token stream (as produced by `tokenize`) into a program.
pub fn parse(tokens: &[Token]) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}
