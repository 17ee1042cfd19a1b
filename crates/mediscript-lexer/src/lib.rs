//! MediScript lexer: converts source text into a token stream.

pub mod error;
pub mod lexer;
pub mod token;

pub use error::LexError;
pub use lexer::{tokenize, Lexer};
pub use token::{Keyword, Token, TokenKind, ALL_KEYWORDS};
