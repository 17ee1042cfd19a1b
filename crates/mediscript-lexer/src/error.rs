//! Lexer error type.

use serde::Serialize;
use thiserror::Error;

/// A lexical error: an unrecognized symbol or an unterminated string.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Error on {line}:{column}: {message}")]
pub struct LexError {
    /// 1-based line of the offending character.
    pub line: u32,
    /// 1-based column of the offending character.
    pub column: u32,
    pub message: String,
}

impl LexError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}
