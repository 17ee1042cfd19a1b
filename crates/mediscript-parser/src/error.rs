//! Parser error type.

use mediscript_lexer::Token;
use serde::Serialize;
use thiserror::Error;

/// A syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("Syntax error on {}: {message}", .token.span)]
pub struct ParseError {
    /// The offending token.
    pub token: Token,
    /// What the parser was looking for, when it was looking for one thing.
    pub expected: Option<String>,
    pub message: String,
}

impl ParseError {
    /// An "expected X but got Y" error at `token`.
    pub fn expected(token: &Token, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        let message = format!("Expected {expected} but got '{}'", token.kind);
        Self {
            token: token.clone(),
            expected: Some(expected),
            message,
        }
    }

    /// A free-form error at `token`.
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            token: token.clone(),
            expected: None,
            message: message.into(),
        }
    }

    /// 1-based line of the offending token.
    pub fn line(&self) -> u32 {
        self.token.line()
    }

    /// 1-based column of the offending token.
    pub fn column(&self) -> u32 {
        self.token.column()
    }
}

/// Parser result type alias.
pub type ParseResult<T> = Result<T, ParseError>;
