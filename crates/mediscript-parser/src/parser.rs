//! Core parser infrastructure: token cursor and expect helpers.

use mediscript_lexer::{Keyword, Token, TokenKind};
use mediscript_types::ast::{Ident, Program};
use mediscript_types::Span;

use crate::error::{ParseError, ParseResult};

/// The MediScript parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// `Eof` is the only stopping condition: the cursor never moves past it, and
/// a stream without a trailing `Eof` behaves as if it had one.
pub struct Parser<'t> {
    /// The token stream.
    tokens: &'t [Token],
    /// Current index into `tokens`.
    pos: usize,
    /// Returned by `peek` once the stream is exhausted.
    eof: Token,
    /// Current expression nesting depth.
    pub(crate) expr_depth: usize,
    /// Current block nesting depth.
    pub(crate) block_depth: usize,
}

impl<'t> Parser<'t> {
    /// Create a new parser over a token stream.
    pub fn new(tokens: &'t [Token]) -> Self {
        let eof_span = tokens.last().map(|t| t.span).unwrap_or_default();
        Self {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, "", eof_span),
            expr_depth: 0,
            block_depth: 0,
        }
    }

    /// Parse statements until `Eof`.
    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut program = Vec::new();
        while !self.at_end() {
            program.push(self.parse_statement()?);
        }
        Ok(program)
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => self.eof.span,
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Check if the current token is the given keyword.
    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek().is_keyword(keyword)
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific punctuation or operator token.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> ParseResult<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(format!("'{}'", expected.describe())))
        }
    }

    /// Expect a keyword. Errors report the keyword text.
    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> ParseResult<Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(format!("'{keyword}'")))
        }
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self) -> ParseResult<Ident> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            _ => Err(self.error_expected("identifier")),
        }
    }

    /// Comma-separated identifiers; the list may be empty. The caller
    /// consumes the closing delimiter.
    pub(crate) fn parse_ident_list(&mut self) -> ParseResult<Vec<Ident>> {
        let mut idents = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::Identifier(_)) {
            return Ok(idents);
        }
        idents.push(self.expect_identifier()?);
        while self.eat(&TokenKind::Comma) {
            idents.push(self.expect_identifier()?);
        }
        Ok(idents)
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// An "expected X but got Y" error at the current token.
    pub(crate) fn error_expected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::expected(self.peek(), expected)
    }
}
