//! Core MediScript lexer: converts source text to a token stream.
//!
//! Single left-to-right pass with one character of lookahead. Lexing stops
//! at the first error.
//!
//! - Spaces, tabs and `\r` are skipped; newlines only advance the position
//! - `!` as the first non-blank character of a line starts a line comment
//! - Strings use `'` or `"` and carry their raw content (no escapes)

use mediscript_types::Span;

use crate::error::LexError;
use crate::token::{Keyword, Token, TokenKind};

/// The MediScript lexer.
pub struct Lexer<'src> {
    /// The full source text.
    source: &'src str,
    /// The source text as bytes, for cheap lookahead.
    bytes: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// No token has been produced on the current line yet.
    at_line_start: bool,
    /// Tokens produced so far.
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    /// Lex the entire source into a token stream ending with [`TokenKind::Eof`].
    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_trivia();
            if self.at_end() {
                break;
            }
            self.scan_token()?;
            self.at_line_start = false;
        }
        let eof = Token::new(TokenKind::Eof, "", self.current_span());
        self.tokens.push(eof);
        Ok(self.tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Consume one character (a whole UTF-8 sequence for non-ASCII text).
    fn advance(&mut self) -> Option<char> {
        let ch = self.source[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
            self.at_line_start = true;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume the next byte if it equals `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn push(&mut self, kind: TokenKind, start: usize, start_line: u32, start_col: u32) {
        let lexeme = &self.source[start..self.pos];
        let span = self.span_from(start_line, start_col);
        self.tokens.push(Token::new(kind, lexeme, span));
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace, newlines and line comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'!' if self.at_line_start => self.skip_comment(),
                _ => break,
            }
        }
    }

    /// Consume everything until end-of-line (but not the newline itself).
    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == b'\n' {
                break;
            }
            self.advance();
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let Some(ch) = self.advance() else {
            return Ok(());
        };

        let kind = match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '.' => TokenKind::Period,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,

            '>' if self.eat(b'=') => TokenKind::Gte,
            '>' => TokenKind::Gt,
            '<' if self.eat(b'=') => TokenKind::Lte,
            '<' => TokenKind::Lt,
            '!' if self.eat(b'=') => TokenKind::NotEquiv,
            '!' => TokenKind::Not,
            '=' if self.eat(b'=') => TokenKind::Equiv,
            '&' if self.eat(b'&') => TokenKind::And,
            '|' if self.eat(b'|') => TokenKind::Or,

            '"' | '\'' => self.scan_string(ch, start_line, start_col)?,
            '0'..='9' => self.scan_number(start),
            'a'..='z' | 'A'..='Z' | '_' => self.scan_identifier(start),

            _ => {
                return Err(LexError::new(
                    start_line,
                    start_col,
                    format!("Unexpected character '{ch}'"),
                ));
            }
        };

        self.push(kind, start, start_line, start_col);
        Ok(())
    }

    /// Scan a string literal after its opening delimiter.
    fn scan_string(
        &mut self,
        delimiter: char,
        start_line: u32,
        start_col: u32,
    ) -> Result<TokenKind, LexError> {
        let content_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(LexError::new(
                        start_line,
                        start_col,
                        "Unexpected end of file; expected a closing quote",
                    ));
                }
                Some(b) if b as char == delimiter => {
                    let content = self.source[content_start..self.pos].to_string();
                    self.advance();
                    return Ok(TokenKind::String(content));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self, start: usize) -> TokenKind {
        // The first digit was already consumed.
        while let Some(b'0'..=b'9') = self.peek() {
            self.advance();
        }

        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            self.advance();
            while let Some(b'0'..=b'9') = self.peek() {
                self.advance();
            }
        }

        // Digits with at most one interior point always parse.
        let value = self.source[start..self.pos].parse().unwrap_or(0.0);
        TokenKind::Number(value)
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[start..self.pos];
        match text {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            _ => Keyword::lookup(text)
                .map(TokenKind::Keyword)
                .unwrap_or_else(|| TokenKind::Identifier(text.to_string())),
        }
    }
}

/// Lex `source` into tokens, stopping at the first error.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).lex()
}
