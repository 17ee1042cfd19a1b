//! Token types for the MediScript lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the language, the closed
//! [`Keyword`] set, and [`Token`], which pairs a kind with its raw text and
//! source [`Span`].

use mediscript_types::Span;
use serde::Serialize;
use std::fmt;

/// All reserved words, in the order the grammar introduces them.
pub const ALL_KEYWORDS: &[&str] = &[
    "finished", "diagnose", "needs", "while", "loop", "through", "if", "elif", "else", "prepare",
    "as", "patient", "has",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// What kind of token this is, including any literal payload.
    pub kind: TokenKind,
    /// The raw source text of the token (empty for `Eof`).
    pub lexeme: String,
    /// Source location.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// 1-based line of the first character.
    pub fn line(&self) -> u32 {
        self.span.start_line
    }

    /// 1-based column of the first character.
    pub fn column(&self) -> u32 {
        self.span.start_col
    }

    /// Returns `true` if this token is the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Keyword
// ─────────────────────────────────────────────────────────────────────

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    /// `finished`: return from a function
    Finished,
    /// `diagnose`: function declaration
    Diagnose,
    /// `needs`: parameter list
    Needs,
    While,
    /// `loop`: counted range loop
    Loop,
    /// `through`: range of a `loop`
    Through,
    If,
    Elif,
    Else,
    /// `prepare`: variable declaration / property assignment
    Prepare,
    As,
    /// `patient`: struct declaration
    Patient,
    /// `has`: member list of a `patient`
    Has,
}

impl Keyword {
    /// Look up a reserved word. Returns `None` for user identifiers.
    pub fn lookup(s: &str) -> Option<Keyword> {
        Some(match s {
            "finished" => Keyword::Finished,
            "diagnose" => Keyword::Diagnose,
            "needs" => Keyword::Needs,
            "while" => Keyword::While,
            "loop" => Keyword::Loop,
            "through" => Keyword::Through,
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "prepare" => Keyword::Prepare,
            "as" => Keyword::As,
            "patient" => Keyword::Patient,
            "has" => Keyword::Has,
            _ => return None,
        })
    }

    /// The source text of the keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Finished => "finished",
            Keyword::Diagnose => "diagnose",
            Keyword::Needs => "needs",
            Keyword::While => "while",
            Keyword::Loop => "loop",
            Keyword::Through => "through",
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::Prepare => "prepare",
            Keyword::As => "as",
            Keyword::Patient => "patient",
            Keyword::Has => "has",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every kind of token the lexer can produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum TokenKind {
    // ── Punctuation ──────────────────────────────────────────
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Period,
    Comma,
    Colon,

    // ── Operators ────────────────────────────────────────────
    Plus,
    Minus,
    Asterisk,
    Slash,
    /// `||`
    Or,
    /// `&&`
    And,
    /// `!`
    Not,
    /// `==`
    Equiv,
    /// `!=`
    NotEquiv,
    Gt,
    Gte,
    Lt,
    Lte,

    // ── Words & literals ─────────────────────────────────────
    Keyword(Keyword),
    Identifier(String),
    String(String),
    Number(f64),
    Boolean(bool),

    /// End of input
    Eof,
}

impl TokenKind {
    /// A short description of the kind, independent of any payload.
    /// Used for "expected X" messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::String(_) => "string",
            TokenKind::Number(_) => "number",
            TokenKind::Boolean(_) => "boolean",
            TokenKind::Eof => "end of input",
            _ => self.symbol(),
        }
    }

    /// The fixed source text of punctuation and operator kinds.
    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Period => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Or => "||",
            TokenKind::And => "&&",
            TokenKind::Not => "!",
            TokenKind::Equiv => "==",
            TokenKind::NotEquiv => "!=",
            TokenKind::Gt => ">",
            TokenKind::Gte => ">=",
            TokenKind::Lt => "<",
            TokenKind::Lte => "<=",
            TokenKind::Keyword(_)
            | TokenKind::Identifier(_)
            | TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::Boolean(_)
            | TokenKind::Eof => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "{kw}"),
            TokenKind::Identifier(name) => f.write_str(name),
            TokenKind::String(s) => write!(f, "\"{s}\""),
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Boolean(b) => write!(f, "{b}"),
            TokenKind::Eof => f.write_str("end of input"),
            _ => f.write_str(self.symbol()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
