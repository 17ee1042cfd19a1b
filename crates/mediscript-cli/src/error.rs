//! Driver-level errors and their rendering.

use mediscript_eval::RuntimeError;
use mediscript_lexer::LexError;
use mediscript_parser::ParseError;
use mediscript_types::SourceFile;
use thiserror::Error;

/// Anything that can stop the driver.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not write JSON dump: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line editor failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl CliError {
    /// The 1-based line and column the error points at, when it has one.
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            CliError::Lex(e) => Some((e.line, e.column)),
            CliError::Parse(e) => Some((e.line(), e.column())),
            CliError::Runtime(e) => e.span.map(|s| (s.start_line, s.start_col)),
            CliError::Io(_) | CliError::Json(_) | CliError::Readline(_) => None,
        }
    }

    /// The message followed by the offending source line and a caret.
    pub fn render(&self, source: &SourceFile) -> String {
        let mut out = self.to_string();
        let Some((line, column)) = self.position() else {
            return out;
        };
        if let Some(text) = source.line(line) {
            let gutter = format!("{line} | ");
            let pad: String = text
                .chars()
                .take(column.saturating_sub(1) as usize)
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            out.push_str(&format!(
                "\n  --> {}:{line}:{column}\n{gutter}{text}\n{}{pad}^",
                source.name,
                " ".repeat(gutter.len())
            ));
        }
        out
    }
}
