//! Interactive read-eval-print loop.

use std::cell::Cell;
use std::rc::Rc;

use mediscript_eval::{Interpreter, InterpreterOptions, Scope, Value};
use mediscript_types::SourceFile;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::builtins;
use crate::error::CliError;

const PROMPT: &str = "> ";

/// A persistent global scope plus the flag `exit()` raises.
pub struct Session {
    scope: Scope,
    options: InterpreterOptions,
    exit_requested: Rc<Cell<bool>>,
}

impl Session {
    pub fn new(options: InterpreterOptions) -> Self {
        let scope = Scope::new();
        builtins::install(&scope);
        Self::with_scope(scope, options)
    }

    /// Start from a scope that already holds the built-ins the caller wants.
    pub fn with_scope(scope: Scope, options: InterpreterOptions) -> Self {
        let exit_requested = Rc::new(Cell::new(false));
        let flag = Rc::clone(&exit_requested);
        builtins::define(&scope, "exit", Some(0), move |_| {
            flag.set(true);
            Ok(Value::Nil)
        });
        Self {
            scope,
            options,
            exit_requested,
        }
    }

    /// Run one line against the session scope.
    ///
    /// A failing line leaves the session scope in place, so bindings made
    /// by earlier lines stay reachable.
    pub fn run_line(&mut self, line: &str) -> Result<(), CliError> {
        let tokens = mediscript_lexer::tokenize(line)?;
        let program = mediscript_parser::parse(&tokens)?;
        let mut interpreter = Interpreter::with_options(self.options);
        self.scope = interpreter.run(&program, self.scope.clone())?;
        Ok(())
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested.get()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

/// Read lines until Ctrl-C, Ctrl-D or `exit()`.
pub fn run(options: InterpreterOptions) -> Result<(), CliError> {
    println!("MediScript v{}", env!("CARGO_PKG_VERSION"));

    let mut session = Session::new(options);
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str())?;

                if let Err(e) = session.run_line(&line) {
                    debug!(error = ?e, "line failed");
                    eprintln!("{}", e.render(&SourceFile::new("<repl>", line)));
                }
                if session.exit_requested() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::with_scope(Scope::new(), InterpreterOptions::default())
    }

    #[test]
    fn scope_persists_between_lines() {
        let mut s = session();
        s.run_line("prepare dose as 5").unwrap();
        s.run_line("prepare total as dose * 2").unwrap();
        assert_eq!(s.scope().get("total"), Some(Value::Number(10.0)));
    }

    #[test]
    fn failed_line_keeps_previous_scope() {
        let mut s = session();
        s.run_line("diagnose twice needs (x) { finished x * 2 }").unwrap();
        assert!(matches!(
            s.run_line("prepare y as missing"),
            Err(CliError::Runtime(_))
        ));
        assert!(matches!(s.run_line("prepare 'oops"), Err(CliError::Lex(_))));
        assert!(matches!(s.run_line("prepare as"), Err(CliError::Parse(_))));
        s.run_line("prepare z as twice(4)").unwrap();
        assert_eq!(s.scope().get("z"), Some(Value::Number(8.0)));
        assert!(!s.scope().contains("y"));
    }

    #[test]
    fn exit_raises_the_flag() {
        let mut s = session();
        assert!(!s.exit_requested());
        s.run_line("exit()").unwrap();
        assert!(s.exit_requested());
    }

    #[test]
    fn call_depth_option_applies() {
        let mut s = Session::with_scope(
            Scope::new(),
            InterpreterOptions { max_call_depth: 4 },
        );
        s.run_line("diagnose down needs (n) { if (n > 0) { finished down(n - 1) } finished 0 }")
            .unwrap();
        s.run_line("down(3)").unwrap();
        assert!(matches!(s.run_line("down(10)"), Err(CliError::Runtime(_))));
    }
}
