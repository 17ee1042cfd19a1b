//! Built-in functions installed into the global scope.

use std::io::Write;

use mediscript_eval::{EvalResult, NativeFunction, RuntimeError, Scope, Value};

/// Bind every built-in in `scope`. `print` writes to stdout.
pub fn install(scope: &Scope) {
    install_with_output(scope, || -> Box<dyn Write> { Box::new(std::io::stdout()) });
}

/// Bind every built-in, with `print` writing to whatever `output` opens.
pub fn install_with_output(scope: &Scope, output: impl Fn() -> Box<dyn Write> + 'static) {
    define(scope, "print", None, move |args| {
        let line = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(output(), "{line}")
            .map_err(|e| RuntimeError::native(format!("print failed: {e}")))?;
        Ok(Value::Nil)
    });
    define(scope, "length", Some(1), |args| match &args[0] {
        Value::Array(items) => Ok(Value::Number(items.len() as f64)),
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        other => Err(expected("length", "an array or string", other)),
    });
    define(scope, "text", Some(1), |args| Ok(Value::String(args[0].to_string())));
    define(scope, "number", Some(1), |args| match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Value::Number)
            .map_err(|_| RuntimeError::native(format!("cannot read '{s}' as a number"))),
        other => Err(expected("number", "a number or string", other)),
    });
    define(scope, "round", Some(1), |args| {
        Ok(Value::Number(number_arg("round", &args[0])?.round()))
    });
    define(scope, "floor", Some(1), |args| {
        Ok(Value::Number(number_arg("floor", &args[0])?.floor()))
    });
    define(scope, "sqrt", Some(1), |args| {
        let n = number_arg("sqrt", &args[0])?;
        if n < 0.0 {
            return Err(RuntimeError::native(format!(
                "sqrt of negative number {n}"
            )));
        }
        Ok(Value::Number(n.sqrt()))
    });
}

pub(crate) fn define(
    scope: &Scope,
    name: &str,
    arity: Option<usize>,
    func: impl Fn(Vec<Value>) -> EvalResult<Value> + 'static,
) {
    let native = NativeFunction::new(name, arity, func);
    scope.define(name, Value::Native(native.into()));
}

fn number_arg(name: &str, value: &Value) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(expected(name, "a number", other)),
    }
}

fn expected(name: &str, what: &str, got: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(format!(
        "{name} expects {what} but got {}",
        got.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use mediscript_eval::RuntimeErrorKind;

    use super::*;

    /// A writer that appends into a shared buffer.
    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn run(source: &str) -> (EvalResult<Scope>, String) {
        let captured = Captured::default();
        let scope = Scope::new();
        let sink = captured.clone();
        install_with_output(&scope, move || -> Box<dyn Write> { Box::new(sink.clone()) });
        let tokens = mediscript_lexer::tokenize(source).unwrap();
        let program = mediscript_parser::parse(&tokens).unwrap();
        let result = mediscript_eval::evaluate(&program, scope);
        let out = String::from_utf8(captured.0.borrow().clone()).unwrap();
        (result, out)
    }

    fn output(source: &str) -> String {
        let (result, out) = run(source);
        if let Err(e) = result {
            panic!("unexpected error: {e}");
        }
        out
    }

    fn error(source: &str) -> RuntimeErrorKind {
        match run(source).0 {
            Ok(_) => panic!("expected a runtime error"),
            Err(e) => e.kind,
        }
    }

    #[test]
    fn print_joins_arguments_with_spaces() {
        assert_eq!(output("print('dose', 2.5, true, [1, 'a'])"), "dose 2.5 true [1, \"a\"]\n");
        assert_eq!(output("print()"), "\n");
    }

    #[test]
    fn print_returns_nil() {
        assert_eq!(output("print(print(1))"), "1\nnil\n");
    }

    #[test]
    fn length_of_arrays_and_strings() {
        assert_eq!(output("print(length([1, 2, 3]), length('héllo'))"), "3 5\n");
        assert!(matches!(error("length(4)"), RuntimeErrorKind::TypeMismatch(_)));
    }

    #[test]
    fn text_and_number_conversions() {
        assert_eq!(output("print(text(12) + 1, number(' 3.5 ') + 1, number(2))"), "121 4.5 2\n");
        assert!(matches!(error("number('abc')"), RuntimeErrorKind::Native(_)));
        assert!(matches!(error("number(true)"), RuntimeErrorKind::TypeMismatch(_)));
    }

    #[test]
    fn rounding_and_roots() {
        assert_eq!(output("print(round(2.5), floor(2.9), sqrt(16))"), "3 2 4\n");
        assert_eq!(
            error("sqrt(0 - 4)"),
            RuntimeErrorKind::Native("sqrt of negative number -4".into())
        );
        assert!(matches!(error("round('x')"), RuntimeErrorKind::TypeMismatch(_)));
    }

    #[test]
    fn fixed_arity_is_enforced() {
        assert!(matches!(
            error("sqrt(1, 2)"),
            RuntimeErrorKind::ArityMismatch { expected: 1, got: 2, .. }
        ));
    }
}
