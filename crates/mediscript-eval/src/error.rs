//! Runtime error types for the MediScript evaluator.

use mediscript_types::Span;
use thiserror::Error;

/// What went wrong at runtime.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeErrorKind {
    /// Reading a name that no enclosing frame binds.
    #[error("{0} is not defined in current scope")]
    UndefinedVariable(String),

    /// Calling a value that is not a function, method, built-in or patient.
    #[error("{0} is not callable")]
    NotCallable(String),

    #[error("{name} expects {expected} argument(s) but got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Property access on a value that has no such property.
    #[error("{type_name} has no property '{property}'")]
    NoProperty { type_name: String, property: String },

    /// An operand or argument of the wrong type.
    #[error("{0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    /// A member that the patient definition does not declare.
    #[error("{structure} has no member '{member}'")]
    UnknownMember { structure: String, member: String },

    /// An instance literal that leaves a declared member out.
    #[error("{structure} instance is missing member '{member}'")]
    MissingMember { structure: String, member: String },

    /// An instance literal that initializes a member twice.
    #[error("member '{member}' of {structure} is given more than once")]
    DuplicateMember { structure: String, member: String },

    #[error("index {index} is out of bounds for length {length}")]
    IndexOutOfBounds { index: f64, length: usize },

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    /// Raised by a built-in function.
    #[error("{0}")]
    Native(String),
}

/// A runtime error and the innermost node being evaluated when it arose.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Runtime error{}: {kind}", location(.span))]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Option<Span>,
}

fn location(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" on {span}"),
        None => String::new(),
    }
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind) -> Self {
        Self { kind, span: None }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::TypeMismatch(message.into()))
    }

    /// An error raised by a built-in.
    pub fn native(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Native(message.into()))
    }

    /// Attach `span` unless a more precise one is already recorded.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, RuntimeError>;
