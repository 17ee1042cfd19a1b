//! Core expression and statement evaluator.

use std::rc::Rc;

use mediscript_types::ast::*;
use mediscript_types::ensure_sufficient_stack;

use crate::env::Scope;
use crate::error::{EvalResult, RuntimeError, RuntimeErrorKind};
use crate::value::{Function, Instance, StructDef, Value};

/// Largest integer up to which every whole `f64` is exact (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Tunables for an [`Interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Maximum number of nested user function calls.
    pub max_call_depth: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
        }
    }
}

/// How a statement finished.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    /// A `finished` statement ran; unwind to the nearest call boundary.
    Return(Value),
}

/// The tree-walking interpreter. Walks AST nodes against a [`Scope`] and
/// produces [`Value`]s.
#[derive(Debug, Default)]
pub struct Interpreter {
    options: InterpreterOptions,
    /// Current number of active user function calls.
    depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: InterpreterOptions) -> Self {
        Self { options, depth: 0 }
    }

    /// Run a program against `scope` and hand the scope back.
    ///
    /// A top-level `finished` ends the program early; the scope keeps every
    /// binding made up to that point.
    pub fn run(&mut self, program: &[Stmt], scope: Scope) -> EvalResult<Scope> {
        self.execute_block(program, &scope)?;
        Ok(scope)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statement execution
    // ══════════════════════════════════════════════════════════════════════

    /// Execute statements in order, stopping at the first `finished`.
    pub fn execute_block(&mut self, stmts: &[Stmt], scope: &Scope) -> EvalResult<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.execute(stmt, scope)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Execute a single statement.
    pub fn execute(&mut self, stmt: &Stmt, scope: &Scope) -> EvalResult<Flow> {
        ensure_sufficient_stack(|| self.exec_stmt(stmt, scope))
            .map_err(|e| e.with_span(stmt.span))
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &Scope) -> EvalResult<Flow> {
        match &stmt.kind {
            StmtKind::Expr { expr } => {
                self.evaluate(expr, scope)?;
            }
            StmtKind::VarDecl { name, value } => {
                let value = self.evaluate(value, scope)?;
                scope.define(&name.name, value);
            }
            StmtKind::PropertySet {
                object,
                property,
                value,
            } => self.exec_property_set(object, property, value, scope)?,
            StmtKind::FuncDecl(decl) => {
                let function = Function {
                    name: decl.name.name.clone(),
                    params: decl.params.iter().map(|p| p.name.clone()).collect(),
                    body: decl.body.clone(),
                    closure: scope.clone(),
                };
                scope.define(&decl.name.name, Value::Function(Rc::new(function)));
            }
            StmtKind::Return { value } => {
                return Ok(Flow::Return(self.evaluate(value, scope)?));
            }
            StmtKind::While { condition, body } => {
                while self.condition(condition, "while", scope)? {
                    if let Flow::Return(value) = self.execute_block(body, scope)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            StmtKind::ForRange {
                var,
                start,
                end,
                body,
            } => return self.exec_for_range(var, start, end, body, scope),
            StmtKind::Conditional(cond) => return self.exec_conditional(cond, scope),
            StmtKind::StructDecl { name, members } => {
                let def = StructDef {
                    name: name.name.clone(),
                    members: members.iter().map(|m| m.name.clone()).collect(),
                };
                scope.define(&name.name, Value::Struct(Rc::new(def)));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_property_set(
        &mut self,
        object: &Expr,
        property: &Ident,
        value: &Expr,
        scope: &Scope,
    ) -> EvalResult<()> {
        let instance = match self.evaluate(object, scope)? {
            Value::Instance(instance) => instance,
            other => {
                return Err(RuntimeError::type_mismatch(format!(
                    "cannot set property '{}' on {}",
                    property.name,
                    other.type_name()
                )));
            }
        };
        let value = self.evaluate(value, scope)?;
        let mut instance = instance.borrow_mut();
        if instance.set(&property.name, value) {
            Ok(())
        } else {
            Err(RuntimeErrorKind::UnknownMember {
                structure: instance.def.name.clone(),
                member: property.name.clone(),
            }
            .into())
        }
    }

    /// `loop var through (start, end)`: bounds are evaluated once; the loop
    /// variable lives in the current frame and takes `start, start + 1, ...`
    /// while below `end`.
    fn exec_for_range(
        &mut self,
        var: &Ident,
        start: &Expr,
        end: &Expr,
        body: &[Stmt],
        scope: &Scope,
    ) -> EvalResult<Flow> {
        let start = self.range_bound(start, "loop start", scope)?;
        let end = self.range_bound(end, "loop end", scope)?;
        for i in start..end {
            scope.define(&var.name, Value::Number(i as f64));
            if let Flow::Return(value) = self.execute_block(body, scope)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// A loop bound: a whole number that `f64` holds exactly.
    fn range_bound(&mut self, expr: &Expr, context: &str, scope: &Scope) -> EvalResult<i64> {
        let n = self.number(expr, context, scope)?;
        if n.fract() != 0.0 || n.abs() > MAX_EXACT_INTEGER {
            return Err(RuntimeError::type_mismatch(format!(
                "{context} must be a whole number, got {n}"
            ))
            .with_span(expr.span));
        }
        Ok(n as i64)
    }

    /// Run the first branch whose guard holds. `else` has no guard.
    fn exec_conditional(&mut self, cond: &Conditional, scope: &Scope) -> EvalResult<Flow> {
        for branch in std::iter::once(cond).chain(&cond.otherwise) {
            let taken = match &branch.condition {
                Some(condition) => self.condition(condition, "if", scope)?,
                None => true,
            };
            if taken {
                return self.execute_block(&branch.body, scope);
            }
        }
        Ok(Flow::Normal)
    }

    fn condition(&mut self, expr: &Expr, context: &str, scope: &Scope) -> EvalResult<bool> {
        match self.evaluate(expr, scope)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::type_mismatch(format!(
                "{context} condition must be a boolean, got {}",
                other.type_name()
            ))
            .with_span(expr.span)),
        }
    }

    fn number(&mut self, expr: &Expr, context: &str, scope: &Scope) -> EvalResult<f64> {
        match self.evaluate(expr, scope)? {
            Value::Number(n) => Ok(n),
            other => Err(RuntimeError::type_mismatch(format!(
                "{context} must be a number, got {}",
                other.type_name()
            ))
            .with_span(expr.span)),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn evaluate(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr(expr, scope))
            .map_err(|e| e.with_span(expr.span))
    }

    fn eval_expr(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Literal { value } => Ok(match value {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
            }),
            ExprKind::Variable { name } => scope
                .get(name)
                .ok_or_else(|| RuntimeError::from(RuntimeErrorKind::UndefinedVariable(name.clone()))),
            ExprKind::Array { elements } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element, scope)?);
                }
                Ok(Value::Array(values))
            }
            ExprKind::Grouping { inner } => self.evaluate(inner, scope),
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand, scope)?;
                eval_unary(*op, value)
            }
            ExprKind::Binary { left, op, right } => {
                // Both sides are always evaluated, `&&` and `||` included.
                let lv = self.evaluate(left, scope)?;
                let rv = self.evaluate(right, scope)?;
                eval_binary(*op, lv, rv)
            }
            ExprKind::Call { callee, args } => {
                let callee = self.evaluate(callee, scope)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg, scope)?);
                }
                self.call(callee, values)
            }
            ExprKind::Get { object, property } => {
                let object = self.evaluate(object, scope)?;
                match property {
                    Property::Named(name) => get_named(object, &name.name),
                    Property::Computed(index) => {
                        let index = self.evaluate(index, scope)?;
                        get_computed(object, index)
                    }
                }
            }
            ExprKind::Instance { name, members } => self.eval_instance(name, members, scope),
        }
    }

    /// `Name(member: expr, ...)`: every declared member exactly once.
    fn eval_instance(
        &mut self,
        name: &Ident,
        members: &[MemberInit],
        scope: &Scope,
    ) -> EvalResult<Value> {
        let def = match scope.get(&name.name) {
            Some(Value::Struct(def)) => def,
            Some(other) => {
                return Err(RuntimeError::type_mismatch(format!(
                    "{} is a {}, not a patient",
                    name.name,
                    other.type_name()
                )));
            }
            None => return Err(RuntimeErrorKind::UndefinedVariable(name.name.clone()).into()),
        };

        let mut values: Vec<Option<Value>> = vec![None; def.members.len()];
        for init in members {
            let member = &init.name.name;
            let Some(index) = def.member_index(member) else {
                return Err(RuntimeError::from(RuntimeErrorKind::UnknownMember {
                    structure: def.name.clone(),
                    member: member.clone(),
                })
                .with_span(init.name.span));
            };
            if values[index].is_some() {
                return Err(RuntimeError::from(RuntimeErrorKind::DuplicateMember {
                    structure: def.name.clone(),
                    member: member.clone(),
                })
                .with_span(init.name.span));
            }
            values[index] = Some(self.evaluate(&init.value, scope)?);
        }

        let mut filled = Vec::with_capacity(values.len());
        for (member, value) in def.members.iter().zip(values) {
            match value {
                Some(value) => filled.push(value),
                None => {
                    return Err(RuntimeErrorKind::MissingMember {
                        structure: def.name.clone(),
                        member: member.clone(),
                    }
                    .into());
                }
            }
        }
        Ok(Value::instance(def, filled))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    /// Call a value with already-evaluated arguments.
    pub fn call(&mut self, callee: Value, args: Vec<Value>) -> EvalResult<Value> {
        match callee {
            Value::Function(function) => self.call_function(&function, args, None),
            Value::Method { receiver, function } => {
                self.call_function(&function, args, Some(Value::Instance(receiver)))
            }
            Value::Native(native) => {
                if let Some(expected) = native.arity {
                    check_arity(&native.name, expected, args.len())?;
                }
                native.invoke(args)
            }
            Value::Struct(def) => {
                check_arity(&def.name, def.members.len(), args.len())?;
                Ok(Value::instance(def, args))
            }
            other => Err(RuntimeErrorKind::NotCallable(other.type_name().to_string()).into()),
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> EvalResult<Value> {
        check_arity(&function.name, function.params.len(), args.len())?;
        if self.depth >= self.options.max_call_depth {
            return Err(RuntimeErrorKind::CallDepthExceeded(self.options.max_call_depth).into());
        }

        let frame = function.closure.child();
        if let Some(receiver) = receiver {
            frame.define("self", receiver);
        }
        for (param, arg) in function.params.iter().zip(args) {
            frame.define(param, arg);
        }

        self.depth += 1;
        let flow = self.execute_block(&function.body, &frame);
        self.depth -= 1;

        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

fn check_arity(name: &str, expected: usize, got: usize) -> EvalResult<()> {
    if expected == got {
        Ok(())
    } else {
        Err(RuntimeErrorKind::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        }
        .into())
    }
}

// ── Operators ────────────────────────────────────────────────────────────

fn eval_unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match (op, value) {
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        (op, value) => Err(RuntimeError::type_mismatch(format!(
            "cannot apply '{}' to {}",
            op.as_str(),
            value.type_name()
        ))),
    }
}

fn eval_binary(op: BinOp, lv: Value, rv: Value) -> EvalResult<Value> {
    match op {
        BinOp::Add => eval_add(lv, rv),
        BinOp::Sub => eval_arith(op, lv, rv, |a, b| a - b),
        BinOp::Mul => eval_arith(op, lv, rv, |a, b| a * b),
        BinOp::Div => {
            if rv == Value::Number(0.0) && matches!(lv, Value::Number(_)) {
                return Err(RuntimeErrorKind::DivisionByZero.into());
            }
            eval_arith(op, lv, rv, |a, b| a / b)
        }
        BinOp::Eq => Ok(Value::Boolean(lv == rv)),
        BinOp::NotEq => Ok(Value::Boolean(lv != rv)),
        BinOp::Less => eval_comparison(op, lv, rv, |o| o.is_lt()),
        BinOp::Greater => eval_comparison(op, lv, rv, |o| o.is_gt()),
        BinOp::LessEq => eval_comparison(op, lv, rv, |o| o.is_le()),
        BinOp::GreaterEq => eval_comparison(op, lv, rv, |o| o.is_ge()),
        BinOp::And | BinOp::Or => match (lv, rv) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if op == BinOp::And {
                a && b
            } else {
                a || b
            })),
            (lv, rv) => Err(operand_mismatch(op, &lv, &rv)),
        },
    }
}

/// Numbers add; if either side is a string the other is rendered and the
/// two are concatenated.
fn eval_add(lv: Value, rv: Value) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::String(a), rv) => Ok(Value::String(format!("{a}{rv}"))),
        (lv, Value::String(b)) => Ok(Value::String(format!("{lv}{b}"))),
        (lv, rv) => Err(operand_mismatch(BinOp::Add, &lv, &rv)),
    }
}

fn eval_arith(op: BinOp, lv: Value, rv: Value, apply: fn(f64, f64) -> f64) -> EvalResult<Value> {
    match (lv, rv) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(a, b))),
        (lv, rv) => Err(operand_mismatch(op, &lv, &rv)),
    }
}

fn eval_comparison(
    op: BinOp,
    lv: Value,
    rv: Value,
    test: fn(std::cmp::Ordering) -> bool,
) -> EvalResult<Value> {
    let ordering = match (&lv, &rv) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => return Err(operand_mismatch(op, &lv, &rv)),
    };
    // NaN compares false against everything.
    Ok(Value::Boolean(ordering.is_some_and(test)))
}

fn operand_mismatch(op: BinOp, lv: &Value, rv: &Value) -> RuntimeError {
    RuntimeError::type_mismatch(format!(
        "cannot apply '{}' to {} and {}",
        op.as_str(),
        lv.type_name(),
        rv.type_name()
    ))
}

// ── Property access ──────────────────────────────────────────────────────

/// `object.name`
fn get_named(object: Value, name: &str) -> EvalResult<Value> {
    match &object {
        Value::Instance(instance) => {
            let borrowed = instance.borrow();
            let value = match borrowed.get(name) {
                Some(Value::Function(function)) => Value::Method {
                    receiver: instance.clone(),
                    function: function.clone(),
                },
                Some(value) => value.clone(),
                None => return Err(unknown_member(&borrowed, name)),
            };
            Ok(value)
        }
        Value::Array(items) if name == "length" => Ok(Value::Number(items.len() as f64)),
        Value::String(s) if name == "length" => Ok(Value::Number(s.chars().count() as f64)),
        _ => Err(RuntimeErrorKind::NoProperty {
            type_name: object.type_name().to_string(),
            property: name.to_string(),
        }
        .into()),
    }
}

/// `object[index]`: a string index reads a named property, a number
/// indexes an array or string.
fn get_computed(object: Value, index: Value) -> EvalResult<Value> {
    match index {
        Value::String(name) => get_named(object, &name),
        Value::Number(n) => match &object {
            Value::Array(items) => {
                let i = element_index(n, items.len())?;
                Ok(items[i].clone())
            }
            Value::String(s) => {
                let i = element_index(n, s.chars().count())?;
                Ok(Value::String(
                    s.chars().nth(i).map(String::from).unwrap_or_default(),
                ))
            }
            _ => Err(RuntimeError::type_mismatch(format!(
                "cannot index {} with a number",
                object.type_name()
            ))),
        },
        other => Err(RuntimeError::type_mismatch(format!(
            "cannot index {} with {}",
            object.type_name(),
            other.type_name()
        ))),
    }
}

/// Validate a numeric index against a length.
fn element_index(n: f64, length: usize) -> EvalResult<usize> {
    if n.fract() != 0.0 {
        return Err(RuntimeError::type_mismatch(format!(
            "index must be a whole number, got {n}"
        )));
    }
    if n < 0.0 || n >= length as f64 {
        return Err(RuntimeErrorKind::IndexOutOfBounds { index: n, length }.into());
    }
    Ok(n as usize)
}

fn unknown_member(instance: &Instance, member: &str) -> RuntimeError {
    RuntimeErrorKind::UnknownMember {
        structure: instance.def.name.clone(),
        member: member.to_string(),
    }
    .into()
}
