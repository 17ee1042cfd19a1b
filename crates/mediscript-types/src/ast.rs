//! AST node types for MediScript.
//!
//! Every node carries a [`Span`] for error reporting.
//! Recursive expression children are boxed to keep enum sizes reasonable.

use crate::Span;
use serde::Serialize;

/// A parsed program: the top-level statements in source order.
pub type Program = Vec<Stmt>;

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StmtKind {
    /// A bare expression; its value is discarded.
    Expr { expr: Expr },
    /// `prepare name as value`
    VarDecl { name: Ident, value: Expr },
    /// `prepare object.property as value`
    PropertySet {
        object: Expr,
        property: Ident,
        value: Expr,
    },
    /// `diagnose name needs (params) { body }`
    FuncDecl(FuncDecl),
    /// `finished value`
    Return { value: Expr },
    /// `while (condition) { body }`
    While { condition: Expr, body: Vec<Stmt> },
    /// `loop var through (start, end) { body }`
    ForRange {
        var: Ident,
        start: Expr,
        end: Expr,
        body: Vec<Stmt>,
    },
    /// `if (...) { ... } elif (...) { ... } else { ... }`
    Conditional(Conditional),
    /// `patient name has { members }`
    StructDecl { name: Ident, members: Vec<Ident> },
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Vec<Stmt>,
}

/// One guarded branch of an `if` chain.
///
/// The head of a chain and every `elif` carry a condition; a terminal `else`
/// has `condition: None` and always runs when reached. Only the head uses
/// `otherwise`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditional {
    pub condition: Option<Expr>,
    pub body: Vec<Stmt>,
    pub otherwise: Vec<Conditional>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Number of nodes on the longest path from this node down to a leaf.
    ///
    /// Walks with an explicit stack, so it is safe on trees of any depth.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, level)) = pending.pop() {
            height = height.max(level);
            let next = level + 1;
            match &expr.kind {
                ExprKind::Literal { .. } | ExprKind::Variable { .. } => {}
                ExprKind::Array { elements } => {
                    pending.extend(elements.iter().map(|e| (e, next)));
                }
                ExprKind::Grouping { inner } => pending.push((inner.as_ref(), next)),
                ExprKind::Unary { operand, .. } => pending.push((operand.as_ref(), next)),
                ExprKind::Binary { left, right, .. } => {
                    pending.push((left.as_ref(), next));
                    pending.push((right.as_ref(), next));
                }
                ExprKind::Call { callee, args } => {
                    pending.push((callee.as_ref(), next));
                    pending.extend(args.iter().map(|a| (a, next)));
                }
                ExprKind::Get { object, property } => {
                    pending.push((object.as_ref(), next));
                    if let Property::Computed(index) = property {
                        pending.push((index.as_ref(), next));
                    }
                }
                ExprKind::Instance { members, .. } => {
                    pending.extend(members.iter().map(|m| (&m.value, next)));
                }
            }
        }
        height
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    /// `42`, `"text"`, `true`
    Literal { value: Literal },
    /// `name`
    Variable { name: String },
    /// `[expr, ...]`
    Array { elements: Vec<Expr> },
    /// `(expr)`
    Grouping { inner: Box<Expr> },
    /// `!x`, `-x`
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `a + b`, `a == b`, `a && b`, etc.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `object.name` or `object[expr]`
    Get {
        object: Box<Expr>,
        property: Property,
    },
    /// `Name(member: expr, ...)`
    Instance {
        name: Ident,
        members: Vec<MemberInit>,
    },
}

/// A literal value as written in source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
}

/// The property side of a `Get`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Property {
    /// `object.name`
    Named(Ident),
    /// `object[expr]`
    Computed(Box<Expr>),
}

impl Property {
    pub fn is_computed(&self) -> bool {
        matches!(self, Property::Computed(_))
    }
}

/// `member: expr` inside an instance literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberInit {
    pub name: Ident,
    pub value: Expr,
}

// ── Operators ─────────────────────────────────────────────────────────────────

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Or,
    And,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Returns the operator symbol for error messages and printing.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }

    /// Binding tier: comparison and logic 0, additive 1, multiplicative 2.
    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Or
            | BinOp::And
            | BinOp::Eq
            | BinOp::NotEq
            | BinOp::Less
            | BinOp::Greater
            | BinOp::LessEq
            | BinOp::GreaterEq => 0,
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div => 2,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    /// `!x`
    Not,
    /// `-x`
    Negate,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_tiers() {
        assert!(BinOp::Mul.precedence() > BinOp::Add.precedence());
        assert!(BinOp::Add.precedence() > BinOp::Less.precedence());
        assert_eq!(BinOp::And.precedence(), BinOp::Eq.precedence());
        assert_eq!(BinOp::Div.precedence(), BinOp::Mul.precedence());
    }

    fn leaf(n: f64) -> Expr {
        Expr::new(
            ExprKind::Literal {
                value: Literal::Number(n),
            },
            Span::default(),
        )
    }

    #[test]
    fn height_follows_the_deepest_branch() {
        assert_eq!(leaf(1.0).height(), 1);
        let sum = Expr::new(
            ExprKind::Binary {
                left: Box::new(leaf(1.0)),
                op: BinOp::Add,
                right: Box::new(leaf(2.0)),
            },
            Span::default(),
        );
        let call = Expr::new(
            ExprKind::Call {
                callee: Box::new(leaf(0.0)),
                args: vec![leaf(3.0), sum],
            },
            Span::default(),
        );
        assert_eq!(call.height(), 3);
    }

    #[test]
    fn height_of_a_long_spine() {
        let mut expr = leaf(0.0);
        for _ in 0..10_000 {
            expr = Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Negate,
                    operand: Box::new(expr),
                },
                Span::default(),
            );
        }
        assert_eq!(expr.height(), 10_001);
        // Dismantle iteratively; dropping a spine this long recurses per node.
        while let ExprKind::Unary { operand, .. } = expr.kind {
            expr = *operand;
        }
    }

    #[test]
    fn expr_serializes_with_type_tag() {
        let expr = Expr::new(
            ExprKind::Literal {
                value: Literal::Number(4.0),
            },
            Span::point(1, 1),
        );
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["kind"]["type"], "Literal");
        assert_eq!(json["kind"]["value"], 4.0);
    }
}
