//! Renders an AST back into MediScript source.
//!
//! Output is canonical rather than faithful: whitespace and comments are not
//! preserved, but parsing the output yields the same tree (ignoring spans).
//!
//! A `!` that begins a line starts a comment, so a statement whose text
//! would begin with `!` is written on the same line as the statement before
//! it.

use crate::ast::*;
use std::fmt::{self, Write};

const INDENT: &str = "    ";

/// Render a whole program, one statement per line.
pub fn to_source(program: &[Stmt]) -> String {
    let mut out = String::new();
    for (i, stmt) in program.iter().enumerate() {
        if i > 0 && leads_with_bang(stmt) {
            out.pop();
            out.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write_stmt(&mut out, stmt, 0);
        out.push('\n');
    }
    out
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stmt(f, self, 0)
    }
}

fn write_stmt<W: Write>(out: &mut W, stmt: &Stmt, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    match &stmt.kind {
        StmtKind::Expr { expr } => write_expr(out, expr),
        StmtKind::VarDecl { name, value } => {
            write!(out, "prepare {} as ", name.name)?;
            write_expr(out, value)
        }
        StmtKind::PropertySet {
            object,
            property,
            value,
        } => {
            out.write_str("prepare ")?;
            write_expr(out, object)?;
            write!(out, ".{} as ", property.name)?;
            write_expr(out, value)
        }
        StmtKind::FuncDecl(decl) => {
            write!(out, "diagnose {}", decl.name.name)?;
            if !decl.params.is_empty() {
                out.write_str(" needs (")?;
                write_idents(out, &decl.params)?;
                out.write_str(")")?;
            }
            out.write_str(" ")?;
            write_block(out, &decl.body, depth)
        }
        StmtKind::Return { value } => {
            out.write_str("finished ")?;
            write_expr(out, value)
        }
        StmtKind::While { condition, body } => {
            out.write_str("while (")?;
            write_expr(out, condition)?;
            out.write_str(") ")?;
            write_block(out, body, depth)
        }
        StmtKind::ForRange {
            var,
            start,
            end,
            body,
        } => {
            write!(out, "loop {} through (", var.name)?;
            write_expr(out, start)?;
            out.write_str(", ")?;
            write_expr(out, end)?;
            out.write_str(") ")?;
            write_block(out, body, depth)
        }
        StmtKind::Conditional(cond) => write_conditional(out, cond, depth),
        StmtKind::StructDecl { name, members } => {
            write!(out, "patient {} has {{ ", name.name)?;
            write_idents(out, members)?;
            out.write_str(" }")
        }
    }
}

fn write_conditional<W: Write>(out: &mut W, cond: &Conditional, depth: usize) -> fmt::Result {
    out.write_str("if (")?;
    if let Some(condition) = &cond.condition {
        write_expr(out, condition)?;
    } else {
        out.write_str("true")?;
    }
    out.write_str(") ")?;
    write_block(out, &cond.body, depth)?;
    for branch in &cond.otherwise {
        match &branch.condition {
            Some(condition) => {
                out.write_str(" elif (")?;
                write_expr(out, condition)?;
                out.write_str(") ")?;
            }
            None => out.write_str(" else ")?,
        }
        write_block(out, &branch.body, depth)?;
    }
    Ok(())
}

fn write_block<W: Write>(out: &mut W, body: &[Stmt], depth: usize) -> fmt::Result {
    if body.is_empty() {
        return out.write_str("{}");
    }
    out.write_str("{")?;
    for stmt in body {
        if leads_with_bang(stmt) {
            out.write_str(" ")?;
            write_stmt(out, stmt, 0)?;
        } else {
            out.write_str("\n")?;
            write_stmt(out, stmt, depth + 1)?;
        }
    }
    out.write_str("\n")?;
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    out.write_str("}")
}

/// Whether the statement's source text starts with `!`.
fn leads_with_bang(stmt: &Stmt) -> bool {
    let StmtKind::Expr { expr } = &stmt.kind else {
        return false;
    };
    let mut expr = expr;
    loop {
        expr = match &expr.kind {
            ExprKind::Unary { op, .. } => return *op == UnaryOp::Not,
            ExprKind::Binary { left, .. } => left.as_ref(),
            ExprKind::Call { callee, .. } => callee.as_ref(),
            ExprKind::Get { object, .. } => object.as_ref(),
            _ => return false,
        };
    }
}

fn write_idents<W: Write>(out: &mut W, idents: &[Ident]) -> fmt::Result {
    for (i, ident) in idents.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        out.write_str(&ident.name)?;
    }
    Ok(())
}

fn write_exprs<W: Write>(out: &mut W, exprs: &[Expr]) -> fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_expr(out, expr)?;
    }
    Ok(())
}

fn write_expr<W: Write>(out: &mut W, expr: &Expr) -> fmt::Result {
    match &expr.kind {
        ExprKind::Literal { value } => write_literal(out, value),
        ExprKind::Variable { name } => out.write_str(name),
        ExprKind::Array { elements } => {
            out.write_str("[")?;
            write_exprs(out, elements)?;
            out.write_str("]")
        }
        ExprKind::Grouping { inner } => {
            out.write_str("(")?;
            write_expr(out, inner)?;
            out.write_str(")")
        }
        ExprKind::Unary { op, operand } => {
            out.write_str(op.as_str())?;
            write_expr(out, operand)
        }
        ExprKind::Binary { left, op, right } => {
            write_expr(out, left)?;
            write!(out, " {} ", op.as_str())?;
            write_expr(out, right)
        }
        ExprKind::Call { callee, args } => {
            write_expr(out, callee)?;
            out.write_str("(")?;
            write_exprs(out, args)?;
            out.write_str(")")
        }
        ExprKind::Get { object, property } => {
            write_expr(out, object)?;
            match property {
                Property::Named(name) => write!(out, ".{}", name.name),
                Property::Computed(index) => {
                    out.write_str("[")?;
                    write_expr(out, index)?;
                    out.write_str("]")
                }
            }
        }
        ExprKind::Instance { name, members } => {
            write!(out, "{}(", name.name)?;
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{}: ", member.name.name)?;
                write_expr(out, &member.value)?;
            }
            out.write_str(")")
        }
    }
}

fn write_literal<W: Write>(out: &mut W, literal: &Literal) -> fmt::Result {
    match literal {
        Literal::Number(n) => write!(out, "{n}"),
        // No escapes exist, so pick the delimiter the content does not use.
        Literal::String(s) if s.contains('"') => write!(out, "'{s}'"),
        Literal::String(s) => write!(out, "\"{s}\""),
        Literal::Boolean(b) => write!(out, "{b}"),
    }
}
