//! Statement parsing.

use crate::error::{ParseError, ParseResult};
use crate::parser::Parser;
use mediscript_lexer::{Keyword, TokenKind};
use mediscript_types::ast::*;
use mediscript_types::ensure_sufficient_stack;

/// Maximum nesting depth of `{ }` blocks.
pub const MAX_BLOCK_DEPTH: usize = 64;

impl<'t> Parser<'t> {
    /// Parse a single statement, dispatching on its leading keyword.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.peek_kind() {
            TokenKind::Keyword(Keyword::Finished) => self.parse_return(),
            TokenKind::Keyword(Keyword::Diagnose) => self.parse_func_decl(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Loop) => self.parse_for_range(),
            TokenKind::Keyword(Keyword::If) => self.parse_conditional(),
            TokenKind::Keyword(Keyword::Prepare) => self.parse_prepare(),
            TokenKind::Keyword(Keyword::Patient) => self.parse_struct_decl(),
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                Ok(Stmt::new(StmtKind::Expr { expr }, span))
            }
        }
    }

    /// Parse a block of statements: `{ stmts... }`
    ///
    /// Blocks nest at most [`MAX_BLOCK_DEPTH`] deep.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        let open = self.expect(&TokenKind::LeftBrace)?;
        if self.block_depth >= MAX_BLOCK_DEPTH {
            return Err(ParseError::at(
                &open,
                format!("maximum block nesting depth is {MAX_BLOCK_DEPTH}"),
            ));
        }
        self.block_depth += 1;
        let stmts = ensure_sufficient_stack(|| self.parse_block_body());
        self.block_depth -= 1;
        let stmts = stmts?;
        self.expect(&TokenKind::RightBrace)?;
        Ok(stmts)
    }

    fn parse_block_body(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.at_end() {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    /// `( expr )` as used by `while`, `if` and `elif`.
    fn parse_paren_condition(&mut self) -> ParseResult<Expr> {
        self.expect(&TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(condition)
    }

    /// `finished expr`
    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span; // eat `finished`
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Ok(Stmt::new(StmtKind::Return { value }, span))
    }

    /// `diagnose name [needs (params)] { body }`
    fn parse_func_decl(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span; // eat `diagnose`
        let name = self.expect_identifier()?;
        let params = if self.check_keyword(Keyword::Needs) {
            self.advance();
            self.expect(&TokenKind::LeftParen)?;
            let params = self.parse_ident_list()?;
            self.expect(&TokenKind::RightParen)?;
            params
        } else {
            Vec::new()
        };
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::new(
            StmtKind::FuncDecl(FuncDecl { name, params, body }),
            span,
        ))
    }

    /// `while (condition) { body }`
    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span; // eat `while`
        let condition = self.parse_paren_condition()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::new(StmtKind::While { condition, body }, span))
    }

    /// `loop var through (start, end) { body }`
    ///
    /// The range takes exactly two expressions: a missing second one is
    /// reported at whatever stands where the comma should be, a third one at
    /// its separating comma.
    fn parse_for_range(&mut self) -> ParseResult<Stmt> {
        let start_span = self.advance().span; // eat `loop`
        let var = self.expect_identifier()?;
        self.expect_keyword(Keyword::Through)?;
        self.expect(&TokenKind::LeftParen)?;
        let start = self.parse_expression()?;
        self.expect(&TokenKind::Comma)?;
        let end = self.parse_expression()?;
        self.expect(&TokenKind::RightParen)?;
        let body = self.parse_block()?;
        let span = start_span.merge(self.previous_span());
        Ok(Stmt::new(
            StmtKind::ForRange {
                var,
                start,
                end,
                body,
            },
            span,
        ))
    }

    /// `if (c) { } elif (c) { } ... else { }`
    fn parse_conditional(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span; // eat `if`
        let condition = self.parse_paren_condition()?;
        let body = self.parse_block()?;

        let mut otherwise = Vec::new();
        while self.check_keyword(Keyword::Elif) {
            let branch_start = self.advance().span;
            let condition = self.parse_paren_condition()?;
            let body = self.parse_block()?;
            otherwise.push(Conditional {
                condition: Some(condition),
                body,
                otherwise: Vec::new(),
                span: branch_start.merge(self.previous_span()),
            });
        }
        if self.check_keyword(Keyword::Else) {
            let branch_start = self.advance().span;
            let body = self.parse_block()?;
            otherwise.push(Conditional {
                condition: None,
                body,
                otherwise: Vec::new(),
                span: branch_start.merge(self.previous_span()),
            });
        }

        let span = start.merge(self.previous_span());
        Ok(Stmt::new(
            StmtKind::Conditional(Conditional {
                condition: Some(condition),
                body,
                otherwise,
                span,
            }),
            span,
        ))
    }

    /// `prepare name as value` or `prepare target.member as value`
    ///
    /// A dotted target may have several segments; all but the last form the
    /// object expression.
    fn parse_prepare(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span; // eat `prepare`
        let name = self.expect_identifier()?;

        let mut target: Option<(Expr, Ident)> = None;
        while self.eat(&TokenKind::Period) {
            let member = self.expect_identifier()?;
            let object = match target.take() {
                None => Expr::new(
                    ExprKind::Variable {
                        name: name.name.clone(),
                    },
                    name.span,
                ),
                Some((object, property)) => {
                    let span = object.span.merge(property.span);
                    Expr::new(
                        ExprKind::Get {
                            object: Box::new(object),
                            property: Property::Named(property),
                        },
                        span,
                    )
                }
            };
            target = Some((object, member));
        }

        self.expect_keyword(Keyword::As)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        let kind = match target {
            None => StmtKind::VarDecl { name, value },
            Some((object, property)) => StmtKind::PropertySet {
                object,
                property,
                value,
            },
        };
        Ok(Stmt::new(kind, span))
    }

    /// `patient Name has { members }`
    fn parse_struct_decl(&mut self) -> ParseResult<Stmt> {
        let start = self.advance().span; // eat `patient`
        let name = self.expect_identifier()?;
        self.expect_keyword(Keyword::Has)?;
        self.expect(&TokenKind::LeftBrace)?;
        let members = self.parse_ident_list()?;
        self.expect(&TokenKind::RightBrace)?;
        let span = start.merge(self.previous_span());
        Ok(Stmt::new(StmtKind::StructDecl { name, members }, span))
    }
}
