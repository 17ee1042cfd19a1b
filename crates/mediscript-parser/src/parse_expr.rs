//! Expression parsing.
//!
//! Binary operators come in three tiers, all left-associative:
//!
//! ```text
//! 0  (lowest)  ||  &&  ==  !=  <  <=  >  >=
//! 1            +  -
//! 2  (highest) *  /
//! ```
//!
//! Each tier loops over its operators, so a long flat chain costs no
//! recursion. Nesting (brackets, calls, prefix operators) recurses and is
//! capped by [`MAX_EXPR_DEPTH`], which also bounds the height of every tree
//! the parser returns.

use crate::error::{ParseError, ParseResult};
use crate::parser::Parser;
use mediscript_lexer::{Token, TokenKind};
use mediscript_types::ast::*;
use mediscript_types::{ensure_sufficient_stack, Span};

/// Maximum height of an expression tree. Every operator, call, member
/// access, index and bracket adds a level.
pub const MAX_EXPR_DEPTH: usize = 256;

/// The highest binary operator tier.
const TOP_TIER: u8 = 2;

impl<'t> Parser<'t> {
    // ══════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.nested(|p| p.parse_tier(0).map(|(expr, _)| expr))
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_EXPR_DEPTH`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.expr_depth >= MAX_EXPR_DEPTH {
            return Err(too_deep(self.peek()));
        }
        self.expr_depth += 1;
        let result = ensure_sufficient_stack(|| parse(self));
        self.expr_depth -= 1;
        result
    }

    // ══════════════════════════════════════════════════════════════════════
    // Binary Operators
    // ══════════════════════════════════════════════════════════════════════

    /// `operand { op operand }` for the operators of `tier`, where an operand
    /// is the next tier up. Returns the tree with its height.
    fn parse_tier(&mut self, tier: u8) -> ParseResult<(Expr, usize)> {
        if tier > TOP_TIER {
            return self.parse_operand();
        }
        let (mut left, mut height) = self.parse_tier(tier + 1)?;
        while let Some(op) = binary_op(self.peek_kind()).filter(|op| op.precedence() == tier) {
            let token = self.advance();
            let (right, right_height) = self.parse_tier(tier + 1)?;
            height = 1 + height.max(right_height);
            if height > MAX_EXPR_DEPTH {
                return Err(too_deep(&token));
            }
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok((left, height))
    }

    fn parse_operand(&mut self) -> ParseResult<(Expr, usize)> {
        let start = self.peek().clone();
        let operand = self.parse_simple()?;
        let height = operand.height();
        if height > MAX_EXPR_DEPTH {
            return Err(too_deep(&start));
        }
        Ok((operand, height))
    }

    /// Comma-separated expressions (at least one).
    fn parse_expr_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    /// Arguments or elements up to `close`. Returns them with the span of
    /// the closing token.
    fn parse_delimited(&mut self, close: &TokenKind) -> ParseResult<(Vec<Expr>, Span)> {
        let items = if self.check(close) {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        let close_token = self.expect(close)?;
        Ok((items, close_token.span))
    }

    /// A primary expression followed by its postfix chain, or a prefix
    /// operator applied to one.
    fn parse_simple(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let expr = match self.peek_kind().clone() {
            TokenKind::Number(n) => self.literal(Literal::Number(n)),
            TokenKind::String(s) => self.literal(Literal::String(s)),
            TokenKind::Boolean(b) => self.literal(Literal::Boolean(b)),
            TokenKind::LeftBracket => {
                self.advance();
                let (elements, end) = self.parse_delimited(&TokenKind::RightBracket)?;
                Expr::new(ExprKind::Array { elements }, start.merge(end))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let close = self.expect(&TokenKind::RightParen)?;
                Expr::new(
                    ExprKind::Grouping {
                        inner: Box::new(inner),
                    },
                    start.merge(close.span),
                )
            }
            TokenKind::Not => return self.parse_unary(UnaryOp::Not),
            TokenKind::Minus => return self.parse_unary(UnaryOp::Negate),
            TokenKind::Identifier(name) => {
                if self.at_instance_literal() {
                    self.parse_instance()?
                } else {
                    let span = self.advance().span;
                    Expr::new(ExprKind::Variable { name }, span)
                }
            }
            _ => return Err(self.error_expected("expression")),
        };
        self.parse_postfix(expr)
    }

    fn literal(&mut self, value: Literal) -> Expr {
        let span = self.advance().span;
        Expr::new(ExprKind::Literal { value }, span)
    }

    /// `!simple` or `-simple`
    fn parse_unary(&mut self, op: UnaryOp) -> ParseResult<Expr> {
        let start = self.advance().span;
        let operand = self.nested(Self::parse_simple)?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `Name ( member :` starts an instance literal; anything else after an
    /// identifier is an ordinary variable (possibly called).
    fn at_instance_literal(&self) -> bool {
        matches!(self.look_ahead(1), TokenKind::LeftParen)
            && matches!(self.look_ahead(2), TokenKind::Identifier(_))
            && matches!(self.look_ahead(3), TokenKind::Colon)
    }

    /// `Name(member: expr, ...)`
    fn parse_instance(&mut self) -> ParseResult<Expr> {
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LeftParen)?;
        let mut members = Vec::new();
        loop {
            let member = self.expect_identifier()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            members.push(MemberInit {
                name: member,
                value,
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RightParen)?;
        let span = name.span.merge(close.span);
        Ok(Expr::new(ExprKind::Instance { name, members }, span))
    }

    /// `(args)`, `.name` and `[index]`, as many as follow.
    fn parse_postfix(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        let mut height = expr.height();
        loop {
            let token = match self.peek_kind() {
                TokenKind::LeftParen | TokenKind::Period | TokenKind::LeftBracket => {
                    self.advance()
                }
                _ => return Ok(expr),
            };
            expr = match token.kind {
                TokenKind::LeftParen => {
                    let (args, end) = self.parse_delimited(&TokenKind::RightParen)?;
                    height = 1 + args.iter().map(Expr::height).fold(height, usize::max);
                    let span = expr.span.merge(end);
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    )
                }
                TokenKind::Period => {
                    let name = self.expect_identifier()?;
                    height += 1;
                    let span = expr.span.merge(name.span);
                    Expr::new(
                        ExprKind::Get {
                            object: Box::new(expr),
                            property: Property::Named(name),
                        },
                        span,
                    )
                }
                _ => {
                    let index = self.parse_expression()?;
                    let close = self.expect(&TokenKind::RightBracket)?;
                    height = 1 + height.max(index.height());
                    let span = expr.span.merge(close.span);
                    Expr::new(
                        ExprKind::Get {
                            object: Box::new(expr),
                            property: Property::Computed(Box::new(index)),
                        },
                        span,
                    )
                }
            };
            if height > MAX_EXPR_DEPTH {
                return Err(too_deep(&token));
            }
        }
    }
}

/// Map an operator token to its binary operator.
fn binary_op(kind: &TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::Or => BinOp::Or,
        TokenKind::And => BinOp::And,
        TokenKind::Equiv => BinOp::Eq,
        TokenKind::NotEquiv => BinOp::NotEq,
        TokenKind::Lt => BinOp::Less,
        TokenKind::Gt => BinOp::Greater,
        TokenKind::Lte => BinOp::LessEq,
        TokenKind::Gte => BinOp::GreaterEq,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Asterisk => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        _ => return None,
    })
}

fn too_deep(token: &Token) -> ParseError {
    ParseError::at(
        token,
        format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediscript_lexer::tokenize;

    fn tier_of(source: &str) -> (Expr, usize) {
        let tokens = tokenize(source).unwrap();
        Parser::new(&tokens).parse_tier(0).unwrap()
    }

    fn root_op(expr: &Expr) -> BinOp {
        match &expr.kind {
            ExprKind::Binary { op, .. } => *op,
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn higher_tier_binds_tighter() {
        let (expr, _) = tier_of("1 + 2 * 3");
        assert_eq!(root_op(&expr), BinOp::Add);
        let (expr, _) = tier_of("1 * 2 + 3");
        assert_eq!(root_op(&expr), BinOp::Add);
        let (expr, _) = tier_of("a < b + 1 && c");
        assert_eq!(root_op(&expr), BinOp::And);
    }

    #[test]
    fn equal_tier_folds_left() {
        let (expr, _) = tier_of("10 - 2 - 3");
        let ExprKind::Binary { left, right, .. } = expr.kind else {
            panic!("expected binary");
        };
        assert_eq!(left.to_string(), "10 - 2");
        assert_eq!(right.to_string(), "3");
    }

    #[test]
    fn grouping_is_an_operand() {
        let (expr, _) = tier_of("10 - (2 - 3)");
        let ExprKind::Binary { right, .. } = expr.kind else {
            panic!("expected binary");
        };
        assert!(matches!(right.kind, ExprKind::Grouping { .. }));
    }

    #[test]
    fn tracked_height_matches_tree() {
        for source in ["1", "1 + 2 * 3 - 4", "f(a + b)[0].c * -d", "[(1 + 2), 3] == x"] {
            let (expr, height) = tier_of(source);
            assert_eq!(height, expr.height(), "{source}");
        }
    }

    #[test]
    fn depth_counter_is_restored() {
        let tokens = tokenize("((1)) + (2)").unwrap();
        let mut parser = Parser::new(&tokens);
        parser.parse_expression().unwrap();
        assert_eq!(parser.expr_depth, 0);
    }
}
