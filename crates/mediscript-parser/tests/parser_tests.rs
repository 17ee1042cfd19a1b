//! Parser tests.
//!
//! Covers:
//! 1. Precedence and associativity shapes
//! 2. Prefix operators, postfix chains and instance literals
//! 3. Every statement form
//! 4. Error positions and messages
//! 5. Nesting limits

use mediscript_lexer::{tokenize, TokenKind};
use mediscript_parser::{parse, ParseError, MAX_BLOCK_DEPTH, MAX_EXPR_DEPTH};
use mediscript_types::ast::*;
use mediscript_types::Span;
use pretty_assertions::assert_eq;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source and return the program, panicking on any error.
fn parse_ok(source: &str) -> Program {
    let tokens = tokenize(source).unwrap_or_else(|e| panic!("lex error: {e}"));
    parse(&tokens).unwrap_or_else(|e| panic!("parse error: {e}"))
}

/// Parse source that must fail to parse.
fn parse_err(source: &str) -> ParseError {
    let tokens = tokenize(source).unwrap_or_else(|e| panic!("lex error: {e}"));
    match parse(&tokens) {
        Ok(program) => panic!("expected a parse error, got {program:?}"),
        Err(e) => e,
    }
}

/// Parse a single expression statement.
fn parse_expr(source: &str) -> Expr {
    let mut program = parse_ok(source);
    assert_eq!(program.len(), 1, "expected one statement in {source:?}");
    match program.remove(0).kind {
        StmtKind::Expr { expr } => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

/// Fully parenthesized rendering that exposes the tree shape.
/// Binary nodes print as `(l op r)`, groupings as `[inner]`.
fn shape(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Literal { value } => match value {
            Literal::Number(n) => n.to_string(),
            Literal::String(s) => format!("{s:?}"),
            Literal::Boolean(b) => b.to_string(),
        },
        ExprKind::Variable { name } => name.clone(),
        ExprKind::Array { elements } => {
            let items: Vec<String> = elements.iter().map(shape).collect();
            format!("array({})", items.join(", "))
        }
        ExprKind::Grouping { inner } => format!("[{}]", shape(inner)),
        ExprKind::Unary { op, operand } => format!("({}{})", op.as_str(), shape(operand)),
        ExprKind::Binary { left, op, right } => {
            format!("({} {} {})", shape(left), op.as_str(), shape(right))
        }
        ExprKind::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(shape).collect();
            format!("call({}; {})", shape(callee), args.join(", "))
        }
        ExprKind::Get { object, property } => match property {
            Property::Named(name) => format!("get({}.{})", shape(object), name.name),
            Property::Computed(index) => format!("index({}[{}])", shape(object), shape(index)),
        },
        ExprKind::Instance { name, members } => {
            let members: Vec<String> = members
                .iter()
                .map(|m| format!("{}: {}", m.name.name, shape(&m.value)))
                .collect();
            format!("new({}; {})", name.name, members.join(", "))
        }
    }
}

fn expr_shape(source: &str) -> String {
    shape(&parse_expr(source))
}

// ─────────────────────────────────────────────────────────────────────
// Precedence & associativity
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(expr_shape("2 + 3 * 4"), "(2 + (3 * 4))");
    assert_eq!(expr_shape("2 * 3 + 4"), "((2 * 3) + 4)");
}

#[test]
fn test_same_tier_is_left_associative() {
    assert_eq!(expr_shape("10 - 2 - 3"), "((10 - 2) - 3)");
    assert_eq!(expr_shape("8 / 4 / 2"), "((8 / 4) / 2)");
    assert_eq!(expr_shape("a - b + c - d"), "(((a - b) + c) - d)");
}

#[test]
fn test_mixed_tiers() {
    assert_eq!(expr_shape("1 + 2 * 3 - 4"), "((1 + (2 * 3)) - 4)");
    assert_eq!(expr_shape("1 * 2 + 3 * 4"), "((1 * 2) + (3 * 4))");
    assert_eq!(expr_shape("a - b * c / d + e"), "((a - ((b * c) / d)) + e)");
}

#[test]
fn test_comparison_and_logic_are_lowest() {
    assert_eq!(expr_shape("a + b < c"), "((a + b) < c)");
    assert_eq!(expr_shape("a < b + 1 && c"), "((a < (b + 1)) && c)");
    assert_eq!(expr_shape("x == 1 || y != 2"), "(((x == 1) || y) != 2)");
}

#[test]
fn test_grouping_is_kept_as_operand() {
    assert_eq!(expr_shape("(2 + 3) * 4"), "([(2 + 3)] * 4)");
    assert_eq!(expr_shape("1 - (2 - 3)"), "(1 - [(2 - 3)])");
    assert_eq!(expr_shape("2 * (3 + 4) - 1"), "((2 * [(3 + 4)]) - 1)");
}

#[test]
fn test_binary_span_covers_operands() {
    let expr = parse_expr("10 - 2 - 3");
    assert_eq!(expr.span, Span::new(1, 1, 1, 10));
    let ExprKind::Binary { left, .. } = &expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(left.span, Span::new(1, 1, 1, 6));
}

// ─────────────────────────────────────────────────────────────────────
// Prefix, postfix & literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unary_operators() {
    assert_eq!(expr_shape("-x * y"), "((-x) * y)");
    assert_eq!(expr_shape("a == !b"), "(a == (!b))");
    assert_eq!(expr_shape("- -3"), "(-(-3))");
    assert_eq!(expr_shape("-f(2)"), "(-call(f; 2))");
}

#[test]
fn test_postfix_chain() {
    assert_eq!(
        expr_shape("ward.beds[0](1).name"),
        "get(call(index(get(ward.beds)[0]); 1).name)"
    );
}

#[test]
fn test_postfix_applies_to_any_primary() {
    assert_eq!(expr_shape("[1, 2][0]"), "index(array(1, 2)[0])");
    assert_eq!(expr_shape("'abc'.length"), "get(\"abc\".length)");
    assert_eq!(expr_shape("(f)(1)"), "call([f]; 1)");
}

#[test]
fn test_calls() {
    assert_eq!(expr_shape("f()"), "call(f; )");
    assert_eq!(expr_shape("f(1, a + 2)"), "call(f; 1, (a + 2))");
    assert_eq!(expr_shape("f(g(1))(2)"), "call(call(f; call(g; 1)); 2)");
}

#[test]
fn test_array_literals() {
    assert_eq!(expr_shape("[]"), "array()");
    assert_eq!(expr_shape("[1, 'two', true]"), "array(1, \"two\", true)");
    assert_eq!(expr_shape("[[1], []]"), "array(array(1), array())");
}

#[test]
fn test_instance_literal() {
    assert_eq!(
        expr_shape("Bed(ward: 'A', number: 2 + 1)"),
        "new(Bed; ward: \"A\", number: (2 + 1))"
    );
    // Without `member:` the same head is an ordinary call.
    assert_eq!(expr_shape("Bed(ward, 3)"), "call(Bed; ward, 3)");
    assert_eq!(
        expr_shape("Bed(ward: 'A').ward"),
        "get(new(Bed; ward: \"A\").ward)"
    );
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_var_decl() {
    let program = parse_ok("prepare dose as 5");
    assert_eq!(program.len(), 1);
    assert_eq!(program[0].span, Span::new(1, 1, 1, 17));
    let StmtKind::VarDecl { name, value } = &program[0].kind else {
        panic!("expected VarDecl, got {:?}", program[0].kind);
    };
    assert_eq!(name.name, "dose");
    assert_eq!(shape(value), "5");
}

#[test]
fn test_property_set() {
    let program = parse_ok("prepare bed.ward as 'B'");
    let StmtKind::PropertySet {
        object,
        property,
        value,
    } = &program[0].kind
    else {
        panic!("expected PropertySet");
    };
    assert_eq!(shape(object), "bed");
    assert_eq!(property.name, "ward");
    assert_eq!(shape(value), "\"B\"");
}

#[test]
fn test_property_set_through_chain() {
    let program = parse_ok("prepare ward.head.name as 'Ana'");
    let StmtKind::PropertySet {
        object, property, ..
    } = &program[0].kind
    else {
        panic!("expected PropertySet");
    };
    assert_eq!(shape(object), "get(ward.head)");
    assert_eq!(property.name, "name");
}

#[test]
fn test_func_decl() {
    let program = parse_ok("diagnose dose needs (weight, age) {\n  finished weight * 2\n}");
    let StmtKind::FuncDecl(decl) = &program[0].kind else {
        panic!("expected FuncDecl");
    };
    assert_eq!(decl.name.name, "dose");
    let params: Vec<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["weight", "age"]);
    assert_eq!(decl.body.len(), 1);
    assert!(matches!(decl.body[0].kind, StmtKind::Return { .. }));
    assert_eq!(program[0].span, Span::new(1, 1, 3, 1));
}

#[test]
fn test_func_decl_without_params() {
    for source in ["diagnose greet { print('hi') }", "diagnose greet needs () { print('hi') }"] {
        let program = parse_ok(source);
        let StmtKind::FuncDecl(decl) = &program[0].kind else {
            panic!("expected FuncDecl");
        };
        assert!(decl.params.is_empty(), "{source}");
        assert_eq!(decl.body.len(), 1);
    }
}

#[test]
fn test_while() {
    let program = parse_ok("while (n > 0) { prepare n as n - 1 }");
    let StmtKind::While { condition, body } = &program[0].kind else {
        panic!("expected While");
    };
    assert_eq!(shape(condition), "(n > 0)");
    assert_eq!(body.len(), 1);
}

#[test]
fn test_loop_range() {
    let program = parse_ok("loop i through (0, n + 1) { print(i) }");
    let StmtKind::ForRange {
        var,
        start,
        end,
        body,
    } = &program[0].kind
    else {
        panic!("expected ForRange");
    };
    assert_eq!(var.name, "i");
    assert_eq!(shape(start), "0");
    assert_eq!(shape(end), "(n + 1)");
    assert_eq!(body.len(), 1);
}

#[test]
fn test_if_elif_else_chain() {
    let source = "if (a) { x } elif (b) { y } elif (c) { } else { z }";
    let program = parse_ok(source);
    let StmtKind::Conditional(cond) = &program[0].kind else {
        panic!("expected Conditional");
    };
    assert_eq!(cond.condition.as_ref().map(shape), Some("a".to_string()));
    assert_eq!(cond.body.len(), 1);

    let guards: Vec<Option<String>> = cond
        .otherwise
        .iter()
        .map(|branch| branch.condition.as_ref().map(shape))
        .collect();
    assert_eq!(
        guards,
        vec![Some("b".to_string()), Some("c".to_string()), None]
    );
    assert!(cond.otherwise.iter().all(|b| b.otherwise.is_empty()));
    assert!(cond.otherwise[1].body.is_empty());
}

#[test]
fn test_if_without_else() {
    let program = parse_ok("if (ok) { print(1) }\nprint(2)");
    assert_eq!(program.len(), 2);
    let StmtKind::Conditional(cond) = &program[0].kind else {
        panic!("expected Conditional");
    };
    assert!(cond.otherwise.is_empty());
}

#[test]
fn test_struct_decl() {
    let program = parse_ok("patient Bed has { ward, number }\npatient Empty has {}");
    let StmtKind::StructDecl { name, members } = &program[0].kind else {
        panic!("expected StructDecl");
    };
    assert_eq!(name.name, "Bed");
    let members: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(members, vec!["ward", "number"]);
    let StmtKind::StructDecl { members, .. } = &program[1].kind else {
        panic!("expected StructDecl");
    };
    assert!(members.is_empty());
}

#[test]
fn test_statements_need_no_separators() {
    let program = parse_ok("prepare a as 1 prepare b as a print(a, b)");
    assert_eq!(program.len(), 3);
}

#[test]
fn test_comments_are_ignored() {
    let program = parse_ok("! setup\nprepare a as 1\n! done");
    assert_eq!(program.len(), 1);
}

#[test]
fn test_empty_program() {
    assert!(parse_ok("").is_empty());
    assert!(parse_ok("\n\n! only a comment\n").is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_loop_with_three_range_expressions() {
    let err = parse_err("loop i through (0, 3, 6) { }");
    assert_eq!(err.token.kind, TokenKind::Comma);
    assert_eq!((err.line(), err.column()), (1, 21));
    assert_eq!(err.expected.as_deref(), Some("')'"));
    assert_eq!(err.to_string(), "Syntax error on 1:21: Expected ')' but got ','");
}

#[test]
fn test_loop_with_one_range_expression() {
    let err = parse_err("loop i through (0) { }");
    assert_eq!(err.token.kind, TokenKind::RightParen);
    assert_eq!((err.line(), err.column()), (1, 18));
    assert_eq!(err.expected.as_deref(), Some("','"));
}

#[test]
fn test_missing_as_reports_keyword() {
    let err = parse_err("prepare x 5");
    assert_eq!(err.message, "Expected 'as' but got '5'");
    assert_eq!(err.expected.as_deref(), Some("'as'"));
}

#[test]
fn test_missing_identifier() {
    let err = parse_err("prepare as 5");
    assert_eq!(err.message, "Expected identifier but got 'as'");
    assert_eq!((err.line(), err.column()), (1, 9));
}

#[test]
fn test_unexpected_token_in_expression_position() {
    let err = parse_err("prepare a as )");
    assert_eq!(err.message, "Expected expression but got ')'");
    assert_eq!(err.expected.as_deref(), Some("expression"));

    let err = parse_err("else { }");
    assert!(err.token.kind == TokenKind::Keyword(mediscript_lexer::Keyword::Else));
}

#[test]
fn test_unclosed_block_reports_end_of_input() {
    let err = parse_err("while (true) {\n  print(1)\n");
    assert_eq!(err.token.kind, TokenKind::Eof);
    assert_eq!(err.message, "Expected '}' but got 'end of input'");
}

#[test]
fn test_error_on_later_line() {
    let err = parse_err("prepare a as 1\nprepare b as [1, 2\nprint(b)");
    assert_eq!(err.line(), 3);
    assert_eq!(err.expected.as_deref(), Some("']'"));
}

#[test]
fn test_instance_literal_requires_member_syntax_throughout() {
    let err = parse_err("Bed(ward: 'A', 3)");
    assert_eq!(err.message, "Expected identifier but got '3'");
}

// ─────────────────────────────────────────────────────────────────────
// Nesting limits
// ─────────────────────────────────────────────────────────────────────

fn sum_of_ones(terms: usize) -> String {
    vec!["1"; terms].join(" + ")
}

fn nested_blocks(depth: usize) -> String {
    format!("{}{}", "if (true) { ".repeat(depth), "}".repeat(depth))
}

#[test]
fn test_long_operator_chain_up_to_limit() {
    let expr = parse_expr(&sum_of_ones(MAX_EXPR_DEPTH));
    assert_eq!(expr.height(), MAX_EXPR_DEPTH);
}

#[test]
fn test_operator_chain_past_limit_is_an_error() {
    let err = parse_err(&sum_of_ones(MAX_EXPR_DEPTH + 1));
    assert_eq!(err.message, "maximum expression nesting depth is 256");
    assert_eq!(err.token.kind, TokenKind::Plus);
    assert_eq!((err.line(), err.column()), (1, 1023));
    assert_eq!(err.expected, None);

    let err = parse_err(&format!("prepare s as {}", sum_of_ones(2000)));
    assert_eq!(err.message, "maximum expression nesting depth is 256");
}

#[test]
fn test_deep_parentheses() {
    let ok = format!("{}1{}", "(".repeat(255), ")".repeat(255));
    assert_eq!(parse_expr(&ok).height(), MAX_EXPR_DEPTH);

    let err = parse_err(&format!("{}1{}", "(".repeat(256), ")".repeat(256)));
    assert_eq!((err.line(), err.column()), (1, 257));

    let err = parse_err(&format!("prepare x as {}1{}", "(".repeat(5000), ")".repeat(5000)));
    assert_eq!(err.message, "maximum expression nesting depth is 256");
}

#[test]
fn test_deep_prefix_operators() {
    let ok = format!("{}1", "-".repeat(255));
    assert_eq!(parse_expr(&ok).height(), MAX_EXPR_DEPTH);

    let err = parse_err(&format!("prepare x as {}true", "!".repeat(3000)));
    assert_eq!(err.message, "maximum expression nesting depth is 256");
}

#[test]
fn test_long_postfix_chain() {
    let ok = format!("a{}", ".b".repeat(255));
    assert_eq!(parse_expr(&ok).height(), MAX_EXPR_DEPTH);

    let err = parse_err(&format!("a{}", ".b".repeat(1000)));
    assert_eq!(err.token.kind, TokenKind::Period);
    assert_eq!(err.column(), 512);
}

#[test]
fn test_nested_calls_and_arrays_past_limit() {
    let err = parse_err(&format!("{}0{}", "f(".repeat(400), ")".repeat(400)));
    assert_eq!(err.message, "maximum expression nesting depth is 256");
    let err = parse_err(&format!("{}0{}", "[".repeat(400), "]".repeat(400)));
    assert_eq!(err.message, "maximum expression nesting depth is 256");
}

#[test]
fn test_block_nesting_limit() {
    let program = parse_ok(&nested_blocks(MAX_BLOCK_DEPTH));
    assert_eq!(program.len(), 1);

    let err = parse_err(&nested_blocks(MAX_BLOCK_DEPTH + 1));
    assert_eq!(err.message, "maximum block nesting depth is 64");
    assert_eq!(err.token.kind, TokenKind::LeftBrace);

    let err = parse_err(&nested_blocks(3000));
    assert_eq!(err.message, "maximum block nesting depth is 64");
}
