//! Builder tests: operator desugaring, precedence and error reporting

use bigdecimal::BigDecimal;
use formula_syntax::{
    BuildError, MAX_NESTING_DEPTH,
    ast::{
        expr::{Expression, ExpressionKind},
        literal::Literal,
    },
    parse, parse_with_limit,
};
use std::str::FromStr;

fn call_name(expr: &Expression) -> &str {
    match &expr.kind {
        ExpressionKind::FunctionCall { name, .. } => name,
        other => panic!("Expected function call, got {other:?}"),
    }
}

#[test]
fn test_operators_desugar_to_calls() {
    let expr = parse("1 + 2").unwrap();
    assert_eq!(expr.to_string(), "add(1, 2)");

    let expr = parse("field('a') != 'x'").unwrap();
    assert_eq!(expr.to_string(), "not_equal(field('a'), 'x')");
}

#[test]
fn test_precedence() {
    let expr = parse("1 + 2 * 3").unwrap();
    assert_eq!(expr.to_string(), "add(1, multiply(2, 3))");

    let expr = parse("(1 + 2) * 3").unwrap();
    assert_eq!(expr.to_string(), "multiply(add(1, 2), 3)");

    let expr = parse("1 < 2 && true || false").unwrap();
    assert_eq!(call_name(&expr), "or");
    assert_eq!(expr.to_string(), "or(and(less_than(1, 2), true), false)");
}

#[test]
fn test_left_associativity() {
    let expr = parse("10 - 4 - 3").unwrap();
    assert_eq!(expr.to_string(), "minus(minus(10, 4), 3)");

    let expr = parse("'a' + 'b' + 'c'").unwrap();
    assert_eq!(expr.to_string(), "add(add('a', 'b'), 'c')");
}

#[test]
fn test_unary_operators() {
    let expr = parse("-1.5").unwrap();
    assert_eq!(
        expr.kind,
        ExpressionKind::Literal(Literal::Number(BigDecimal::from_str("-1.5").unwrap()))
    );

    let expr = parse("-field('n')").unwrap();
    assert_eq!(expr.to_string(), "minus(0, field('n'))");

    let expr = parse("!!true").unwrap();
    assert_eq!(expr.to_string(), "not(not(true))");
}

#[test]
fn test_function_names_are_case_insensitive() {
    let expr = parse("UPPER(Field('Name'))").unwrap();
    assert_eq!(expr.to_string(), "upper(field('Name'))");
    assert_eq!(expr.referenced_field_names(), vec!["Name"]);
}

#[test]
fn test_field_by_id() {
    let expr = parse("field_by_id(42)").unwrap();
    assert_eq!(expr.kind, ExpressionKind::FieldByIdReference(42));
}

#[test]
fn test_number_literal_keeps_scale() {
    let expr = parse("2.50").unwrap();
    match expr.kind {
        ExpressionKind::Literal(literal) => assert_eq!(literal.decimal_places(), 2),
        other => panic!("Expected literal, got {other:?}"),
    }
}

#[test]
fn test_syntax_error_position() {
    let err = parse("upper('a',)").unwrap_err();
    match err {
        BuildError::Syntax { line, column, .. } => {
            assert_eq!(line, 1);
            assert!(column > 1);
        }
        other => panic!("Expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_deep_nesting_rejected_before_parsing() {
    let deep = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(
        parse_with_limit(&deep, 10),
        Err(BuildError::TooDeep { limit: 10 })
    );
    assert!(parse_with_limit(&deep, 50).is_ok());
}

#[test]
fn test_long_operator_chain_rejected() {
    let sum = vec!["1"; 50_000].join("+");
    assert_eq!(
        parse(&sum),
        Err(BuildError::TooDeep { limit: MAX_NESTING_DEPTH })
    );

    let short = vec!["1"; 10].join(" + ");
    assert_eq!(parse_with_limit(&short, 10).unwrap().depth(), 10);
    assert_eq!(
        parse_with_limit(&short, 9),
        Err(BuildError::TooDeep { limit: 9 })
    );
}

#[test]
fn test_long_unary_stack_rejected() {
    let negations = format!("{}true", "!".repeat(50_000));
    assert_eq!(
        parse(&negations),
        Err(BuildError::TooDeep { limit: MAX_NESTING_DEPTH })
    );

    // Negated number literals fold instead of nesting.
    let expr = parse_with_limit("- - -1", 1).unwrap();
    assert_eq!(expr.to_string(), "-1");
}

#[test]
fn test_call_with_deep_argument_rejected() {
    let inner = vec!["1"; 4].join(" * ");
    assert!(parse_with_limit(&inner, 4).is_ok());
    assert_eq!(
        parse_with_limit(&format!("round({inner}, 2)"), 4),
        Err(BuildError::TooDeep { limit: 4 })
    );
}

#[test]
fn test_spans_cover_source() {
    let expr = parse("  upper('a')").unwrap();
    assert_eq!(expr.span.start, 2);
    assert_eq!(expr.span.column, 3);
}
