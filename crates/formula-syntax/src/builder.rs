use crate::{
    ast::{
        expr::{Expression, ExpressionKind},
        literal::Literal,
        operator::{BinaryOperator, UnaryOperator},
        span::Span,
    },
    errors::BuildError,
    parser::{FormulaParser, Rule},
};
use bigdecimal::BigDecimal;
use pest::{
    Parser,
    error::LineColLocation,
    iterators::{Pair, Pairs},
};
use std::str::FromStr;
use tracing::trace;

pub type BuildResult<T> = Result<T, BuildError>;

/// Deepest nesting accepted, both for parentheses in the text and for the
/// call tree built from operator chains.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse formula text into an untyped expression.
pub fn parse(input: &str) -> BuildResult<Expression> {
    parse_with_limit(input, MAX_NESTING_DEPTH)
}

pub fn parse_with_limit(input: &str, max_nesting: usize) -> BuildResult<Expression> {
    check_nesting(input, max_nesting)?;

    let mut pairs = FormulaParser::parse(Rule::formula, input).map_err(syntax_error)?;
    let formula = pairs
        .next()
        .ok_or_else(|| BuildError::syntax("Empty input", 1, 1))?;
    let span = pair_to_span(&formula);
    let expression = formula
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::expression)
        .ok_or_else(|| BuildError::syntax("Expected an expression", span.line, span.column))?;

    let expression = build_expression(expression, max_nesting)?;
    trace!(formula = input, depth = expression.depth(), "Parsed formula");
    Ok(expression)
}

/// Rejects text whose parentheses nest deeper than `limit`, ignoring
/// parentheses inside string literals.
fn check_nesting(input: &str, limit: usize) -> BuildResult<()> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => {
                depth += 1;
                if depth > limit {
                    return Err(BuildError::TooDeep { limit });
                }
            }
            (None, ')') => depth = depth.saturating_sub(1),
            (None, _) => {}
        }
    }

    Ok(())
}

fn syntax_error(error: pest::error::Error<Rule>) -> BuildError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    BuildError::syntax(error.variant.message(), line, column)
}

fn pair_to_span(pair: &Pair<Rule>) -> Span {
    let (line, col) = pair.line_col();
    let span_pest = pair.as_span();
    Span::new(span_pest.start(), span_pest.end(), line, col)
}

fn check_depth(depth: usize, limit: usize) -> BuildResult<()> {
    if depth > limit {
        return Err(BuildError::TooDeep { limit });
    }
    Ok(())
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, span: Span) -> BuildResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| BuildError::syntax("Incomplete expression", span.line, span.column))
}

fn build_expression(pair: Pair<Rule>, limit: usize) -> BuildResult<Expression> {
    let span = pair_to_span(&pair);

    match pair.as_rule() {
        Rule::expression | Rule::grouped => {
            let inner = next_pair(&mut pair.into_inner(), span)?;
            build_expression(inner, limit)
        }
        Rule::logical_or
        | Rule::logical_and
        | Rule::equality
        | Rule::comparison
        | Rule::additive
        | Rule::multiplicative => build_binary_chain(pair, span, limit),
        Rule::unary => build_unary(pair, span, limit),
        Rule::field_reference => {
            let literal = next_pair(&mut pair.into_inner(), span)?;
            Ok(Expression::new(
                ExpressionKind::FieldReference(parse_string_literal(literal)),
                span,
            ))
        }
        Rule::field_by_id_reference => {
            let id_pair = next_pair(&mut pair.into_inner(), span)?;
            let id = id_pair.as_str().parse::<u64>().map_err(|_| {
                BuildError::syntax(
                    format!("Invalid field id: {}", id_pair.as_str()),
                    span.line,
                    span.column,
                )
            })?;
            Ok(Expression::new(ExpressionKind::FieldByIdReference(id), span))
        }
        Rule::fn_call => build_function_call(pair, span, limit),
        Rule::lit_number => {
            let number = BigDecimal::from_str(pair.as_str()).map_err(|_| {
                BuildError::syntax(
                    format!("Invalid number: {}", pair.as_str()),
                    span.line,
                    span.column,
                )
            })?;
            Ok(Expression::literal(Literal::Number(number), span))
        }
        Rule::lit_string => Ok(Expression::literal(
            Literal::Text(parse_string_literal(pair)),
            span,
        )),
        Rule::lit_boolean => Ok(Expression::literal(
            Literal::Boolean(pair.as_str().eq_ignore_ascii_case("true")),
            span,
        )),
        rule => Err(BuildError::syntax(
            format!("Unexpected rule in expression: {rule:?}"),
            span.line,
            span.column,
        )),
    }
}

/// Folds `a op b op c` left-associatively into nested function calls. Each
/// operator adds a level, so a long chain fails once it passes `limit`.
fn build_binary_chain(pair: Pair<Rule>, span: Span, limit: usize) -> BuildResult<Expression> {
    let mut inner = pair.into_inner();
    let mut acc = build_expression(next_pair(&mut inner, span)?, limit)?;
    let mut depth = acc.depth();

    while let Some(op_pair) = inner.next() {
        let operator = BinaryOperator::from_symbol(op_pair.as_str()).ok_or_else(|| {
            BuildError::syntax(
                format!("Unknown operator: {}", op_pair.as_str()),
                span.line,
                span.column,
            )
        })?;
        let right = build_expression(next_pair(&mut inner, span)?, limit)?;
        depth = depth.max(right.depth()) + 1;
        check_depth(depth, limit)?;

        let joined = Span::new(acc.span.start, right.span.end, acc.span.line, acc.span.column);
        acc = Expression::call(operator.function_name(), vec![acc, right], joined);
    }

    Ok(acc)
}

fn build_unary(pair: Pair<Rule>, span: Span, limit: usize) -> BuildResult<Expression> {
    let mut operators = Vec::new();
    let mut operand = None;

    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::op_unary {
            let operator = UnaryOperator::from_symbol(inner.as_str()).ok_or_else(|| {
                BuildError::syntax(
                    format!("Unknown operator: {}", inner.as_str()),
                    span.line,
                    span.column,
                )
            })?;
            operators.push(operator);
        } else {
            operand = Some(build_expression(inner, limit)?);
        }
    }

    let mut expr = operand
        .ok_or_else(|| BuildError::syntax("Expected an operand", span.line, span.column))?;
    let mut depth = expr.depth();

    for operator in operators.into_iter().rev() {
        expr = match (operator, expr.kind) {
            (UnaryOperator::Negate, ExpressionKind::Literal(Literal::Number(n))) => {
                Expression::literal(Literal::Number(-n), span)
            }
            (UnaryOperator::Negate, kind) => {
                depth += 1;
                check_depth(depth, limit)?;
                let zero = Expression::literal(Literal::Number(BigDecimal::from(0)), span);
                Expression::call("minus", vec![zero, Expression::new(kind, expr.span)], span)
            }
            (UnaryOperator::Not, kind) => {
                depth += 1;
                check_depth(depth, limit)?;
                Expression::call("not", vec![Expression::new(kind, expr.span)], span)
            }
        };
    }

    Ok(expr)
}

fn build_function_call(pair: Pair<Rule>, span: Span, limit: usize) -> BuildResult<Expression> {
    let mut name = String::new();
    let mut arguments = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => {
                name = inner.as_str().to_ascii_lowercase();
            }
            Rule::expression => {
                arguments.push(build_expression(inner, limit)?);
            }
            _ => {}
        }
    }

    let depth = 1 + arguments.iter().map(Expression::depth).max().unwrap_or(0);
    check_depth(depth, limit)?;

    Ok(Expression::call(name, arguments, span))
}

fn parse_string_literal(pair: Pair<Rule>) -> String {
    let raw = pair
        .into_inner()
        .next()
        .map(|inner| inner.as_str())
        .unwrap_or_default();

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
