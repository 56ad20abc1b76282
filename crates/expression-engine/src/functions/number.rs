use super::{TypeResult, number_argument};
use crate::types::TypedExpression;
use bigdecimal::ToPrimitive;
use formula_syntax::ast::literal::Literal;
use model::field::formula::FormulaType;

/// Largest precision a formula number can carry.
pub const MAX_DECIMAL_PLACES: u32 = 10;

fn operands(function: &str, arguments: &[TypedExpression]) -> Result<(u32, u32), String> {
    Ok((
        number_argument(function, arguments, 0)?,
        number_argument(function, arguments, 1)?,
    ))
}

/// Adds numbers or joins two texts.
pub fn type_add(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    if arguments.iter().all(|a| a.expression_type.is_textual()) {
        return Ok(FormulaType::Text);
    }
    type_arithmetic(function, arguments)
}

/// `minus` and `multiply` keep the larger precision of their operands.
pub fn type_arithmetic(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    let (left, right) = operands(function, arguments)?;
    Ok(FormulaType::Number {
        decimal_places: left.max(right),
    })
}

/// Division shows at least two decimal places.
pub fn type_divide(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    let (left, right) = operands(function, arguments)?;
    Ok(FormulaType::Number {
        decimal_places: left.max(right).max(2),
    })
}

/// The precision must be a literal so the result type is known up front.
pub fn type_round(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    number_argument(function, arguments, 0)?;

    let places = match arguments.get(1).and_then(TypedExpression::as_literal) {
        Some(Literal::Number(n)) if n.is_integer() => n.to_u32(),
        _ => None,
    };
    match places {
        Some(places) if places <= MAX_DECIMAL_PLACES => Ok(FormulaType::Number {
            decimal_places: places,
        }),
        _ => Err(format!(
            "argument 2 of {function} must be a whole number literal between 0 and {MAX_DECIMAL_PLACES}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::{functions::FunctionRegistry, types::TypedExpression};
    use bigdecimal::BigDecimal;
    use formula_syntax::ast::literal::Literal;
    use model::field::formula::FormulaType;
    use std::str::FromStr;

    fn number(value: &str) -> TypedExpression {
        TypedExpression::literal(Literal::Number(BigDecimal::from_str(value).unwrap()))
    }

    fn typed(name: &str, arguments: Vec<TypedExpression>) -> FormulaType {
        FunctionRegistry::new()
            .call(name, arguments)
            .unwrap()
            .expression_type
    }

    #[test]
    fn test_arithmetic_keeps_largest_precision() {
        assert_eq!(
            typed("add", vec![number("1.5"), number("2.25")]),
            FormulaType::Number { decimal_places: 2 }
        );
        assert_eq!(
            typed("multiply", vec![number("3"), number("1.125")]),
            FormulaType::Number { decimal_places: 3 }
        );
    }

    #[test]
    fn test_add_joins_text() {
        let text = |s: &str| TypedExpression::literal(Literal::Text(s.into()));
        assert_eq!(typed("add", vec![text("a"), text("b")]), FormulaType::Text);
        assert!(typed("add", vec![text("a"), number("1")]).is_invalid());
    }

    #[test]
    fn test_divide_has_at_least_two_places() {
        assert_eq!(
            typed("divide", vec![number("10"), number("3")]),
            FormulaType::Number { decimal_places: 2 }
        );
        assert_eq!(
            typed("divide", vec![number("10.125"), number("3")]),
            FormulaType::Number { decimal_places: 3 }
        );
    }

    #[test]
    fn test_round_needs_literal_precision() {
        assert_eq!(
            typed("round", vec![number("1.2345"), number("2")]),
            FormulaType::Number { decimal_places: 2 }
        );
        assert!(typed("round", vec![number("1.2345"), number("1.5")]).is_invalid());
        assert!(typed("round", vec![number("1.2345"), number("-1")]).is_invalid());
        assert!(typed("round", vec![number("1.2345"), number("11")]).is_invalid());
    }
}
