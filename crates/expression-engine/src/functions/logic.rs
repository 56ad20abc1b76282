use super::{TypeResult, argument};
use crate::types::TypedExpression;
use model::field::formula::FormulaType;

fn is_boolean(formula_type: &FormulaType) -> bool {
    matches!(formula_type, FormulaType::Boolean)
}

/// Operands must be of the same kind; text and char compare with each other.
pub fn type_comparison(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    let left = &arguments[0].expression_type;
    let right = &arguments[1].expression_type;
    if left.same_kind(right) {
        Ok(FormulaType::Boolean)
    } else {
        Err(format!(
            "arguments of {function} must be of the same type, got {left} and {right}"
        ))
    }
}

/// `and`, `or` and `not`
pub fn type_boolean_operator(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    for index in 0..arguments.len() {
        argument(function, arguments, index, "a boolean", is_boolean)?;
    }
    Ok(FormulaType::Boolean)
}

/// Both branches must agree; the result is the wider of the two.
pub fn type_if(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    argument(function, arguments, 0, "a boolean", is_boolean)?;

    let then = &arguments[1].expression_type;
    let otherwise = &arguments[2].expression_type;
    match (then, otherwise) {
        (FormulaType::Number { decimal_places: a }, FormulaType::Number { decimal_places: b }) => {
            Ok(FormulaType::Number {
                decimal_places: (*a).max(*b),
            })
        }
        (FormulaType::Char, FormulaType::Char) => Ok(FormulaType::Char),
        (a, b) if a.is_textual() && b.is_textual() => Ok(FormulaType::Text),
        (a, b) if a.same_kind(b) => Ok(a.clone()),
        (a, b) => Err(format!(
            "both branches of {function} must be of the same type, got {a} and {b}"
        )),
    }
}

pub fn type_isblank(_: &str, _: &mut [TypedExpression]) -> TypeResult {
    Ok(FormulaType::Boolean)
}

/// `when_empty(value, fallback)` keeps the type of `value`.
pub fn type_when_empty(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    let value = &arguments[0].expression_type;
    let fallback = &arguments[1].expression_type;
    if value.same_kind(fallback) {
        Ok(value.clone())
    } else {
        Err(format!(
            "fallback of {function} must match {value}, got {fallback}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{functions::FunctionRegistry, types::TypedExpression};
    use formula_syntax::ast::literal::Literal;
    use model::field::formula::FormulaType;

    fn text(value: &str) -> TypedExpression {
        TypedExpression::literal(Literal::Text(value.into()))
    }

    fn boolean(value: bool) -> TypedExpression {
        TypedExpression::literal(Literal::Boolean(value))
    }

    fn typed(name: &str, arguments: Vec<TypedExpression>) -> FormulaType {
        FunctionRegistry::new()
            .call(name, arguments)
            .unwrap()
            .expression_type
    }

    #[test]
    fn test_comparisons_need_same_kind() {
        assert_eq!(
            typed("equal", vec![text("a"), text("b")]),
            FormulaType::Boolean
        );
        assert_eq!(
            typed("less_than", vec![text("a"), TypedExpression::number(1)]),
            FormulaType::invalid("arguments of less_than must be of the same type, got text and number(0)")
        );
    }

    #[test]
    fn test_boolean_operators() {
        assert_eq!(
            typed("and", vec![boolean(true), boolean(false)]),
            FormulaType::Boolean
        );
        assert!(typed("not", vec![text("yes")]).is_invalid());
    }

    #[test]
    fn test_if_widens_branches() {
        assert_eq!(
            typed(
                "if",
                vec![
                    boolean(true),
                    TypedExpression::number(1),
                    TypedExpression::literal(Literal::Number("1.50".parse().unwrap())),
                ]
            ),
            FormulaType::Number { decimal_places: 2 }
        );
        assert!(typed("if", vec![boolean(true), text("a"), boolean(false)]).is_invalid());
        assert!(typed("if", vec![text("x"), text("a"), text("b")]).is_invalid());
    }

    #[test]
    fn test_isblank_accepts_anything() {
        assert_eq!(
            typed("isblank", vec![TypedExpression::number(0)]),
            FormulaType::Boolean
        );
    }
}
