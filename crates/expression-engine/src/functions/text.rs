use super::{TypeResult, argument};
use crate::types::TypedExpression;
use model::field::formula::FormulaType;

fn text_argument(function: &str, arguments: &[TypedExpression]) -> Result<(), String> {
    argument(function, arguments, 0, "text", FormulaType::is_textual).map(|_| ())
}

/// `upper` and `lower`
pub fn type_text_transform(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    text_argument(function, arguments)?;
    Ok(FormulaType::Text)
}

/// Accepts anything; non-text arguments are converted with `totext`.
pub fn type_concat(_: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    for argument in arguments.iter_mut().filter(|a| !a.expression_type.is_textual()) {
        *argument = TypedExpression::call("totext", vec![argument.clone()], FormulaType::Text);
    }
    Ok(FormulaType::Text)
}

pub fn type_totext(_: &str, _: &mut [TypedExpression]) -> TypeResult {
    Ok(FormulaType::Text)
}

pub fn type_tonumber(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    text_argument(function, arguments)?;
    Ok(FormulaType::Number { decimal_places: 5 })
}

pub fn type_length(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    text_argument(function, arguments)?;
    Ok(FormulaType::Number { decimal_places: 0 })
}

#[cfg(test)]
mod tests {
    use crate::{functions::FunctionRegistry, types::{TypedExpression, TypedKind}};
    use formula_syntax::ast::literal::Literal;
    use model::field::formula::FormulaType;

    #[test]
    fn test_upper_rejects_numbers() {
        let registry = FunctionRegistry::new();
        let typed = registry.call("upper", vec![TypedExpression::number(1)]).unwrap();
        assert_eq!(
            typed.expression_type,
            FormulaType::invalid("argument 1 of upper must be text, got number(0)")
        );
    }

    #[test]
    fn test_concat_converts_non_text_arguments() {
        let registry = FunctionRegistry::new();
        let typed = registry
            .call(
                "concat",
                vec![
                    TypedExpression::literal(Literal::Text("n=".into())),
                    TypedExpression::number(4),
                ],
            )
            .unwrap();

        assert_eq!(typed.expression_type, FormulaType::Text);
        assert_eq!(typed.to_string(), "concat('n=', totext(4))");
        let TypedKind::FunctionCall { arguments, .. } = &typed.kind else {
            panic!("expected a call");
        };
        assert!(arguments.iter().all(|a| a.expression_type.is_textual()));
    }

    #[test]
    fn test_number_conversions() {
        let registry = FunctionRegistry::new();
        let text = || TypedExpression::literal(Literal::Text("12".into()));
        assert_eq!(
            registry.call("tonumber", vec![text()]).unwrap().expression_type,
            FormulaType::Number { decimal_places: 5 }
        );
        assert_eq!(
            registry.call("length", vec![text()]).unwrap().expression_type,
            FormulaType::Number { decimal_places: 0 }
        );
    }
}
