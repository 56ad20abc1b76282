use crate::error::{FormulaError, Result};
use bigdecimal::BigDecimal;
use formula_syntax::ast::literal::Literal;
use model::field::formula::FormulaType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedKind {
    Literal(Literal),
    FieldReference {
        field_id: u64,
        name: String,
    },
    FunctionCall {
        name: String,
        arguments: Vec<TypedExpression>,
    },
}

/// Expression tree where every node carries its resolved formula type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedExpression {
    pub kind: TypedKind,
    pub expression_type: FormulaType,
}

impl TypedExpression {
    pub fn new(kind: TypedKind, expression_type: FormulaType) -> Self {
        Self {
            kind,
            expression_type,
        }
    }

    pub fn literal(literal: Literal) -> Self {
        let expression_type = match &literal {
            Literal::Text(_) => FormulaType::Text,
            Literal::Number(_) => FormulaType::Number {
                decimal_places: literal.decimal_places(),
            },
            Literal::Boolean(_) => FormulaType::Boolean,
        };
        Self::new(TypedKind::Literal(literal), expression_type)
    }

    pub fn number(value: u32) -> Self {
        Self::literal(Literal::Number(BigDecimal::from(value)))
    }

    pub fn call(
        name: impl Into<String>,
        arguments: Vec<TypedExpression>,
        expression_type: FormulaType,
    ) -> Self {
        Self::new(
            TypedKind::FunctionCall {
                name: name.into(),
                arguments,
            },
            expression_type,
        )
    }

    pub fn with_type(self, expression_type: FormulaType) -> Self {
        Self {
            expression_type,
            ..self
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.expression_type.is_invalid()
    }

    /// The literal behind this node, if it is one.
    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            TypedKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Converts an invalid root into an error for callers that cannot store
    /// an invalid formula.
    pub fn into_valid(self) -> Result<Self> {
        match self.expression_type {
            FormulaType::Invalid { error } => Err(FormulaError::InvalidFormula(error)),
            _ => Ok(self),
        }
    }
}

impl fmt::Display for TypedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypedKind::Literal(literal) => write!(f, "{literal}"),
            TypedKind::FieldReference { name, .. } => {
                write!(f, "field({})", Literal::Text(name.clone()))
            }
            TypedKind::FunctionCall { name, arguments } => {
                write!(f, "{name}(")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_literal_types() {
        assert_eq!(
            TypedExpression::literal(Literal::Text("a".into())).expression_type,
            FormulaType::Text
        );
        assert_eq!(
            TypedExpression::literal(Literal::Number(BigDecimal::from_str("1.25").unwrap()))
                .expression_type,
            FormulaType::Number { decimal_places: 2 }
        );
    }

    #[test]
    fn test_into_valid() {
        let valid = TypedExpression::literal(Literal::Boolean(true));
        assert_eq!(valid.clone().into_valid(), Ok(valid));

        let invalid = TypedExpression::number(1).with_type(FormulaType::invalid("bad"));
        assert_eq!(
            invalid.into_valid(),
            Err(FormulaError::InvalidFormula("bad".into()))
        );
    }

    #[test]
    fn test_display() {
        let reference = TypedExpression::new(
            TypedKind::FieldReference {
                field_id: 3,
                name: "Price".into(),
            },
            FormulaType::Number { decimal_places: 2 },
        );
        let call = TypedExpression::call(
            "round",
            vec![reference, TypedExpression::number(2)],
            FormulaType::Number { decimal_places: 2 },
        );
        assert_eq!(call.to_string(), "round(field('Price'), 2)");
    }
}
