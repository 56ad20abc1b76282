use crate::{
    error::PlannerError,
    eval::pattern::{like_match, regex_match},
    query::ast::expr::BinaryOperator,
};
use model::core::value::Value;
use std::cmp::Ordering;
use tracing::warn;

/// Binary operation evaluator following SQL NULL semantics.
pub(crate) struct BinaryOpEvaluator<'a> {
    left: &'a Value,
    right: &'a Value,
    op: BinaryOperator,
}

impl<'a> BinaryOpEvaluator<'a> {
    pub fn new(left: &'a Value, right: &'a Value, op: BinaryOperator) -> Self {
        Self { left, right, op }
    }

    pub fn evaluate(&self) -> Result<Value, PlannerError> {
        use BinaryOperator::*;

        match self.op {
            And | Or => Ok(self.eval_logical()),
            _ if self.left.is_null() || self.right.is_null() => Ok(Value::Null),
            Eq | NotEq | Lt | LtEq | Gt | GtEq => Ok(self.eval_comparison()),
            Like | ILike => Ok(self.eval_like()),
            IRegexMatch => self.eval_regex(),
            Overlap => Ok(self.eval_overlap()),
        }
    }

    fn eval_logical(&self) -> Value {
        let l = truth(self.left);
        let r = truth(self.right);

        let result = match self.op {
            BinaryOperator::And => match (l, r) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            _ => match (l, r) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
        };
        result.map(Value::Boolean).unwrap_or(Value::Null)
    }

    fn eval_comparison(&self) -> Value {
        let ordering = match (self.left, self.right) {
            (Value::Json(l), Value::Json(r)) => {
                return match self.op {
                    BinaryOperator::Eq => Value::Boolean(l == r),
                    BinaryOperator::NotEq => Value::Boolean(l != r),
                    _ => Value::Null,
                };
            }
            _ => self.left.compare(self.right),
        };

        let Some(ordering) = ordering else {
            warn!(
                left = ?self.left.data_type(),
                right = ?self.right.data_type(),
                "Incomparable values in {}",
                self.op
            );
            return Value::Null;
        };

        Value::Boolean(match self.op {
            BinaryOperator::Eq => ordering == Ordering::Equal,
            BinaryOperator::NotEq => ordering != Ordering::Equal,
            BinaryOperator::Lt => ordering == Ordering::Less,
            BinaryOperator::LtEq => ordering != Ordering::Greater,
            BinaryOperator::Gt => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        })
    }

    fn eval_like(&self) -> Value {
        let (Some(text), Some(pattern)) = (self.left.as_text(), self.right.as_text()) else {
            return Value::Null;
        };

        if self.op == BinaryOperator::ILike {
            Value::Boolean(like_match(&text.to_lowercase(), &pattern.to_lowercase()))
        } else {
            Value::Boolean(like_match(&text, &pattern))
        }
    }

    fn eval_regex(&self) -> Result<Value, PlannerError> {
        let (Some(text), Some(pattern)) = (self.left.as_text(), self.right.as_text()) else {
            return Ok(Value::Null);
        };
        regex_match(&text, &pattern).map(Value::Boolean)
    }

    fn eval_overlap(&self) -> Value {
        match (self.left, self.right) {
            (Value::IntArray(l), Value::IntArray(r)) => {
                Value::Boolean(l.iter().any(|item| r.contains(item)))
            }
            (Value::StringArray(l), Value::StringArray(r)) => {
                Value::Boolean(l.iter().any(|item| r.contains(item)))
            }
            _ => {
                warn!("Unsupported operands for array overlap");
                Value::Null
            }
        }
    }
}

fn truth(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn eval(left: Value, op: BinaryOperator, right: Value) -> Value {
        BinaryOpEvaluator::new(&left, &right, op).evaluate().unwrap()
    }

    #[test]
    fn test_numeric_comparison_across_types() {
        let decimal = Value::Decimal(BigDecimal::from_str("2.5").unwrap());
        assert_eq!(eval(Value::Int(3), BinaryOperator::Gt, decimal.clone()), Value::Boolean(true));
        assert_eq!(eval(Value::Int(2), BinaryOperator::GtEq, decimal), Value::Boolean(false));
    }

    #[test]
    fn test_null_operands() {
        assert_eq!(eval(Value::Null, BinaryOperator::Eq, Value::Null), Value::Null);
        assert_eq!(
            eval(Value::String("a".into()), BinaryOperator::ILike, Value::Null),
            Value::Null
        );
    }

    #[test]
    fn test_ilike_is_case_insensitive() {
        assert_eq!(
            eval(
                Value::String("Hello World".into()),
                BinaryOperator::ILike,
                Value::String("%WORLD%".into())
            ),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(
                Value::String("Hello World".into()),
                BinaryOperator::Like,
                Value::String("%WORLD%".into())
            ),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_overlap() {
        assert_eq!(
            eval(Value::IntArray(vec![1, 2]), BinaryOperator::Overlap, Value::IntArray(vec![2])),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(Value::IntArray(vec![1]), BinaryOperator::Overlap, Value::IntArray(vec![3])),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_json_equality() {
        assert_eq!(
            eval(
                Value::Json(serde_json::json!([])),
                BinaryOperator::Eq,
                Value::Json(serde_json::json!([]))
            ),
            Value::Boolean(true)
        );
    }
}
