//! In-memory evaluation of filter expressions with SQL three-valued logic.

use crate::{
    error::PlannerError,
    query::{
        ast::{
            expr::Expr,
            predicate::{Annotation, Predicate},
        },
        builder::filter::{FilterPlan, Selection},
    },
};
use binary::BinaryOpEvaluator;
use model::core::value::Value;
use std::collections::HashMap;

mod binary;
mod functions;
mod pattern;

/// A stored row keyed by column name.
pub type Row = HashMap<String, Value>;

/// A row plus the annotations computed for it.
pub struct Scope<'a> {
    row: &'a Row,
    annotations: HashMap<String, Value>,
}

impl<'a> Scope<'a> {
    pub fn new(row: &'a Row) -> Self {
        Self {
            row,
            annotations: HashMap::new(),
        }
    }

    /// Computes `annotations` in order; later annotations may refer to
    /// earlier ones.
    pub fn annotate(&mut self, annotations: &[Annotation]) -> Result<(), PlannerError> {
        for annotation in annotations {
            let value = annotation.expr.evaluate(self)?;
            self.annotations.insert(annotation.name.clone(), value);
        }
        Ok(())
    }

    /// A copy of this scope with `name` bound to `value`.
    fn with_binding(&self, name: &str, value: Value) -> Scope<'a> {
        let mut annotations = self.annotations.clone();
        annotations.insert(name.to_string(), value);
        Scope {
            row: self.row,
            annotations,
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, PlannerError> {
        self.annotations
            .get(name)
            .or_else(|| self.row.get(name))
            .cloned()
            .ok_or_else(|| PlannerError::UnknownIdentifier(name.to_string()))
    }
}

/// Trait for evaluating expressions against row data
pub trait Evaluator {
    fn evaluate(&self, scope: &Scope) -> Result<Value, PlannerError>;
}

impl Evaluator for Expr {
    fn evaluate(&self, scope: &Scope) -> Result<Value, PlannerError> {
        match self {
            Expr::Identifier(ident) => scope.lookup(&ident.name),
            Expr::Value(value) => Ok(value.clone()),
            Expr::BinaryOp(op) => {
                let left = op.left.evaluate(scope)?;
                let right = op.right.evaluate(scope)?;
                BinaryOpEvaluator::new(&left, &right, op.op).evaluate()
            }
            Expr::Not(expr) => Ok(match expr.evaluate(scope)? {
                Value::Boolean(b) => Value::Boolean(!b),
                _ => Value::Null,
            }),
            Expr::IsNull { expr, negated } => {
                let is_null = expr.evaluate(scope)?.is_null();
                Ok(Value::Boolean(is_null != *negated))
            }
            Expr::FunctionCall(call) => {
                let args = call
                    .args
                    .iter()
                    .map(|arg| arg.evaluate(scope))
                    .collect::<Result<Vec<_>, _>>()?;
                functions::call(&call.name, &args)
            }
            Expr::Cast { expr, data_type } => functions::cast(expr.evaluate(scope)?, data_type),
            Expr::AtTimeZone { expr, timezone } => {
                functions::at_time_zone(expr.evaluate(scope)?, timezone)
            }
            Expr::Extract { part, expr } => Ok(functions::extract(&expr.evaluate(scope)?, *part)),
            Expr::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| item.evaluate(scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(functions::array(values))
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let needle = expr.evaluate(scope)?;
                if needle.is_null() {
                    return Ok(Value::Null);
                }
                let mut found = false;
                for item in list {
                    if needle.equal(&item.evaluate(scope)?) {
                        found = true;
                        break;
                    }
                }
                Ok(Value::Boolean(found != *negated))
            }
            Expr::JsonArrayAny {
                array,
                key,
                op,
                value,
            } => {
                let Value::Json(serde_json::Value::Array(elements)) = array.evaluate(scope)? else {
                    return Ok(Value::Boolean(false));
                };
                let expected = value.evaluate(scope)?;
                for element in &elements {
                    let actual = functions::json_field(element, key);
                    if BinaryOpEvaluator::new(&actual, &expected, *op).evaluate()?
                        == Value::Boolean(true)
                    {
                        return Ok(Value::Boolean(true));
                    }
                }
                Ok(Value::Boolean(false))
            }
            Expr::ArrayAny {
                array,
                element,
                condition,
            } => {
                let elements: Vec<Value> = match array.evaluate(scope)? {
                    Value::IntArray(ids) => ids.into_iter().map(Value::Int).collect(),
                    Value::StringArray(items) => items.into_iter().map(Value::String).collect(),
                    Value::Null => Vec::new(),
                    other => vec![other],
                };
                for item in elements {
                    let inner = scope.with_binding(element, item);
                    if is_true(&condition.evaluate(&inner)?) {
                        return Ok(Value::Boolean(true));
                    }
                }
                Ok(Value::Boolean(false))
            }
        }
    }
}

/// A row passes a filter only when the condition evaluates to `TRUE`.
fn is_true(value: &Value) -> bool {
    matches!(value, Value::Boolean(true))
}

impl Predicate {
    pub fn matches(&self, row: &Row) -> Result<bool, PlannerError> {
        match self {
            Predicate::MatchAll => Ok(true),
            Predicate::MatchNone => Ok(false),
            Predicate::Condition {
                condition,
                annotation,
            } => {
                let mut scope = Scope::new(row);
                if let Some(annotation) = annotation {
                    scope.annotate(std::slice::from_ref(annotation))?;
                }
                Ok(is_true(&condition.evaluate(&scope)?))
            }
        }
    }
}

impl FilterPlan {
    pub fn matches(&self, row: &Row) -> Result<bool, PlannerError> {
        match &self.selection {
            Selection::All => Ok(true),
            Selection::Nothing => Ok(false),
            Selection::Where(condition) => {
                let mut scope = Scope::new(row);
                scope.annotate(&self.annotations)?;
                Ok(is_true(&condition.evaluate(&scope)?))
            }
        }
    }

    /// Rows of `rows` the plan keeps, in order.
    pub fn apply<'r>(&self, rows: &'r [Row]) -> Result<Vec<&'r Row>, PlannerError> {
        let mut kept = Vec::new();
        for row in rows {
            if self.matches(row)? {
                kept.push(row);
            }
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        ast::expr::{BinaryOperator, DatePart},
        ident, value,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use model::core::data_type::DataType;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_null_comparison_is_unknown() {
        let predicate = Predicate::condition(ident("field_1").equals(value(Value::Int(1))));
        let negated = predicate.clone().negate();
        let r = row(&[("field_1", Value::Null)]);

        assert!(!predicate.matches(&r).unwrap());
        assert!(negated.matches(&r).unwrap());
    }

    #[test]
    fn test_three_valued_logic() {
        let r = row(&[("n", Value::Null)]);
        let unknown_and_false = ident("n").is_null().negate().and(value(Value::Boolean(false)));
        let unknown = Expr::Not(Box::new(ident("n")));

        let scope = Scope::new(&r);
        assert_eq!(unknown.evaluate(&scope).unwrap(), Value::Null);
        assert_eq!(
            unknown.clone().and(value(Value::Boolean(false))).evaluate(&scope).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            unknown.clone().or(value(Value::Boolean(true))).evaluate(&scope).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            unknown.and(value(Value::Boolean(true))).evaluate(&scope).unwrap(),
            Value::Null
        );
        assert_eq!(
            unknown_and_false.evaluate(&scope).unwrap(),
            Value::Boolean(false)
        );
    }

    #[test]
    fn test_annotation_is_visible_to_condition() {
        let predicate = Predicate::annotated(
            ident("field_1_len").lt(value(Value::Int(4))),
            Annotation::new("field_1_len", Expr::function("LENGTH", vec![ident("field_1")])),
        );
        assert!(predicate.matches(&row(&[("field_1", Value::String("abc".into()))])).unwrap());
        assert!(!predicate.matches(&row(&[("field_1", Value::String("abcd".into()))])).unwrap());
    }

    #[test]
    fn test_unknown_identifier_is_an_error() {
        let predicate = Predicate::condition(ident("missing").is_null());
        assert_eq!(
            predicate.matches(&Row::new()),
            Err(PlannerError::UnknownIdentifier("missing".into()))
        );
    }

    #[test]
    fn test_timezone_shift_changes_the_day() {
        let instant = Utc.with_ymd_and_hms(2021, 1, 1, 23, 30, 0).unwrap();
        let r = row(&[("field_1", Value::Timestamp(instant))]);
        let local_day = ident("field_1")
            .at_time_zone("Europe/Amsterdam")
            .cast(DataType::Date);

        let predicate = Predicate::condition(
            local_day.equals(value(Value::Date(NaiveDate::from_ymd_opt(2021, 1, 2).unwrap()))),
        );
        assert!(predicate.matches(&r).unwrap());

        let day = ident("field_1").at_time_zone("GMT").extract(DatePart::Day);
        let predicate = Predicate::condition(day.equals(value(Value::Int(1))));
        assert!(predicate.matches(&r).unwrap());
    }

    #[test]
    fn test_in_list_and_json_any() {
        let r = row(&[
            ("field_1", Value::Int(2)),
            (
                "field_2",
                Value::Json(serde_json::json!([
                    {"visible_name": "Report.pdf", "is_image": false},
                    {"visible_name": "cat.png", "is_image": true}
                ])),
            ),
        ]);

        let in_list = Expr::InList {
            expr: Box::new(ident("field_1")),
            list: vec![value(Value::Int(1)), value(Value::Int(2))],
            negated: false,
        };
        assert!(Predicate::condition(in_list).matches(&r).unwrap());

        let any_image = Expr::JsonArrayAny {
            array: Box::new(ident("field_2")),
            key: "visible_name".into(),
            op: BinaryOperator::ILike,
            value: Box::new(value(Value::String("%REPORT%".into()))),
        };
        assert!(Predicate::condition(any_image).matches(&r).unwrap());
    }

    #[test]
    fn test_any_element_binds_each_item() {
        let r = row(&[
            ("field_4", Value::StringArray(vec!["Ada".into(), "Grace".into()])),
            ("field_5", Value::Null),
        ]);
        let any = |column: &str, pattern: &str| {
            Predicate::condition(Expr::any_element(
                ident(column),
                "related",
                ident("related").ilike(pattern),
            ))
        };

        assert!(any("field_4", "%RAC%").matches(&r).unwrap());
        assert!(!any("field_4", "%linus%").matches(&r).unwrap());
        assert!(!any("field_5", "%%").matches(&r).unwrap());
    }
}
