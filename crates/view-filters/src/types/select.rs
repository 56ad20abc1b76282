use crate::filter::{Compatibility, Compiled, FilterInput, ViewFilterType, trimmed};
use model::core::value::Value;
use planner::query::value;

/// Matches the select option with the given id.
pub struct SingleSelectEqualViewFilterType;

impl ViewFilterType for SingleSelectEqualViewFilterType {
    fn type_name(&self) -> &'static str {
        "single_select_equal"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        &[Compatibility::Field("single_select")]
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let Some(raw) = trimmed(input) else {
            return Compiled::NoFilter;
        };

        match raw.parse::<i64>() {
            Ok(option_id) => {
                Compiled::condition(input.column_expr().equals(value(Value::Int(option_id))))
            }
            Err(err) => Compiled::invalid(format!("`{raw}` is not an option id: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::FilterContext,
        filter::Not,
        types::testing::{compile, matching, rows},
    };
    use model::field::{Field, FieldKind, options::SelectOptions};
    use planner::Predicate;

    fn status() -> Field {
        Field::new(5, 1, "Status", FieldKind::SingleSelect(SelectOptions::default()))
    }

    #[test]
    fn test_single_select_equal() {
        let context = FilterContext::default();
        let data = rows("field_5", [Value::Int(1), Value::Int(2), Value::Null]);

        let equal = compile(&SingleSelectEqualViewFilterType, &status(), "2", &context);
        assert_eq!(matching(&equal, &data), vec![1]);

        let not_equal = compile(
            &Not::new("single_select_not_equal", SingleSelectEqualViewFilterType),
            &status(),
            "2",
            &context,
        );
        assert_eq!(matching(&not_equal, &data), vec![0, 2]);
    }

    #[test]
    fn test_non_numeric_option() {
        let context = FilterContext::default();
        assert_eq!(
            compile(&SingleSelectEqualViewFilterType, &status(), "red", &context),
            Predicate::MatchNone
        );
        assert_eq!(
            compile(
                &Not::new("single_select_not_equal", SingleSelectEqualViewFilterType),
                &status(),
                "red",
                &context
            ),
            Predicate::MatchAll
        );
    }
}
