use crate::{
    filter::{Compatibility, Compiled, FilterInput, ViewFilterType, trimmed},
    queries::contains_query,
};
use planner::{Annotation, Expr, Predicate, query::ident};

/// Keeps rows where the primary value of any related row contains the
/// value. The related primary values are aggregated into
/// `<column>__<primary column>_array` and the primary field's own contains
/// query runs against each of them.
pub struct LinkRowContainsViewFilterType;

impl ViewFilterType for LinkRowContainsViewFilterType {
    fn type_name(&self) -> &'static str {
        "link_row_contains"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        &[Compatibility::Field("link_row")]
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let Some(needle) = trimmed(input) else {
            return Compiled::NoFilter;
        };
        let Some(primary) = input.related_primary else {
            return Compiled::invalid("the related table has no primary field");
        };

        let related = format!("{}__{}", input.field_name, primary.db_column());
        let condition = match contains_query(&related, needle, &primary.kind.resolved()) {
            Compiled::Fragment(Predicate::Condition {
                condition,
                annotation: Some(inner),
            }) => condition.replace_identifier(&inner.name, &inner.expr),
            Compiled::Fragment(Predicate::Condition { condition, .. }) => condition,
            other => return other,
        };

        let annotation = Annotation::new(
            format!("{related}_array"),
            Expr::function("ARRAY_AGG", vec![ident(&related)]),
        );
        Compiled::annotated(
            Expr::any_element(ident(&annotation.name), related, condition),
            annotation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::FilterContext,
        filter::Not,
        types::testing::{compile, compile_related, matching},
    };
    use model::{
        core::value::Value,
        field::{
            Field, FieldKind,
            options::{DateFormat, DateOptions, LinkRowOptions},
        },
    };
    use planner::{FilterBuilder, FilterType, Row};

    fn customers() -> Field {
        Field::new(
            10,
            1,
            "Customers",
            FieldKind::LinkRow(LinkRowOptions {
                link_row_table_id: 2,
            }),
        )
    }

    fn name() -> Field {
        let mut field = Field::new(20, 2, "Name", FieldKind::Text);
        field.primary = true;
        field
    }

    fn data() -> Vec<Row> {
        [
            Value::StringArray(vec!["Ada Lovelace".into(), "Grace Hopper".into()]),
            Value::StringArray(vec!["Alan Turing".into()]),
            Value::Null,
        ]
        .into_iter()
        .map(|related| Row::from([("field_10__field_20".to_string(), related)]))
        .collect()
    }

    fn contains(value: &str) -> Predicate {
        compile_related(
            &LinkRowContainsViewFilterType,
            &customers(),
            Some(&name()),
            value,
            &FilterContext::default(),
        )
    }

    fn not_contains(value: &str) -> Predicate {
        compile_related(
            &Not::new("link_row_not_contains", LinkRowContainsViewFilterType),
            &customers(),
            Some(&name()),
            value,
            &FilterContext::default(),
        )
    }

    #[test]
    fn test_contains_any_related_primary_value() {
        let predicate = contains("hopper");
        assert_eq!(
            predicate.annotation().map(|a| a.name.as_str()),
            Some("field_10__field_20_array")
        );
        assert_eq!(matching(&predicate, &data()), vec![0]);
        assert_eq!(matching(&contains(" A "), &data()), vec![0, 1]);
    }

    #[test]
    fn test_not_contains_keeps_rows_without_relations() {
        assert_eq!(matching(&not_contains("hopper"), &data()), vec![1, 2]);
    }

    #[test]
    fn test_empty_value_is_no_filter() {
        assert_eq!(contains(""), Predicate::MatchAll);
        assert_eq!(not_contains(""), Predicate::MatchAll);
        assert_eq!(not_contains("   "), Predicate::MatchAll);
    }

    #[test]
    fn test_missing_primary_field() {
        let context = FilterContext::default();
        assert_eq!(
            compile(&LinkRowContainsViewFilterType, &customers(), "ada", &context),
            Predicate::MatchNone
        );
        assert_eq!(
            compile(
                &Not::new("link_row_not_contains", LinkRowContainsViewFilterType),
                &customers(),
                "ada",
                &context
            ),
            Predicate::MatchAll
        );
    }

    #[test]
    fn test_date_primary_is_searched_as_displayed() {
        let mut due = Field::new(
            21,
            2,
            "Due",
            FieldKind::Date(DateOptions {
                date_format: DateFormat::Eu,
                ..Default::default()
            }),
        );
        due.primary = true;

        let predicate = compile_related(
            &LinkRowContainsViewFilterType,
            &customers(),
            Some(&due),
            "05/",
            &FilterContext::default(),
        );
        let Predicate::Condition {
            condition,
            annotation: Some(annotation),
        } = &predicate
        else {
            panic!("expected an annotated condition, got {predicate:?}");
        };
        assert_eq!(annotation.name, "field_10__field_21_array");

        // The formatted date is computed per element instead of annotated.
        let Expr::ArrayAny { condition, .. } = condition else {
            panic!("expected an element quantifier, got {condition:?}");
        };
        let debug = format!("{condition:?}");
        assert!(debug.contains("TO_CHAR"));
        assert!(!debug.contains("field_10__field_21_formatted"));
    }

    #[test]
    fn test_stacked_filters_share_the_aggregation() {
        let mut builder = FilterBuilder::new(FilterType::Or);
        builder
            .filter(contains("ada"))
            .unwrap()
            .filter(contains("alan"))
            .unwrap();
        assert_eq!(builder.annotations().len(), 1);
        assert_eq!(builder.build().apply(&data()).unwrap().len(), 2);
    }
}
