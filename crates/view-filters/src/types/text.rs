use super::TEXT_LIKE;
use crate::{
    filter::{Compatibility, Compiled, FilterInput, ViewFilterType, trimmed},
    queries::{contains_query, contains_word_query},
};
use model::core::value::Value;
use planner::{Annotation, Expr, query::{ident, value}};

use Compatibility::{Field, Formula};

/// Exact match after coercing the value through the column.
pub struct EqualViewFilterType;

impl ViewFilterType for EqualViewFilterType {
    fn type_name(&self) -> &'static str {
        "equal"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        &[
            Field("text"),
            Field("long_text"),
            Field("url"),
            Field("number"),
            Field("rating"),
            Field("email"),
            Field("phone_number"),
            Formula(&["text", "char", "number"]),
        ]
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let Some(raw) = trimmed(input) else {
            return Compiled::NoFilter;
        };

        match input.column.prep_value(raw) {
            Ok(prepared) => Compiled::condition(input.column_expr().equals(value(prepared))),
            Err(err) => Compiled::invalid(err),
        }
    }
}

pub struct ContainsViewFilterType;

impl ViewFilterType for ContainsViewFilterType {
    fn type_name(&self) -> &'static str {
        "contains"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        &[
            Field("text"),
            Field("long_text"),
            Field("url"),
            Field("email"),
            Field("phone_number"),
            Field("date"),
            Field("last_modified"),
            Field("created_on"),
            Field("single_select"),
            Field("multiple_select"),
            Field("number"),
            Formula(&["text", "char", "number", "date"]),
        ]
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        match trimmed(input) {
            Some(needle) => contains_query(input.field_name, needle, &input.kind()),
            None => Compiled::NoFilter,
        }
    }
}

/// Matches whole words only, so `cat` does not match `concatenate`.
pub struct ContainsWordViewFilterType;

impl ViewFilterType for ContainsWordViewFilterType {
    fn type_name(&self) -> &'static str {
        "contains_word"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        &[
            Field("text"),
            Field("long_text"),
            Field("url"),
            Field("email"),
            Field("single_select"),
            Field("multiple_select"),
            Formula(&["text", "char"]),
        ]
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        match trimmed(input) {
            Some(word) => contains_word_query(input.field_name, word, &input.kind()),
            None => Compiled::NoFilter,
        }
    }
}

/// Character length strictly below the value. A limit of zero can never
/// exclude anything and is treated as no filter.
pub struct LengthIsLowerThanViewFilterType;

impl ViewFilterType for LengthIsLowerThanViewFilterType {
    fn type_name(&self) -> &'static str {
        "length_is_lower_than"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        TEXT_LIKE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let Some(raw) = trimmed(input) else {
            return Compiled::NoFilter;
        };

        match raw.parse::<i64>() {
            Ok(0) => Compiled::NoFilter,
            Ok(limit) => {
                let annotation = Annotation::new(
                    format!("{}_len", input.field_name),
                    Expr::function("LENGTH", vec![input.column_expr()]),
                );
                Compiled::annotated(
                    ident(&annotation.name).lt(value(Value::Int(limit))),
                    annotation,
                )
            }
            Err(err) => Compiled::invalid(format!("`{raw}` is not a length: {err}")),
        }
    }
}
