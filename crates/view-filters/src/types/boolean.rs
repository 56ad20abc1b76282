use crate::filter::{Compatibility, Compiled, FilterInput, ViewFilterType};
use model::core::value::Value;
use planner::query::value;

const TRUTHY: [&str; 7] = ["y", "t", "o", "yes", "true", "on", "1"];

/// Compares with the boolean the value spells. Anything that does not read
/// as true, including an empty value, means false.
pub struct BooleanViewFilterType;

impl ViewFilterType for BooleanViewFilterType {
    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        &[
            Compatibility::Field("boolean"),
            Compatibility::Formula(&["boolean"]),
        ]
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let expected = TRUTHY.contains(&input.value.trim().to_lowercase().as_str());
        Compiled::condition(input.column_expr().equals(value(Value::Boolean(expected))))
    }
}
