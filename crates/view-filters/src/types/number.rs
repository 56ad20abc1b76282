use crate::filter::{Compatibility, Compiled, FilterInput, ViewFilterType, trimmed};
use bigdecimal::{BigDecimal, RoundingMode};
use planner::{BinaryOperator, Expr, query::value};
use std::{borrow::Cow, str::FromStr};

const NUMERIC: &[Compatibility] = &[
    Compatibility::Field("number"),
    Compatibility::Field("rating"),
    Compatibility::Formula(&["number"]),
];

/// Compares the field against a numeric threshold. A fractional threshold on
/// an integer column is rounded with `rounding` first, so `> 3.7` means `> 3`
/// and `< 3.2` means `< 4`.
fn compare(input: &FilterInput<'_>, op: BinaryOperator, rounding: RoundingMode) -> Compiled {
    let Some(raw) = trimmed(input) else {
        return Compiled::NoFilter;
    };

    let threshold = if input.column.data_type.is_integer() && raw.contains('.') {
        match BigDecimal::from_str(raw) {
            Ok(decimal) => Cow::Owned(decimal.with_scale_round(0, rounding).to_string()),
            Err(err) => return Compiled::invalid(format!("`{raw}` is not a number: {err}")),
        }
    } else {
        Cow::Borrowed(raw)
    };

    match input.column.prep_value(&threshold) {
        Ok(prepared) => Compiled::condition(Expr::binary(input.column_expr(), op, value(prepared))),
        Err(err) => Compiled::invalid(err),
    }
}

pub struct HigherThanViewFilterType;

impl ViewFilterType for HigherThanViewFilterType {
    fn type_name(&self) -> &'static str {
        "higher_than"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        NUMERIC
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        compare(input, BinaryOperator::Gt, RoundingMode::Floor)
    }
}

pub struct LowerThanViewFilterType;

impl ViewFilterType for LowerThanViewFilterType {
    fn type_name(&self) -> &'static str {
        "lower_than"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        NUMERIC
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        compare(input, BinaryOperator::Lt, RoundingMode::Ceiling)
    }
}
