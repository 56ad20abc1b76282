use super::{TypeResult, argument};
use crate::types::TypedExpression;
use model::field::{formula::FormulaType, options::DateOptions};

pub fn type_today(_: &str, _: &mut [TypedExpression]) -> TypeResult {
    Ok(FormulaType::Date(DateOptions::default()))
}

pub fn type_now(_: &str, _: &mut [TypedExpression]) -> TypeResult {
    Ok(FormulaType::Date(DateOptions {
        include_time: true,
        ..Default::default()
    }))
}

/// Drops the time part, keeping the date formatting.
pub fn type_trunc_day(function: &str, arguments: &mut [TypedExpression]) -> TypeResult {
    match argument(function, arguments, 0, "a date", |t| {
        matches!(t, FormulaType::Date(_))
    })? {
        FormulaType::Date(options) => Ok(FormulaType::Date(DateOptions {
            include_time: false,
            ..options.clone()
        })),
        other => Err(format!("{function} cannot truncate {other}")),
    }
}
