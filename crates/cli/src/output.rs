use crate::error::CliError;
use expression_engine::TypedExpression;
use model::field::formula::FormulaType;
use planner::query::{
    builder::filter::FilterPlan, dialect::Postgres, renderer::filter::RenderedFilter,
};
use serde::Serialize;
use view_filters::ViewFilterType;

#[derive(Serialize)]
struct FilterReport<'a> {
    field: &'a str,
    filter_type: &'a str,
    value: &'a str,
    #[serde(flatten)]
    rendered: RenderedFilter,
    query: String,
}

#[derive(Serialize)]
struct FormulaReport<'a> {
    field: &'a str,
    typed: String,
    formula_type: &'a FormulaType,
    expression: &'a TypedExpression,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}

pub fn print_filter(
    table: &str,
    field: &str,
    filter_type: &str,
    value: &str,
    plan: &FilterPlan,
) -> Result<(), CliError> {
    let (query, _) = plan.render_select(table, &Postgres);
    print_json(&FilterReport {
        field,
        filter_type,
        value,
        rendered: plan.render(&Postgres),
        query,
    })
}

pub fn print_formula(field: &str, expression: &TypedExpression) -> Result<(), CliError> {
    print_json(&FormulaReport {
        field,
        typed: expression.to_string(),
        formula_type: &expression.expression_type,
        expression,
    })
}

pub fn print_filter_types<'a>(types: impl Iterator<Item = &'a dyn ViewFilterType>) {
    for filter_type in types {
        let compatible = filter_type
            .compatible_field_types()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<32} {}", filter_type.type_name(), compatible);
    }
}
