use expression_engine::{FieldLookupCache, FormulaTyper};
use model::{
    core::value::Value,
    field::{FieldKind, formula::FormulaType},
    schema::Schema,
};
use planner::Row;

pub const PROJECTS_SCHEMA: &str = r#"{
    "tables": [
        {
            "id": 1,
            "name": "Projects",
            "fields": [
                {"id": 1, "table_id": 1, "name": "Name", "type": "text", "primary": true},
                {"id": 2, "table_id": 1, "name": "Budget", "type": "number", "decimal_places": 2},
                {"id": 3, "table_id": 1, "name": "Active", "type": "boolean"},
                {"id": 4, "table_id": 1, "name": "Label", "type": "formula",
                 "formula": "concat(field('Name'), ' #', field('Budget'))"},
                {"id": 5, "table_id": 1, "name": "Double", "type": "formula",
                 "formula": "field('Budget') * 2"},
                {"id": 6, "table_id": 1, "name": "Expensive", "type": "formula",
                 "formula": "field('Double') > 300"},
                {"id": 7, "table_id": 1, "name": "Shout", "type": "formula",
                 "formula": "upper(field('Name'))"}
            ]
        },
        {
            "id": 2,
            "name": "Loops",
            "fields": [
                {"id": 20, "table_id": 2, "name": "A", "type": "formula", "formula": "field('B')"},
                {"id": 21, "table_id": 2, "name": "B", "type": "formula", "formula": "field('A')"},
                {"id": 22, "table_id": 2, "name": "Broken", "type": "formula", "formula": "upper(1"}
            ]
        }
    ]
}"#;

pub fn projects_schema() -> Schema {
    Schema::from_json(PROJECTS_SCHEMA).expect("valid schema fixture")
}

/// Types every formula field and stores the result on the field, turning
/// typing errors into an invalid formula type.
pub fn type_formula_fields(schema: &mut Schema, max_depth: usize) {
    let typer = FormulaTyper::new(max_depth);
    let mut typed = Vec::new();
    {
        let mut cache = FieldLookupCache::new(schema);
        for field in schema.fields().filter(|f| f.is_formula()) {
            let formula_type = typer
                .typed_expression(field, &mut cache)
                .map(|expression| expression.expression_type)
                .unwrap_or_else(|err| FormulaType::invalid(err.to_string()));

            let mut field = field.clone();
            if let FieldKind::Formula(options) = &mut field.kind {
                options.formula_type = Some(formula_type);
            }
            typed.push(field);
        }
    }
    for field in typed {
        schema.replace_field(field).expect("field exists");
    }
}

pub fn typed_projects_schema() -> Schema {
    let mut schema = projects_schema();
    type_formula_fields(&mut schema, 64);
    schema
}

pub fn formula_type(schema: &Schema, table: &str, field: &str) -> FormulaType {
    schema
        .find_field(table, field)
        .expect("field exists")
        .formula_options()
        .and_then(|options| options.formula_type.clone())
        .expect("formula field is typed")
}

/// A row of `Projects` with the formula columns filled in the way a database
/// would compute them.
pub fn project_row(name: &str, budget: i64, active: bool) -> Row {
    Row::from([
        ("field_1".to_string(), Value::String(name.into())),
        ("field_2".to_string(), Value::Int(budget)),
        ("field_3".to_string(), Value::Boolean(active)),
        (
            "field_4".to_string(),
            Value::String(format!("{name} #{budget}")),
        ),
        ("field_5".to_string(), Value::Int(budget * 2)),
        ("field_6".to_string(), Value::Boolean(budget * 2 > 300)),
        ("field_7".to_string(), Value::String(name.to_uppercase())),
    ])
}

pub fn project_rows() -> Vec<Row> {
    vec![
        project_row("Apollo", 100, true),
        project_row("Gemini", 200, false),
        project_row("Mercury", 180, true),
        project_row("Artemis", 50, true),
    ]
}

/// Indices of the rows kept by `kept`, which must borrow from `rows`.
pub fn indices(rows: &[Row], kept: &[&Row]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| kept.iter().any(|k| std::ptr::eq(*k, *row)))
        .map(|(i, _)| i)
        .collect()
}
