//! In-memory catalogue of tables and their fields.

use crate::{error::ModelError, field::Field};
use serde::{Deserialize, Serialize};

/// Lookup of fields by name within a table or by global id. Formula typing
/// resolves `field('...')` references through this seam, link row filters
/// reach the related table's primary field through it.
pub trait FieldSource {
    fn field_by_name(&self, table_id: u64, name: &str) -> Option<&Field>;
    fn field_by_id(&self, id: u64) -> Option<&Field>;
    fn primary_field(&self, table_id: u64) -> Option<&Field>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Table {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.primary)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn table(&self, id: u64) -> Result<&Table, ModelError> {
        self.tables
            .iter()
            .find(|t| t.id == id)
            .ok_or(ModelError::TableNotFound(id))
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Resolves `table.field` style references used on the command line.
    pub fn find_field(&self, table: &str, field: &str) -> Result<&Field, ModelError> {
        self.table_by_name(table)
            .and_then(|t| t.field(field))
            .ok_or_else(|| ModelError::FieldNotFound(format!("{table}.{field}")))
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.tables.iter().flat_map(|t| t.fields.iter())
    }

    /// Replaces the stored copy of `field`, keeping its position.
    pub fn replace_field(&mut self, field: Field) -> Result<(), ModelError> {
        let slot = self
            .tables
            .iter_mut()
            .flat_map(|t| t.fields.iter_mut())
            .find(|f| f.id == field.id)
            .ok_or_else(|| ModelError::FieldNotFound(field.name.clone()))?;
        *slot = field;
        Ok(())
    }
}

impl FieldSource for Schema {
    fn field_by_name(&self, table_id: u64, name: &str) -> Option<&Field> {
        self.tables
            .iter()
            .find(|t| t.id == table_id)
            .and_then(|t| t.field(name))
    }

    fn field_by_id(&self, id: u64) -> Option<&Field> {
        self.fields().find(|f| f.id == id)
    }

    fn primary_field(&self, table_id: u64) -> Option<&Field> {
        self.table(table_id).ok().and_then(Table::primary_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, formula::FormulaOptions};

    fn schema() -> Schema {
        let mut table = Table::new(1, "tasks");
        let mut name = Field::new(10, 1, "Name", FieldKind::Text);
        name.primary = true;
        table.fields.push(name);
        table.fields.push(Field::new(
            11,
            1,
            "Upper",
            FieldKind::Formula(FormulaOptions::new("upper(field('Name'))")),
        ));
        Schema {
            tables: vec![table, Table::new(2, "people")],
        }
    }

    #[test]
    fn test_field_lookup() {
        let schema = schema();
        assert_eq!(schema.field_by_name(1, "Name").map(|f| f.id), Some(10));
        assert!(schema.field_by_name(2, "Name").is_none());
        assert_eq!(schema.field_by_id(11).map(|f| f.name.as_str()), Some("Upper"));
        assert_eq!(schema.table(3), Err(ModelError::TableNotFound(3)));
        assert_eq!(schema.primary_field(1).map(|f| f.id), Some(10));
        assert!(schema.primary_field(2).is_none());
        assert!(schema.primary_field(3).is_none());
    }

    #[test]
    fn test_find_field_reports_qualified_name() {
        let schema = schema();
        assert_eq!(
            schema.find_field("tasks", "Missing"),
            Err(ModelError::FieldNotFound("tasks.Missing".into()))
        );
    }

    #[test]
    fn test_replace_field() {
        let mut schema = schema();
        let mut field = schema.field_by_id(10).cloned().unwrap();
        field.name = "Title".into();
        schema.replace_field(field).unwrap();
        assert!(schema.field_by_name(1, "Title").is_some());
    }

    #[test]
    fn test_schema_from_json() {
        let schema = Schema::from_json(
            r#"{"tables": [{"id": 1, "name": "t", "fields": [
                {"id": 1, "table_id": 1, "name": "n", "type": "number", "decimal_places": 2}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(schema.fields().count(), 1);
    }
}
