use crate::{
    context::FilterContext,
    error::FilterError,
    filter::{FilterInput, ViewFilterType},
    types,
};
use model::{
    field::{Field, FieldKind},
    schema::FieldSource,
};
use planner::{FilterBuilder, FilterType, Predicate, query::builder::filter::FilterPlan};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A filter as stored on a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub field_id: u64,
    #[serde(rename = "type")]
    pub filter_type: String,
    #[serde(default)]
    pub value: String,
}

impl ViewFilter {
    pub fn new(field_id: u64, filter_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_id,
            filter_type: filter_type.into(),
            value: value.into(),
        }
    }
}

/// Lookup table of filter types keyed by type name. Built once and only read
/// afterwards.
pub struct ViewFilterRegistry {
    types: Vec<Box<dyn ViewFilterType>>,
    index: HashMap<&'static str, usize>,
}

impl ViewFilterRegistry {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        for filter_type in types::builtin() {
            // Built-in type names are unique.
            let _ = registry.register_boxed(filter_type);
        }
        registry
    }

    pub fn register(
        &mut self,
        filter_type: impl ViewFilterType + 'static,
    ) -> Result<(), FilterError> {
        self.register_boxed(Box::new(filter_type))
    }

    fn register_boxed(&mut self, filter_type: Box<dyn ViewFilterType>) -> Result<(), FilterError> {
        let name = filter_type.type_name();
        if self.index.contains_key(name) {
            return Err(FilterError::AlreadyRegistered(name.to_string()));
        }
        self.index.insert(name, self.types.len());
        self.types.push(filter_type);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Result<&dyn ViewFilterType, FilterError> {
        let index = self
            .index
            .get(type_name)
            .ok_or_else(|| FilterError::UnknownFilterType(type_name.to_string()))?;
        Ok(self.types[*index].as_ref())
    }

    pub fn has(&self, type_name: &str) -> bool {
        self.index.contains_key(type_name)
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &dyn ViewFilterType> {
        self.types
            .iter()
            .map(|filter_type| &**filter_type as &dyn ViewFilterType)
    }

    /// Names of the filter types that accept `field`.
    pub fn compatible_types_for(&self, field: &Field) -> Vec<&'static str> {
        self.types()
            .filter(|t| t.is_compatible(field))
            .map(|t| t.type_name())
            .collect()
    }

    /// Compiles one filter on `field`. Only an unknown type or an
    /// incompatible field is an error; bad values degrade per type.
    pub fn compile(
        &self,
        type_name: &str,
        field: &Field,
        value: &str,
        context: &FilterContext,
    ) -> Result<Predicate, FilterError> {
        self.compile_with_related(type_name, field, None, value, context)
    }

    /// Like [`Self::compile`], resolving the related table of a link row
    /// field through `fields`.
    pub fn compile_in(
        &self,
        fields: &dyn FieldSource,
        type_name: &str,
        field: &Field,
        value: &str,
        context: &FilterContext,
    ) -> Result<Predicate, FilterError> {
        let related_primary = match &field.kind {
            FieldKind::LinkRow(options) => fields.primary_field(options.link_row_table_id),
            _ => None,
        };
        self.compile_with_related(type_name, field, related_primary, value, context)
    }

    fn compile_with_related(
        &self,
        type_name: &str,
        field: &Field,
        related_primary: Option<&Field>,
        value: &str,
        context: &FilterContext,
    ) -> Result<Predicate, FilterError> {
        let filter_type = self.get(type_name)?;
        if !filter_type.is_compatible(field) {
            return Err(FilterError::IncompatibleField {
                filter_type: type_name.to_string(),
                field: field.name.clone(),
                field_type: field
                    .formula_type_tag()
                    .map(|tag| format!("formula({tag})"))
                    .unwrap_or_else(|| field.type_name().to_string()),
            });
        }

        let field_name = field.db_column();
        let column = field.column();
        let predicate = filter_type.get_filter(&FilterInput {
            field_name: &field_name,
            value,
            column: &column,
            field,
            related_primary,
            context,
        });
        debug!(filter_type = type_name, field = %field.name, ?predicate, "Compiled view filter");
        Ok(predicate)
    }

    /// Compiles every filter of a view and combines them with `filter_type`.
    pub fn plan(
        &self,
        fields: &dyn FieldSource,
        filter_type: FilterType,
        filters: &[ViewFilter],
        context: &FilterContext,
    ) -> Result<FilterPlan, FilterError> {
        let mut builder = FilterBuilder::new(filter_type);
        for filter in filters {
            let field = fields
                .field_by_id(filter.field_id)
                .ok_or(FilterError::FieldNotFound(filter.field_id))?;
            builder.filter(self.compile_in(
                fields,
                &filter.filter_type,
                field,
                &filter.value,
                context,
            )?)?;
        }
        Ok(builder.build())
    }
}

impl Default for ViewFilterRegistry {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use model::{
        core::value::Value,
        field::{
            FieldKind,
            formula::{FormulaOptions, FormulaType},
            options::{DateOptions, LinkRowOptions, NumberOptions},
        },
        schema::{Schema, Table},
    };
    use planner::{Row, query::builder::filter::Selection};

    fn schema() -> Schema {
        let mut table = Table::new(1, "Projects");
        table.fields = vec![
            Field::new(1, 1, "Name", FieldKind::Text),
            Field::new(2, 1, "Budget", FieldKind::Number(NumberOptions::default())),
            Field::new(
                3,
                1,
                "Deadline",
                FieldKind::Date(DateOptions {
                    include_time: true,
                    ..Default::default()
                }),
            ),
        ];
        Schema {
            tables: vec![table],
        }
    }

    #[test]
    fn test_builtin_catalogue() {
        let registry = ViewFilterRegistry::with_builtin_types();
        for name in [
            "equal",
            "not_equal",
            "filename_contains",
            "has_file_type",
            "contains",
            "contains_not",
            "contains_word",
            "doesnt_contain_word",
            "length_is_lower_than",
            "higher_than",
            "lower_than",
            "date_equal",
            "date_not_equal",
            "date_before",
            "date_after",
            "date_equals_day_of_month",
            "date_equals_today",
            "date_before_today",
            "date_after_today",
            "date_equals_week",
            "date_equals_month",
            "date_equals_year",
            "date_equals_days_ago",
            "date_equals_months_ago",
            "date_equals_years_ago",
            "single_select_equal",
            "single_select_not_equal",
            "boolean",
            "link_row_has",
            "link_row_has_not",
            "link_row_contains",
            "link_row_not_contains",
            "multiple_select_has",
            "multiple_select_has_not",
            "multiple_collaborators_has",
            "multiple_collaborators_has_not",
            "empty",
            "not_empty",
        ] {
            assert!(registry.has(name), "{name}");
        }
        assert_eq!(registry.types().count(), 38);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = ViewFilterRegistry::with_builtin_types();
        assert_eq!(
            registry.register(types::text::EqualViewFilterType),
            Err(FilterError::AlreadyRegistered("equal".into()))
        );
    }

    #[test]
    fn test_unknown_and_incompatible() {
        let registry = ViewFilterRegistry::with_builtin_types();
        let context = FilterContext::default();
        let name = Field::new(1, 1, "Name", FieldKind::Text);

        assert_eq!(
            registry.compile("sounds_like", &name, "x", &context).err(),
            Some(FilterError::UnknownFilterType("sounds_like".into()))
        );
        assert!(matches!(
            registry.compile("higher_than", &name, "1", &context),
            Err(FilterError::IncompatibleField { .. })
        ));
    }

    #[test]
    fn test_compatible_types_for_formula() {
        let registry = ViewFilterRegistry::with_builtin_types();
        let mut options = FormulaOptions::new("1");
        options.formula_type = Some(FormulaType::Number { decimal_places: 0 });
        let field = Field::new(4, 1, "Total", FieldKind::Formula(options));

        let names = registry.compatible_types_for(&field);
        assert!(names.contains(&"higher_than"));
        assert!(names.contains(&"equal"));
        assert!(names.contains(&"empty"));
        assert!(!names.contains(&"contains_word"));
        assert!(!names.contains(&"date_equal"));
    }

    #[test]
    fn test_plan_for_view() {
        let registry = ViewFilterRegistry::with_builtin_types();
        let context = FilterContext::fixed(Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap());
        let filters = vec![
            ViewFilter::new(1, "contains", "alpha"),
            ViewFilter::new(2, "higher_than", "100.5"),
            ViewFilter::new(3, "date_equals_today", "Europe/Amsterdam"),
        ];
        let plan = registry
            .plan(&schema(), FilterType::And, &filters, &context)
            .unwrap();
        assert_eq!(plan.annotations.len(), 1);

        let row = |name: &str, budget: i64, day: u32| -> Row {
            Row::from([
                ("field_1".to_string(), Value::String(name.into())),
                ("field_2".to_string(), Value::Int(budget)),
                (
                    "field_3".to_string(),
                    Value::Timestamp(Utc.with_ymd_and_hms(2023, 5, day, 9, 0, 0).unwrap()),
                ),
            ])
        };
        let rows = vec![
            row("Project Alpha", 200, 1),
            row("Project Alpha", 100, 1),
            row("Project Beta", 200, 1),
            row("Project Alpha", 200, 2),
        ];
        let kept = plan.apply(&rows).unwrap();
        assert_eq!(kept, vec![&rows[0]]);
    }

    #[test]
    fn test_plan_with_invalid_value_matches_nothing() {
        let registry = ViewFilterRegistry::with_builtin_types();
        let filters = vec![
            ViewFilter::new(1, "contains", "alpha"),
            ViewFilter::new(2, "equal", "lots"),
        ];
        let plan = registry
            .plan(&schema(), FilterType::And, &filters, &FilterContext::default())
            .unwrap();
        assert_eq!(plan.selection, Selection::Nothing);

        let missing = vec![ViewFilter::new(99, "empty", "")];
        assert_eq!(
            registry
                .plan(&schema(), FilterType::And, &missing, &FilterContext::default())
                .err(),
            Some(FilterError::FieldNotFound(99))
        );
    }

    #[test]
    fn test_empty_filter_is_inert_in_or_views() {
        let registry = ViewFilterRegistry::with_builtin_types();
        let filters = vec![
            ViewFilter::new(1, "equal", "alpha"),
            ViewFilter::new(1, "contains", ""),
        ];
        let plan = registry
            .plan(&schema(), FilterType::Or, &filters, &FilterContext::default())
            .unwrap();

        let rows: Vec<Row> = ["alpha", "beta"]
            .into_iter()
            .map(|name| Row::from([("field_1".to_string(), Value::String(name.into()))]))
            .collect();
        assert_eq!(plan.apply(&rows).unwrap(), vec![&rows[0]]);

        let filters = vec![
            ViewFilter::new(1, "equal", "alpha"),
            ViewFilter::new(2, "not_equal", "lots"),
        ];
        let plan = registry
            .plan(&schema(), FilterType::Or, &filters, &FilterContext::default())
            .unwrap();
        assert!(matches!(plan.selection, Selection::Where(_)));
    }

    #[test]
    fn test_link_row_contains_reads_related_primary_field() {
        let registry = ViewFilterRegistry::with_builtin_types();
        let mut schema = schema();
        schema.tables[0].fields[0].primary = true;
        schema.tables[0].fields.push(Field::new(
            4,
            1,
            "Parent",
            FieldKind::LinkRow(LinkRowOptions {
                link_row_table_id: 1,
            }),
        ));

        let filters = vec![ViewFilter::new(4, "link_row_contains", "alp")];
        let plan = registry
            .plan(&schema, FilterType::And, &filters, &FilterContext::default())
            .unwrap();
        assert_eq!(plan.annotations[0].name, "field_4__field_1_array");

        let rows: Vec<Row> = [vec!["Alpha"], vec!["Beta"], vec![]]
            .into_iter()
            .map(|parents| {
                Row::from([(
                    "field_4__field_1".to_string(),
                    Value::StringArray(parents.into_iter().map(String::from).collect()),
                )])
            })
            .collect();
        assert_eq!(plan.apply(&rows).unwrap(), vec![&rows[0]]);

        let filters = vec![ViewFilter::new(4, "link_row_not_contains", "alp")];
        let plan = registry
            .plan(&schema, FilterType::And, &filters, &FilterContext::default())
            .unwrap();
        assert_eq!(plan.apply(&rows).unwrap(), vec![&rows[1], &rows[2]]);

        // Without a schema there is no related primary field to search.
        let parent = schema.field_by_id(4).unwrap();
        assert_eq!(
            registry.compile("link_row_contains", parent, "alp", &FilterContext::default()),
            Ok(Predicate::MatchNone)
        );
    }

    #[test]
    fn test_view_filter_deserializes() {
        let filter: ViewFilter =
            serde_json::from_str(r#"{"field_id": 3, "type": "date_equal", "value": "2023-05-01"}"#)
                .unwrap();
        assert_eq!(filter, ViewFilter::new(3, "date_equal", "2023-05-01"));
    }
}
