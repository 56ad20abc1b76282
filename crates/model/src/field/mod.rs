use crate::core::{column::Column, data_type::DataType};
use formula::{FormulaOptions, FormulaType};
use options::{DateOptions, LinkRowOptions, NumberOptions, RatingOptions, SelectOptions};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub mod formula;
pub mod options;

/// A typed column definition within a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: u64,
    pub table_id: u64,
    pub name: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(flatten)]
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Url,
    Email,
    PhoneNumber,
    Number(NumberOptions),
    Rating(RatingOptions),
    Boolean,
    Date(DateOptions),
    LastModified(DateOptions),
    CreatedOn(DateOptions),
    File,
    SingleSelect(SelectOptions),
    MultipleSelect(SelectOptions),
    LinkRow(LinkRowOptions),
    MultipleCollaborators,
    Formula(FormulaOptions),
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::LongText => "long_text",
            FieldKind::Url => "url",
            FieldKind::Email => "email",
            FieldKind::PhoneNumber => "phone_number",
            FieldKind::Number(_) => "number",
            FieldKind::Rating(_) => "rating",
            FieldKind::Boolean => "boolean",
            FieldKind::Date(_) => "date",
            FieldKind::LastModified(_) => "last_modified",
            FieldKind::CreatedOn(_) => "created_on",
            FieldKind::File => "file",
            FieldKind::SingleSelect(_) => "single_select",
            FieldKind::MultipleSelect(_) => "multiple_select",
            FieldKind::LinkRow(_) => "link_row",
            FieldKind::MultipleCollaborators => "multiple_collaborators",
            FieldKind::Formula(_) => "formula",
        }
    }

    pub fn date_options(&self) -> Option<&DateOptions> {
        match self {
            FieldKind::Date(options)
            | FieldKind::LastModified(options)
            | FieldKind::CreatedOn(options) => Some(options),
            FieldKind::Formula(FormulaOptions {
                formula_type: Some(FormulaType::Date(options)),
                ..
            }) => Some(options),
            _ => None,
        }
    }

    /// The kind whose filtering and storage semantics apply to this field. A
    /// formula behaves like the plain field type of its resolved formula type;
    /// every other kind is returned unchanged.
    pub fn resolved(&self) -> Cow<'_, FieldKind> {
        let FieldKind::Formula(options) = self else {
            return Cow::Borrowed(self);
        };

        match &options.formula_type {
            Some(FormulaType::Text | FormulaType::Char) => Cow::Owned(FieldKind::Text),
            Some(FormulaType::Number { decimal_places }) => {
                Cow::Owned(FieldKind::Number(NumberOptions {
                    decimal_places: *decimal_places,
                    negative: true,
                }))
            }
            Some(FormulaType::Boolean) => Cow::Owned(FieldKind::Boolean),
            Some(FormulaType::Date(date)) => Cow::Owned(FieldKind::Date(date.clone())),
            Some(FormulaType::Invalid { .. }) | None => Cow::Borrowed(self),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self.resolved().as_ref() {
            FieldKind::Text
            | FieldKind::LongText
            | FieldKind::Url
            | FieldKind::Email
            | FieldKind::PhoneNumber => DataType::String,
            FieldKind::Number(options) if options.decimal_places == 0 => DataType::Long,
            FieldKind::Number(_) => DataType::Decimal,
            FieldKind::Rating(_) => DataType::Short,
            FieldKind::Boolean => DataType::Boolean,
            FieldKind::Date(options)
            | FieldKind::LastModified(options)
            | FieldKind::CreatedOn(options) => {
                if options.include_time {
                    DataType::Timestamp
                } else {
                    DataType::Date
                }
            }
            FieldKind::File => DataType::Json,
            FieldKind::SingleSelect(_) => DataType::Int,
            FieldKind::MultipleSelect(_)
            | FieldKind::LinkRow(_)
            | FieldKind::MultipleCollaborators => DataType::IntArray,
            FieldKind::Formula(_) => DataType::String,
        }
    }
}

impl Field {
    pub fn new(id: u64, table_id: u64, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id,
            table_id,
            name: name.into(),
            primary: false,
            kind,
        }
    }

    pub fn db_column(&self) -> String {
        format!("field_{}", self.id)
    }

    /// Storage column descriptor backing this field.
    pub fn column(&self) -> Column {
        Column::new(self.db_column(), self.kind.data_type())
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Tag of the resolved formula type, `None` for non-formula fields or
    /// formulas that were never typed.
    pub fn formula_type_tag(&self) -> Option<&'static str> {
        match &self.kind {
            FieldKind::Formula(options) => options.formula_type.as_ref().map(FormulaType::tag),
            _ => None,
        }
    }

    pub fn formula_options(&self) -> Option<&FormulaOptions> {
        match &self.kind {
            FieldKind::Formula(options) => Some(options),
            _ => None,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.kind, FieldKind::Formula(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_deserializes_flattened_kind() {
        let field: Field = serde_json::from_str(
            r#"{"id": 3, "table_id": 1, "name": "Due", "type": "date", "include_time": true,
                "force_timezone": "Europe/Rome"}"#,
        )
        .unwrap();

        assert_eq!(field.db_column(), "field_3");
        assert_eq!(field.type_name(), "date");
        let options = field.kind.date_options().unwrap();
        assert!(options.include_time);
        assert_eq!(options.force_timezone.as_deref(), Some("Europe/Rome"));
        assert_eq!(field.column().data_type, DataType::Timestamp);
    }

    #[test]
    fn test_formula_resolves_to_plain_kind() {
        let mut options = FormulaOptions::new("1 + 1");
        options.formula_type = Some(FormulaType::Number { decimal_places: 2 });
        let field = Field::new(9, 1, "Total", FieldKind::Formula(options));

        assert_eq!(field.formula_type_tag(), Some("number"));
        assert_eq!(field.column().data_type, DataType::Decimal);
        assert!(matches!(
            field.kind.resolved().as_ref(),
            FieldKind::Number(NumberOptions {
                decimal_places: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_untyped_formula_stays_formula() {
        let field = Field::new(2, 1, "F", FieldKind::Formula(FormulaOptions::new("'a'")));
        assert_eq!(field.formula_type_tag(), None);
        assert!(matches!(field.kind.resolved().as_ref(), FieldKind::Formula(_)));
    }

    #[test]
    fn test_number_columns() {
        let integer = Field::new(1, 1, "n", FieldKind::Number(NumberOptions::default()));
        assert_eq!(integer.column().data_type, DataType::Long);
        let rating = Field::new(2, 1, "r", FieldKind::Rating(RatingOptions::default()));
        assert!(rating.column().data_type.is_integer());
    }
}
