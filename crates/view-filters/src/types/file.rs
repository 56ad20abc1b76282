//! Filters over the JSON list of files stored by file fields.

use crate::{
    filter::{Compatibility, Compiled, FilterInput, ViewFilterType, trimmed},
    queries::escape_like,
};
use model::core::value::Value;
use planner::{BinaryOperator, Expr, query::value};

const FILE: &[Compatibility] = &[Compatibility::Field("file")];

fn any_file(input: &FilterInput<'_>, key: &str, op: BinaryOperator, expected: Value) -> Compiled {
    Compiled::condition(Expr::JsonArrayAny {
        array: Box::new(input.column_expr()),
        key: key.to_string(),
        op,
        value: Box::new(value(expected)),
    })
}

/// At least one file whose visible name contains the value.
pub struct FilenameContainsViewFilterType;

impl ViewFilterType for FilenameContainsViewFilterType {
    fn type_name(&self) -> &'static str {
        "filename_contains"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        FILE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        match trimmed(input) {
            Some(needle) => any_file(
                input,
                "visible_name",
                BinaryOperator::ILike,
                Value::String(format!("%{}%", escape_like(needle))),
            ),
            None => Compiled::NoFilter,
        }
    }
}

/// `image` keeps rows with at least one image, `document` rows with at least
/// one file that is not an image. Other values do not filter.
pub struct HasFileTypeViewFilterType;

impl ViewFilterType for HasFileTypeViewFilterType {
    fn type_name(&self) -> &'static str {
        "has_file_type"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        FILE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let is_image = match input.value.trim() {
            "image" => true,
            "document" => false,
            _ => return Compiled::NoFilter,
        };
        any_file(input, "is_image", BinaryOperator::Eq, Value::Boolean(is_image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::FilterContext,
        types::testing::{compile, matching, rows},
    };
    use model::field::{Field, FieldKind};
    use planner::Predicate;
    use serde_json::json;

    fn attachments() -> Field {
        Field::new(12, 1, "Attachments", FieldKind::File)
    }

    fn data() -> Vec<planner::Row> {
        rows(
            "field_12",
            [
                Value::Json(json!([{"visible_name": "Invoice_2023.pdf", "is_image": false}])),
                Value::Json(json!([{"visible_name": "cat.png", "is_image": true}])),
                Value::Json(json!([])),
                Value::Null,
            ],
        )
    }

    #[test]
    fn test_filename_contains() {
        let context = FilterContext::default();
        let predicate = compile(&FilenameContainsViewFilterType, &attachments(), "invoice_", &context);
        assert_eq!(matching(&predicate, &data()), vec![0]);
    }

    #[test]
    fn test_has_file_type() {
        let context = FilterContext::default();
        let images = compile(&HasFileTypeViewFilterType, &attachments(), "image", &context);
        assert_eq!(matching(&images, &data()), vec![1]);

        let documents = compile(&HasFileTypeViewFilterType, &attachments(), "document", &context);
        assert_eq!(matching(&documents, &data()), vec![0]);

        assert_eq!(
            compile(&HasFileTypeViewFilterType, &attachments(), "video", &context),
            Predicate::MatchAll
        );
    }
}
