use crate::{
    filter::{Compatibility, Compiled, FilterInput, ViewFilterType},
    queries::empty_query,
};

use Compatibility::{Field, Formula};

/// Emptiness as the field type defines it. The value is ignored.
pub struct EmptyViewFilterType;

impl ViewFilterType for EmptyViewFilterType {
    fn type_name(&self) -> &'static str {
        "empty"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        &[
            Field("text"),
            Field("long_text"),
            Field("url"),
            Field("number"),
            Field("rating"),
            Field("boolean"),
            Field("date"),
            Field("last_modified"),
            Field("created_on"),
            Field("link_row"),
            Field("email"),
            Field("file"),
            Field("single_select"),
            Field("phone_number"),
            Field("multiple_select"),
            Field("multiple_collaborators"),
            Formula(&["text", "char", "number", "date", "boolean"]),
        ]
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        Compiled::Fragment(empty_query(input.field_name, &input.kind()))
    }
}
