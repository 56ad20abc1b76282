use crate::{
    filter::{Compatibility, Compiled, FilterInput, ViewFilterType, trimmed},
    queries::overlaps,
};

/// Keeps rows related to the id in the value. The related ids are
/// aggregated into `<column>_array`, so several of these filters on one
/// field share a single aggregation.
pub struct ManyToManyHasViewFilterType {
    type_name: &'static str,
    compatible: &'static [Compatibility],
}

impl ManyToManyHasViewFilterType {
    pub fn link_row() -> Self {
        Self {
            type_name: "link_row_has",
            compatible: &[Compatibility::Field("link_row")],
        }
    }

    pub fn multiple_select() -> Self {
        Self {
            type_name: "multiple_select_has",
            compatible: &[Compatibility::Field("multiple_select")],
        }
    }

    pub fn multiple_collaborators() -> Self {
        Self {
            type_name: "multiple_collaborators_has",
            compatible: &[Compatibility::Field("multiple_collaborators")],
        }
    }
}

impl ViewFilterType for ManyToManyHasViewFilterType {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        self.compatible
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let Some(raw) = trimmed(input) else {
            return Compiled::NoFilter;
        };

        match raw.parse::<i64>() {
            Ok(id) => overlaps(input.field_name, vec![id]),
            Err(err) => Compiled::invalid(format!("`{raw}` is not a row id: {err}")),
        }
    }
}
