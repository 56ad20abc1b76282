use model::{
    field::{Field, formula::FormulaType},
    schema::FieldSource,
};
use std::collections::HashMap;

/// Memoizes field lookups and typed formula fields for one typing pass. A new
/// cache must be created for every pass; entries go stale when fields change.
pub struct FieldLookupCache<'s> {
    source: &'s dyn FieldSource,
    by_name: HashMap<(u64, String), Option<&'s Field>>,
    by_id: HashMap<u64, Option<&'s Field>>,
    typed: HashMap<u64, FormulaType>,
}

impl<'s> FieldLookupCache<'s> {
    pub fn new(source: &'s dyn FieldSource) -> Self {
        Self {
            source,
            by_name: HashMap::new(),
            by_id: HashMap::new(),
            typed: HashMap::new(),
        }
    }

    pub fn field_by_name(&mut self, table_id: u64, name: &str) -> Option<&'s Field> {
        let source = self.source;
        *self
            .by_name
            .entry((table_id, name.to_string()))
            .or_insert_with(|| source.field_by_name(table_id, name))
    }

    pub fn field_by_id(&mut self, id: u64) -> Option<&'s Field> {
        let source = self.source;
        *self
            .by_id
            .entry(id)
            .or_insert_with(|| source.field_by_id(id))
    }

    /// Formula type of a formula field already typed in this pass.
    pub fn typed_formula(&self, field_id: u64) -> Option<&FormulaType> {
        self.typed.get(&field_id)
    }

    pub(crate) fn store_typed_formula(&mut self, field_id: u64, formula_type: FormulaType) {
        self.typed.insert(field_id, formula_type);
    }

    /// Number of distinct lookups made against the source.
    pub fn lookups(&self) -> usize {
        self.by_name.len() + self.by_id.len()
    }
}
