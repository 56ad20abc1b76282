use crate::query::{
    builder::filter::{FilterPlan, Selection},
    dialect::Dialect,
    renderer::{Render, Renderer},
};
use model::core::value::Value;
use serde::Serialize;

/// SQL text of a filter plan. Placeholders are numbered across the
/// annotations first and the `WHERE` condition after them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFilter {
    pub annotations: Vec<(String, String)>,
    pub where_clause: String,
    pub params: Vec<Value>,
}

impl Render for Selection {
    fn render(&self, r: &mut Renderer) {
        match self {
            Selection::All => r.sql.push_str("TRUE"),
            Selection::Nothing => r.sql.push_str("FALSE"),
            Selection::Where(condition) => condition.render(r),
        }
    }
}

impl FilterPlan {
    pub fn render(&self, dialect: &dyn Dialect) -> RenderedFilter {
        let mut r = Renderer::new(dialect);

        let mut annotations = Vec::with_capacity(self.annotations.len());
        for annotation in &self.annotations {
            annotation.expr.render(&mut r);
            annotations.push((annotation.name.clone(), r.take_sql()));
        }

        self.selection.render(&mut r);
        let (where_clause, params) = r.finish();

        RenderedFilter {
            annotations,
            where_clause,
            params,
        }
    }

    /// Full query over `table`, exposing the annotations to the `WHERE`
    /// clause through a derived table.
    pub fn render_select(&self, table: &str, dialect: &dyn Dialect) -> (String, Vec<Value>) {
        let rendered = self.render(dialect);
        let table = dialect.quote_identifier(table);

        let inner = if rendered.annotations.is_empty() {
            format!("SELECT * FROM {table}")
        } else {
            let columns = rendered
                .annotations
                .iter()
                .map(|(name, sql)| format!("{sql} AS {}", dialect.quote_identifier(name)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("SELECT *, {columns} FROM {table}")
        };

        let sql = format!(
            "SELECT * FROM ({inner}) AS {} WHERE {}",
            dialect.quote_identifier("filtered"),
            rendered.where_clause
        );
        (sql, rendered.params)
    }
}
