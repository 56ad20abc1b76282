//! Turns filter expressions into parameterised SQL.

use crate::query::dialect::Dialect;
use model::core::value::Value;

pub mod expr;
pub mod filter;

pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// SQL buffer plus the values bound to its placeholders. Every value is
/// sent as a parameter, never inlined into the text.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    pub fn push_param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.get_placeholder(self.params.len() - 1);
        self.sql.push_str(&placeholder);
    }

    pub fn push_identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Takes the SQL written so far. Parameters stay, so placeholders keep
    /// counting across annotations and the `WHERE` condition.
    pub fn take_sql(&mut self) -> String {
        std::mem::take(&mut self.sql)
    }
}
