//! Database specific pieces of the rendered SQL.

use model::core::data_type::DataType;

pub trait Dialect: Send + Sync {
    /// Quotes a column or annotation name, doubling embedded quotes.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Placeholder of the zero-based parameter `index`.
    fn get_placeholder(&self, index: usize) -> String;

    /// Type name used in `CAST(.. AS ..)`.
    fn render_data_type(&self, data_type: &DataType) -> String;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn get_placeholder(&self, index: usize) -> String {
        format!("${}", index + 1)
    }

    fn render_data_type(&self, data_type: &DataType) -> String {
        data_type.postgres_name().into_owned()
    }
}
