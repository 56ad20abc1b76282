use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Column `{column}` of type {data_type} does not accept value '{value}'")]
    InvalidValue {
        column: String,
        data_type: String,
        value: String,
    },

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(u64),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}
