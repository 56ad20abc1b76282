use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Formula nesting exceeds the limit of {limit} levels")]
    TooDeep { limit: usize },
}

impl BuildError {
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        BuildError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}
