use formula_syntax::BuildError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormulaError {
    #[error("Formula is too large or references itself (maximum depth {max_depth})")]
    MaximumFormulaSize { max_depth: usize },

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Function {function} expects {expected} arguments, got {actual}")]
    InvalidArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Field `{0}` is not a formula field")]
    NotAFormula(String),

    #[error(transparent)]
    Syntax(BuildError),

    #[error("Invalid formula: {0}")]
    InvalidFormula(String),
}

impl From<BuildError> for FormulaError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::TooDeep { limit } => FormulaError::MaximumFormulaSize { max_depth: limit },
            other => FormulaError::Syntax(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_limit_maps_to_maximum_size() {
        assert_eq!(
            FormulaError::from(BuildError::TooDeep { limit: 8 }),
            FormulaError::MaximumFormulaSize { max_depth: 8 }
        );
        assert!(matches!(
            FormulaError::from(BuildError::syntax("bad", 1, 2)),
            FormulaError::Syntax(_)
        ));
    }
}
