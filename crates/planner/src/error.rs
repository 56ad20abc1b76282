use model::ModelError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
    #[error("Annotation `{0}` is already defined with a different expression")]
    DuplicateAnnotation(String),

    #[error("Unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("Unknown function `{0}`")]
    UnknownFunction(String),

    #[error("Invalid regular expression `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}
