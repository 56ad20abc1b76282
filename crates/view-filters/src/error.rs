use planner::PlannerError;
use thiserror::Error;

/// Errors caused by the caller rather than by the filter value, which never
/// fails compilation.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Unknown view filter type: {0}")]
    UnknownFilterType(String),

    #[error("Filter type `{filter_type}` is not compatible with field `{field}` of type {field_type}")]
    IncompatibleField {
        filter_type: String,
        field: String,
        field_type: String,
    },

    #[error("Field with id {0} not found")]
    FieldNotFound(u64),

    #[error("Filter type `{0}` is already registered")]
    AlreadyRegistered(String),

    #[error(transparent)]
    Planner(#[from] PlannerError),
}
