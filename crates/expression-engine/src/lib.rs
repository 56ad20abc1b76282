pub mod cache;
pub mod error;
pub mod functions;
pub mod typer;
pub mod types;

pub use cache::FieldLookupCache;
pub use error::{FormulaError, Result};
pub use functions::FunctionRegistry;
pub use typer::{DEFAULT_MAX_DEPTH, FormulaTyper, calculate_typed_expression};
pub use types::{TypedExpression, TypedKind};
