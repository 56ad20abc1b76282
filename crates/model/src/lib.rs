pub mod core;
pub mod error;
pub mod field;
pub mod schema;

pub use error::ModelError;
