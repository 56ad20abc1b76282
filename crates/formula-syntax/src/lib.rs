pub mod ast;
pub mod builder;
pub mod errors;
pub mod parser;

pub use builder::{MAX_NESTING_DEPTH, parse, parse_with_limit};
pub use errors::BuildError;
