pub mod context;
pub mod error;
pub mod filter;
pub mod queries;
pub mod registry;
pub mod timezone;
pub mod types;

pub use context::{Clock, FilterContext, FixedClock, SystemClock};
pub use error::FilterError;
pub use filter::{Compatibility, Compiled, FilterInput, Not, OnInvalid, ViewFilterType};
pub use registry::{ViewFilter, ViewFilterRegistry};
