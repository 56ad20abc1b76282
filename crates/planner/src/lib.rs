pub mod error;
pub mod eval;
pub mod query;

pub use error::PlannerError;
pub use eval::{Evaluator, Row};
pub use query::{
    ast::{
        expr::{BinaryOperator, DatePart, Expr, Ident},
        predicate::{Annotation, Predicate},
    },
    builder::filter::{FilterBuilder, FilterType},
};
