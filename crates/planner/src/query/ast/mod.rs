pub mod expr;
pub mod predicate;
