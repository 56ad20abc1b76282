//! Predicate fragments produced by view filters.

use crate::query::ast::expr::Expr;

/// A named computed column a condition may refer to by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub expr: Expr,
}

impl Annotation {
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Annotation {
            name: name.into(),
            expr,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Keeps every row.
    MatchAll,
    /// Keeps no row.
    MatchNone,
    Condition {
        condition: Expr,
        annotation: Option<Annotation>,
    },
}

impl Predicate {
    pub fn condition(condition: Expr) -> Self {
        Predicate::Condition {
            condition,
            annotation: None,
        }
    }

    pub fn annotated(condition: Expr, annotation: Annotation) -> Self {
        Predicate::Condition {
            condition,
            annotation: Some(annotation),
        }
    }

    /// Logical complement. The annotation travels with the inverted
    /// condition.
    pub fn negate(self) -> Self {
        match self {
            Predicate::MatchAll => Predicate::MatchNone,
            Predicate::MatchNone => Predicate::MatchAll,
            Predicate::Condition {
                condition,
                annotation,
            } => Predicate::Condition {
                condition: condition.negate(),
                annotation,
            },
        }
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Predicate::Condition { annotation, .. } => annotation.as_ref(),
            _ => None,
        }
    }
}
