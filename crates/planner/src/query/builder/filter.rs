//! Combines view filter predicates into a single filter plan.

use crate::{
    error::PlannerError,
    query::ast::{
        expr::{BinaryOperator, Expr},
        predicate::{Annotation, Predicate},
    },
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the filters of a view are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterType {
    #[default]
    And,
    Or,
}

impl FilterType {
    fn operator(&self) -> BinaryOperator {
        match self {
            FilterType::And => BinaryOperator::And,
            FilterType::Or => BinaryOperator::Or,
        }
    }
}

/// Which rows a combined filter keeps.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    Nothing,
    Where(Expr),
}

/// The annotations to compute plus the final row selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPlan {
    pub annotations: Vec<Annotation>,
    pub selection: Selection,
}

#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    filter_type: FilterType,
    annotations: Vec<Annotation>,
    conditions: Vec<Expr>,
    saw_match_none: bool,
}

impl FilterBuilder {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            filter_type,
            ..Default::default()
        }
    }

    /// Adds a predicate. `MatchAll` is the identity of both combinators and
    /// leaves the builder untouched. An annotation whose name is already
    /// registered is skipped when the expressions are identical and rejected
    /// otherwise.
    pub fn filter(&mut self, predicate: Predicate) -> Result<&mut Self, PlannerError> {
        match predicate {
            Predicate::MatchAll => {}
            Predicate::MatchNone => self.saw_match_none = true,
            Predicate::Condition {
                condition,
                annotation,
            } => {
                if let Some(annotation) = annotation {
                    self.annotate(annotation)?;
                }
                self.conditions.push(condition);
            }
        }
        Ok(self)
    }

    fn annotate(&mut self, annotation: Annotation) -> Result<(), PlannerError> {
        match self.annotations.iter().find(|a| a.name == annotation.name) {
            Some(existing) if existing.expr == annotation.expr => {
                debug!(name = %annotation.name, "Reusing identical annotation");
                Ok(())
            }
            Some(_) => Err(PlannerError::DuplicateAnnotation(annotation.name)),
            None => {
                self.annotations.push(annotation);
                Ok(())
            }
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn build(self) -> FilterPlan {
        let operator = self.filter_type.operator();
        let selection = match (self.filter_type, Expr::join_all(self.conditions, operator)) {
            (FilterType::And, _) if self.saw_match_none => Selection::Nothing,
            (_, Some(condition)) => Selection::Where(condition),
            (FilterType::Or, None) if self.saw_match_none => Selection::Nothing,
            (_, None) => Selection::All,
        };

        FilterPlan {
            annotations: self.annotations,
            selection,
        }
    }
}
