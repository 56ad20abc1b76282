//! The contract every view filter type implements.

use crate::context::FilterContext;
use model::{
    core::column::Column,
    field::{Field, FieldKind},
};
use planner::{Annotation, Expr, Predicate};
use serde::Serialize;
use std::{borrow::Cow, fmt};
use tracing::debug;

/// What a filter degrades to when its value is present but unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OnInvalid {
    MatchAll,
    MatchNone,
}

impl OnInvalid {
    pub fn predicate(self) -> Predicate {
        match self {
            OnInvalid::MatchAll => Predicate::MatchAll,
            OnInvalid::MatchNone => Predicate::MatchNone,
        }
    }
}

/// Outcome of compiling a single filter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    /// The value expresses no preference, every row is kept.
    NoFilter,
    /// The value is present but unusable; resolved through [`OnInvalid`].
    Invalid(String),
    Fragment(Predicate),
}

impl Compiled {
    pub fn condition(condition: Expr) -> Self {
        Compiled::Fragment(Predicate::condition(condition))
    }

    pub fn annotated(condition: Expr, annotation: Annotation) -> Self {
        Compiled::Fragment(Predicate::annotated(condition, annotation))
    }

    pub fn invalid(reason: impl fmt::Display) -> Self {
        Compiled::Invalid(reason.to_string())
    }

    fn negate(self) -> Self {
        match self {
            Compiled::Fragment(predicate) => Compiled::Fragment(predicate.negate()),
            other => other,
        }
    }
}

/// A field type a filter type accepts. Formula fields are accepted by the
/// tag of their resolved formula type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Field(&'static str),
    Formula(&'static [&'static str]),
}

impl Compatibility {
    pub fn accepts(&self, field: &Field) -> bool {
        match self {
            Compatibility::Field(type_name) => !field.is_formula() && field.type_name() == *type_name,
            Compatibility::Formula(types) => field
                .formula_type_tag()
                .is_some_and(|tag| types.contains(&tag)),
        }
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compatibility::Field(type_name) => f.write_str(type_name),
            Compatibility::Formula(types) => write!(f, "formula({})", types.join(", ")),
        }
    }
}

/// Everything a filter type sees when compiling one filter.
#[derive(Debug, Clone, Copy)]
pub struct FilterInput<'a> {
    /// Column (or annotation) name the condition refers to.
    pub field_name: &'a str,
    /// Raw value as the user entered it.
    pub value: &'a str,
    pub column: &'a Column,
    pub field: &'a Field,
    /// Primary field of the table a link row field points at, when known.
    pub related_primary: Option<&'a Field>,
    pub context: &'a FilterContext,
}

impl<'a> FilterInput<'a> {
    pub fn kind(&self) -> Cow<'a, FieldKind> {
        self.field.kind.resolved()
    }

    pub fn column_expr(&self) -> Expr {
        planner::query::ident(self.field_name)
    }
}

pub trait ViewFilterType: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn compatible_field_types(&self) -> &'static [Compatibility];

    fn on_invalid(&self) -> OnInvalid {
        OnInvalid::MatchNone
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled;

    fn is_compatible(&self, field: &Field) -> bool {
        self.compatible_field_types()
            .iter()
            .any(|compatibility| compatibility.accepts(field))
    }

    /// Compiles `input` into a predicate fragment. Never fails: an empty value
    /// keeps every row and an invalid one follows [`Self::on_invalid`].
    fn get_filter(&self, input: &FilterInput<'_>) -> Predicate {
        match self.compile(input) {
            Compiled::NoFilter => Predicate::MatchAll,
            Compiled::Invalid(reason) => {
                let policy = self.on_invalid();
                debug!(
                    filter_type = self.type_name(),
                    field = input.field_name,
                    value = input.value,
                    ?policy,
                    "Invalid filter value: {reason}"
                );
                policy.predicate()
            }
            Compiled::Fragment(predicate) => predicate,
        }
    }
}

/// The negated variant of a filter type. Fragments are inverted, an empty
/// value still keeps every row and an invalid value keeps every row.
pub struct Not<T> {
    type_name: &'static str,
    inner: T,
}

impl<T: ViewFilterType> Not<T> {
    pub fn new(type_name: &'static str, inner: T) -> Self {
        Self { type_name, inner }
    }
}

impl<T: ViewFilterType> ViewFilterType for Not<T> {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        self.inner.compatible_field_types()
    }

    fn on_invalid(&self) -> OnInvalid {
        OnInvalid::MatchAll
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        self.inner.compile(input).negate()
    }
}

/// Trims the raw value, yielding `None` when nothing is left.
pub(crate) fn trimmed<'a>(input: &FilterInput<'a>) -> Option<&'a str> {
    let value = input.value.trim();
    (!value.is_empty()).then_some(value)
}
