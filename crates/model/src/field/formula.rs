use crate::field::options::{DateFormat, DateOptions, TimeFormat};
use formula_syntax::ast::expr::Expression;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved type of a formula expression, including the formatting options
/// that travel with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaType {
    Text,
    Char,
    Number { decimal_places: u32 },
    Boolean,
    Date(DateOptions),
    Invalid { error: String },
}

impl FormulaType {
    pub fn invalid(error: impl Into<String>) -> Self {
        FormulaType::Invalid {
            error: error.into(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            FormulaType::Text => "text",
            FormulaType::Char => "char",
            FormulaType::Number { .. } => "number",
            FormulaType::Boolean => "boolean",
            FormulaType::Date(_) => "date",
            FormulaType::Invalid { .. } => "invalid",
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FormulaType::Invalid { .. })
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, FormulaType::Text | FormulaType::Char)
    }

    /// Whether two types belong to the same family and can be compared or
    /// used as alternative branches.
    pub fn same_kind(&self, other: &FormulaType) -> bool {
        match (self, other) {
            (a, b) if a.is_textual() && b.is_textual() => true,
            (FormulaType::Number { .. }, FormulaType::Number { .. })
            | (FormulaType::Boolean, FormulaType::Boolean)
            | (FormulaType::Date(_), FormulaType::Date(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaType::Number { decimal_places } => write!(f, "number({decimal_places})"),
            FormulaType::Date(options) if options.include_time => write!(f, "date(with time)"),
            FormulaType::Invalid { error } => write!(f, "invalid({error})"),
            other => write!(f, "{}", other.tag()),
        }
    }
}

/// Options stored on a formula field. The `formula_*` overrides are the
/// formatting choices the user made explicitly; `None` means "use whatever
/// the expression calculates".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaOptions {
    pub formula: String,
    pub number_decimal_places: Option<u32>,
    pub date_include_time: Option<bool>,
    pub date_format: Option<DateFormat>,
    pub date_time_format: Option<TimeFormat>,
    pub date_force_timezone: Option<String>,
    pub date_show_tzinfo: Option<bool>,
    pub formula_type: Option<FormulaType>,
    #[serde(skip)]
    pub cached_untyped_expression: Option<Expression>,
}

impl FormulaOptions {
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            ..Default::default()
        }
    }
}
