//! Defines the AST for SQL expressions used by view filters.

use model::core::{data_type::DataType, value::Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or annotation identifier, e.g., `field_7` or `t.field_7`.
    Identifier(Ident),

    /// A literal value, rendered as a bound parameter.
    Value(Value),

    /// A binary operation, e.g., `field_7 = 'value'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// Logical negation, `NOT expr`.
    Not(Box<Expr>),

    /// `expr IS NULL` / `expr IS NOT NULL`.
    IsNull { expr: Box<Expr>, negated: bool },

    /// A function call, e.g., `LENGTH(field_1)` or `COUNT(*)`.
    FunctionCall(FunctionCall),

    /// `CAST(expr AS type)`
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },

    /// `expr AT TIME ZONE 'tz'`, converting an instant into local wall time.
    AtTimeZone { expr: Box<Expr>, timezone: String },

    /// `EXTRACT(part FROM expr)`
    Extract { part: DatePart, expr: Box<Expr> },

    /// `ARRAY[a, b, ...]`
    Array(Vec<Expr>),

    /// `expr IN (a, b, ...)` / `expr NOT IN (...)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// True when any element of a JSON array has `key` matching `value`
    /// under `op`.
    JsonArrayAny {
        array: Box<Expr>,
        key: String,
        op: BinaryOperator,
        value: Box<Expr>,
    },

    /// True when `condition` holds for any element of `array`, with the
    /// element visible to `condition` as the identifier `element`.
    ArrayAny {
        array: Box<Expr>,
        element: String,
        condition: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub qualifier: Option<String>,
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Ident {
            qualifier: None,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,

    // Pattern matching
    Like,
    ILike,
    IRegexMatch, // ~*

    // Arrays
    Overlap, // &&
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Like => "LIKE",
            BinaryOperator::ILike => "ILIKE",
            BinaryOperator::IRegexMatch => "~*",
            BinaryOperator::Overlap => "&&",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
    /// ISO-8601 week number.
    Week,
}

impl DatePart {
    pub fn keyword(&self) -> &'static str {
        match self {
            DatePart::Year => "YEAR",
            DatePart::Month => "MONTH",
            DatePart::Day => "DAY",
            DatePart::Week => "WEEK",
        }
    }
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn equals(self, right: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::Eq, right)
    }

    pub fn lt(self, right: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::Lt, right)
    }

    pub fn lt_eq(self, right: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::LtEq, right)
    }

    pub fn gt(self, right: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::Gt, right)
    }

    pub fn gt_eq(self, right: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::GtEq, right)
    }

    pub fn and(self, right: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::And, right)
    }

    pub fn or(self, right: Expr) -> Expr {
        Expr::binary(self, BinaryOperator::Or, right)
    }

    pub fn ilike(self, pattern: impl Into<String>) -> Expr {
        Expr::binary(
            self,
            BinaryOperator::ILike,
            Expr::Value(Value::String(pattern.into())),
        )
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    pub fn cast(self, data_type: DataType) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            data_type,
        }
    }

    pub fn at_time_zone(self, timezone: impl Into<String>) -> Expr {
        Expr::AtTimeZone {
            expr: Box::new(self),
            timezone: timezone.into(),
        }
    }

    pub fn extract(self, part: DatePart) -> Expr {
        Expr::Extract {
            part,
            expr: Box::new(self),
        }
    }

    pub fn function(name: &str, args: Vec<Expr>) -> Expr {
        Expr::FunctionCall(FunctionCall {
            name: name.to_uppercase(),
            args,
            wildcard: false,
        })
    }

    /// `NOT COALESCE(self, FALSE)`: the complement of a condition, including
    /// the rows where the condition evaluates to NULL.
    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(Expr::function(
            "COALESCE",
            vec![self, Expr::Value(Value::Boolean(false))],
        )))
    }

    pub fn any_element(array: Expr, element: impl Into<String>, condition: Expr) -> Expr {
        Expr::ArrayAny {
            array: Box::new(array),
            element: element.into(),
            condition: Box::new(condition),
        }
    }

    /// Replaces every unqualified identifier `name` with `replacement`.
    pub fn replace_identifier(self, name: &str, replacement: &Expr) -> Expr {
        let replace = |expr: Expr| expr.replace_identifier(name, replacement);
        let replace_box = |expr: Box<Expr>| Box::new((*expr).replace_identifier(name, replacement));

        match self {
            Expr::Identifier(ident) if ident.qualifier.is_none() && ident.name == name => {
                replacement.clone()
            }
            Expr::Identifier(_) | Expr::Value(_) => self,
            Expr::BinaryOp(op) => {
                let BinaryOp { left, op, right } = *op;
                Expr::binary(replace(left), op, replace(right))
            }
            Expr::Not(expr) => Expr::Not(replace_box(expr)),
            Expr::IsNull { expr, negated } => Expr::IsNull {
                expr: replace_box(expr),
                negated,
            },
            Expr::FunctionCall(call) => Expr::FunctionCall(FunctionCall {
                args: call.args.into_iter().map(replace).collect(),
                ..call
            }),
            Expr::Cast { expr, data_type } => Expr::Cast {
                expr: replace_box(expr),
                data_type,
            },
            Expr::AtTimeZone { expr, timezone } => Expr::AtTimeZone {
                expr: replace_box(expr),
                timezone,
            },
            Expr::Extract { part, expr } => Expr::Extract {
                part,
                expr: replace_box(expr),
            },
            Expr::Array(items) => Expr::Array(items.into_iter().map(replace).collect()),
            Expr::InList {
                expr,
                list,
                negated,
            } => Expr::InList {
                expr: replace_box(expr),
                list: list.into_iter().map(replace).collect(),
                negated,
            },
            Expr::JsonArrayAny {
                array,
                key,
                op,
                value,
            } => Expr::JsonArrayAny {
                array: replace_box(array),
                key,
                op,
                value: replace_box(value),
            },
            // The element binding shadows `name` inside the condition.
            Expr::ArrayAny {
                array,
                element,
                condition,
            } => {
                let condition = if element == name {
                    condition
                } else {
                    replace_box(condition)
                };
                Expr::ArrayAny {
                    array: replace_box(array),
                    element,
                    condition,
                }
            }
        }
    }

    /// Joins conditions with `op`, returning `None` for an empty list.
    pub fn join_all(conditions: Vec<Expr>, op: BinaryOperator) -> Option<Expr> {
        conditions
            .into_iter()
            .reduce(|acc, next| Expr::binary(acc, op, next))
    }
}
