use crate::ast::{literal::Literal, span::Span, visitor::ExpressionVisitor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

/// Untyped formula expression. Operators are already desugared into
/// function calls by the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    Literal(Literal),
    FieldReference(String),
    FieldByIdReference(u64),
    FunctionCall {
        name: String,
        arguments: Vec<Expression>,
    },
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Expression { kind, span }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Expression::new(ExpressionKind::Literal(literal), span)
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Expression>, span: Span) -> Self {
        Expression::new(
            ExpressionKind::FunctionCall {
                name: name.into(),
                arguments,
            },
            span,
        )
    }

    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V) -> V::Output {
        match &self.kind {
            ExpressionKind::Literal(literal) => visitor.visit_literal(literal, self.span),
            ExpressionKind::FieldReference(name) => visitor.visit_field_reference(name, self.span),
            ExpressionKind::FieldByIdReference(id) => visitor.visit_field_by_id(*id, self.span),
            ExpressionKind::FunctionCall { name, arguments } => {
                visitor.visit_function_call(name, arguments, self.span)
            }
        }
    }

    /// Nesting depth of the tree; a lone literal or reference has depth 1.
    pub fn depth(&self) -> usize {
        match &self.kind {
            ExpressionKind::FunctionCall { arguments, .. } => {
                1 + arguments.iter().map(Expression::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    /// Names of every `field('...')` reference, in order of appearance.
    pub fn referenced_field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    fn collect_field_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match &self.kind {
            ExpressionKind::FieldReference(name) => names.push(name),
            ExpressionKind::FunctionCall { arguments, .. } => {
                for argument in arguments {
                    argument.collect_field_names(names);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Literal(literal) => write!(f, "{literal}"),
            ExpressionKind::FieldReference(name) => {
                write!(f, "field({})", Literal::Text(name.clone()))
            }
            ExpressionKind::FieldByIdReference(id) => write!(f, "field_by_id({id})"),
            ExpressionKind::FunctionCall { name, arguments } => {
                write!(f, "{name}(")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
        }
    }
}
