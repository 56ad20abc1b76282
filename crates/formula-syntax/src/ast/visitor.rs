use crate::ast::{expr::Expression, literal::Literal, span::Span};

/// Visitor over untyped expressions, dispatched by [`Expression::accept`].
pub trait ExpressionVisitor {
    type Output;

    fn visit_literal(&mut self, literal: &Literal, span: Span) -> Self::Output;
    fn visit_field_reference(&mut self, name: &str, span: Span) -> Self::Output;
    fn visit_field_by_id(&mut self, id: u64, span: Span) -> Self::Output;
    fn visit_function_call(
        &mut self,
        name: &str,
        arguments: &[Expression],
        span: Span,
    ) -> Self::Output;
}
