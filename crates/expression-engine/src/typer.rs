//! Typing of formula fields: parse, type every node bottom-up, apply the
//! user's formatting choices and wrap the root for storage.

use crate::{
    cache::FieldLookupCache,
    error::{FormulaError, Result},
    functions::{FunctionRegistry, number::MAX_DECIMAL_PLACES},
    types::{TypedExpression, TypedKind},
};
use formula_syntax::ast::{
    expr::Expression, literal::Literal, span::Span, visitor::ExpressionVisitor,
};
use model::field::{
    Field, FieldKind,
    formula::{FormulaOptions, FormulaType},
    options::DateOptions,
};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Default bound on expression nesting plus formula-to-formula references.
pub const DEFAULT_MAX_DEPTH: usize = 256;

pub struct FormulaTyper {
    functions: FunctionRegistry,
    max_depth: usize,
}

impl FormulaTyper {
    pub fn new(max_depth: usize) -> Self {
        Self::with_functions(FunctionRegistry::new(), max_depth)
    }

    pub fn with_functions(functions: FunctionRegistry, max_depth: usize) -> Self {
        Self {
            functions,
            max_depth,
        }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Types `field`, resolving references through `cache`.
    pub fn typed_expression(
        &self,
        field: &Field,
        cache: &mut FieldLookupCache<'_>,
    ) -> Result<TypedExpression> {
        self.type_formula_field(field, cache, 0)
    }

    fn type_formula_field(
        &self,
        field: &Field,
        cache: &mut FieldLookupCache<'_>,
        depth: usize,
    ) -> Result<TypedExpression> {
        let options = field
            .formula_options()
            .ok_or_else(|| FormulaError::NotAFormula(field.name.clone()))?;

        let expression = match &options.cached_untyped_expression {
            Some(expression) => Cow::Borrowed(expression),
            None => Cow::Owned(formula_syntax::parse_with_limit(
                &options.formula,
                self.max_depth,
            )?),
        };

        let mut visitor = TypingVisitor {
            typer: self,
            cache: &mut *cache,
            table_id: field.table_id,
            depth,
        };
        let typed = expression.accept(&mut visitor)?;
        let typed = self.wrap_for_field(merge_user_options(typed, options))?;

        debug!(field = %field.name, formula_type = %typed.expression_type, "Typed formula field");
        cache.store_typed_formula(field.id, typed.expression_type.clone());
        Ok(typed)
    }

    /// Outer conversion a value of the root type needs to be stored in the
    /// field's column.
    fn wrap_for_field(&self, typed: TypedExpression) -> Result<TypedExpression> {
        match &typed.expression_type {
            FormulaType::Number { decimal_places } => {
                let places = TypedExpression::number(*decimal_places);
                self.functions.call_internal("round", vec![typed, places])
            }
            FormulaType::Boolean => {
                let fallback = TypedExpression::literal(Literal::Boolean(false));
                self.functions
                    .call_internal("when_empty", vec![typed, fallback])
            }
            FormulaType::Date(options) if !options.include_time => {
                self.functions.call_internal("trunc_day", vec![typed])
            }
            _ => Ok(typed),
        }
    }
}

impl Default for FormulaTyper {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Types a formula field with the built-in functions.
pub fn calculate_typed_expression(
    field: &Field,
    cache: &mut FieldLookupCache<'_>,
    max_depth: usize,
) -> Result<TypedExpression> {
    FormulaTyper::new(max_depth).typed_expression(field, cache)
}

/// Options the user set explicitly win over the calculated ones.
fn merge_user_options(typed: TypedExpression, options: &FormulaOptions) -> TypedExpression {
    let merged = match &typed.expression_type {
        FormulaType::Number { decimal_places } => FormulaType::Number {
            decimal_places: options
                .number_decimal_places
                .unwrap_or(*decimal_places)
                .min(MAX_DECIMAL_PLACES),
        },
        FormulaType::Date(calculated) => FormulaType::Date(DateOptions {
            include_time: options.date_include_time.unwrap_or(calculated.include_time),
            date_format: options.date_format.unwrap_or(calculated.date_format),
            time_format: options.date_time_format.unwrap_or(calculated.time_format),
            force_timezone: options
                .date_force_timezone
                .clone()
                .or_else(|| calculated.force_timezone.clone()),
            show_tzinfo: options.date_show_tzinfo.unwrap_or(calculated.show_tzinfo),
        }),
        _ => return typed,
    };
    typed.with_type(merged)
}

/// Formula type of a reference to a plain field.
fn reference_type(kind: &FieldKind) -> FormulaType {
    match kind {
        FieldKind::Text | FieldKind::LongText => FormulaType::Text,
        FieldKind::Url | FieldKind::Email | FieldKind::PhoneNumber => FormulaType::Char,
        FieldKind::Number(options) => FormulaType::Number {
            decimal_places: options.decimal_places,
        },
        FieldKind::Rating(_) => FormulaType::Number { decimal_places: 0 },
        FieldKind::Boolean => FormulaType::Boolean,
        FieldKind::Date(options)
        | FieldKind::LastModified(options)
        | FieldKind::CreatedOn(options) => FormulaType::Date(options.clone()),
        other => FormulaType::invalid(format!(
            "{} fields cannot be referenced in a formula",
            other.type_name()
        )),
    }
}

struct TypingVisitor<'t, 'c, 's> {
    typer: &'t FormulaTyper,
    cache: &'c mut FieldLookupCache<'s>,
    table_id: u64,
    depth: usize,
}

impl<'s> TypingVisitor<'_, '_, 's> {
    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.typer.max_depth {
            warn!(max_depth = self.typer.max_depth, "Formula exceeds the maximum depth");
            return Err(FormulaError::MaximumFormulaSize {
                max_depth: self.typer.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Type of a referenced formula field, typing it on first use.
    fn formula_type_of(&mut self, field: &'s Field) -> Result<FormulaType> {
        if let Some(formula_type) = self.cache.typed_formula(field.id) {
            return Ok(formula_type.clone());
        }

        self.enter()?;
        let typed = self
            .typer
            .type_formula_field(field, self.cache, self.depth)?;
        self.leave();
        Ok(typed.expression_type)
    }

    fn reference(&mut self, field: &'s Field) -> Result<TypedExpression> {
        let expression_type = match &field.kind {
            FieldKind::Formula(_) => match self.formula_type_of(field)? {
                FormulaType::Invalid { error } => FormulaType::invalid(format!(
                    "references invalid field `{}`: {error}",
                    field.name
                )),
                valid => valid,
            },
            kind => reference_type(kind),
        };

        Ok(TypedExpression::new(
            TypedKind::FieldReference {
                field_id: field.id,
                name: field.name.clone(),
            },
            expression_type,
        ))
    }
}

impl ExpressionVisitor for TypingVisitor<'_, '_, '_> {
    type Output = Result<TypedExpression>;

    fn visit_literal(&mut self, literal: &Literal, _span: Span) -> Self::Output {
        Ok(TypedExpression::literal(literal.clone()))
    }

    fn visit_field_reference(&mut self, name: &str, _span: Span) -> Self::Output {
        let field = self
            .cache
            .field_by_name(self.table_id, name)
            .ok_or_else(|| FormulaError::FieldNotFound(name.to_string()))?;
        self.reference(field)
    }

    fn visit_field_by_id(&mut self, id: u64, _span: Span) -> Self::Output {
        let field = self
            .cache
            .field_by_id(id)
            .ok_or_else(|| FormulaError::FieldNotFound(id.to_string()))?;
        self.reference(field)
    }

    fn visit_function_call(
        &mut self,
        name: &str,
        arguments: &[Expression],
        _span: Span,
    ) -> Self::Output {
        self.enter()?;
        let arguments = arguments
            .iter()
            .map(|argument| argument.accept(self))
            .collect::<Result<Vec<_>>>()?;
        self.leave();
        self.typer.functions.call(name, arguments)
    }
}
