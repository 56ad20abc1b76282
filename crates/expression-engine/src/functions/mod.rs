pub mod date;
pub mod logic;
pub mod number;
pub mod text;

use crate::{
    error::{FormulaError, Result},
    types::TypedExpression,
};
use model::field::formula::FormulaType;
use std::{collections::HashMap, fmt};
use tracing::trace;

/// Outcome of typing one call. `Err` carries the message of the invalid type
/// the call resolves to.
pub type TypeResult = std::result::Result<FormulaType, String>;

/// Type alias for function typing rules. Arguments are already typed and
/// valid; a rule may rewrite them (e.g. to insert conversions).
pub type FunctionImpl = fn(&str, &mut [TypedExpression]) -> TypeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

struct FunctionDef {
    arity: Arity,
    typer: FunctionImpl,
    internal: bool,
}

/// Registry of all available functions
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new function registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };

        registry.register("upper", Arity::Exact(1), text::type_text_transform);
        registry.register("lower", Arity::Exact(1), text::type_text_transform);
        registry.register("concat", Arity::AtLeast(1), text::type_concat);
        registry.register("totext", Arity::Exact(1), text::type_totext);
        registry.register("tonumber", Arity::Exact(1), text::type_tonumber);
        registry.register("length", Arity::Exact(1), text::type_length);

        registry.register("add", Arity::Exact(2), number::type_add);
        registry.register("minus", Arity::Exact(2), number::type_arithmetic);
        registry.register("multiply", Arity::Exact(2), number::type_arithmetic);
        registry.register("divide", Arity::Exact(2), number::type_divide);
        registry.register("round", Arity::Exact(2), number::type_round);

        for name in [
            "equal",
            "not_equal",
            "greater_than",
            "greater_than_or_equal",
            "less_than",
            "less_than_or_equal",
        ] {
            registry.register(name, Arity::Exact(2), logic::type_comparison);
        }
        registry.register("and", Arity::Exact(2), logic::type_boolean_operator);
        registry.register("or", Arity::Exact(2), logic::type_boolean_operator);
        registry.register("not", Arity::Exact(1), logic::type_boolean_operator);
        registry.register("if", Arity::Exact(3), logic::type_if);
        registry.register("isblank", Arity::Exact(1), logic::type_isblank);

        registry.register("today", Arity::Exact(0), date::type_today);
        registry.register("now", Arity::Exact(0), date::type_now);

        // Field-level wrappers, never written by users.
        registry.register_internal("when_empty", Arity::Exact(2), logic::type_when_empty);
        registry.register_internal("trunc_day", Arity::Exact(1), date::type_trunc_day);

        registry
    }

    pub fn register(&mut self, name: &str, arity: Arity, typer: FunctionImpl) {
        self.insert(name, arity, typer, false);
    }

    fn register_internal(&mut self, name: &str, arity: Arity, typer: FunctionImpl) {
        self.insert(name, arity, typer, true);
    }

    fn insert(&mut self, name: &str, arity: Arity, typer: FunctionImpl, internal: bool) {
        self.functions.insert(
            name.to_lowercase(),
            FunctionDef {
                arity,
                typer,
                internal,
            },
        );
    }

    /// Types a call written in a formula. Internal wrappers are not visible
    /// here.
    pub fn call(&self, name: &str, arguments: Vec<TypedExpression>) -> Result<TypedExpression> {
        let name = name.to_lowercase();
        match self.functions.get(&name) {
            Some(def) if !def.internal => Self::apply(&name, def, arguments),
            _ => Err(FormulaError::UnknownFunction(name)),
        }
    }

    /// Types a call to any registered function, internal ones included.
    pub(crate) fn call_internal(
        &self,
        name: &str,
        arguments: Vec<TypedExpression>,
    ) -> Result<TypedExpression> {
        let def = self
            .functions
            .get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;
        Self::apply(name, def, arguments)
    }

    fn apply(
        name: &str,
        def: &FunctionDef,
        mut arguments: Vec<TypedExpression>,
    ) -> Result<TypedExpression> {
        if !def.arity.accepts(arguments.len()) {
            return Err(FormulaError::InvalidArgumentCount {
                function: name.to_string(),
                expected: def.arity.to_string(),
                actual: arguments.len(),
            });
        }

        // An invalid argument makes the whole call invalid with the same error.
        if let Some(invalid) = arguments.iter().find(|a| a.is_invalid()) {
            let expression_type = invalid.expression_type.clone();
            return Ok(TypedExpression::call(name, arguments, expression_type));
        }

        let expression_type = (def.typer)(name, &mut arguments).unwrap_or_else(FormulaType::invalid);
        trace!(function = name, %expression_type, "Typed function call");
        Ok(TypedExpression::call(name, arguments, expression_type))
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions
            .get(&name.to_lowercase())
            .is_some_and(|def| !def.internal)
    }

    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .functions
            .iter()
            .filter(|(_, def)| !def.internal)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks argument `index` with `accepts` and returns its type.
pub(crate) fn argument<'a>(
    function: &str,
    arguments: &'a [TypedExpression],
    index: usize,
    expected: &str,
    accepts: impl Fn(&FormulaType) -> bool,
) -> std::result::Result<&'a FormulaType, String> {
    let actual = arguments
        .get(index)
        .map(|argument| &argument.expression_type)
        .ok_or_else(|| format!("{function} is missing argument {}", index + 1))?;

    if accepts(actual) {
        Ok(actual)
    } else {
        Err(format!(
            "argument {} of {function} must be {expected}, got {actual}",
            index + 1
        ))
    }
}

/// Decimal places of a numeric argument.
pub(crate) fn number_argument(
    function: &str,
    arguments: &[TypedExpression],
    index: usize,
) -> std::result::Result<u32, String> {
    match argument(function, arguments, index, "a number", |t| {
        matches!(t, FormulaType::Number { .. })
    })? {
        FormulaType::Number { decimal_places } => Ok(*decimal_places),
        _ => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula_syntax::ast::literal::Literal;

    fn text(value: &str) -> TypedExpression {
        TypedExpression::literal(Literal::Text(value.into()))
    }

    #[test]
    fn test_registry_has_builtin_functions() {
        let registry = FunctionRegistry::new();
        for name in ["upper", "lower", "concat", "add", "divide", "if", "today"] {
            assert!(registry.has_function(name), "{name}");
        }
    }

    #[test]
    fn test_registry_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.has_function("UPPER"));
        assert!(registry.has_function("Concat"));
    }

    #[test]
    fn test_internal_functions_are_hidden() {
        let registry = FunctionRegistry::new();
        assert!(!registry.has_function("when_empty"));
        assert!(!registry.function_names().contains(&"trunc_day"));
        assert_eq!(
            registry.call("trunc_day", vec![text("x")]),
            Err(FormulaError::UnknownFunction("trunc_day".into()))
        );
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::new();
        assert!(matches!(
            registry.call("unknown_func", vec![]),
            Err(FormulaError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_argument_count_is_checked() {
        let registry = FunctionRegistry::new();
        assert_eq!(
            registry.call("upper", vec![text("a"), text("b")]),
            Err(FormulaError::InvalidArgumentCount {
                function: "upper".into(),
                expected: "1".into(),
                actual: 2,
            })
        );
        assert!(matches!(
            registry.call("concat", vec![]),
            Err(FormulaError::InvalidArgumentCount { .. })
        ));
    }

    #[test]
    fn test_invalid_argument_propagates() {
        let registry = FunctionRegistry::new();
        let broken = text("a").with_type(FormulaType::invalid("boom"));
        let typed = registry.call("upper", vec![broken]).unwrap();
        assert_eq!(typed.expression_type, FormulaType::invalid("boom"));
    }

    #[test]
    fn test_custom_function_registration() {
        let mut registry = FunctionRegistry::new();

        fn type_shout(_: &str, _: &mut [TypedExpression]) -> TypeResult {
            Ok(FormulaType::Char)
        }

        registry.register("shout", Arity::Exact(1), type_shout);
        assert!(registry.has_function("shout"));
        let typed = registry.call("SHOUT", vec![text("hi")]).unwrap();
        assert_eq!(typed.expression_type, FormulaType::Char);
    }
}
