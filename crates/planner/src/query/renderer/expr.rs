use crate::query::{
    ast::expr::{BinaryOp, Expr, FunctionCall, Ident},
    renderer::{Render, Renderer},
};
use model::core::value::Value;

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.push_param(val.clone()),
            Expr::BinaryOp(op) => op.render(r),
            Expr::Not(expr) => {
                r.sql.push_str("NOT ");
                expr.render(r);
            }
            Expr::IsNull { expr, negated } => {
                r.sql.push('(');
                expr.render(r);
                r.sql
                    .push_str(if *negated { " IS NOT NULL)" } else { " IS NULL)" });
            }
            Expr::FunctionCall(func) => func.render(r),
            Expr::Cast { expr, data_type } => {
                r.sql.push_str("CAST(");
                expr.render(r);
                r.sql.push_str(" AS ");
                let type_name = r.dialect.render_data_type(data_type);
                r.sql.push_str(&type_name);
                r.sql.push(')');
            }
            Expr::AtTimeZone { expr, timezone } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(" AT TIME ZONE ");
                r.push_param(Value::String(timezone.clone()));
                r.sql.push(')');
            }
            Expr::Extract { part, expr } => {
                r.sql.push_str("EXTRACT(");
                r.sql.push_str(part.keyword());
                r.sql.push_str(" FROM ");
                expr.render(r);
                r.sql.push(')');
            }
            Expr::Array(items) => {
                r.sql.push_str("ARRAY[");
                render_list(items, r);
                r.sql.push(']');
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                render_list(list, r);
                r.sql.push_str("))");
            }
            Expr::JsonArrayAny {
                array,
                key,
                op,
                value,
            } => {
                let element = r.dialect.quote_identifier("element");
                r.sql.push_str("EXISTS (SELECT 1 FROM JSONB_ARRAY_ELEMENTS(");
                array.render(r);
                r.sql.push_str(") AS ");
                r.sql.push_str(&element);
                r.sql.push_str(" WHERE (");
                r.sql.push_str(&element);
                r.sql.push_str("->>");
                r.push_param(Value::String(key.clone()));
                r.sql.push(' ');
                r.sql.push_str(op.symbol());
                r.sql.push(' ');
                value.render(r);
                r.sql.push_str("))");
            }
            Expr::ArrayAny {
                array,
                element,
                condition,
            } => {
                r.sql.push_str("EXISTS (SELECT 1 FROM UNNEST(");
                array.render(r);
                r.sql.push_str(") AS ");
                r.push_identifier(element);
                r.sql.push_str(" WHERE ");
                condition.render(r);
                r.sql.push(')');
            }
        }
    }
}

fn render_list(items: &[Expr], r: &mut Renderer) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        item.render(r);
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.push_identifier(qualifier);
            r.sql.push('.');
        }
        r.push_identifier(&self.name);
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);
        r.sql.push(' ');
        r.sql.push_str(self.op.symbol());
        r.sql.push(' ');
        self.right.render(r);
        r.sql.push(')');
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        if self.wildcard {
            r.sql.push('*');
        } else {
            render_list(&self.args, r);
        }
        r.sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ast::expr::DatePart, dialect::Postgres, ident, value};
    use model::core::data_type::DataType;

    fn render(expr: &Expr) -> (String, Vec<Value>) {
        let mut r = Renderer::new(&Postgres);
        expr.render(&mut r);
        r.finish()
    }

    #[test]
    fn test_render_comparison_with_params() {
        let expr = ident("field_1")
            .equals(value(Value::Int(5)))
            .or(ident("field_1").is_null());
        let (sql, params) = render(&expr);
        assert_eq!(sql, r#"(("field_1" = $1) OR ("field_1" IS NULL))"#);
        assert_eq!(params, vec![Value::Int(5)]);
    }

    #[test]
    fn test_render_timezone_extract() {
        let expr = ident("field_2")
            .at_time_zone("Europe/Rome")
            .cast(DataType::Date)
            .extract(DatePart::Day);
        let (sql, params) = render(&expr);
        assert_eq!(
            sql,
            r#"EXTRACT(DAY FROM CAST(("field_2" AT TIME ZONE $1) AS DATE))"#
        );
        assert_eq!(params, vec![Value::String("Europe/Rome".into())]);
    }

    #[test]
    fn test_render_any_element() {
        let expr = Expr::any_element(
            ident("field_4__field_1_array"),
            "field_4__field_1",
            ident("field_4__field_1").ilike("%ada%"),
        );
        let (sql, params) = render(&expr);
        assert_eq!(
            sql,
            r#"EXISTS (SELECT 1 FROM UNNEST("field_4__field_1_array") AS "field_4__field_1" WHERE ("field_4__field_1" ILIKE $1))"#
        );
        assert_eq!(params, vec![Value::String("%ada%".into())]);
    }

    #[test]
    fn test_render_negation_and_arrays() {
        let expr = Expr::binary(
            ident("field_3_array"),
            crate::query::ast::expr::BinaryOperator::Overlap,
            Expr::Array(vec![value(Value::Int(1))]),
        )
        .negate();
        let (sql, _) = render(&expr);
        assert_eq!(
            sql,
            r#"NOT COALESCE(("field_3_array" && ARRAY[$1]), $2)"#
        );
    }
}
