//! Field type specific definitions of "contains" and "empty".

use crate::{filter::Compiled, timezone};
use model::{
    core::{data_type::DataType, value::Value},
    field::{
        FieldKind,
        options::{DateOptions, SelectOptions},
    },
};
use planner::{
    Annotation, BinaryOperator, Expr, Predicate,
    query::{ident, value},
};
use regex::RegexBuilder;

/// Escapes the `LIKE` wildcards of `value`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `ARRAY_AGG` of a many-to-many column, shared by every filter that looks
/// at the related ids.
pub fn array_annotation(field_name: &str) -> Annotation {
    Annotation::new(
        format!("{field_name}_array"),
        Expr::function("ARRAY_AGG", vec![ident(field_name)]),
    )
}

/// `<column>_array && ARRAY[ids]`.
pub fn overlaps(field_name: &str, ids: Vec<i64>) -> Compiled {
    let annotation = array_annotation(field_name);
    let condition = Expr::binary(
        ident(&annotation.name),
        BinaryOperator::Overlap,
        Expr::Array(ids.into_iter().map(|id| value(Value::Int(id))).collect()),
    );
    Compiled::annotated(condition, annotation)
}

fn select_matching(
    field_name: &str,
    kind: &FieldKind,
    options: &SelectOptions,
    predicate: impl Fn(&str) -> bool,
) -> Compiled {
    let ids = options.ids_matching(predicate);
    if ids.is_empty() {
        return Compiled::Fragment(Predicate::MatchNone);
    }

    match kind {
        FieldKind::MultipleSelect(_) => overlaps(field_name, ids),
        _ => Compiled::condition(Expr::InList {
            expr: Box::new(ident(field_name)),
            list: ids.into_iter().map(|id| value(Value::Int(id))).collect(),
            negated: false,
        }),
    }
}

/// The date rendered the way the field displays it, so users can search for
/// what they see.
fn formatted_date(field_name: &str, options: &DateOptions) -> Annotation {
    let local = if options.include_time {
        ident(field_name).at_time_zone(timezone::field_timezone(options))
    } else {
        ident(field_name)
    };

    Annotation::new(
        format!("{field_name}_formatted"),
        Expr::function(
            "TO_CHAR",
            vec![local, value(Value::String(options.to_char_pattern()))],
        ),
    )
}

/// Case-insensitive substring match of `needle` (already trimmed and not
/// empty) against the field.
pub fn contains_query(field_name: &str, needle: &str, kind: &FieldKind) -> Compiled {
    let pattern = format!("%{}%", escape_like(needle));

    match kind {
        FieldKind::Text
        | FieldKind::LongText
        | FieldKind::Url
        | FieldKind::Email
        | FieldKind::PhoneNumber => Compiled::condition(ident(field_name).ilike(pattern)),
        FieldKind::Number(_) | FieldKind::Rating(_) => {
            Compiled::condition(ident(field_name).cast(DataType::String).ilike(pattern))
        }
        FieldKind::Date(options)
        | FieldKind::LastModified(options)
        | FieldKind::CreatedOn(options) => {
            let annotation = formatted_date(field_name, options);
            Compiled::annotated(ident(&annotation.name).ilike(pattern), annotation)
        }
        FieldKind::SingleSelect(options) | FieldKind::MultipleSelect(options) => {
            let needle = needle.to_lowercase();
            select_matching(field_name, kind, options, |option| {
                option.to_lowercase().contains(&needle)
            })
        }
        other => Compiled::invalid(format!(
            "`{}` fields do not support contains",
            other.type_name()
        )),
    }
}

/// Whole-word, case-insensitive match of `word` against the field.
pub fn contains_word_query(field_name: &str, word: &str, kind: &FieldKind) -> Compiled {
    let escaped = regex::escape(word);

    match kind {
        FieldKind::Text
        | FieldKind::LongText
        | FieldKind::Url
        | FieldKind::Email
        | FieldKind::PhoneNumber => Compiled::condition(Expr::binary(
            ident(field_name),
            BinaryOperator::IRegexMatch,
            value(Value::String(format!("\\m{escaped}\\M"))),
        )),
        FieldKind::SingleSelect(options) | FieldKind::MultipleSelect(options) => {
            let regex = match RegexBuilder::new(&format!(r"\b{escaped}\b"))
                .case_insensitive(true)
                .build()
            {
                Ok(regex) => regex,
                Err(err) => return Compiled::invalid(err),
            };
            select_matching(field_name, kind, options, |option| regex.is_match(option))
        }
        other => Compiled::invalid(format!(
            "`{}` fields do not support contains word",
            other.type_name()
        )),
    }
}

/// What "empty" means for the field kind.
pub fn empty_query(field_name: &str, kind: &FieldKind) -> Predicate {
    let column = ident(field_name);
    let or_equals = |empty: Value| {
        Predicate::condition(column.clone().is_null().or(column.clone().equals(value(empty))))
    };

    match kind {
        FieldKind::Text
        | FieldKind::LongText
        | FieldKind::Url
        | FieldKind::Email
        | FieldKind::PhoneNumber => or_equals(Value::String(String::new())),
        FieldKind::Rating(_) => or_equals(Value::Int(0)),
        FieldKind::Boolean => or_equals(Value::Boolean(false)),
        FieldKind::File => or_equals(Value::Json(serde_json::Value::Array(Vec::new()))),
        FieldKind::MultipleSelect(_)
        | FieldKind::LinkRow(_)
        | FieldKind::MultipleCollaborators => {
            let annotation = Annotation::new(
                format!("{field_name}_count"),
                Expr::function("COUNT", vec![column]),
            );
            Predicate::annotated(
                ident(&annotation.name).equals(value(Value::Int(0))),
                annotation,
            )
        }
        FieldKind::Number(_)
        | FieldKind::Date(_)
        | FieldKind::LastModified(_)
        | FieldKind::CreatedOn(_)
        | FieldKind::SingleSelect(_)
        | FieldKind::Formula(_) => Predicate::condition(column.is_null()),
    }
}
