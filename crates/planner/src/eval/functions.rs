use crate::{error::PlannerError, query::ast::expr::DatePart};
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use model::core::{data_type::DataType, timezone::parse_timezone, value::Value};
use std::str::FromStr;
use tracing::warn;

static NULL: Value = Value::Null;

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

pub(crate) fn call(name: &str, args: &[Value]) -> Result<Value, PlannerError> {
    let value = match name.to_ascii_uppercase().as_str() {
        "COALESCE" => args
            .iter()
            .find(|v| !v.is_null())
            .cloned()
            .unwrap_or(Value::Null),
        "LENGTH" => match arg(args, 0).as_text() {
            Some(text) => Value::Int(text.chars().count() as i64),
            None => Value::Null,
        },
        "UPPER" => map_text(arg(args, 0), |s| s.to_uppercase()),
        "LOWER" => map_text(arg(args, 0), |s| s.to_lowercase()),
        "ARRAY_AGG" => match arg(args, 0) {
            Value::IntArray(v) if v.is_empty() => Value::Null,
            Value::StringArray(v) if v.is_empty() => Value::Null,
            Value::Null => Value::Null,
            v @ (Value::IntArray(_) | Value::StringArray(_)) => v.clone(),
            other => array(vec![other.clone()]),
        },
        "CARDINALITY" => match arg(args, 0) {
            Value::IntArray(v) => Value::Int(v.len() as i64),
            Value::StringArray(v) => Value::Int(v.len() as i64),
            _ => Value::Null,
        },
        "COUNT" => Value::Int(match arg(args, 0) {
            Value::Null => 0,
            Value::IntArray(v) => v.len() as i64,
            Value::StringArray(v) => v.len() as i64,
            Value::Json(serde_json::Value::Array(v)) => v.len() as i64,
            _ => 1,
        }),
        "TO_CHAR" => {
            let (Some(moment), Some(pattern)) = (as_naive_datetime(arg(args, 0)), arg(args, 1).as_str())
            else {
                return Ok(Value::Null);
            };
            Value::String(moment.format(&chrono_pattern(pattern)).to_string())
        }
        other => return Err(PlannerError::UnknownFunction(other.to_string())),
    };
    Ok(value)
}

fn map_text(value: &Value, f: impl Fn(&str) -> String) -> Value {
    value
        .as_text()
        .map(|text| Value::String(f(&text)))
        .unwrap_or(Value::Null)
}

/// Translates a `TO_CHAR` template into a `chrono` format string.
fn chrono_pattern(pattern: &str) -> String {
    const TOKENS: [(&str, &str); 8] = [
        ("YYYY", "%Y"),
        ("HH24", "%H"),
        ("HH12", "%I"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("MI", "%M"),
        ("AM", "%p"),
        ("PM", "%p"),
    ];

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;
    'outer: while !rest.is_empty() {
        for (token, replacement) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '%' {
                out.push_str("%%");
            } else {
                out.push(c);
            }
        }
        rest = chars.as_str();
    }
    out
}

fn as_naive_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        Value::TimestampNaive(n) => Some(*n),
        Value::Timestamp(t) => Some(t.naive_utc()),
        _ => None,
    }
}

fn as_naive_date(value: &Value) -> Option<NaiveDate> {
    as_naive_datetime(value).map(|n| n.date())
}

pub(crate) fn cast(value: Value, data_type: &DataType) -> Result<Value, PlannerError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let cast = match data_type {
        DataType::String | DataType::VarChar => value.as_text().map(Value::String),
        DataType::Short | DataType::Int | DataType::Long => match &value {
            Value::Int(_) | Value::IntArray(_) => Some(value.clone()),
            Value::Boolean(b) => Some(Value::Int(i64::from(*b))),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Int),
            other => other
                .as_decimal()
                .and_then(|d| d.round(0).to_i64())
                .map(Value::Int),
        },
        DataType::Decimal => match &value {
            Value::String(s) => BigDecimal::from_str(s.trim()).ok().map(Value::Decimal),
            other => other.as_decimal().map(Value::Decimal),
        },
        DataType::Float | DataType::Double => match &value {
            Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Float),
            other => other
                .as_decimal()
                .and_then(|d| d.to_f64())
                .map(Value::Float),
        },
        DataType::Boolean => match &value {
            Value::Boolean(_) => Some(value.clone()),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "y" | "yes" | "on" | "1" => Some(Value::Boolean(true)),
                "f" | "false" | "n" | "no" | "off" | "0" => Some(Value::Boolean(false)),
                _ => None,
            },
            Value::Int(i) => Some(Value::Boolean(*i != 0)),
            _ => None,
        },
        DataType::Date => match &value {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            other => as_naive_date(other).map(Value::Date),
        },
        DataType::Timestamp => match &value {
            Value::Timestamp(_) => Some(value.clone()),
            other => as_naive_datetime(other).map(|n| Value::Timestamp(n.and_utc())),
        },
        DataType::Json | DataType::IntArray | DataType::TextArray | DataType::Null => {
            Some(value.clone())
        }
    };

    Ok(cast.unwrap_or_else(|| {
        warn!(?data_type, value = %value, "Cast failed, yielding NULL");
        Value::Null
    }))
}

/// `AT TIME ZONE`: an instant becomes local wall time in `timezone`, and
/// wall time is read as local to `timezone` to give an instant.
pub(crate) fn at_time_zone(value: Value, timezone: &str) -> Result<Value, PlannerError> {
    let tz = parse_timezone(timezone)?;

    Ok(match value {
        Value::Timestamp(instant) => Value::TimestampNaive(instant.with_timezone(&tz).naive_local()),
        Value::TimestampNaive(_) | Value::Date(_) => as_naive_datetime(&value)
            .and_then(|local| tz.from_local_datetime(&local).earliest())
            .map(|instant| Value::Timestamp(instant.with_timezone(&Utc)))
            .unwrap_or(Value::Null),
        _ => Value::Null,
    })
}

pub(crate) fn extract(value: &Value, part: DatePart) -> Value {
    let Some(date) = as_naive_date(value) else {
        return Value::Null;
    };

    Value::Int(match part {
        DatePart::Year => i64::from(date.year()),
        DatePart::Month => i64::from(date.month()),
        DatePart::Day => i64::from(date.day()),
        DatePart::Week => i64::from(date.iso_week().week()),
    })
}

pub(crate) fn array(values: Vec<Value>) -> Value {
    if values.iter().all(|v| matches!(v, Value::Int(_))) {
        Value::IntArray(values.iter().filter_map(Value::as_i64).collect())
    } else {
        Value::StringArray(values.iter().filter_map(Value::as_text).collect())
    }
}

pub(crate) fn json_field(element: &serde_json::Value, key: &str) -> Value {
    match element.get(key) {
        Some(serde_json::Value::String(s)) => Value::String(s.clone()),
        Some(serde_json::Value::Bool(b)) => Value::Boolean(*b),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        Some(serde_json::Value::Null) | None => Value::Null,
        Some(other) => Value::Json(other.clone()),
    }
}
