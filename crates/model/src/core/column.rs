//! Storage-level description of a table column.

use crate::{
    core::{data_type::DataType, value::Value},
    error::ModelError,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Converts raw user input into a value the column can store, failing when
    /// the column would reject it.
    pub fn prep_value(&self, raw: &str) -> Result<Value, ModelError> {
        let invalid = || ModelError::InvalidValue {
            column: self.name.clone(),
            data_type: self.data_type.to_string(),
            value: raw.to_string(),
        };

        match self.data_type {
            DataType::Short => raw
                .parse::<i16>()
                .map(|v| Value::Int(i64::from(v)))
                .map_err(|_| invalid()),
            DataType::Int => raw
                .parse::<i32>()
                .map(|v| Value::Int(i64::from(v)))
                .map_err(|_| invalid()),
            DataType::Long => raw.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
            DataType::Decimal => BigDecimal::from_str(raw)
                .map(Value::Decimal)
                .map_err(|_| invalid()),
            DataType::Float | DataType::Double => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Value::Float(v)),
                _ => Err(invalid()),
            },
            DataType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Value::Boolean(true)),
                "false" | "f" | "0" => Ok(Value::Boolean(false)),
                _ => Err(invalid()),
            },
            DataType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| invalid()),
            DataType::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Value::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| invalid()),
            DataType::VarChar | DataType::String => Ok(Value::String(raw.to_string())),
            DataType::Json | DataType::IntArray | DataType::TextArray | DataType::Null => {
                Err(invalid())
            }
        }
    }

    pub fn accepts(&self, raw: &str) -> bool {
        self.prep_value(raw).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_column_rejects_fractions() {
        let column = Column::new("field_1", DataType::Long);
        assert_eq!(column.prep_value("42"), Ok(Value::Int(42)));
        assert!(!column.accepts("3.7"));
        assert!(!column.accepts("abc"));
    }

    #[test]
    fn test_small_integer_range() {
        let column = Column::new("field_1", DataType::Short);
        assert!(column.accepts("5"));
        assert!(!column.accepts("70000"));
    }

    #[test]
    fn test_decimal_column() {
        let column = Column::new("field_1", DataType::Decimal);
        assert_eq!(
            column.prep_value("1.25"),
            Ok(Value::Decimal(BigDecimal::from_str("1.25").unwrap()))
        );
        assert!(!column.accepts("1.2.3"));
    }

    #[test]
    fn test_text_column_accepts_anything() {
        let column = Column::new("field_1", DataType::String);
        assert_eq!(column.prep_value("x"), Ok(Value::String("x".into())));
    }

    #[test]
    fn test_error_names_the_column() {
        let column = Column::new("field_9", DataType::Date);
        let err = column.prep_value("yesterday").unwrap_err();
        assert!(err.to_string().contains("field_9"));
    }
}
