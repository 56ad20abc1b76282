use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};

/// Storage-level type of a table column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    Short,
    Int,
    Long,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    Timestamp,
    VarChar,
    String,
    Json,
    IntArray,
    TextArray,
    Null,
}

impl DataType {
    pub fn postgres_name(&self) -> Cow<'_, str> {
        match self {
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Decimal => Cow::Borrowed("DECIMAL"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("DOUBLE PRECISION"),
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP WITH TIME ZONE"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::String => Cow::Borrowed("TEXT"),
            DataType::Json => Cow::Borrowed("JSONB"),
            DataType::IntArray => Cow::Borrowed("INTEGER[]"),
            DataType::TextArray => Cow::Borrowed("TEXT[]"),
            DataType::Null => Cow::Borrowed("NULL"),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Short | DataType::Int | DataType::Long)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.postgres_name())
    }
}
