use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Text(String),
    Number(BigDecimal),
    Boolean(bool),
}

impl Literal {
    /// Number of digits after the decimal point as written, `0` for
    /// non-numeric literals.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Literal::Number(n) => u32::try_from(n.as_bigint_and_exponent().1.max(0)).unwrap_or(0),
            _ => 0,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_literal_display() {
        assert_eq!(format!("{}", Literal::Text("it's".to_string())), r"'it\'s'");
        assert_eq!(
            format!("{}", Literal::Number(BigDecimal::from_str("42.50").unwrap())),
            "42.50"
        );
        assert_eq!(format!("{}", Literal::Boolean(true)), "true");
    }

    #[test]
    fn test_decimal_places_follow_written_scale() {
        let number = Literal::Number(BigDecimal::from_str("1.250").unwrap());
        assert_eq!(number.decimal_places(), 3);
        assert_eq!(Literal::Number(BigDecimal::from(7)).decimal_places(), 0);
        assert_eq!(Literal::Text("1.5".into()).decimal_places(), 0);
    }
}
