//! Timezone resolution and date parsing shared by the date filters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use model::{
    core::{
        data_type::DataType,
        timezone::{DEFAULT_TIMEZONE, parse_timezone},
    },
    field::options::DateOptions,
};
use planner::{Annotation, Expr, Predicate, query::ident};
use tracing::warn;

const SEPARATOR: char = '?';

/// Timezone a filter compares in. Only honoured for fields that include a
/// time, date-only fields always compare in GMT.
pub fn resolve_timezone(requested: Option<&str>, options: &DateOptions) -> String {
    match requested.map(str::trim) {
        Some(name) if options.include_time && !name.is_empty() => match parse_timezone(name) {
            Ok(_) => name.to_string(),
            Err(err) => {
                warn!("{err}, falling back to {DEFAULT_TIMEZONE}");
                DEFAULT_TIMEZONE.to_string()
            }
        },
        _ => DEFAULT_TIMEZONE.to_string(),
    }
}

/// Timezone the field is displayed in.
pub fn field_timezone(options: &DateOptions) -> String {
    resolve_timezone(options.force_timezone.as_deref(), options)
}

/// Splits a `<timezone>?<value>` filter value. Without a separator the field's
/// forced timezone applies. The value is `None` when the split is malformed or
/// nothing remains to filter on.
pub fn split_timezone_and_value<'a>(raw: &'a str, options: &DateOptions) -> (String, Option<&'a str>) {
    let (requested, value) = match raw.split_once(SEPARATOR) {
        Some((_, rest)) if rest.contains(SEPARATOR) => {
            return (DEFAULT_TIMEZONE.to_string(), None);
        }
        Some((timezone, rest)) => (Some(timezone), rest),
        None => (options.force_timezone.as_deref(), raw),
    };

    let value = value.trim();
    (
        resolve_timezone(requested, options),
        (!value.is_empty()).then_some(value),
    )
}

/// Loads a timezone that [`resolve_timezone`] already accepted.
pub(crate) fn load(name: &str) -> Tz {
    parse_timezone(name).unwrap_or(Tz::GMT)
}

/// A filter value in ISO 8601 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoValue {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl IsoValue {
    /// Wall time of the value in `tz`; bare dates are already local.
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        match self {
            IsoValue::Date(date) => *date,
            IsoValue::DateTime(instant) => instant.with_timezone(tz).date_naive(),
        }
    }
}

/// Parses a bare ISO date or a full ISO datetime. Datetimes without an
/// offset are read as UTC.
pub fn parse_iso(value: &str) -> Option<IsoValue> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(IsoValue::Date(date));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(IsoValue::DateTime(instant.with_timezone(&Utc)));
    }
    for format in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(value, format) {
            return Some(IsoValue::DateTime(instant.with_timezone(&Utc)));
        }
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| IsoValue::DateTime(naive.and_utc()))
}

/// The expression a date filter compares against. For fields with a time it
/// is the timestamp shifted into the filter timezone, materialised as an
/// annotation named `<column>_tz_<timezone>`.
#[derive(Debug, Clone)]
pub struct DateSubject {
    expr: Expr,
    annotation: Option<Annotation>,
}

impl DateSubject {
    pub fn new(field_name: &str, options: &DateOptions, timezone: &str) -> Self {
        if options.include_time {
            let name = format!("{field_name}_tz_{timezone}");
            Self {
                expr: ident(&name),
                annotation: Some(Annotation::new(
                    name,
                    ident(field_name).at_time_zone(timezone),
                )),
            }
        } else {
            Self {
                expr: ident(field_name),
                annotation: None,
            }
        }
    }

    pub fn expr(&self) -> Expr {
        self.expr.clone()
    }

    /// The calendar day of the subject.
    pub fn date(&self) -> Expr {
        match self.annotation {
            Some(_) => self.expr.clone().cast(DataType::Date),
            None => self.expr.clone(),
        }
    }

    pub fn predicate(self, condition: Expr) -> Predicate {
        match self.annotation {
            Some(annotation) => Predicate::annotated(condition, annotation),
            None => Predicate::condition(condition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn with_time(force_timezone: Option<&str>) -> DateOptions {
        DateOptions {
            include_time: true,
            force_timezone: force_timezone.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_with_prefix() {
        let options = with_time(None);
        assert_eq!(
            split_timezone_and_value("Europe/Rome?2023-05-01", &options),
            ("Europe/Rome".to_string(), Some("2023-05-01"))
        );
        assert_eq!(
            split_timezone_and_value("Europe/Rome?", &options),
            ("Europe/Rome".to_string(), None)
        );
        assert_eq!(
            split_timezone_and_value("a?b?c", &options),
            ("GMT".to_string(), None)
        );
    }

    #[test]
    fn test_split_without_prefix_uses_forced_timezone() {
        assert_eq!(
            split_timezone_and_value("2023-05-01", &with_time(Some("Asia/Tokyo"))),
            ("Asia/Tokyo".to_string(), Some("2023-05-01"))
        );
        assert_eq!(
            split_timezone_and_value("2023-05-01", &with_time(None)),
            ("GMT".to_string(), Some("2023-05-01"))
        );
    }

    #[test]
    fn test_timezone_ignored_without_time() {
        let options = DateOptions::default();
        assert_eq!(
            split_timezone_and_value("Europe/Rome?2023-05-01", &options).0,
            "GMT"
        );
        assert_eq!(resolve_timezone(Some("Nowhere/Land"), &with_time(None)), "GMT");
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(
            parse_iso("2023-05-01"),
            Some(IsoValue::Date(NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()))
        );
        assert_eq!(
            parse_iso("2023-05-01T10:00:00+02:00"),
            Some(IsoValue::DateTime(
                Utc.with_ymd_and_hms(2023, 5, 1, 8, 0, 0).unwrap()
            ))
        );
        assert_eq!(
            parse_iso("2023-05-01 10:30"),
            Some(IsoValue::DateTime(
                Utc.with_ymd_and_hms(2023, 5, 1, 10, 30, 0).unwrap()
            ))
        );
        assert_eq!(parse_iso("2023-13-01"), None);
        assert_eq!(parse_iso("yesterday"), None);
    }

    #[test]
    fn test_subject_annotation_name() {
        let subject = DateSubject::new("field_3", &with_time(None), "Europe/Rome");
        let predicate = subject.predicate(ident("x"));
        assert_eq!(
            predicate.annotation().map(|a| a.name.as_str()),
            Some("field_3_tz_Europe/Rome")
        );
    }
}
