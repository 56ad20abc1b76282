//! Timezone aware date filters.

use super::DATE_LIKE;
use crate::{
    filter::{Compatibility, Compiled, FilterInput, ViewFilterType},
    timezone::{self, DateSubject, IsoValue, parse_iso, resolve_timezone, split_timezone_and_value},
};
use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use model::{core::value::Value, field::options::DateOptions};
use planner::{BinaryOperator, DatePart, Expr, query::value};
use tracing::debug;

fn date_options<'a>(input: &FilterInput<'a>) -> Result<&'a DateOptions, Compiled> {
    input.field.kind.date_options().ok_or_else(|| {
        Compiled::invalid(format!("field `{}` holds no dates", input.field.name))
    })
}

fn date_part(date: NaiveDate, part: DatePart) -> Value {
    Value::Int(match part {
        DatePart::Year => i64::from(date.year()),
        DatePart::Month => i64::from(date.month()),
        DatePart::Day => i64::from(date.day()),
        DatePart::Week => i64::from(date.iso_week().week()),
    })
}

/// `part(subject) = part(date)` for every part, joined with `AND`.
fn same_parts(subject: &DateSubject, date: NaiveDate, parts: &[DatePart]) -> Expr {
    let conditions = parts
        .iter()
        .map(|part| subject.expr().extract(*part).equals(value(date_part(date, *part))))
        .collect();
    Expr::join_all(conditions, BinaryOperator::And)
        .unwrap_or_else(|| value(Value::Boolean(true)))
}

/// Compares the field with an ISO date or datetime under `op`. Bare dates
/// compare calendar days in the filter timezone, datetimes compare local
/// wall time when the field has a time and the local day otherwise.
fn compare_iso(input: &FilterInput<'_>, op: BinaryOperator) -> Compiled {
    let options = match date_options(input) {
        Ok(options) => options,
        Err(compiled) => return compiled,
    };

    let (timezone, raw) = split_timezone_and_value(input.value.trim(), options);
    let Some(raw) = raw else {
        return Compiled::NoFilter;
    };
    let Some(parsed) = parse_iso(raw) else {
        return Compiled::invalid(format!("`{raw}` is not an ISO date"));
    };

    let tz = timezone::load(&timezone);
    let subject = DateSubject::new(input.field_name, options, &timezone);
    let condition = match parsed {
        IsoValue::DateTime(instant) if options.include_time => Expr::binary(
            subject.expr(),
            op,
            value(Value::TimestampNaive(instant.with_timezone(&tz).naive_local())),
        ),
        other => Expr::binary(subject.date(), op, value(Value::Date(other.local_date(&tz)))),
    };
    Compiled::Fragment(subject.predicate(condition))
}

pub struct DateEqualViewFilterType;

impl ViewFilterType for DateEqualViewFilterType {
    fn type_name(&self) -> &'static str {
        "date_equal"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        DATE_LIKE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        compare_iso(input, BinaryOperator::Eq)
    }
}

/// `date_before` and `date_after`.
pub struct DateLookupViewFilterType {
    type_name: &'static str,
    op: BinaryOperator,
}

impl DateLookupViewFilterType {
    pub fn before() -> Self {
        Self {
            type_name: "date_before",
            op: BinaryOperator::Lt,
        }
    }

    pub fn after() -> Self {
        Self {
            type_name: "date_after",
            op: BinaryOperator::Gt,
        }
    }
}

impl ViewFilterType for DateLookupViewFilterType {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        DATE_LIKE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        compare_iso(input, self.op)
    }
}

pub struct DateEqualsDayOfMonthViewFilterType;

impl ViewFilterType for DateEqualsDayOfMonthViewFilterType {
    fn type_name(&self) -> &'static str {
        "date_equals_day_of_month"
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        DATE_LIKE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let options = match date_options(input) {
            Ok(options) => options,
            Err(compiled) => return compiled,
        };

        let (timezone, raw) = split_timezone_and_value(input.value.trim(), options);
        let Some(raw) = raw else {
            return Compiled::NoFilter;
        };

        let day = match raw.parse::<u8>() {
            Ok(day) if raw.bytes().all(|b| b.is_ascii_digit()) && (1..=31).contains(&day) => day,
            _ => return Compiled::invalid(format!("`{raw}` is not a day of the month")),
        };

        let subject = DateSubject::new(input.field_name, options, &timezone);
        let condition = subject
            .expr()
            .extract(DatePart::Day)
            .equals(value(Value::Int(i64::from(day))));
        Compiled::Fragment(subject.predicate(condition))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodayComparison {
    Today,
    BeforeToday,
    AfterToday,
    CurrentWeek,
    CurrentMonth,
    CurrentYear,
}

/// Filters relative to the current day. The value is the timezone in which
/// "today" is determined.
pub struct DateCompareTodayViewFilterType {
    type_name: &'static str,
    comparison: TodayComparison,
}

impl DateCompareTodayViewFilterType {
    pub fn new(type_name: &'static str, comparison: TodayComparison) -> Self {
        Self {
            type_name,
            comparison,
        }
    }
}

impl ViewFilterType for DateCompareTodayViewFilterType {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        DATE_LIKE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let options = match date_options(input) {
            Ok(options) => options,
            Err(compiled) => return compiled,
        };

        let timezone = resolve_timezone(Some(input.value), options);
        let today = input
            .context
            .now()
            .with_timezone(&timezone::load(&timezone))
            .date_naive();
        let subject = DateSubject::new(input.field_name, options, &timezone);
        let today_value = || value(Value::Date(today));

        let condition = match self.comparison {
            TodayComparison::Today => subject.date().equals(today_value()),
            TodayComparison::BeforeToday => subject.date().lt(today_value()),
            TodayComparison::AfterToday => subject.date().gt(today_value()),
            TodayComparison::CurrentWeek => {
                same_parts(&subject, today, &[DatePart::Week, DatePart::Year])
            }
            TodayComparison::CurrentMonth => {
                same_parts(&subject, today, &[DatePart::Month, DatePart::Year])
            }
            TodayComparison::CurrentYear => same_parts(&subject, today, &[DatePart::Year]),
        };
        Compiled::Fragment(subject.predicate(condition))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgoUnit {
    Days,
    Months,
    Years,
}

impl AgoUnit {
    /// `date` moved `count` units into the past, `None` on overflow.
    fn shift(self, date: NaiveDate, count: i64) -> Option<NaiveDate> {
        match self {
            AgoUnit::Days => date.checked_sub_signed(TimeDelta::try_days(count)?),
            AgoUnit::Months => shift_months(date, count),
            AgoUnit::Years => shift_months(date, count.checked_mul(12)?),
        }
    }

    fn parts(self) -> &'static [DatePart] {
        match self {
            AgoUnit::Days => &[DatePart::Year, DatePart::Month, DatePart::Day],
            AgoUnit::Months => &[DatePart::Year, DatePart::Month],
            AgoUnit::Years => &[DatePart::Year],
        }
    }
}

fn shift_months(date: NaiveDate, count: i64) -> Option<NaiveDate> {
    let months = Months::new(u32::try_from(count.unsigned_abs()).ok()?);
    if count >= 0 {
        date.checked_sub_months(months)
    } else {
        date.checked_add_months(months)
    }
}

/// `date_equals_days_ago`, `date_equals_months_ago` and
/// `date_equals_years_ago`. The value is `<timezone>?<count>`.
pub struct DateEqualsXAgoViewFilterType {
    type_name: &'static str,
    unit: AgoUnit,
}

impl DateEqualsXAgoViewFilterType {
    pub fn new(type_name: &'static str, unit: AgoUnit) -> Self {
        Self { type_name, unit }
    }
}

impl ViewFilterType for DateEqualsXAgoViewFilterType {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn compatible_field_types(&self) -> &'static [Compatibility] {
        DATE_LIKE
    }

    fn compile(&self, input: &FilterInput<'_>) -> Compiled {
        let options = match date_options(input) {
            Ok(options) => options,
            Err(compiled) => return compiled,
        };

        let (timezone, raw) = split_timezone_and_value(input.value.trim(), options);
        let Some(count) = raw.and_then(|raw| raw.parse::<i64>().ok()) else {
            debug!(filter_type = self.type_name, value = input.value, "No count to filter on");
            return Compiled::NoFilter;
        };

        let today = input
            .context
            .now()
            .with_timezone(&timezone::load(&timezone))
            .date_naive();
        let Some(reference) = self.unit.shift(today, count) else {
            return Compiled::invalid(format!("{count} {:?} ago is out of range", self.unit));
        };

        let subject = DateSubject::new(input.field_name, options, &timezone);
        let condition = same_parts(&subject, reference, self.unit.parts());
        Compiled::Fragment(subject.predicate(condition))
    }
}
