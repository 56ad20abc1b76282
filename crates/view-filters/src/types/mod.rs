//! The built-in view filter types.

use crate::filter::{Compatibility, Not, ViewFilterType};
use boolean::BooleanViewFilterType;
use date::{
    AgoUnit, DateCompareTodayViewFilterType, DateEqualViewFilterType,
    DateEqualsDayOfMonthViewFilterType, DateEqualsXAgoViewFilterType, DateLookupViewFilterType,
    TodayComparison,
};
use empty::EmptyViewFilterType;
use file::{FilenameContainsViewFilterType, HasFileTypeViewFilterType};
use has::ManyToManyHasViewFilterType;
use link_row::LinkRowContainsViewFilterType;
use number::{HigherThanViewFilterType, LowerThanViewFilterType};
use select::SingleSelectEqualViewFilterType;
use text::{
    ContainsViewFilterType, ContainsWordViewFilterType, EqualViewFilterType,
    LengthIsLowerThanViewFilterType,
};

pub mod boolean;
pub mod date;
pub mod empty;
pub mod file;
pub mod has;
pub mod link_row;
pub mod number;
pub mod select;
pub mod text;

use Compatibility::{Field, Formula};

pub(crate) const TEXT_LIKE: &[Compatibility] = &[
    Field("text"),
    Field("long_text"),
    Field("url"),
    Field("email"),
    Field("phone_number"),
];

pub(crate) const DATE_LIKE: &[Compatibility] = &[
    Field("date"),
    Field("last_modified"),
    Field("created_on"),
    Formula(&["date"]),
];

/// Every built-in filter type, positive variants followed by their negation.
pub fn builtin() -> Vec<Box<dyn ViewFilterType>> {
    vec![
        Box::new(EqualViewFilterType),
        Box::new(Not::new("not_equal", EqualViewFilterType)),
        Box::new(FilenameContainsViewFilterType),
        Box::new(HasFileTypeViewFilterType),
        Box::new(ContainsViewFilterType),
        Box::new(Not::new("contains_not", ContainsViewFilterType)),
        Box::new(ContainsWordViewFilterType),
        Box::new(Not::new("doesnt_contain_word", ContainsWordViewFilterType)),
        Box::new(LengthIsLowerThanViewFilterType),
        Box::new(HigherThanViewFilterType),
        Box::new(LowerThanViewFilterType),
        Box::new(DateEqualViewFilterType),
        Box::new(Not::new("date_not_equal", DateEqualViewFilterType)),
        Box::new(DateLookupViewFilterType::before()),
        Box::new(DateLookupViewFilterType::after()),
        Box::new(DateEqualsDayOfMonthViewFilterType),
        Box::new(DateCompareTodayViewFilterType::new(
            "date_equals_today",
            TodayComparison::Today,
        )),
        Box::new(DateCompareTodayViewFilterType::new(
            "date_before_today",
            TodayComparison::BeforeToday,
        )),
        Box::new(DateCompareTodayViewFilterType::new(
            "date_after_today",
            TodayComparison::AfterToday,
        )),
        Box::new(DateCompareTodayViewFilterType::new(
            "date_equals_week",
            TodayComparison::CurrentWeek,
        )),
        Box::new(DateCompareTodayViewFilterType::new(
            "date_equals_month",
            TodayComparison::CurrentMonth,
        )),
        Box::new(DateCompareTodayViewFilterType::new(
            "date_equals_year",
            TodayComparison::CurrentYear,
        )),
        Box::new(DateEqualsXAgoViewFilterType::new(
            "date_equals_days_ago",
            AgoUnit::Days,
        )),
        Box::new(DateEqualsXAgoViewFilterType::new(
            "date_equals_months_ago",
            AgoUnit::Months,
        )),
        Box::new(DateEqualsXAgoViewFilterType::new(
            "date_equals_years_ago",
            AgoUnit::Years,
        )),
        Box::new(SingleSelectEqualViewFilterType),
        Box::new(Not::new(
            "single_select_not_equal",
            SingleSelectEqualViewFilterType,
        )),
        Box::new(BooleanViewFilterType),
        Box::new(ManyToManyHasViewFilterType::link_row()),
        Box::new(Not::new(
            "link_row_has_not",
            ManyToManyHasViewFilterType::link_row(),
        )),
        Box::new(LinkRowContainsViewFilterType),
        Box::new(Not::new(
            "link_row_not_contains",
            LinkRowContainsViewFilterType,
        )),
        Box::new(ManyToManyHasViewFilterType::multiple_select()),
        Box::new(Not::new(
            "multiple_select_has_not",
            ManyToManyHasViewFilterType::multiple_select(),
        )),
        Box::new(ManyToManyHasViewFilterType::multiple_collaborators()),
        Box::new(Not::new(
            "multiple_collaborators_has_not",
            ManyToManyHasViewFilterType::multiple_collaborators(),
        )),
        Box::new(EmptyViewFilterType),
        Box::new(Not::new("not_empty", EmptyViewFilterType)),
    ]
}
