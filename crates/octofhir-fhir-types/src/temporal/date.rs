//! FHIR `date`

use super::{capture, fields_compare, fields_equivalent, Fields, Precision};
use crate::error::trusted_literal_failure;
use crate::{
    Accessor, Comparator, DataType, EqualityEvaluator, PrimitiveAccessor, TypeSpec, ValueError,
    ValueResult, DATE_TYPE_SPEC,
};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<year>[0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)",
        r"(-(?P<month>0[1-9]|1[0-2])(-(?P<day>0[1-9]|[1-2][0-9]|3[0-1]))?)?$",
    ))
    .expect("date pattern")
});

/// FHIR date of year, month or day precision
///
/// Day ranges are checked against a 31-day month only; `2015-02-31` is a
/// valid literal that has no calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FhirDate {
    nil: bool,
    year: i32,
    month: u8,
    day: u8,
    precision: Precision,
}

impl FhirDate {
    /// Create a day-precision date from trusted fields
    ///
    /// # Panics
    ///
    /// Panics if a field is outside its literal range.
    #[track_caller]
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self::try_new(year, month, day).unwrap_or_else(|err| trusted_literal_failure(err))
    }

    /// Create a day-precision date, checking field ranges
    pub fn try_new(year: i32, month: u8, day: u8) -> ValueResult<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(ValueError::out_of_range(
                "date",
                format!("{:04}-{:02}-{:02}", year, month, day),
            ));
        }
        Ok(Self {
            nil: false,
            year,
            month,
            day,
            precision: Precision::Day,
        })
    }

    /// Nil date, carrying 1970-01-01 as payload
    pub const fn nil() -> Self {
        Self {
            nil: true,
            year: 1970,
            month: 1,
            day: 1,
            precision: Precision::Day,
        }
    }

    /// Parse `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    pub fn parse(s: &str) -> ValueResult<Self> {
        let caps = DATE_PATTERN
            .captures(s)
            .ok_or_else(|| ValueError::invalid_literal("date", s))?;
        let year = capture(&caps, "year").ok_or_else(|| ValueError::out_of_range("date", s))?;
        let month = capture(&caps, "month");
        let day = capture(&caps, "day");
        let precision = match (month, day) {
            (None, _) => Precision::Year,
            (Some(_), None) => Precision::Month,
            (Some(_), Some(_)) => Precision::Day,
        };
        Ok(Self::from_parts(
            year,
            month.unwrap_or(1),
            day.unwrap_or(1),
            precision,
        ))
    }

    pub(super) const fn from_parts(year: i32, month: u8, day: u8, precision: Precision) -> Self {
        Self {
            nil: false,
            year,
            month,
            day,
            precision,
        }
    }

    /// Parse a literal known to be valid
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a date literal.
    #[track_caller]
    pub fn from_literal(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| trusted_literal_failure(err))
    }

    pub fn is_nil(&self) -> bool {
        self.nil
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month, 1 below month precision
    pub fn month(&self) -> u8 {
        self.month
    }

    /// Day, 1 below day precision
    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Calendar date, when the value has day precision and exists
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        if self.nil || self.precision != Precision::Day {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), u32::from(self.day))
    }

    pub(crate) fn fields(&self) -> Fields {
        [
            i64::from(self.year),
            i64::from(self.month),
            i64::from(self.day),
            0,
            0,
            0,
            0,
        ]
    }
}

impl TryFrom<NaiveDate> for FhirDate {
    type Error = ValueError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        // chrono months and days are 1-based and fit in u8
        Self::try_new(date.year(), date.month() as u8, date.day() as u8)
    }
}

impl FromStr for FhirDate {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FhirDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nil {
            return Ok(());
        }
        write!(f, "{:04}", self.year)?;
        if self.precision >= Precision::Month {
            write!(f, "-{:02}", self.month)?;
        }
        if self.precision >= Precision::Day {
            write!(f, "-{:02}", self.day)?;
        }
        Ok(())
    }
}

impl Accessor for FhirDate {
    fn data_type(&self) -> DataType {
        DataType::Date
    }

    fn type_spec(&self) -> &'static TypeSpec {
        &DATE_TYPE_SPEC
    }

    fn is_empty(&self) -> bool {
        self.nil
    }

    fn equal(&self, other: &dyn Accessor) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_primitive(&self) -> Option<&dyn PrimitiveAccessor> {
        Some(self)
    }

    fn as_equality_evaluator(&self) -> Option<&dyn EqualityEvaluator> {
        Some(self)
    }

    fn as_comparator(&self) -> Option<&dyn Comparator> {
        Some(self)
    }
}

impl EqualityEvaluator for FhirDate {
    fn value_equal(&self, other: &dyn Accessor) -> bool {
        self.equal(other)
    }

    fn value_equivalent(&self, other: &dyn Accessor) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| match (self.nil, other.nil) {
                (false, false) => fields_equivalent(
                    &self.fields(),
                    self.precision,
                    &other.fields(),
                    other.precision,
                ),
                (a, b) => a == b,
            })
    }
}

impl PrimitiveAccessor for FhirDate {
    fn is_nil(&self) -> bool {
        self.nil
    }
}

impl Comparator for FhirDate {
    fn compare(&self, other: &dyn Accessor) -> Option<Ordering> {
        let other = other.as_any().downcast_ref::<Self>()?;
        if self.nil || other.nil {
            return None;
        }
        fields_compare(
            &self.fields(),
            self.precision,
            &other.fields(),
            other.precision,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{equal, value_equivalent};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn v(value: &dyn Accessor) -> Option<&dyn Accessor> {
        Some(value)
    }

    #[rstest]
    #[case("2015", Precision::Year)]
    #[case("2015-02", Precision::Month)]
    #[case("2015-02-07", Precision::Day)]
    #[case("0001-01-01", Precision::Day)]
    fn test_parse_precision(#[case] input: &str, #[case] precision: Precision) {
        let date = FhirDate::parse(input).unwrap();
        assert_eq!(date.precision(), precision);
        assert_eq!(date.to_string(), input);
    }

    #[rstest]
    #[case("0000")]
    #[case("15")]
    #[case("2015-13")]
    #[case("2015-00")]
    #[case("2015-02-32")]
    #[case("2015-2-7")]
    #[case("2015-02-07T10:00:00Z")]
    fn test_parse_rejects(#[case] input: &str) {
        assert_eq!(
            FhirDate::parse(input),
            Err(ValueError::invalid_literal("date", input))
        );
    }

    #[test]
    fn test_partial_fields_default_to_one() {
        let date = FhirDate::from_literal("2015");
        assert_eq!((date.year(), date.month(), date.day()), (2015, 1, 1));
    }

    #[test]
    fn test_equal_requires_same_precision() {
        let day = FhirDate::from_literal("2015-02-01");
        let month = FhirDate::from_literal("2015-02");

        assert!(!equal(v(&day), v(&month)));
        assert!(value_equivalent(v(&day), v(&month)));
        assert!(value_equivalent(v(&month), v(&day)));
        assert!(!value_equivalent(
            v(&FhirDate::from_literal("2015-03-01")),
            v(&month)
        ));
    }

    #[test]
    fn test_compare() {
        let a = FhirDate::from_literal("2015-02-07");
        assert_eq!(
            a.compare(&FhirDate::from_literal("2016")),
            Some(Ordering::Less)
        );
        assert_eq!(a.compare(&FhirDate::from_literal("2015-02")), None);
        assert_eq!(
            a.compare(&FhirDate::from_literal("2015-02-07")),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_nil() {
        let nil = FhirDate::nil();
        assert!(nil.is_nil());
        assert_eq!((nil.year(), nil.month(), nil.day()), (1970, 1, 1));
        assert!(!nil.equal(&FhirDate::new(1970, 1, 1)));
        assert_eq!(nil.to_string(), "");
    }

    #[test]
    fn test_chrono_conversion() {
        assert_eq!(
            FhirDate::from_literal("2024-02-29").to_naive_date(),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(FhirDate::from_literal("2023-02-29").to_naive_date(), None);
        assert_eq!(FhirDate::from_literal("2024-02").to_naive_date(), None);

        let date = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        assert_eq!(FhirDate::try_from(date), Ok(FhirDate::new(2020, 12, 31)));
    }
}
