//! FHIR `dateTime`

use super::{
    capture, fields_compare, fields_equivalent, parse_fraction, write_clock, Fields, FhirDate,
    Precision, ZoneOffset,
};
use crate::error::trusted_literal_failure;
use crate::{
    Accessor, Comparator, DataType, EqualityEvaluator, PrimitiveAccessor, TypeSpec, ValueError,
    ValueResult, DATE_TIME_TYPE_SPEC,
};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, Timelike};
use regex::{Captures, Regex};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const YEAR: &str = r"(?P<year>[0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)";
const MONTH: &str = r"(?P<month>0[1-9]|1[0-2])";
const DAY: &str = r"(?P<day>0[1-9]|[1-2][0-9]|3[0-1])";
const HOUR: &str = r"(?P<hour>[01][0-9]|2[0-3])";
const MINUTE: &str = r"(?P<minute>[0-5][0-9])";
const SECOND: &str = r"(?P<second>[0-5][0-9]|60)";

static STRICT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{YEAR}(-{MONTH}(-{DAY}(T{HOUR}:{MINUTE}:{SECOND}(\.(?P<fraction>[0-9]+))?(?P<offset>Z|[+-](?:(?:0[0-9]|1[0-3]):[0-5][0-9]|14:00)))?)?)?$"
    ))
    .expect("strict dateTime pattern")
});

static FLUENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{YEAR}(-{MONTH}(-{DAY}(T({HOUR}(:({MINUTE}(:({SECOND}(\.(?P<fraction>[0-9]+))?)?)?)?)?(?P<offset>Z|[+-][0-9]{{2}}(:[0-9]{{2}})?)?)?)?)?)?$"
    ))
    .expect("fluent dateTime pattern")
});

/// FHIR date-time of any precision from year to nanosecond
///
/// Equality compares fields and zone as written: the same instant in two
/// zones is not equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FhirDateTime {
    nil: bool,
    date: FhirDate,
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
    zone: ZoneOffset,
    precision: Precision,
}

impl FhirDateTime {
    /// Nil date-time, carrying 1970-01-01T00:00:00Z as payload
    pub const fn nil() -> Self {
        Self {
            nil: true,
            date: FhirDate::nil(),
            hour: 0,
            minute: 0,
            second: 0,
            nanosecond: 0,
            zone: ZoneOffset::Utc,
            precision: Precision::Nanosecond,
        }
    }

    /// Parse a strict literal
    ///
    /// A time part must carry hour, minute, second and a zone offset.
    pub fn parse(s: &str) -> ValueResult<Self> {
        let caps = STRICT_PATTERN
            .captures(s)
            .ok_or_else(|| ValueError::invalid_literal("dateTime", s))?;
        Self::from_captures(s, &caps)
    }

    /// Parse a lenient literal
    ///
    /// Accepts a hanging `T` or `:`, a time cut off after the hour or
    /// minute, and a missing offset, which means the local zone.
    pub fn parse_fluent(s: &str) -> ValueResult<Self> {
        let caps = FLUENT_PATTERN
            .captures(s)
            .ok_or_else(|| ValueError::invalid_literal("dateTime", s))?;
        Self::from_captures(s, &caps)
    }

    /// Parse a strict literal known to be valid
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a strict dateTime literal.
    #[track_caller]
    pub fn from_literal(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| trusted_literal_failure(err))
    }

    fn from_captures(s: &str, caps: &Captures<'_>) -> ValueResult<Self> {
        let year = capture(caps, "year").ok_or_else(|| ValueError::out_of_range("dateTime", s))?;
        let month: Option<u8> = capture(caps, "month");
        let day: Option<u8> = capture(caps, "day");
        let hour: Option<u8> = capture(caps, "hour");
        let minute: Option<u8> = capture(caps, "minute");
        let second: Option<u8> = capture(caps, "second");
        let fraction = caps.name("fraction").map(|m| parse_fraction(m.as_str()));

        let precision = if fraction.is_some() {
            Precision::Nanosecond
        } else if second.is_some() {
            Precision::Second
        } else if minute.is_some() {
            Precision::Minute
        } else if hour.is_some() {
            Precision::Hour
        } else if day.is_some() {
            Precision::Day
        } else if month.is_some() {
            Precision::Month
        } else {
            Precision::Year
        };
        let zone = match caps.name("offset") {
            Some(offset) => ZoneOffset::parse(offset.as_str())?,
            None => ZoneOffset::Local,
        };

        let date_precision = precision.min(Precision::Day);
        Ok(Self {
            nil: false,
            date: FhirDate::from_parts(year, month.unwrap_or(1), day.unwrap_or(1), date_precision),
            hour: hour.unwrap_or(0),
            minute: minute.unwrap_or(0),
            second: second.unwrap_or(0),
            nanosecond: fraction.unwrap_or(0),
            zone,
            precision,
        })
    }

    pub fn is_nil(&self) -> bool {
        self.nil
    }

    /// Date part, at most day precision
    pub fn date(&self) -> FhirDate {
        self.date
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn nanosecond(&self) -> u32 {
        self.nanosecond
    }

    pub fn zone(&self) -> ZoneOffset {
        self.zone
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Wall-clock time, when the value reaches second precision
    pub fn to_naive_date_time(&self) -> Option<NaiveDateTime> {
        if self.nil || self.precision < Precision::Second {
            return None;
        }
        // a leap second maps onto chrono's extended nanosecond range
        let (second, nanos) = if self.second == 60 {
            (59, self.nanosecond + 1_000_000_000)
        } else {
            (self.second, self.nanosecond)
        };
        self.date.to_naive_date()?.and_hms_nano_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(second),
            nanos,
        )
    }

    /// Instant in a fixed offset, resolving the local zone on this host
    pub fn to_fixed_offset(&self) -> Option<DateTime<FixedOffset>> {
        let local = self.to_naive_date_time()?;
        let offset = self.zone.resolve(&local)?;
        local.and_local_timezone(offset).single()
    }

    fn fields(&self) -> Fields {
        let mut fields = self.date.fields();
        fields[3] = i64::from(self.hour);
        fields[4] = i64::from(self.minute);
        fields[5] = i64::from(self.second);
        fields[6] = i64::from(self.nanosecond);
        fields
    }

    /// Zones only matter once both values carry a time
    fn zones_agree(&self, other: &Self) -> bool {
        !(self.precision.has_time() && other.precision.has_time()) || self.zone == other.zone
    }
}

impl From<DateTime<FixedOffset>> for FhirDateTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        let local = value.naive_local();
        let date = local.date();
        let (second, nanosecond) = if local.nanosecond() >= 1_000_000_000 {
            (60, local.nanosecond() - 1_000_000_000)
        } else {
            (local.second() as u8, local.nanosecond())
        };
        Self {
            nil: false,
            date: FhirDate::from_parts(
                date.year(),
                date.month() as u8,
                date.day() as u8,
                Precision::Day,
            ),
            hour: local.hour() as u8,
            minute: local.minute() as u8,
            second,
            nanosecond,
            zone: ZoneOffset::from(*value.offset()),
            precision: Precision::Nanosecond,
        }
    }
}

impl FromStr for FhirDateTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FhirDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nil {
            return Ok(());
        }
        write!(f, "{}", self.date)?;
        if self.precision.has_time() {
            f.write_str("T")?;
            write_clock(f, &self.fields(), self.precision)?;
            write!(f, "{}", self.zone)?;
        }
        Ok(())
    }
}

impl Accessor for FhirDateTime {
    fn data_type(&self) -> DataType {
        DataType::DateTime
    }

    fn type_spec(&self) -> &'static TypeSpec {
        &DATE_TIME_TYPE_SPEC
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

impl EqualityEvaluator for FhirDateTime {
    fn value_equal(&self, other: &dyn Accessor) -> bool {
        self.equal(other)
    }

    fn value_equivalent(&self, other: &dyn Accessor) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| match (self.nil, other.nil) {
                (false, false) => {
                    self.zones_agree(other)
                        && fields_equivalent(
                            &self.fields(),
                            self.precision,
                            &other.fields(),
                            other.precision,
                        )
                }
                (a, b) => a == b,
            })
    }
}

impl PrimitiveAccessor for FhirDateTime {
    fn is_nil(&self) -> bool {
        self.nil
    }
}

impl Comparator for FhirDateTime {
    fn compare(&self, other: &dyn Accessor) -> Option<Ordering> {
        let other = other.as_any().downcast_ref::<Self>()?;
        if self.nil || other.nil || !self.zones_agree(other) {
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
    #[case("2015-02-07T13:28:17Z", Precision::Second)]
    #[case("2015-02-07T13:28:17.239+02:00", Precision::Nanosecond)]
    #[case("2017-01-01T00:00:00.000-05:00", Precision::Nanosecond)]
    fn test_parse_strict(#[case] input: &str, #[case] precision: Precision) {
        let value = FhirDateTime::parse(input).unwrap();
        assert_eq!(value.precision(), precision);
    }

    #[rstest]
    #[case("2015-02-07T13:28:17")]
    #[case("2015-02-07T13:28Z")]
    #[case("2015-02-07T")]
    #[case("2015-02-07T24:00:00Z")]
    #[case("2015-02-07T13:28:17+15:00")]
    fn test_parse_strict_rejects(#[case] input: &str) {
        assert_eq!(
            FhirDateTime::parse(input),
            Err(ValueError::invalid_literal("dateTime", input))
        );
    }

    #[rstest]
    #[case("2015-02-07T", Precision::Day, "2015-02-07")]
    #[case("2015-02-07T13", Precision::Hour, "2015-02-07T13")]
    #[case("2015-02-07T13:", Precision::Hour, "2015-02-07T13")]
    #[case("2015-02-07T13:28", Precision::Minute, "2015-02-07T13:28")]
    #[case("2015-02-07T13:28:17", Precision::Second, "2015-02-07T13:28:17")]
    #[case("2015-02-07T13:28Z", Precision::Minute, "2015-02-07T13:28Z")]
    #[case("2015-02-07T13:28:17-05", Precision::Second, "2015-02-07T13:28:17-05:00")]
    fn test_parse_fluent(
        #[case] input: &str,
        #[case] precision: Precision,
        #[case] rendered: &str,
    ) {
        let value = FhirDateTime::parse_fluent(input).unwrap();
        assert_eq!(value.precision(), precision);
        assert_eq!(value.to_string(), rendered);
    }

    #[test]
    fn test_fluent_missing_offset_is_local() {
        let value = FhirDateTime::parse_fluent("2015-02-07T13:28:17").unwrap();
        assert_eq!(value.zone(), ZoneOffset::Local);
    }

    #[test]
    fn test_fluent_rejects_out_of_range_offset() {
        assert_eq!(
            FhirDateTime::parse_fluent("2015-02-07T13:28+99:00"),
            Err(ValueError::InvalidTimeZone {
                offset: "+99:00".to_string()
            })
        );
    }

    #[rstest]
    #[case("2015-02-07TZ")]
    #[case("2015-02-07T+01:00")]
    #[case("2015-02Z")]
    fn test_fluent_rejects_offset_without_clock(#[case] input: &str) {
        assert_eq!(
            FhirDateTime::parse_fluent(input),
            Err(ValueError::invalid_literal("dateTime", input))
        );
    }

    #[test]
    fn test_fraction_truncated_to_nanoseconds() {
        let value = FhirDateTime::from_literal("2015-02-07T13:28:17.1234567899Z");
        assert_eq!(value.nanosecond(), 123_456_789);
        assert_eq!(value.to_string(), "2015-02-07T13:28:17.123456789Z");
    }

    #[test]
    fn test_render_round_trips() {
        for literal in [
            "2015",
            "2015-02-07",
            "2015-02-07T13:28:17Z",
            "2015-02-07T13:28:17.239+02:00",
            "2015-02-07T13:28:17.0-05:00",
        ] {
            assert_eq!(FhirDateTime::from_literal(literal).to_string(), literal);
        }
    }

    #[test]
    fn test_zero_offset_is_utc() {
        let a = FhirDateTime::from_literal("2015-02-07T13:28:17+00:00");
        let b = FhirDateTime::from_literal("2015-02-07T13:28:17Z");
        assert!(equal(v(&a), v(&b)));
        assert_eq!(a.to_string(), "2015-02-07T13:28:17Z");
    }

    #[test]
    fn test_equality_and_equivalence() {
        let second = FhirDateTime::from_literal("2015-02-07T13:28:17Z");
        let day = FhirDateTime::from_literal("2015-02-07");
        let shifted = FhirDateTime::from_literal("2015-02-07T14:28:17+01:00");

        assert!(!equal(v(&second), v(&day)));
        assert!(value_equivalent(v(&second), v(&day)));
        assert!(!equal(v(&second), v(&shifted)));
        assert!(!value_equivalent(v(&second), v(&shifted)));
    }

    #[test]
    fn test_compare() {
        let a = FhirDateTime::from_literal("2015-02-07T13:28:17Z");
        let b = FhirDateTime::from_literal("2015-02-07T13:28:18Z");
        assert_eq!(a.compare(&b), Some(Ordering::Less));
        assert_eq!(a.compare(&FhirDateTime::from_literal("2015-02-07")), None);
        assert_eq!(
            a.compare(&FhirDateTime::from_literal("2015-02-08")),
            Some(Ordering::Less)
        );
        assert_eq!(
            a.compare(&FhirDateTime::from_literal("2015-02-07T13:28:18+01:00")),
            None
        );
    }

    #[test]
    fn test_chrono_conversion() {
        let value = FhirDateTime::from_literal("2015-02-07T13:28:17.5+02:00");
        let fixed = value.to_fixed_offset().unwrap();
        assert_eq!(fixed.to_rfc3339(), "2015-02-07T13:28:17.500+02:00");
        assert_eq!(FhirDateTime::from(fixed), value);

        assert_eq!(FhirDateTime::from_literal("2015-02-07").to_fixed_offset(), None);
        assert_eq!(FhirDateTime::nil().to_naive_date_time(), None);
    }

    #[test]
    fn test_chrono_leap_second() {
        let naive = chrono::NaiveDate::from_ymd_opt(2016, 12, 31)
            .unwrap()
            .and_hms_nano_opt(23, 59, 59, 1_500_000_000)
            .unwrap();
        let value = FhirDateTime::from(naive.and_utc().fixed_offset());

        assert_eq!(value.second(), 60);
        assert_eq!(value.nanosecond(), 500_000_000);
        assert_eq!(value.to_string(), "2016-12-31T23:59:60.5Z");
        assert_eq!(value.to_naive_date_time(), Some(naive));
        assert_eq!(value, FhirDateTime::from_literal("2016-12-31T23:59:60.5Z"));
    }

    #[test]
    fn test_nil() {
        let nil = FhirDateTime::nil();
        assert!(nil.is_nil());
        assert!(Accessor::is_empty(&nil));
        assert_eq!(nil.to_string(), "");
    }
}
