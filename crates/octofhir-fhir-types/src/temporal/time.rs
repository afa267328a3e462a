//! FHIR `time`

use super::{capture, fields_compare, fields_equivalent, parse_fraction, write_clock, Fields, Precision};
use crate::error::trusted_literal_failure;
use crate::{
    Accessor, Comparator, DataType, EqualityEvaluator, PrimitiveAccessor, TypeSpec, ValueError,
    ValueResult, TIME_TYPE_SPEC,
};
use chrono::{NaiveTime, Timelike};
use regex::{Captures, Regex};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static STRICT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<hour>[01][0-9]|2[0-3]):(?P<minute>[0-5][0-9]):(?P<second>[0-5][0-9]|60)",
        r"(\.(?P<fraction>[0-9]+))?$",
    ))
    .expect("strict time pattern")
});

static FLUENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<hour>[01][0-9]|2[0-3])(:((?P<minute>[0-5][0-9])",
        r"(:((?P<second>[0-5][0-9]|60)(\.(?P<fraction>[0-9]+))?)?)?)?)?$",
    ))
    .expect("fluent time pattern")
});

/// FHIR time of day, from hour to nanosecond precision, without a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FhirTime {
    nil: bool,
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
    precision: Precision,
}

impl FhirTime {
    /// Create a second-precision time from trusted fields
    ///
    /// # Panics
    ///
    /// Panics if a field is outside its literal range.
    #[track_caller]
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self::try_new(hour, minute, second).unwrap_or_else(|err| trusted_literal_failure(err))
    }

    /// Create a second-precision time, checking field ranges
    pub fn try_new(hour: u8, minute: u8, second: u8) -> ValueResult<Self> {
        if hour > 23 || minute > 59 || second > 60 {
            return Err(ValueError::out_of_range(
                "time",
                format!("{:02}:{:02}:{:02}", hour, minute, second),
            ));
        }
        Ok(Self {
            nil: false,
            hour,
            minute,
            second,
            nanosecond: 0,
            precision: Precision::Second,
        })
    }

    /// Nil time, carrying midnight as payload
    pub const fn nil() -> Self {
        Self {
            nil: true,
            hour: 0,
            minute: 0,
            second: 0,
            nanosecond: 0,
            precision: Precision::Nanosecond,
        }
    }

    /// Parse a strict `HH:MM:SS(.fraction)` literal
    pub fn parse(s: &str) -> ValueResult<Self> {
        let caps = STRICT_PATTERN
            .captures(s)
            .ok_or_else(|| ValueError::invalid_literal("time", s))?;
        Ok(Self::from_captures(&caps))
    }

    /// Parse a lenient literal that may stop after the hour or minute
    pub fn parse_fluent(s: &str) -> ValueResult<Self> {
        let caps = FLUENT_PATTERN
            .captures(s)
            .ok_or_else(|| ValueError::invalid_literal("time", s))?;
        Ok(Self::from_captures(&caps))
    }

    /// Parse a strict literal known to be valid
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a strict time literal.
    #[track_caller]
    pub fn from_literal(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| trusted_literal_failure(err))
    }

    fn from_captures(caps: &Captures<'_>) -> Self {
        let minute: Option<u8> = capture(caps, "minute");
        let second: Option<u8> = capture(caps, "second");
        let fraction = caps.name("fraction").map(|m| parse_fraction(m.as_str()));
        let precision = if fraction.is_some() {
            Precision::Nanosecond
        } else if second.is_some() {
            Precision::Second
        } else if minute.is_some() {
            Precision::Minute
        } else {
            Precision::Hour
        };
        Self {
            nil: false,
            hour: capture(caps, "hour").unwrap_or(0),
            minute: minute.unwrap_or(0),
            second: second.unwrap_or(0),
            nanosecond: fraction.unwrap_or(0),
            precision,
        }
    }

    pub fn is_nil(&self) -> bool {
        self.nil
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

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Clock time, when the value reaches second precision
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        if self.nil || self.precision < Precision::Second {
            return None;
        }
        let (second, nanos) = if self.second == 60 {
            (59, self.nanosecond + 1_000_000_000)
        } else {
            (self.second, self.nanosecond)
        };
        NaiveTime::from_hms_nano_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(second),
            nanos,
        )
    }

    fn fields(&self) -> Fields {
        [
            0,
            1,
            1,
            i64::from(self.hour),
            i64::from(self.minute),
            i64::from(self.second),
            i64::from(self.nanosecond),
        ]
    }
}

impl From<NaiveTime> for FhirTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            nil: false,
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
            nanosecond: time.nanosecond(),
            precision: Precision::Nanosecond,
        }
    }
}

impl FromStr for FhirTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FhirTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nil {
            return Ok(());
        }
        write_clock(f, &self.fields(), self.precision)
    }
}

impl Accessor for FhirTime {
    fn data_type(&self) -> DataType {
        DataType::Time
    }

    fn type_spec(&self) -> &'static TypeSpec {
        &TIME_TYPE_SPEC
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

impl EqualityEvaluator for FhirTime {
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

impl PrimitiveAccessor for FhirTime {
    fn is_nil(&self) -> bool {
        self.nil
    }
}

impl Comparator for FhirTime {
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
