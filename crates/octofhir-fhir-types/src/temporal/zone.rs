//! Time zone offsets of date-time values

use crate::error::usage_failure;
use crate::{ValueError, ValueResult};
use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use octofhir_fhir_diagnostics::FHIR0202;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static OFFSET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-])(?P<hours>[0-9]{2})(?::(?P<minutes>[0-9]{2}))?$")
        .expect("offset pattern")
});

/// Zone a date-time is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ZoneOffset {
    /// No offset given; interpreted in the local zone of the host
    #[default]
    Local,
    /// `Z` or a zero numeric offset
    Utc,
    /// Non-zero numeric offset
    Fixed(FixedOffset),
}

impl ZoneOffset {
    /// Parse `Z`, an empty string, or `±HH[:MM]`
    ///
    /// A numeric offset of zero is reported as [`ZoneOffset::Utc`].
    pub fn parse(s: &str) -> ValueResult<Self> {
        match s {
            "" => return Ok(Self::Local),
            "Z" => return Ok(Self::Utc),
            _ => {}
        }
        let invalid = || ValueError::InvalidTimeZone {
            offset: s.to_string(),
        };
        let caps = OFFSET_PATTERN.captures(s).ok_or_else(invalid)?;
        let hours: i32 = caps["hours"].parse().map_err(|_| invalid())?;
        let minutes: i32 = caps
            .name("minutes")
            .map_or(Ok(0), |m| m.as_str().parse())
            .map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        let mut seconds = hours * 3600 + minutes * 60;
        if &caps["sign"] == "-" {
            seconds = -seconds;
        }
        if seconds == 0 {
            return Ok(Self::Utc);
        }
        FixedOffset::east_opt(seconds)
            .map(Self::Fixed)
            .ok_or_else(invalid)
    }

    /// Parse an offset known to be valid
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a well-formed offset.
    #[track_caller]
    pub fn from_literal(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| usage_failure(FHIR0202, err))
    }

    /// Offset from UTC in seconds, `None` for the local zone
    pub fn offset_seconds(&self) -> Option<i32> {
        match self {
            Self::Local => None,
            Self::Utc => Some(0),
            Self::Fixed(offset) => Some(offset.local_minus_utc()),
        }
    }

    /// Fixed offset in effect for a wall-clock time in this zone
    ///
    /// `None` when the local zone has no unique offset at that time.
    pub fn resolve(&self, local: &NaiveDateTime) -> Option<FixedOffset> {
        match self {
            Self::Local => chrono::Local
                .offset_from_local_datetime(local)
                .single(),
            Self::Utc => FixedOffset::east_opt(0),
            Self::Fixed(offset) => Some(*offset),
        }
    }
}

impl From<FixedOffset> for ZoneOffset {
    fn from(offset: FixedOffset) -> Self {
        if offset.local_minus_utc() == 0 {
            Self::Utc
        } else {
            Self::Fixed(offset)
        }
    }
}

impl FromStr for ZoneOffset {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => Ok(()),
            Self::Utc => f.write_str("Z"),
            Self::Fixed(offset) => {
                let seconds = offset.local_minus_utc();
                let sign = if seconds < 0 { '-' } else { '+' };
                let minutes = seconds.abs() / 60;
                write!(f, "{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", ZoneOffset::Local)]
    #[case("Z", ZoneOffset::Utc)]
    #[case("+00:00", ZoneOffset::Utc)]
    #[case("-00", ZoneOffset::Utc)]
    fn test_parse_named(#[case] input: &str, #[case] expected: ZoneOffset) {
        assert_eq!(ZoneOffset::parse(input), Ok(expected));
    }

    #[rstest]
    #[case("+05:30", 19_800, "+05:30")]
    #[case("-08", -28_800, "-08:00")]
    #[case("+14:00", 50_400, "+14:00")]
    fn test_parse_fixed(#[case] input: &str, #[case] seconds: i32, #[case] rendered: &str) {
        let zone = ZoneOffset::parse(input).unwrap();
        assert_eq!(zone.offset_seconds(), Some(seconds));
        assert_eq!(zone.to_string(), rendered);
    }

    #[rstest]
    #[case("UTC")]
    #[case("+5")]
    #[case("+05:75")]
    #[case("+25:00")]
    #[case("05:00")]
    fn test_parse_rejects(#[case] input: &str) {
        assert_eq!(
            ZoneOffset::parse(input),
            Err(ValueError::InvalidTimeZone {
                offset: input.to_string()
            })
        );
    }

    #[test]
    #[should_panic(expected = "FHIR0202")]
    fn test_from_literal_panics() {
        ZoneOffset::from_literal("+5");
    }

    #[test]
    fn test_from_fixed_offset() {
        let zero = FixedOffset::east_opt(0).unwrap();
        assert_eq!(ZoneOffset::from(zero), ZoneOffset::Utc);
        assert_eq!(ZoneOffset::Utc.to_string(), "Z");
        assert_eq!(ZoneOffset::Local.to_string(), "");
        assert_eq!(ZoneOffset::Local.offset_seconds(), None);
    }
}
