//! FHIR temporal primitives: `date`, `dateTime` and `time`
//!
//! Each value records the deepest field its literal supplied as a
//! [`Precision`]. Fields below that precision hold defaults and only take
//! part in comparisons up to the precision both operands share.

mod date;
mod date_time;
mod precision;
mod time;
mod zone;

pub use date::FhirDate;
pub use date_time::FhirDateTime;
pub use precision::Precision;
pub use time::FhirTime;
pub use zone::ZoneOffset;

use regex::Captures;
use std::cmp::Ordering;
use std::fmt;

/// Calendar and clock fields, year first
pub(crate) type Fields = [i64; 7];

const NANOS_DIGITS: usize = 9;

/// Numeric value of an optional named group
pub(crate) fn capture<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Nanoseconds of a fraction literal, truncated to nine digits
pub(crate) fn parse_fraction(digits: &str) -> u32 {
    digits
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(NANOS_DIGITS)
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// Write `.fraction` without trailing zeros, keeping at least one digit
pub(crate) fn write_fraction(f: &mut fmt::Formatter<'_>, nanos: u32) -> fmt::Result {
    let digits = format!("{:09}", nanos);
    let trimmed = digits.trim_end_matches('0');
    if trimmed.is_empty() {
        f.write_str(".0")
    } else {
        write!(f, ".{}", trimmed)
    }
}

/// Write the clock part of a value at the given precision
pub(crate) fn write_clock(
    f: &mut fmt::Formatter<'_>,
    fields: &Fields,
    precision: Precision,
) -> fmt::Result {
    write!(f, "{:02}", fields[3])?;
    if precision >= Precision::Minute {
        write!(f, ":{:02}", fields[4])?;
    }
    if precision >= Precision::Second {
        write!(f, ":{:02}", fields[5])?;
    }
    if precision == Precision::Nanosecond {
        write_fraction(f, fields[6] as u32)?;
    }
    Ok(())
}

/// Fields agree up to the shared precision
pub(crate) fn fields_equivalent(a: &Fields, pa: Precision, b: &Fields, pb: Precision) -> bool {
    let depth = pa.min(pb).depth();
    a[..depth] == b[..depth]
}

/// Order fields up to the shared precision
///
/// `None` when the values agree there but one is more precise.
pub(crate) fn fields_compare(
    a: &Fields,
    pa: Precision,
    b: &Fields,
    pb: Precision,
) -> Option<Ordering> {
    let depth = pa.min(pb).depth();
    match a[..depth].cmp(&b[..depth]) {
        Ordering::Equal if pa != pb => None,
        ordering => Some(ordering),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("5", 500_000_000)]
    #[case("123", 123_000_000)]
    #[case("000000001", 1)]
    #[case("1234567899", 123_456_789)]
    fn test_parse_fraction(#[case] digits: &str, #[case] nanos: u32) {
        assert_eq!(parse_fraction(digits), nanos);
    }

    #[test]
    fn test_fields_compare() {
        let a: Fields = [2015, 2, 7, 0, 0, 0, 0];
        let b: Fields = [2015, 2, 1, 0, 0, 0, 0];

        assert_eq!(
            fields_compare(&a, Precision::Day, &b, Precision::Day),
            Some(Ordering::Greater)
        );
        assert_eq!(fields_compare(&a, Precision::Day, &b, Precision::Month), None);
        assert!(fields_equivalent(&a, Precision::Day, &b, Precision::Month));
        assert!(!fields_equivalent(&a, Precision::Day, &b, Precision::Day));
    }
}
