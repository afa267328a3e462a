//! Temporal precision

use std::fmt;

/// Deepest calendar or clock field a temporal value carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Nanosecond,
}

impl Precision {
    /// Number of leading fields, year first, that this precision covers
    pub(crate) const fn depth(self) -> usize {
        self as usize + 1
    }

    /// Whether this precision includes a time of day
    pub const fn has_time(self) -> bool {
        matches!(
            self,
            Self::Hour | Self::Minute | Self::Second | Self::Nanosecond
        )
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year => write!(f, "year"),
            Self::Month => write!(f, "month"),
            Self::Day => write!(f, "day"),
            Self::Hour => write!(f, "hour"),
            Self::Minute => write!(f, "minute"),
            Self::Second => write!(f, "second"),
            Self::Nanosecond => write!(f, "nanosecond"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_and_depth() {
        assert!(Precision::Year < Precision::Day);
        assert!(Precision::Second < Precision::Nanosecond);
        assert_eq!(Precision::Year.depth(), 1);
        assert_eq!(Precision::Nanosecond.depth(), 7);
        assert!(!Precision::Day.has_time());
        assert!(Precision::Hour.has_time());
        assert_eq!(Precision::Month.to_string(), "month");
    }
}
