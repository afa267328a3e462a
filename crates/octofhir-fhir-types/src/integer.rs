//! FHIR integer family: `integer`, `positiveInt` and `unsignedInt`
//!
//! All kinds hold a signed 32-bit payload; the restricted kinds enforce
//! their lower bound at construction. Arithmetic results leave the
//! restricted kinds, so negation always yields a plain `integer`.

use crate::decimal::{number_compare, number_value_equal, number_value_equivalent};
use crate::error::trusted_literal_failure;
use crate::{
    Accessor, Comparator, DataType, EqualityEvaluator, Negator, NumberAccessor,
    PrimitiveAccessor, TypeSpec, ValueError, ValueResult, INTEGER_TYPE_SPEC,
    POSITIVE_INT_TYPE_SPEC, UNSIGNED_INT_TYPE_SPEC,
};
use regex::Regex;
use rust_decimal::Decimal;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?([0]|([1-9][0-9]*))$").expect("integer pattern"));
static POSITIVE_INT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]*$").expect("positiveInt pattern"));
static UNSIGNED_INT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0]|([1-9][0-9]*))$").expect("unsignedInt pattern"));

fn negate_i32(value: i32) -> ValueResult<FhirInteger> {
    value
        .checked_neg()
        .map(FhirInteger::new)
        .ok_or_else(|| ValueError::overflow("negate"))
}

macro_rules! integer_type {
    (
        $(#[$meta:meta])*
        $name:ident, $data_type:ident, $type_spec:ident, $pattern:ident, $min:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            nil: bool,
            value: i32,
        }

        impl $name {
            /// Smallest payload this kind accepts
            pub const MIN: i32 = $min;

            /// Create a value from a trusted payload
            ///
            /// # Panics
            ///
            /// Panics if `value` is below [`MIN`](Self::MIN).
            #[track_caller]
            pub fn new(value: i32) -> Self {
                Self::try_new(value).unwrap_or_else(|err| trusted_literal_failure(err))
            }

            /// Create a value, checking the lower bound
            pub fn try_new(value: i32) -> ValueResult<Self> {
                if !(Self::MIN..).contains(&value) {
                    return Err(ValueError::out_of_range(
                        $type_spec.name().name(),
                        value.to_string(),
                    ));
                }
                Ok(Self { nil: false, value })
            }

            /// Nil value, carrying zero as payload
            pub const fn nil() -> Self {
                Self {
                    nil: true,
                    value: 0,
                }
            }

            /// Parse a literal of this kind
            pub fn parse(s: &str) -> ValueResult<Self> {
                let type_name = $type_spec.name().name();
                if !$pattern.is_match(s) {
                    return Err(ValueError::invalid_literal(type_name, s));
                }
                let value = s
                    .parse::<i32>()
                    .map_err(|_| ValueError::out_of_range(type_name, s))?;
                Self::try_new(value)
            }

            /// Parse a literal known to be valid
            ///
            /// # Panics
            ///
            /// Panics if `s` is not a valid literal of this kind.
            #[track_caller]
            pub fn from_literal(s: &str) -> Self {
                Self::parse(s).unwrap_or_else(|err| trusted_literal_failure(err))
            }

            pub fn is_nil(&self) -> bool {
                self.nil
            }

            /// Payload, zero when nil
            pub fn value(&self) -> i32 {
                self.value
            }

            /// Negate into a plain integer
            ///
            /// A nil value negates to a nil integer.
            pub fn negate(&self) -> ValueResult<FhirInteger> {
                if self.nil {
                    return Ok(FhirInteger::nil());
                }
                negate_i32(self.value)
            }
        }

        impl FromStr for $name {
            type Err = ValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.nil {
                    return Ok(());
                }
                write!(f, "{}", self.value)
            }
        }

        impl Accessor for $name {
            fn data_type(&self) -> DataType {
                DataType::$data_type
            }

            fn type_spec(&self) -> &'static TypeSpec {
                &$type_spec
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

            fn as_negator(&self) -> Option<&dyn Negator> {
                Some(self)
            }

            fn as_number(&self) -> Option<&dyn NumberAccessor> {
                Some(self)
            }
        }

        impl EqualityEvaluator for $name {
            fn value_equal(&self, other: &dyn Accessor) -> bool {
                number_value_equal(self.decimal_value(), other)
            }

            fn value_equivalent(&self, other: &dyn Accessor) -> bool {
                number_value_equivalent(self.decimal_value(), other)
            }
        }

        impl PrimitiveAccessor for $name {
            fn is_nil(&self) -> bool {
                self.nil
            }
        }

        impl Comparator for $name {
            fn compare(&self, other: &dyn Accessor) -> Option<Ordering> {
                number_compare(self.decimal_value(), other)
            }
        }

        impl Negator for $name {
            fn negate(&self) -> ValueResult<Box<dyn Accessor>> {
                Ok(Box::new($name::negate(self)?))
            }
        }

        impl NumberAccessor for $name {
            fn decimal_value(&self) -> Option<Decimal> {
                (!self.nil).then(|| Decimal::from(self.value))
            }

            fn integer_value(&self) -> Option<i32> {
                (!self.nil).then_some(self.value)
            }
        }
    };
}

integer_type!(
    /// FHIR `integer`: any signed 32-bit value
    FhirInteger, Integer, INTEGER_TYPE_SPEC, INTEGER_PATTERN, i32::MIN
);

integer_type!(
    /// FHIR `positiveInt`: 1 and above
    FhirPositiveInt, PositiveInt, POSITIVE_INT_TYPE_SPEC, POSITIVE_INT_PATTERN, 1
);

integer_type!(
    /// FHIR `unsignedInt`: 0 and above
    FhirUnsignedInt, UnsignedInt, UNSIGNED_INT_TYPE_SPEC, UNSIGNED_INT_PATTERN, 0
);

impl From<i32> for FhirInteger {
    fn from(value: i32) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{equal, value_equal, value_equivalent, FhirDecimal};
    use rstest::rstest;

    fn v(value: &dyn Accessor) -> Option<&dyn Accessor> {
        Some(value)
    }

    #[rstest]
    #[case("0", Some(0))]
    #[case("-17", Some(-17))]
    #[case("2147483647", Some(i32::MAX))]
    #[case("-2147483648", Some(i32::MIN))]
    #[case("007", None)]
    #[case("-0x1", None)]
    #[case("+5", None)]
    fn test_integer_parse(#[case] input: &str, #[case] expected: Option<i32>) {
        assert_eq!(FhirInteger::parse(input).ok().map(|i| i.value()), expected);
    }

    #[test]
    fn test_integer_parse_out_of_range() {
        assert!(matches!(
            FhirInteger::parse("2147483648"),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[rstest]
    #[case("1", true)]
    #[case("+12", true)]
    #[case("0", false)]
    #[case("-1", false)]
    fn test_positive_int_parse(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(FhirPositiveInt::parse(input).is_ok(), valid);
    }

    #[rstest]
    #[case("0", true)]
    #[case("42", true)]
    #[case("-1", false)]
    #[case("+1", false)]
    fn test_unsigned_int_parse(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(FhirUnsignedInt::parse(input).is_ok(), valid);
    }

    #[test]
    fn test_lower_bounds() {
        assert!(FhirPositiveInt::try_new(0).is_err());
        assert!(FhirUnsignedInt::try_new(-1).is_err());
        assert!(FhirUnsignedInt::try_new(0).is_ok());
    }

    #[test]
    #[should_panic(expected = "FHIR0200")]
    fn test_new_panics_below_minimum() {
        FhirPositiveInt::new(0);
    }

    #[test]
    fn test_negate() {
        assert_eq!(FhirInteger::new(5).negate(), Ok(FhirInteger::new(-5)));
        assert_eq!(FhirPositiveInt::new(3).negate(), Ok(FhirInteger::new(-3)));
        assert!(FhirInteger::nil().negate().unwrap().is_nil());
        assert_eq!(
            FhirInteger::new(i32::MIN).negate(),
            Err(ValueError::overflow("negate"))
        );
    }

    #[test]
    fn test_negator_yields_plain_integer() {
        let negated = Negator::negate(&FhirUnsignedInt::new(4)).unwrap();
        assert_eq!(negated.data_type(), DataType::Integer);
    }

    #[test]
    fn test_cross_kind_equality() {
        let integer = FhirInteger::new(3);
        let positive = FhirPositiveInt::new(3);
        let decimal = FhirDecimal::from_literal("3.0");

        assert!(!equal(v(&integer), v(&positive)));
        assert!(value_equal(v(&integer), v(&positive)));
        assert!(!value_equal(v(&integer), v(&decimal)));
        assert!(value_equivalent(v(&integer), v(&decimal)));
        assert!(value_equal(v(&integer), v(&FhirDecimal::from_literal("3"))));
    }

    #[test]
    fn test_compare() {
        let a = FhirUnsignedInt::new(2);
        assert_eq!(a.compare(&FhirInteger::new(3)), Some(Ordering::Less));
        assert_eq!(
            a.compare(&FhirDecimal::from_literal("1.5")),
            Some(Ordering::Greater)
        );
        assert_eq!(a.compare(&FhirInteger::nil()), None);
    }

    #[test]
    fn test_display_and_type() {
        assert_eq!(FhirPositiveInt::from_literal("+7").to_string(), "7");
        assert_eq!(FhirInteger::nil().to_string(), "");
        assert_eq!(FhirUnsignedInt::new(1).type_spec().to_string(), "FHIR.unsignedInt");
        assert!(FhirPositiveInt::new(1).type_spec().extends(&INTEGER_TYPE_SPEC));
    }
}
