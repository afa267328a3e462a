//! FHIR `decimal` and the precision algorithm
//!
//! A decimal keeps the scale of its literal, so `1.20` and `1.2` are
//! different values for equality. Equivalence compares at the resolution of
//! the least precise operand, where precision is the number of fractional
//! digits up to the last non-zero one.

use crate::error::trusted_literal_failure;
use crate::{
    Accessor, Comparator, DataType, EqualityEvaluator, Negator, NumberAccessor,
    PrimitiveAccessor, TypeSpec, ValueError, ValueResult, DECIMAL_TYPE_SPEC,
};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;

static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").expect("decimal pattern")
});

/// Count of significant fractional digits
///
/// Trailing zero digits of the fraction are not significant:
/// `precision_of(1.230) == 2`, `precision_of(5.000) == 0`.
pub fn precision_of(d: &Decimal) -> u32 {
    let mut scale = d.scale();
    let mut mantissa = d.mantissa();
    while scale > 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    scale
}

/// Truncate the more precise operand down to the precision of the other
///
/// The less precise operand is returned unchanged; values are truncated,
/// never rounded.
pub fn least_precision_truncate(a: Decimal, b: Decimal) -> (Decimal, Decimal) {
    let (pa, pb) = (precision_of(&a), precision_of(&b));
    match pa.cmp(&pb) {
        Ordering::Greater => (a.round_dp_with_strategy(pb, RoundingStrategy::ToZero), b),
        Ordering::Less => (a, b.round_dp_with_strategy(pa, RoundingStrategy::ToZero)),
        Ordering::Equal => (a, b),
    }
}

/// Equality of value and scale
pub(crate) fn exact_equal(a: &Decimal, b: &Decimal) -> bool {
    a == b && a.scale() == b.scale()
}

/// Numeric equality at the least precise operand's resolution
pub(crate) fn precision_equivalent(a: Decimal, b: Decimal) -> bool {
    let (a, b) = least_precision_truncate(a, b);
    a == b
}

pub(crate) fn number_value_equal(this: Option<Decimal>, other: &dyn Accessor) -> bool {
    other
        .as_number()
        .is_some_and(|other| match (this, other.decimal_value()) {
            (None, None) => true,
            (Some(a), Some(b)) => exact_equal(&a, &b),
            _ => false,
        })
}

pub(crate) fn number_value_equivalent(this: Option<Decimal>, other: &dyn Accessor) -> bool {
    other
        .as_number()
        .is_some_and(|other| match (this, other.decimal_value()) {
            (None, None) => true,
            (Some(a), Some(b)) => precision_equivalent(a, b),
            _ => false,
        })
}

pub(crate) fn number_compare(this: Option<Decimal>, other: &dyn Accessor) -> Option<Ordering> {
    let other = other.as_number()?.decimal_value()?;
    Some(this?.cmp(&other))
}

/// FHIR decimal with nil state
///
/// `==` is scale-aware like [`Accessor::equal`].
#[derive(Debug, Clone, Copy)]
pub struct FhirDecimal {
    nil: bool,
    value: Decimal,
}

impl PartialEq for FhirDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.nil == other.nil && exact_equal(&self.value, &other.value)
    }
}

impl Eq for FhirDecimal {}

impl Hash for FhirDecimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nil.hash(state);
        self.value.hash(state);
        self.value.scale().hash(state);
    }
}

impl FhirDecimal {
    pub const fn new(value: Decimal) -> Self {
        Self { nil: false, value }
    }

    /// Nil decimal, carrying zero as payload
    pub const fn nil() -> Self {
        Self {
            nil: true,
            value: Decimal::ZERO,
        }
    }

    /// Parse a decimal literal, keeping its scale
    ///
    /// Exponent notation is accepted; values that do not fit the 96-bit
    /// significand or 28 fractional digits are out of range.
    pub fn parse(s: &str) -> ValueResult<Self> {
        if !DECIMAL_PATTERN.is_match(s) {
            return Err(ValueError::invalid_literal("decimal", s));
        }
        let parsed = if s.contains(['e', 'E']) {
            Decimal::from_scientific(s)
        } else {
            Decimal::from_str_exact(s)
        };
        parsed
            .map(Self::new)
            .map_err(|_| ValueError::out_of_range("decimal", s))
    }

    /// Parse a literal known to be valid
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a decimal literal.
    #[track_caller]
    pub fn from_literal(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| trusted_literal_failure(err))
    }

    pub fn is_nil(&self) -> bool {
        self.nil
    }

    /// Payload, zero when nil
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Significant fractional digits of the payload
    pub fn precision(&self) -> u32 {
        precision_of(&self.value)
    }

    /// Bring two decimals to the precision of the less precise one
    ///
    /// Nil operands pass through unchanged.
    pub fn least_precision_truncate(a: &Self, b: &Self) -> (Self, Self) {
        if a.nil || b.nil {
            return (*a, *b);
        }
        let (ta, tb) = least_precision_truncate(a.value, b.value);
        (Self::new(ta), Self::new(tb))
    }

    pub fn add(&self, other: &Self) -> ValueResult<Self> {
        self.combine(other, "add", Decimal::checked_add)
    }

    pub fn subtract(&self, other: &Self) -> ValueResult<Self> {
        self.combine(other, "subtract", Decimal::checked_sub)
    }

    pub fn multiply(&self, other: &Self) -> ValueResult<Self> {
        self.combine(other, "multiply", Decimal::checked_mul)
    }

    /// Divide, yielding nil for a zero divisor
    ///
    /// Quotients are normalized, so `48.75 / 2.5` is `19.5`.
    pub fn divide(&self, other: &Self) -> ValueResult<Self> {
        if !other.nil && other.value.is_zero() {
            return Ok(Self::nil());
        }
        self.combine(other, "divide", |a, b| a.checked_div(b).map(|q| q.normalize()))
    }

    pub fn negate(&self) -> Self {
        if self.nil {
            return *self;
        }
        Self::new(-self.value)
    }

    /// Apply an operation, propagating nil operands as a nil result
    fn combine(
        &self,
        other: &Self,
        operation: &str,
        op: impl FnOnce(Decimal, Decimal) -> Option<Decimal>,
    ) -> ValueResult<Self> {
        if self.nil || other.nil {
            return Ok(Self::nil());
        }
        op(self.value, other.value)
            .map(Self::new)
            .ok_or_else(|| ValueError::overflow(operation))
    }
}

impl From<Decimal> for FhirDecimal {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl FromStr for FhirDecimal {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FhirDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nil {
            return Ok(());
        }
        write!(f, "{}", self.value)
    }
}

impl Accessor for FhirDecimal {
    fn data_type(&self) -> DataType {
        DataType::Decimal
    }

    fn type_spec(&self) -> &'static TypeSpec {
        &DECIMAL_TYPE_SPEC
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

impl EqualityEvaluator for FhirDecimal {
    fn value_equal(&self, other: &dyn Accessor) -> bool {
        number_value_equal(self.decimal_value(), other)
    }

    fn value_equivalent(&self, other: &dyn Accessor) -> bool {
        number_value_equivalent(self.decimal_value(), other)
    }
}

impl PrimitiveAccessor for FhirDecimal {
    fn is_nil(&self) -> bool {
        self.nil
    }
}

impl Comparator for FhirDecimal {
    fn compare(&self, other: &dyn Accessor) -> Option<Ordering> {
        number_compare(self.decimal_value(), other)
    }
}

impl Negator for FhirDecimal {
    fn negate(&self) -> ValueResult<Box<dyn Accessor>> {
        Ok(Box::new(FhirDecimal::negate(self)))
    }
}

impl NumberAccessor for FhirDecimal {
    fn decimal_value(&self) -> Option<Decimal> {
        (!self.nil).then_some(self.value)
    }
}
