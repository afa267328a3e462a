//! Value contract
//!
//! [`Accessor`] is the capability surface every value implements. The
//! optional capabilities ([`EqualityEvaluator`], [`Comparator`],
//! [`Negator`], the typed views) are exposed through `as_*` methods so that
//! dispatch is an explicit two-step lookup instead of runtime type probing.
//!
//! The free functions [`equal`], [`value_equal`] and [`value_equivalent`]
//! are the entry points for comparing two optional values.

use crate::{DataType, TypeSpec, ValueResult};
use rust_decimal::Decimal;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

/// Base contract of every value
pub trait Accessor: fmt::Debug + Send + Sync + 'static {
    /// Family classification of this value
    fn data_type(&self) -> DataType;

    /// Type identity of this value
    fn type_spec(&self) -> &'static TypeSpec;

    /// Whether this value carries no information
    fn is_empty(&self) -> bool;

    /// Strict equality including presentation metadata
    ///
    /// Returns `false` whenever `other` has a different concrete type, even
    /// when the two values would convert into each other.
    fn equal(&self, other: &dyn Accessor) -> bool;

    /// Concrete value, for downcasting to the same type
    fn as_any(&self) -> &dyn Any;

    fn as_primitive(&self) -> Option<&dyn PrimitiveAccessor> {
        None
    }

    fn as_equality_evaluator(&self) -> Option<&dyn EqualityEvaluator> {
        None
    }

    fn as_comparator(&self) -> Option<&dyn Comparator> {
        None
    }

    fn as_negator(&self) -> Option<&dyn Negator> {
        None
    }

    fn as_boolean(&self) -> Option<&dyn BooleanAccessor> {
        None
    }

    fn as_string(&self) -> Option<&dyn StringAccessor> {
        None
    }

    fn as_number(&self) -> Option<&dyn NumberAccessor> {
        None
    }
}

/// Value-only comparison that ignores presentation metadata
pub trait EqualityEvaluator: Accessor {
    /// Compare values, permitting compatible kinds (e.g. integer and decimal)
    fn value_equal(&self, other: &dyn Accessor) -> bool;

    /// Lenient comparison, at least as permissive as [`value_equal`](Self::value_equal)
    fn value_equivalent(&self, other: &dyn Accessor) -> bool;
}

/// Primitive value with an explicit nil state
///
/// A nil primitive holds a default payload; check [`is_nil`](Self::is_nil)
/// before trusting it. A primitive is empty exactly when it is nil.
pub trait PrimitiveAccessor: EqualityEvaluator + fmt::Display {
    fn is_nil(&self) -> bool;
}

/// Ordering between comparable values
pub trait Comparator: Accessor {
    /// Order `self` relative to `other`
    ///
    /// `None` when the values are of incomparable kinds, either side is
    /// nil, or the order cannot be decided at the available precision.
    fn compare(&self, other: &dyn Accessor) -> Option<Ordering>;
}

/// Arithmetic negation
pub trait Negator: Accessor {
    fn negate(&self) -> ValueResult<Box<dyn Accessor>>;
}

/// Boolean view of a value
pub trait BooleanAccessor: Accessor {
    /// `None` when nil
    fn boolean(&self) -> Option<bool>;
}

/// String view of a value
pub trait StringAccessor: Accessor {
    /// `None` when nil
    fn string_value(&self) -> Option<&str>;
}

/// Numeric view of a value
pub trait NumberAccessor: Accessor {
    /// `None` when nil
    fn decimal_value(&self) -> Option<Decimal>;

    /// `None` when nil or not an integer kind
    fn integer_value(&self) -> Option<i32> {
        None
    }
}

fn same_value(a: &dyn Accessor, b: &dyn Accessor) -> bool {
    std::ptr::addr_eq(a as *const dyn Accessor, b as *const dyn Accessor)
}

/// Check whether an optional value is absent or empty
pub fn is_empty(value: Option<&dyn Accessor>) -> bool {
    value.is_none_or(|v| v.is_empty())
}

/// Check whether an optional value is absent, nil, or empty
///
/// Primitives are judged by their nil flag; other values by their own
/// emptiness.
pub fn is_value_empty(value: Option<&dyn Accessor>) -> bool {
    match value {
        None => true,
        Some(v) => match v.as_primitive() {
            Some(primitive) => primitive.is_nil(),
            None => v.is_empty(),
        },
    }
}

/// Strict equality of two optional values
///
/// Both empty counts as equal; otherwise `a.equal(b)` decides.
pub fn equal(a: Option<&dyn Accessor>, b: Option<&dyn Accessor>) -> bool {
    if let (Some(a), Some(b)) = (a, b) {
        if same_value(a, b) {
            return true;
        }
    }
    if is_empty(a) && is_empty(b) {
        return true;
    }
    match (a, b) {
        (Some(a), Some(b)) => a.equal(b),
        _ => false,
    }
}

/// Value equality of two optional values
///
/// Dispatches to [`EqualityEvaluator::value_equal`] when `a` provides it,
/// falling back to strict equality otherwise.
pub fn value_equal(a: Option<&dyn Accessor>, b: Option<&dyn Accessor>) -> bool {
    if let (Some(a), Some(b)) = (a, b) {
        if same_value(a, b) {
            return true;
        }
    }
    if is_empty(a) && is_empty(b) {
        return true;
    }
    match (a, b) {
        (Some(a), Some(b)) => match a.as_equality_evaluator() {
            Some(evaluator) => evaluator.value_equal(b),
            None => a.equal(b),
        },
        _ => false,
    }
}

/// Value equivalence of two optional values
///
/// Same shape as [`value_equal`] with a nil-aware emptiness check and
/// [`EqualityEvaluator::value_equivalent`] dispatch.
pub fn value_equivalent(a: Option<&dyn Accessor>, b: Option<&dyn Accessor>) -> bool {
    if let (Some(a), Some(b)) = (a, b) {
        if same_value(a, b) {
            return true;
        }
    }
    if is_value_empty(a) && is_value_empty(b) {
        return true;
    }
    match (a, b) {
        (Some(a), Some(b)) => match a.as_equality_evaluator() {
            Some(evaluator) => evaluator.value_equivalent(b),
            None => a.equal(b),
        },
        _ => false,
    }
}

/// Order two optional values
///
/// `None` when either side is absent or `a` is not comparable.
pub fn compare(a: Option<&dyn Accessor>, b: Option<&dyn Accessor>) -> Option<Ordering> {
    let (a, b) = (a?, b?);
    a.as_comparator()?.compare(b)
}

/// Negate a value if it supports negation
///
/// `Ok(None)` when the value has no [`Negator`] capability.
pub fn negate(value: &dyn Accessor) -> ValueResult<Option<Box<dyn Accessor>>> {
    value.as_negator().map(|negator| negator.negate()).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FhirBoolean, FhirCode, FhirDecimal, FhirInteger, FhirQuantity, FhirString};

    fn v(value: &dyn Accessor) -> Option<&dyn Accessor> {
        Some(value)
    }

    #[test]
    fn test_empty_predicates() {
        let nil = FhirString::nil();
        let blank = FhirString::new("");
        let quantity = FhirQuantity::default();

        assert!(is_empty(None));
        assert!(is_empty(v(&nil)));
        assert!(!is_empty(v(&blank)));
        assert!(is_empty(v(&quantity)));

        assert!(is_value_empty(None));
        assert!(is_value_empty(v(&nil)));
        assert!(!is_value_empty(v(&blank)));
        assert!(is_value_empty(v(&quantity)));
    }

    #[test]
    fn test_equal_short_circuits() {
        let a = FhirString::new("abc");
        assert!(equal(v(&a), v(&a)));
        assert!(equal(None, None));
        assert!(equal(None, v(&FhirString::nil())));
        assert!(equal(v(&FhirInteger::nil()), v(&FhirString::nil())));
        assert!(!equal(v(&a), None));
        assert!(!equal(None, v(&a)));
    }

    #[test]
    fn test_equal_is_kind_strict() {
        let integer = FhirInteger::new(5);
        let decimal = FhirDecimal::from_literal("5");

        assert!(!equal(v(&integer), v(&decimal)));
        assert!(value_equal(v(&integer), v(&decimal)));
        assert!(value_equivalent(v(&integer), v(&decimal)));
    }

    #[test]
    fn test_value_equal_across_string_kinds() {
        let string = FhirString::new("active");
        let code = FhirCode::new("active");

        assert!(!equal(v(&string), v(&code)));
        assert!(value_equal(v(&string), v(&code)));
        assert!(value_equal(v(&code), v(&string)));
    }

    #[test]
    fn test_value_equivalent_uses_nil_awareness() {
        let nil = FhirBoolean::nil();
        assert!(value_equivalent(v(&nil), None));
        assert!(!value_equivalent(v(&nil), v(&FhirBoolean::new(false))));
    }

    #[test]
    fn test_compare_dispatch() {
        let one = FhirInteger::new(1);
        let two = FhirDecimal::from_literal("2.0");
        assert_eq!(compare(v(&one), v(&two)), Some(Ordering::Less));
        assert_eq!(compare(v(&two), v(&one)), Some(Ordering::Greater));
        assert_eq!(compare(v(&FhirBoolean::new(true)), v(&one)), None);
        assert_eq!(compare(None, v(&one)), None);
    }

    #[test]
    fn test_negate_dispatch() {
        let negated = negate(&FhirInteger::new(7)).unwrap().unwrap();
        assert!(value_equal(Some(&*negated), v(&FhirInteger::new(-7))));

        assert!(negate(&FhirString::new("x")).unwrap().is_none());
    }
}
