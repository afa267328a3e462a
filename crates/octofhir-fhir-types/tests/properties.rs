//! Algebraic properties of the comparison relations

use octofhir_fhir_types::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn v(value: &dyn Accessor) -> Option<&dyn Accessor> {
    Some(value)
}

fn decimal_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64, 0u32..=8u32)
        .prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn fhir_decimal_strategy() -> impl Strategy<Value = FhirDecimal> {
    prop_oneof![
        9 => decimal_strategy().prop_map(FhirDecimal::new),
        1 => Just(FhirDecimal::nil()),
    ]
}

fn date_strategy() -> impl Strategy<Value = FhirDate> {
    (1900i32..2100, 1u8..=12, 1u8..=28, 0usize..3).prop_map(|(year, month, day, depth)| {
        let literal = match depth {
            0 => format!("{:04}", year),
            1 => format!("{:04}-{:02}", year, month),
            _ => format!("{:04}-{:02}-{:02}", year, month, day),
        };
        FhirDate::from_literal(&literal)
    })
}

fn text_strategy() -> impl Strategy<Value = FhirString> {
    "[a-zA-Z ]{0,12}".prop_map(|text| FhirString::new(text))
}

proptest! {
    #[test]
    fn prop_decimal_equal_is_reflexive(a in fhir_decimal_strategy()) {
        let copy = a;
        prop_assert!(equal(v(&a), v(&copy)));
        prop_assert!(value_equal(v(&a), v(&copy)));
        prop_assert!(value_equivalent(v(&a), v(&copy)));
    }

    #[test]
    fn prop_date_equal_is_reflexive(a in date_strategy()) {
        let copy = a;
        prop_assert!(equal(v(&a), v(&copy)));
        prop_assert!(value_equivalent(v(&a), v(&copy)));
    }

    #[test]
    fn prop_decimal_value_equal_implies_equivalent(
        a in fhir_decimal_strategy(),
        b in fhir_decimal_strategy(),
    ) {
        if value_equal(v(&a), v(&b)) {
            prop_assert!(value_equivalent(v(&a), v(&b)));
        }
    }

    #[test]
    fn prop_decimal_equivalence_is_symmetric(
        a in fhir_decimal_strategy(),
        b in fhir_decimal_strategy(),
    ) {
        prop_assert_eq!(value_equivalent(v(&a), v(&b)), value_equivalent(v(&b), v(&a)));
    }

    #[test]
    fn prop_string_value_equal_implies_equivalent(
        a in text_strategy(),
        b in text_strategy(),
    ) {
        if value_equal(v(&a), v(&b)) {
            prop_assert!(value_equivalent(v(&a), v(&b)));
        }
    }

    #[test]
    fn prop_date_value_equal_implies_equivalent(a in date_strategy(), b in date_strategy()) {
        if value_equal(v(&a), v(&b)) {
            prop_assert!(value_equivalent(v(&a), v(&b)));
        }
    }

    #[test]
    fn prop_truncation_matches_least_precision(a in decimal_strategy(), b in decimal_strategy()) {
        let (ta, tb) = least_precision_truncate(a, b);
        let least = precision_of(&a).min(precision_of(&b));

        prop_assert!(precision_of(&ta) <= least);
        prop_assert!(precision_of(&tb) <= least);
        prop_assert!(ta.abs() <= a.abs());
        prop_assert!(tb.abs() <= b.abs());
    }

    #[test]
    fn prop_integer_matches_scale_zero_decimal(n in any::<i32>()) {
        let integer = FhirInteger::new(n);
        let decimal = FhirDecimal::new(Decimal::from(n));
        prop_assert!(value_equal(v(&integer), v(&decimal)));
        prop_assert!(!equal(v(&integer), v(&decimal)));
    }

    #[test]
    fn prop_add_all_unique_is_idempotent(
        words in prop::collection::vec("[a-c]{1,2}", 0..12),
    ) {
        let mut source = FhirCollection::new(&STRING_TYPE_SPEC);
        for word in &words {
            source.add(Some(Arc::new(FhirString::new(word.as_str()))));
        }

        let mut unique = FhirCollection::new(&STRING_TYPE_SPEC);
        let added = unique.add_all_unique(&source);
        prop_assert_eq!(added, unique.len());
        prop_assert_eq!(unique.add_all_unique(&source), 0);
        prop_assert!(unique.len() <= source.len());
    }
}
