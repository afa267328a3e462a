//! FHIR `Quantity` and unit-code arithmetic
//!
//! Arithmetic never converts between units. Codes are combined only when
//! their base units match, with a single trailing digit read as the power:
//! `m` × `m` is `m2` and `m3` ÷ `m` is `m2`. Codes that already carry a
//! power cannot be multiplied.

use crate::{
    value_equal, value_equivalent, Accessor, Comparator, DataType, EqualityEvaluator,
    FhirCode, FhirDecimal, FhirString, FhirUri, Negator, TypeSpec, ValueError, ValueResult,
    QUANTITY_TYPE_SPEC,
};
use regex::Regex;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Code system of UCUM units
pub const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";

static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<value>[^\s']+)(\s+'(?P<unit>[^']+)')?$").expect("quantity pattern")
});

/// Arithmetic operator symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    TruncatedDivide,
    Modulo,
}

impl ArithmeticOperator {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::TruncatedDivide => "div",
            Self::Modulo => "mod",
        }
    }
}

impl FromStr for ArithmeticOperator {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Subtract),
            "*" => Ok(Self::Multiply),
            "/" => Ok(Self::Divide),
            "div" => Ok(Self::TruncatedDivide),
            "mod" => Ok(Self::Modulo),
            _ => Err(ValueError::unsupported_operator(s)),
        }
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Base unit and power of a unit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitExponent<'a> {
    pub unit: &'a str,
    pub exponent: u32,
}

/// Split a unit code into base unit and trailing single-digit power
///
/// An absent or empty code is the dimensionless `("", 0)`; a code without
/// a trailing digit has power 1.
pub fn decompose_code(code: Option<&str>) -> UnitExponent<'_> {
    let Some(code) = code.filter(|code| !code.is_empty()) else {
        return UnitExponent {
            unit: "",
            exponent: 0,
        };
    };
    let Some(last) = code.chars().next_back() else {
        return UnitExponent {
            unit: code,
            exponent: 1,
        };
    };
    match last.to_digit(10) {
        Some(exponent) => UnitExponent {
            unit: &code[..code.len() - 1],
            exponent,
        },
        None => UnitExponent {
            unit: code,
            exponent: 1,
        },
    }
}

/// Measured amount with optional unit, code system and comparator
///
/// All five fields are independent; a quantity with none of them set (or
/// only nil ones) is empty. Setters update the receiver in place and
/// return it for chaining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FhirQuantity {
    value: Option<FhirDecimal>,
    comparator: Option<FhirCode>,
    unit: Option<FhirString>,
    system: Option<FhirUri>,
    code: Option<FhirCode>,
}

impl FhirQuantity {
    /// Create a UCUM quantity whose unit display and code are `code`
    ///
    /// # Panics
    ///
    /// Panics if `code` is not a valid code literal.
    #[track_caller]
    pub fn new(value: FhirDecimal, code: &str) -> Self {
        let mut quantity = Self::default();
        quantity
            .set_value(Some(value))
            .set_unit(Some(FhirString::new(code)))
            .set_system(Some(FhirUri::new(UCUM_SYSTEM)))
            .set_code(Some(FhirCode::new(code)));
        quantity
    }

    /// Parse `value` or `value 'code'`
    pub fn parse(s: &str) -> ValueResult<Self> {
        let caps = QUANTITY_PATTERN
            .captures(s)
            .ok_or_else(|| ValueError::invalid_literal("Quantity", s))?;
        let value = FhirDecimal::parse(&caps["value"])?;
        let mut quantity = Self::default();
        quantity.set_value(Some(value));
        if let Some(unit) = caps.name("unit") {
            let invalid = |_: ValueError| ValueError::invalid_literal("Quantity", s);
            let code = FhirCode::parse(unit.as_str()).map_err(invalid)?;
            let display = FhirString::parse(unit.as_str()).map_err(invalid)?;
            quantity
                .set_unit(Some(display))
                .set_system(Some(FhirUri::new(UCUM_SYSTEM)))
                .set_code(Some(code));
        }
        Ok(quantity)
    }

    /// Parse a literal known to be valid
    ///
    /// # Panics
    ///
    /// Panics if `s` is not a quantity literal.
    #[track_caller]
    pub fn from_literal(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| crate::error::trusted_literal_failure(err))
    }

    pub fn value(&self) -> Option<&FhirDecimal> {
        self.value.as_ref()
    }

    pub fn comparator(&self) -> Option<&FhirCode> {
        self.comparator.as_ref()
    }

    pub fn unit(&self) -> Option<&FhirString> {
        self.unit.as_ref()
    }

    pub fn system(&self) -> Option<&FhirUri> {
        self.system.as_ref()
    }

    pub fn code(&self) -> Option<&FhirCode> {
        self.code.as_ref()
    }

    pub fn set_value(&mut self, value: Option<FhirDecimal>) -> &mut Self {
        self.value = value;
        self
    }

    pub fn set_comparator(&mut self, comparator: Option<FhirCode>) -> &mut Self {
        self.comparator = comparator;
        self
    }

    pub fn set_unit(&mut self, unit: Option<FhirString>) -> &mut Self {
        self.unit = unit;
        self
    }

    pub fn set_system(&mut self, system: Option<FhirUri>) -> &mut Self {
        self.system = system;
        self
    }

    pub fn set_code(&mut self, code: Option<FhirCode>) -> &mut Self {
        self.code = code;
        self
    }

    /// Magnitude, when present and not nil
    fn magnitude(&self) -> Option<&FhirDecimal> {
        self.value.as_ref().filter(|value| !value.is_nil())
    }

    fn code_text(&self) -> Option<&str> {
        self.code
            .as_ref()
            .filter(|code| !code.is_nil())
            .map(FhirCode::value)
    }

    fn system_text(&self) -> Option<&str> {
        self.system
            .as_ref()
            .filter(|system| !system.is_nil())
            .map(FhirUri::value)
    }

    /// Copy with the magnitude negated
    pub fn negate(&self) -> Self {
        let mut negated = self.clone();
        negated.value = self.value.map(|value| value.negate());
        negated
    }

    /// Combine two quantities with a basic arithmetic operator
    ///
    /// Returns `Ok(None)` when either magnitude is unknown or when dividing
    /// by zero. The result keeps the comparator, unit display and system of
    /// `q1` and carries the merged code.
    pub fn calc(q1: &Self, q2: &Self, op: ArithmeticOperator) -> ValueResult<Option<Self>> {
        ensure_supported(op)?;
        let (Some(v1), Some(v2)) = (q1.magnitude(), q2.magnitude()) else {
            return Ok(None);
        };
        let code = merge_codes(q1, q2, op)?;
        let value = match op {
            ArithmeticOperator::Add => v1.add(v2)?,
            ArithmeticOperator::Subtract => v1.subtract(v2)?,
            ArithmeticOperator::Multiply => v1.multiply(v2)?,
            ArithmeticOperator::Divide => v1.divide(v2)?,
            ArithmeticOperator::TruncatedDivide | ArithmeticOperator::Modulo => {
                return Err(ValueError::unsupported_operator(op.symbol()));
            }
        };
        if value.is_nil() {
            return Ok(None);
        }
        Ok(Some(Self {
            value: Some(value),
            comparator: q1.comparator.clone(),
            unit: q1.unit.clone(),
            system: q1.system.clone(),
            code,
        }))
    }
}

fn ensure_supported(op: ArithmeticOperator) -> ValueResult<()> {
    match op {
        ArithmeticOperator::Add
        | ArithmeticOperator::Subtract
        | ArithmeticOperator::Multiply
        | ArithmeticOperator::Divide => Ok(()),
        ArithmeticOperator::TruncatedDivide | ArithmeticOperator::Modulo => {
            log::trace!("quantity arithmetic rejected operator {}", op);
            Err(ValueError::unsupported_operator(op.symbol()))
        }
    }
}

fn power_code(unit: &str, exponent: u32) -> ValueResult<Option<FhirCode>> {
    match exponent {
        0 => Ok(None),
        1 => FhirCode::parse(unit).map(Some),
        n => FhirCode::parse(format!("{}{}", unit, n)).map(Some),
    }
}

/// Unit code of `q1 op q2`
///
/// Both systems, when present, must be identical. Addition and subtraction
/// need equal units and powers and keep the operand code. Multiplication
/// squares a shared power-1 unit, and a dimensionless side yields the
/// other side's code. Division subtracts powers of a shared unit.
pub fn merge_codes(
    q1: &FhirQuantity,
    q2: &FhirQuantity,
    op: ArithmeticOperator,
) -> ValueResult<Option<FhirCode>> {
    ensure_supported(op)?;
    if let (Some(system1), Some(system2)) = (q1.system_text(), q2.system_text()) {
        if system1 != system2 {
            log::trace!("quantity systems {} and {} differ", system1, system2);
            return Err(ValueError::IncompatibleSystems {
                system1: system1.to_string(),
                system2: system2.to_string(),
            });
        }
    }

    let (code1, code2) = (q1.code_text(), q2.code_text());
    let (u1, u2) = (decompose_code(code1), decompose_code(code2));
    let incompatible_units = || {
        log::trace!("quantity units '{}' and '{}' differ", u1.unit, u2.unit);
        ValueError::IncompatibleUnits {
            unit1: u1.unit.to_string(),
            unit2: u2.unit.to_string(),
        }
    };
    let incompatible_exponents = || {
        log::trace!(
            "quantity codes '{}' and '{}' cannot be combined by {}",
            code1.unwrap_or_default(),
            code2.unwrap_or_default(),
            op
        );
        ValueError::IncompatibleExponents {
            code1: code1.unwrap_or_default().to_string(),
            code2: code2.unwrap_or_default().to_string(),
        }
    };
    let non_nil = |code: &Option<FhirCode>| code.clone().filter(|code| !code.is_nil());

    match op {
        ArithmeticOperator::Add | ArithmeticOperator::Subtract => {
            if u1.unit != u2.unit {
                return Err(incompatible_units());
            }
            if u1.exponent != u2.exponent {
                return Err(incompatible_exponents());
            }
            Ok(non_nil(&q1.code).or_else(|| non_nil(&q2.code)))
        }
        ArithmeticOperator::Multiply => {
            if u1.exponent == 0 {
                return Ok(non_nil(&q2.code));
            }
            if u2.exponent == 0 {
                return Ok(non_nil(&q1.code));
            }
            if u1.unit != u2.unit {
                return Err(incompatible_units());
            }
            if u1.exponent != 1 || u2.exponent != 1 {
                return Err(incompatible_exponents());
            }
            power_code(u1.unit, 2)
        }
        ArithmeticOperator::Divide => {
            if u2.exponent == 0 {
                return Ok(non_nil(&q1.code));
            }
            if u1.unit != u2.unit {
                return Err(incompatible_units());
            }
            if u2.exponent > u1.exponent {
                return Err(incompatible_exponents());
            }
            power_code(u1.unit, u1.exponent - u2.exponent)
        }
        ArithmeticOperator::TruncatedDivide | ArithmeticOperator::Modulo => {
            Err(ValueError::unsupported_operator(op.symbol()))
        }
    }
}

fn optional<T: Accessor>(value: &Option<T>) -> Option<&dyn Accessor> {
    value.as_ref().map(|value| value as &dyn Accessor)
}

impl fmt::Display for FhirQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(value) = self.magnitude() else {
            return Ok(());
        };
        write!(f, "{}", value)?;
        match self.code_text() {
            Some(code) => write!(f, " '{}'", code),
            None => Ok(()),
        }
    }
}

impl FromStr for FhirQuantity {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Accessor for FhirQuantity {
    fn data_type(&self) -> DataType {
        DataType::Quantity
    }

    fn type_spec(&self) -> &'static TypeSpec {
        &QUANTITY_TYPE_SPEC
    }

    fn is_empty(&self) -> bool {
        crate::is_value_empty(optional(&self.value))
            && crate::is_value_empty(optional(&self.comparator))
            && crate::is_value_empty(optional(&self.unit))
            && crate::is_value_empty(optional(&self.system))
            && crate::is_value_empty(optional(&self.code))
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

    fn as_equality_evaluator(&self) -> Option<&dyn EqualityEvaluator> {
        Some(self)
    }

    fn as_comparator(&self) -> Option<&dyn Comparator> {
        Some(self)
    }

    fn as_negator(&self) -> Option<&dyn Negator> {
        Some(self)
    }
}

impl EqualityEvaluator for FhirQuantity {
    fn value_equal(&self, other: &dyn Accessor) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|other| {
            value_equal(optional(&self.value), optional(&other.value))
                && value_equal(optional(&self.system), optional(&other.system))
                && value_equal(optional(&self.code), optional(&other.code))
        })
    }

    fn value_equivalent(&self, other: &dyn Accessor) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|other| {
            value_equivalent(optional(&self.value), optional(&other.value))
                && value_equal(optional(&self.system), optional(&other.system))
                && value_equal(optional(&self.code), optional(&other.code))
        })
    }
}

impl Comparator for FhirQuantity {
    fn compare(&self, other: &dyn Accessor) -> Option<Ordering> {
        let other = other.as_any().downcast_ref::<Self>()?;
        if self.code_text() != other.code_text() || self.system_text() != other.system_text() {
            return None;
        }
        Some(self.magnitude()?.value().cmp(&other.magnitude()?.value()))
    }
}

impl Negator for FhirQuantity {
    fn negate(&self) -> ValueResult<Box<dyn Accessor>> {
        Ok(Box::new(FhirQuantity::negate(self)))
    }
}
