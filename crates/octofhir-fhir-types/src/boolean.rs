//! FHIR `boolean`

use crate::error::trusted_literal_failure;
use crate::{
    Accessor, BooleanAccessor, DataType, EqualityEvaluator, PrimitiveAccessor, TypeSpec,
    ValueError, ValueResult, BOOLEAN_TYPE_SPEC,
};
use std::any::Any;
use std::fmt;
use std::str::FromStr;

/// FHIR boolean with nil state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FhirBoolean {
    nil: bool,
    value: bool,
}

impl FhirBoolean {
    pub const TRUE: Self = Self::new(true);
    pub const FALSE: Self = Self::new(false);

    pub const fn new(value: bool) -> Self {
        Self { nil: false, value }
    }

    /// Nil boolean, carrying `false` as payload
    pub const fn nil() -> Self {
        Self {
            nil: true,
            value: false,
        }
    }

    /// Parse `true` or `false`
    pub fn parse(s: &str) -> ValueResult<Self> {
        match s {
            "true" => Ok(Self::TRUE),
            "false" => Ok(Self::FALSE),
            _ => Err(ValueError::invalid_literal("boolean", s)),
        }
    }

    /// Parse a literal known to be valid
    ///
    /// # Panics
    ///
    /// Panics if `s` is neither `true` nor `false`.
    #[track_caller]
    pub fn from_literal(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| trusted_literal_failure(err))
    }

    pub fn is_nil(&self) -> bool {
        self.nil
    }

    /// Payload, `false` when nil
    pub fn value(&self) -> bool {
        self.value
    }
}

impl From<bool> for FhirBoolean {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl FromStr for FhirBoolean {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FhirBoolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nil {
            return Ok(());
        }
        write!(f, "{}", self.value)
    }
}

impl Accessor for FhirBoolean {
    fn data_type(&self) -> DataType {
        DataType::Boolean
    }

    fn type_spec(&self) -> &'static TypeSpec {
        &BOOLEAN_TYPE_SPEC
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

    fn as_boolean(&self) -> Option<&dyn BooleanAccessor> {
        Some(self)
    }
}

impl EqualityEvaluator for FhirBoolean {
    fn value_equal(&self, other: &dyn Accessor) -> bool {
        other
            .as_boolean()
            .is_some_and(|other| self.boolean() == other.boolean())
    }

    fn value_equivalent(&self, other: &dyn Accessor) -> bool {
        self.value_equal(other)
    }
}

impl PrimitiveAccessor for FhirBoolean {
    fn is_nil(&self) -> bool {
        self.nil
    }
}

impl BooleanAccessor for FhirBoolean {
    fn boolean(&self) -> Option<bool> {
        (!self.nil).then_some(self.value)
    }
}
