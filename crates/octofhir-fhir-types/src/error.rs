//! Data errors for the value model

use octofhir_fhir_diagnostics::{
    Diagnostic, ErrorCode, FHIR0001, FHIR0002, FHIR0003, FHIR0100, FHIR0101, FHIR0102, FHIR0103,
    FHIR0104, FHIR0200,
};
use std::fmt;
use thiserror::Error;

/// Result type for value operations
pub type ValueResult<T> = Result<T, ValueError>;

/// Recoverable errors raised while constructing or combining values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Text does not match the literal grammar of the type
    #[error("Invalid {type_name} literal: '{literal}'")]
    InvalidLiteral { type_name: String, literal: String },

    /// Literal is well-formed but outside the value range of the type
    #[error("Value out of range for {type_name}: '{literal}'")]
    OutOfRange { type_name: String, literal: String },

    /// Malformed time zone offset
    #[error("Invalid time zone offset: '{offset}'")]
    InvalidTimeZone { offset: String },

    /// Quantities carry different code systems
    #[error("Incompatible systems: {system1} and {system2}")]
    IncompatibleSystems { system1: String, system2: String },

    /// Quantity units cannot be combined
    #[error("Incompatible units: '{unit1}' and '{unit2}'")]
    IncompatibleUnits { unit1: String, unit2: String },

    /// Quantity unit powers cannot be combined
    #[error("Incompatible exponents: '{code1}' and '{code2}'")]
    IncompatibleExponents { code1: String, code2: String },

    /// Operator not supported for the operands
    #[error("Unsupported operator: {operator}")]
    UnsupportedOperator { operator: String },

    /// Arithmetic overflow
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },
}

impl ValueError {
    /// Create an invalid literal error
    pub fn invalid_literal(type_name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::InvalidLiteral {
            type_name: type_name.into(),
            literal: literal.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(type_name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::OutOfRange {
            type_name: type_name.into(),
            literal: literal.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create an unsupported operator error
    pub fn unsupported_operator(operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
        }
    }

    /// Get the diagnostic error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidLiteral { .. } => FHIR0001,
            Self::OutOfRange { .. } => FHIR0002,
            Self::InvalidTimeZone { .. } => FHIR0003,
            Self::IncompatibleSystems { .. } => FHIR0100,
            Self::IncompatibleUnits { .. } => FHIR0101,
            Self::IncompatibleExponents { .. } => FHIR0102,
            Self::UnsupportedOperator { .. } => FHIR0103,
            Self::Overflow { .. } => FHIR0104,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            Self::InvalidLiteral { literal, .. } | Self::OutOfRange { literal, .. } => {
                diag.with_subject(literal.clone())
            }
            Self::InvalidTimeZone { offset } => diag.with_subject(offset.clone()),
            _ => diag,
        }
    }
}

/// Abort an operation whose precondition was violated
#[track_caller]
pub(crate) fn usage_failure(code: ErrorCode, message: impl fmt::Display) -> ! {
    panic!("{}: {}", code, message)
}

/// Abort a trusted-literal construction
///
/// Trusted literals are known at compile time, so a malformed one is a bug
/// in the caller rather than bad data.
#[track_caller]
pub(crate) fn trusted_literal_failure(err: ValueError) -> ! {
    usage_failure(FHIR0200, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ValueError::invalid_literal("date", "2015-13").code(), FHIR0001);
        assert_eq!(ValueError::overflow("negate").code(), FHIR0104);
        assert!(ValueError::unsupported_operator("mod").code().is_arithmetic_error());
    }

    #[test]
    fn test_to_diagnostic_carries_literal() {
        let diag = ValueError::invalid_literal("date", "2015-13").to_diagnostic();
        assert_eq!(diag.code, FHIR0001);
        assert_eq!(diag.subject.as_deref(), Some("2015-13"));
        assert_eq!(diag.message, "Invalid date literal: '2015-13'");
    }

    #[test]
    #[should_panic(expected = "FHIR0200: Invalid code literal")]
    fn test_trusted_literal_failure_panics() {
        trusted_literal_failure(ValueError::invalid_literal("code", " x"));
    }
}
