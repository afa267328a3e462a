//! FHIR value model error codes following a structured numbering system
//!
//! Error code ranges:
//! - FHIR0001-FHIR0099: Literal errors (syntax and range of primitive text)
//! - FHIR0100-FHIR0199: Arithmetic errors (quantity units, operators, overflow)
//! - FHIR0200-FHIR0299: Usage errors (precondition violations, always fatal)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a literal error (0001-0099)
    pub const fn is_literal_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is an arithmetic error (0100-0199)
    pub const fn is_arithmetic_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a usage error (0200-0299)
    ///
    /// Usage errors are never returned as values; they only appear in panic
    /// messages of operations whose preconditions were violated.
    pub const fn is_usage_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FHIR{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Literal errors (0001-0099)
    map.insert(1, ErrorInfo::new("Invalid literal")
        .with_help("The text does not match the literal grammar of the target type"));
    map.insert(2, ErrorInfo::new("Value out of range"));
    map.insert(3, ErrorInfo::new("Invalid time zone offset")
        .with_help("Offsets are written as Z, +HH:MM or -HH:MM"));

    // Arithmetic errors (0100-0199)
    map.insert(100, ErrorInfo::new("Incompatible code systems"));
    map.insert(101, ErrorInfo::new("Incompatible units"));
    map.insert(102, ErrorInfo::new("Incompatible unit exponents")
        .with_help("Only base units may be squared; powers are combined by division only"));
    map.insert(103, ErrorInfo::new("Unsupported operator"));
    map.insert(104, ErrorInfo::new("Arithmetic overflow"));

    // Usage errors (0200-0299)
    map.insert(200, ErrorInfo::new("Invalid trusted literal"));
    map.insert(201, ErrorInfo::new("Index out of range"));
    map.insert(202, ErrorInfo::new("Malformed time zone offset"));

    map
});

// Literal errors
pub const FHIR0001: ErrorCode = ErrorCode::new(1);
pub const FHIR0002: ErrorCode = ErrorCode::new(2);
pub const FHIR0003: ErrorCode = ErrorCode::new(3);

// Arithmetic errors
pub const FHIR0100: ErrorCode = ErrorCode::new(100);
pub const FHIR0101: ErrorCode = ErrorCode::new(101);
pub const FHIR0102: ErrorCode = ErrorCode::new(102);
pub const FHIR0103: ErrorCode = ErrorCode::new(103);
pub const FHIR0104: ErrorCode = ErrorCode::new(104);

// Usage errors
pub const FHIR0200: ErrorCode = ErrorCode::new(200);
pub const FHIR0201: ErrorCode = ErrorCode::new(201);
pub const FHIR0202: ErrorCode = ErrorCode::new(202);
