//! Diagnostics for the FHIR value model
//!
//! This crate provides the error reporting vocabulary shared by the value
//! model crates: structured error codes with a static description table,
//! and severity-tagged diagnostics that callers can surface as validation
//! issues.

mod diagnostic;
mod error_code;

pub use diagnostic::*;
pub use error_code::*;
