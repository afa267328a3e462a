//! FHIR value model
//!
//! This crate defines the typed values of FHIR data:
//! - Type identity (`FHIR.<name>` names and the base-type chain)
//! - The value contract with strict equality, value equality and equivalence
//! - Primitives: boolean, the string family, the integer family, decimal,
//!   date, dateTime and time
//! - Ordered collections and quantities with unit-code arithmetic
//!
//! Every primitive distinguishes a nil value from a present one, offers a
//! panicking constructor for trusted literals and a `parse` function for
//! runtime input.

pub mod accessor;
pub mod boolean;
pub mod collection;
pub mod data_type;
pub mod decimal;
pub mod error;
pub mod integer;
pub mod quantity;
pub mod string;
pub mod temporal;
pub mod type_spec;

pub use accessor::*;
pub use boolean::FhirBoolean;
pub use collection::{FhirCollection, Item};
pub use data_type::DataType;
pub use decimal::{least_precision_truncate, precision_of, FhirDecimal};
pub use error::{ValueError, ValueResult};
pub use integer::{FhirInteger, FhirPositiveInt, FhirUnsignedInt};
pub use quantity::{
    decompose_code, merge_codes, ArithmeticOperator, FhirQuantity, UnitExponent, UCUM_SYSTEM,
};
pub use string::{FhirCode, FhirId, FhirMarkdown, FhirString, FhirUri};
pub use temporal::{FhirDate, FhirDateTime, FhirTime, Precision, ZoneOffset};
pub use type_spec::*;
