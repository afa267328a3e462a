//! FHIR string family: `string`, `code`, `id`, `markdown` and `uri`
//!
//! All kinds store their text verbatim and validate it against the literal
//! grammar of the kind at construction. Value comparison works across the
//! whole family; strict equality requires the same kind.

use crate::error::trusted_literal_failure;
use crate::{
    Accessor, Comparator, DataType, EqualityEvaluator, PrimitiveAccessor, StringAccessor,
    TypeSpec, ValueError, ValueResult, CODE_TYPE_SPEC, ID_TYPE_SPEC, MARKDOWN_TYPE_SPEC,
    STRING_TYPE_SPEC, URI_TYPE_SPEC,
};
use regex::Regex;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static STRING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\r\n\t\x{20}-\x{FFFF}]*$").expect("string pattern"));
static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s]+( [^\s]+)*$").expect("code pattern"));
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").expect("id pattern"));
static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S*$").expect("uri pattern"));

/// Collapse whitespace runs and ignore case
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

macro_rules! string_type {
    (
        $(#[$meta:meta])*
        $name:ident, $data_type:ident, $type_spec:ident, $pattern:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            nil: bool,
            value: String,
        }

        impl $name {
            /// Create a value from trusted text
            ///
            /// # Panics
            ///
            /// Panics if the text does not match the literal grammar.
            #[track_caller]
            pub fn new(value: impl Into<String>) -> Self {
                Self::parse(value).unwrap_or_else(|err| trusted_literal_failure(err))
            }

            /// Create a value from untrusted text
            pub fn parse(value: impl Into<String>) -> ValueResult<Self> {
                let value = value.into();
                if !$pattern.is_match(&value) {
                    return Err(ValueError::invalid_literal(
                        $type_spec.name().name(),
                        value,
                    ));
                }
                Ok(Self { nil: false, value })
            }

            /// Alias of [`new`](Self::new) for literal-heavy call sites
            #[track_caller]
            pub fn from_literal(value: &str) -> Self {
                Self::new(value)
            }

            /// Nil value, carrying an empty string as payload
            pub fn nil() -> Self {
                Self {
                    nil: true,
                    value: String::new(),
                }
            }

            pub fn is_nil(&self) -> bool {
                self.nil
            }

            /// Payload text, empty when nil
            pub fn value(&self) -> &str {
                &self.value
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
                f.write_str(&self.value)
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

            fn as_string(&self) -> Option<&dyn StringAccessor> {
                Some(self)
            }
        }

        impl EqualityEvaluator for $name {
            fn value_equal(&self, other: &dyn Accessor) -> bool {
                other
                    .as_string()
                    .is_some_and(|other| self.string_value() == other.string_value())
            }

            fn value_equivalent(&self, other: &dyn Accessor) -> bool {
                other.as_string().is_some_and(|other| {
                    match (self.string_value(), other.string_value()) {
                        (None, None) => true,
                        (Some(a), Some(b)) => normalize(a) == normalize(b),
                        _ => false,
                    }
                })
            }
        }

        impl PrimitiveAccessor for $name {
            fn is_nil(&self) -> bool {
                self.nil
            }
        }

        impl Comparator for $name {
            fn compare(&self, other: &dyn Accessor) -> Option<Ordering> {
                let other = other.as_string()?.string_value()?;
                Some(self.string_value()?.cmp(other))
            }
        }

        impl StringAccessor for $name {
            fn string_value(&self) -> Option<&str> {
                (!self.nil).then_some(self.value.as_str())
            }
        }
    };
}

string_type!(
    /// FHIR `string`: any text of tab, carriage return, line feed and BMP characters
    FhirString, String, STRING_TYPE_SPEC, STRING_PATTERN
);

string_type!(
    /// FHIR `code`: non-whitespace runs separated by single spaces
    FhirCode, Code, CODE_TYPE_SPEC, CODE_PATTERN
);

string_type!(
    /// FHIR `id`: up to 64 letters, digits, `-` and `.`
    FhirId, Id, ID_TYPE_SPEC, ID_PATTERN
);

string_type!(
    /// FHIR `markdown`: string content interpreted as markdown by renderers
    FhirMarkdown, Markdown, MARKDOWN_TYPE_SPEC, STRING_PATTERN
);

string_type!(
    /// FHIR `uri`: text without whitespace
    FhirUri, Uri, URI_TYPE_SPEC, URI_PATTERN
);
