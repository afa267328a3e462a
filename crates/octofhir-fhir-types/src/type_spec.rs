//! Type identity: fully-qualified type names and base-type chains
//!
//! Every concrete value type exposes a process-wide [`TypeSpec`] constant.
//! Specs form a singly-linked chain towards the abstract root
//! `FHIR.Element`, which is what "is this instance (also) of type X" and
//! common-ancestor resolution walk.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Namespace of all types defined by the FHIR standard
pub const FHIR_NAMESPACE: &str = "FHIR";

/// Namespaced type name with a precomputed fully-qualified form
///
/// Equality and hashing only consider the fully-qualified string.
#[derive(Debug, Clone)]
pub struct FqTypeName {
    namespace: Cow<'static, str>,
    name: Cow<'static, str>,
    fq_name: Cow<'static, str>,
}

impl FqTypeName {
    /// Create a type name from runtime strings
    ///
    /// An empty namespace yields a bare fully-qualified name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        let fq_name = if namespace.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", namespace, name)
        };
        Self {
            namespace: Cow::Owned(namespace),
            name: Cow::Owned(name),
            fq_name: Cow::Owned(fq_name),
        }
    }

    /// Create a type name usable in constant context
    ///
    /// `fq_name` must be the concatenation the runtime constructor would
    /// produce; use [`fhir_type_name!`](crate::fhir_type_name) to get it right.
    pub const fn from_static(
        namespace: &'static str,
        name: &'static str,
        fq_name: &'static str,
    ) -> Self {
        Self {
            namespace: Cow::Borrowed(namespace),
            name: Cow::Borrowed(name),
            fq_name: Cow::Borrowed(fq_name),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified form, `Namespace.name` or bare `name`
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn has_namespace(&self) -> bool {
        !self.namespace.is_empty()
    }
}

impl PartialEq for FqTypeName {
    fn eq(&self, other: &Self) -> bool {
        self.fq_name == other.fq_name
    }
}

impl Eq for FqTypeName {}

impl Hash for FqTypeName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fq_name.hash(state);
    }
}

impl fmt::Display for FqTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fq_name)
    }
}

/// Build a constant [`FqTypeName`] in the `FHIR` namespace
#[macro_export]
macro_rules! fhir_type_name {
    ($name:literal) => {
        $crate::FqTypeName::from_static("FHIR", $name, concat!("FHIR.", $name))
    };
}

/// A type name together with its base type
///
/// Two specs are equal when their names are equal; the base chain is not
/// compared.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    name: FqTypeName,
    base: Option<&'static TypeSpec>,
}

impl TypeSpec {
    pub const fn new(name: FqTypeName, base: Option<&'static TypeSpec>) -> Self {
        Self { name, base }
    }

    pub fn name(&self) -> &FqTypeName {
        &self.name
    }

    pub fn base(&self) -> Option<&'static TypeSpec> {
        self.base
    }

    /// Iterate this spec followed by all of its base types, innermost last
    pub fn ancestors(&self) -> impl Iterator<Item = &TypeSpec> {
        std::iter::successors(Some(self), |spec| spec.base.map(|b| b as &TypeSpec))
    }

    /// Check whether this spec or any base type carries the given name
    pub fn extends_name(&self, candidate: &FqTypeName) -> bool {
        self.ancestors().any(|spec| spec.name == *candidate)
    }

    /// Check whether this spec is, or derives from, `other`
    pub fn extends(&self, other: &TypeSpec) -> bool {
        self.extends_name(&other.name)
    }

    /// Number of base types above this spec
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }
}

impl PartialEq for TypeSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeSpec {}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.name, f)
    }
}

/// Resolve the nearest common ancestor of two type specs
///
/// Walks the chain of `a` from `a` itself outwards and, for every
/// entry, the whole chain of `b`; the first name match wins. Returns `None`
/// for unrelated chains.
pub fn common_base_type<'a>(a: &'a TypeSpec, b: &'a TypeSpec) -> Option<&'a TypeSpec> {
    a.ancestors()
        .find(|outer| b.ancestors().any(|inner| inner.name == outer.name))
}

pub static ELEMENT_TYPE_SPEC: TypeSpec = TypeSpec::new(fhir_type_name!("Element"), None);

pub static BOOLEAN_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("boolean"), Some(&ELEMENT_TYPE_SPEC));

pub static STRING_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("string"), Some(&ELEMENT_TYPE_SPEC));
pub static CODE_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("code"), Some(&STRING_TYPE_SPEC));
pub static ID_TYPE_SPEC: TypeSpec = TypeSpec::new(fhir_type_name!("id"), Some(&STRING_TYPE_SPEC));
pub static MARKDOWN_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("markdown"), Some(&STRING_TYPE_SPEC));
pub static URI_TYPE_SPEC: TypeSpec = TypeSpec::new(fhir_type_name!("uri"), Some(&ELEMENT_TYPE_SPEC));

pub static INTEGER_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("integer"), Some(&ELEMENT_TYPE_SPEC));
pub static POSITIVE_INT_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("positiveInt"), Some(&INTEGER_TYPE_SPEC));
pub static UNSIGNED_INT_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("unsignedInt"), Some(&INTEGER_TYPE_SPEC));
pub static DECIMAL_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("decimal"), Some(&ELEMENT_TYPE_SPEC));

pub static DATE_TYPE_SPEC: TypeSpec = TypeSpec::new(fhir_type_name!("date"), Some(&ELEMENT_TYPE_SPEC));
pub static DATE_TIME_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("dateTime"), Some(&ELEMENT_TYPE_SPEC));
pub static TIME_TYPE_SPEC: TypeSpec = TypeSpec::new(fhir_type_name!("time"), Some(&ELEMENT_TYPE_SPEC));

pub static QUANTITY_TYPE_SPEC: TypeSpec =
    TypeSpec::new(fhir_type_name!("Quantity"), Some(&ELEMENT_TYPE_SPEC));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fq_name_forms() {
        let name = FqTypeName::new("FHIR", "string");
        assert_eq!(name.fq_name(), "FHIR.string");
        assert!(name.has_namespace());

        let bare = FqTypeName::new("", "Patient");
        assert_eq!(bare.fq_name(), "Patient");
        assert!(!bare.has_namespace());
    }

    #[test]
    fn test_static_and_runtime_names_are_equal() {
        assert_eq!(fhir_type_name!("code"), FqTypeName::new(FHIR_NAMESPACE, "code"));
        assert_ne!(fhir_type_name!("code"), FqTypeName::new("System", "code"));
    }

    #[test]
    fn test_type_spec_display() {
        assert_eq!(STRING_TYPE_SPEC.to_string(), "FHIR.string");
        assert_eq!(ELEMENT_TYPE_SPEC.to_string(), "FHIR.Element");
        assert_eq!(POSITIVE_INT_TYPE_SPEC.to_string(), "FHIR.positiveInt");
    }

    #[test]
    fn test_equality_ignores_base_chain() {
        let detached = TypeSpec::new(fhir_type_name!("code"), None);
        assert_eq!(detached, CODE_TYPE_SPEC);
    }

    #[test]
    fn test_extends_name() {
        assert!(CODE_TYPE_SPEC.extends_name(CODE_TYPE_SPEC.name()));
        assert!(CODE_TYPE_SPEC.extends_name(STRING_TYPE_SPEC.name()));
        assert!(CODE_TYPE_SPEC.extends_name(ELEMENT_TYPE_SPEC.name()));
        assert!(!CODE_TYPE_SPEC.extends_name(URI_TYPE_SPEC.name()));
        assert!(!STRING_TYPE_SPEC.extends(&CODE_TYPE_SPEC));
    }

    #[test]
    fn test_depth() {
        assert_eq!(ELEMENT_TYPE_SPEC.depth(), 0);
        assert_eq!(INTEGER_TYPE_SPEC.depth(), 1);
        assert_eq!(UNSIGNED_INT_TYPE_SPEC.depth(), 2);
    }

    #[test]
    fn test_common_base_type() {
        let common = common_base_type(&CODE_TYPE_SPEC, &ID_TYPE_SPEC);
        assert_eq!(common, Some(&STRING_TYPE_SPEC));

        let common = common_base_type(&POSITIVE_INT_TYPE_SPEC, &INTEGER_TYPE_SPEC);
        assert_eq!(common, Some(&INTEGER_TYPE_SPEC));

        let common = common_base_type(&CODE_TYPE_SPEC, &DECIMAL_TYPE_SPEC);
        assert_eq!(common, Some(&ELEMENT_TYPE_SPEC));
    }

    #[test]
    fn test_common_base_type_unrelated() {
        static PATIENT: TypeSpec = TypeSpec::new(FqTypeName::from_static("", "Patient", "Patient"), None);
        assert_eq!(common_base_type(&PATIENT, &STRING_TYPE_SPEC), None);
    }
}
