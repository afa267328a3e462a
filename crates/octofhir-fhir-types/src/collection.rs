//! Ordered, append-only collection of values

use crate::error::usage_failure;
use crate::{
    common_base_type, value_equal, value_equivalent, Accessor, DataType, EqualityEvaluator,
    TypeSpec, ELEMENT_TYPE_SPEC,
};
use octofhir_fhir_diagnostics::FHIR0201;
use smallvec::SmallVec;
use std::any::Any;
use std::sync::Arc;

/// Shared handle to a collection item; `None` is a nil entry
pub type Item = Option<Arc<dyn Accessor>>;

/// Ordered values of a declared or inferred item type
///
/// Items are never removed. Equality is positional: `[A, B]` and `[B, A]`
/// are different collections.
#[derive(Debug, Clone)]
pub struct FhirCollection {
    item_type: &'static TypeSpec,
    infer_item_type: bool,
    items: SmallVec<[Item; 4]>,
}

impl FhirCollection {
    /// Create an empty collection of a fixed item type
    pub fn new(item_type: &'static TypeSpec) -> Self {
        Self {
            item_type,
            infer_item_type: false,
            items: SmallVec::new(),
        }
    }

    /// Create an empty collection whose item type follows its items
    ///
    /// The item type starts as `FHIR.Element`, becomes the type of the first
    /// non-nil item, then narrows to the nearest common base type of every
    /// non-nil item added. Items with no common base widen it back to
    /// `FHIR.Element`.
    pub fn inferred() -> Self {
        Self {
            item_type: &ELEMENT_TYPE_SPEC,
            infer_item_type: true,
            items: SmallVec::new(),
        }
    }

    /// Declared type of the items
    pub fn item_type(&self) -> &'static TypeSpec {
        self.item_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn get(&self, index: usize) -> Option<&dyn Accessor> {
        match self.items.get(index) {
            Some(item) => item.as_deref(),
            None => usage_failure(
                FHIR0201,
                format!(
                    "Index {} out of range for collection of length {}",
                    index,
                    self.items.len()
                ),
            ),
        }
    }

    /// Append an item, nil entries included
    pub fn add(&mut self, item: Item) {
        self.narrow_item_type(&item);
        self.items.push(item);
    }

    /// Append a concrete value
    pub fn add_value<T: Accessor>(&mut self, value: T) {
        self.add(Some(Arc::new(value)));
    }

    /// Append unless a value-equal item is already present
    ///
    /// A nil entry matches only another nil entry. Returns whether the item
    /// was added.
    pub fn add_unique(&mut self, item: Item) -> bool {
        let present = self.items.iter().any(|existing| match (existing, &item) {
            (None, None) => true,
            (Some(existing), Some(item)) => value_equal(Some(&**existing), Some(&**item)),
            _ => false,
        });
        if present {
            return false;
        }
        self.add(item);
        true
    }

    /// Apply [`add_unique`](Self::add_unique) to every item of `other` in
    /// order, returning how many were added
    pub fn add_all_unique(&mut self, other: &Self) -> usize {
        other
            .items
            .iter()
            .filter(|item| self.add_unique((*item).clone()))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&dyn Accessor>> {
        self.items.iter().map(|item| item.as_deref())
    }

    fn narrow_item_type(&mut self, item: &Item) {
        if !self.infer_item_type {
            return;
        }
        let Some(value) = item else {
            return;
        };
        let item_type = value.type_spec();
        self.item_type = if self.items.iter().any(Option::is_some) {
            common_base_type(self.item_type, item_type).unwrap_or(&ELEMENT_TYPE_SPEC)
        } else {
            item_type
        };
    }

    fn pairwise(&self, other: &dyn Accessor, eq: impl Fn(&Item, &Item) -> bool) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| {
                self.items.len() == other.items.len()
                    && self.items.iter().zip(&other.items).all(|(a, b)| eq(a, b))
            })
    }
}

impl<'a> IntoIterator for &'a FhirCollection {
    type Item = Option<&'a dyn Accessor>;
    type IntoIter = Box<dyn Iterator<Item = Option<&'a dyn Accessor>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Accessor for FhirCollection {
    fn data_type(&self) -> DataType {
        DataType::Collection
    }

    fn type_spec(&self) -> &'static TypeSpec {
        self.item_type
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn equal(&self, other: &dyn Accessor) -> bool {
        self.pairwise(other, |a, b| crate::equal(a.as_deref(), b.as_deref()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_equality_evaluator(&self) -> Option<&dyn EqualityEvaluator> {
        Some(self)
    }
}

impl EqualityEvaluator for FhirCollection {
    fn value_equal(&self, other: &dyn Accessor) -> bool {
        self.pairwise(other, |a, b| value_equal(a.as_deref(), b.as_deref()))
    }

    fn value_equivalent(&self, other: &dyn Accessor) -> bool {
        self.pairwise(other, |a, b| value_equivalent(a.as_deref(), b.as_deref()))
    }
}
