//! Multi-key record comparators.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use cassette_foundation::{Error, ErrorKind, FsRef, Result};
use cassette_store::FsHeap;
use cassette_typesystem::{FeatureId, LinearTypeOrder, TypeId, TypeSystem};

/// Direction of one comparator key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SortDirection {
    /// Smaller slot values order first.
    Standard,
    /// Larger slot values order first.
    Reverse,
}

/// An ordered list of feature keys, with an optional trailing linear
/// type order as the final tie-breaker.
///
/// Keys are evaluated left to right; the first non-equal key decides.
/// Every feature key must be integer-ranged, checked when the comparator
/// is registered with a repository.
#[derive(Clone, Debug, Default)]
pub struct IndexComparator {
    keys: Vec<(FeatureId, SortDirection)>,
    type_order: Option<LinearTypeOrder>,
}

impl IndexComparator {
    /// Creates a comparator with no keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a feature key.
    #[must_use]
    pub fn key(mut self, feature: FeatureId, direction: SortDirection) -> Self {
        self.keys.push((feature, direction));
        self
    }

    /// Appends the linear type order as the final tie-breaker.
    #[must_use]
    pub fn type_order(mut self, order: LinearTypeOrder) -> Self {
        self.type_order = Some(order);
        self
    }

    /// Returns true if this comparator has no feature keys and no type
    /// order.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.type_order.is_none()
    }

    /// Checks every feature key against `ts`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::BadComparatorKey`] for a key whose range is
    /// not `cas.Integer`.
    pub fn validate(&self, ts: &TypeSystem) -> Result<()> {
        for &(f, _) in &self.keys {
            if ts.feature_range(f) != TypeId::INTEGER {
                return Err(Error::new(ErrorKind::BadComparatorKey {
                    feature: ts.feature_full_name(f).to_string(),
                }));
            }
        }
        Ok(())
    }

    /// Compares the records at `a` and `b` key by key.
    ///
    /// # Panics
    ///
    /// Panics if either handle is dead; callers compare only indexed
    /// records, which insertion has validated.
    #[must_use]
    pub fn compare(&self, heap: &FsHeap, a: FsRef, b: FsRef) -> Ordering {
        for &(f, dir) in &self.keys {
            let va = heap.feature_slot(a, f);
            let vb = heap.feature_slot(b, f);
            let ord = match dir {
                SortDirection::Standard => va.cmp(&vb),
                SortDirection::Reverse => vb.cmp(&va),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        if let Some(order) = &self.type_order {
            return order.compare(heap.type_code(a), heap.type_code(b));
        }
        Ordering::Equal
    }
}
