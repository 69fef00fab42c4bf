//! Opaque handles to feature-structure records.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to a feature-structure record in a store.
///
/// A handle is a plain non-negative integer, stable for the lifetime of the
/// store that issued it. Indexes hold handles, never references, so holding
/// a handle across mutations is always safe; only dereferencing through a
/// stale cursor is checked.
///
/// Handle `0` is reserved as the null reference.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FsRef(u32);

impl FsRef {
    /// The null reference.
    pub const NULL: FsRef = FsRef(0);

    /// Creates a handle from a raw store address.
    #[must_use]
    pub const fn new(address: u32) -> Self {
        Self(address)
    }

    /// Returns the raw store address of this handle.
    #[must_use]
    pub const fn address(self) -> u32 {
        self.0
    }

    /// Returns true if this is the null reference.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FsRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "FsRef(null)")
        } else {
            write!(f, "FsRef({})", self.0)
        }
    }
}

impl fmt::Display for FsRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "fs:null")
        } else {
            write!(f, "fs:{}", self.0)
        }
    }
}
