//! Natural-order map specializations of the red-black tree.
//!
//! These are thin wrappers fixing the comparator to plain integer order,
//! for callers that key by dense ids (type codes, handles) rather than by
//! record fields.

use std::cmp::Ordering;

use crate::node::NodeId;
use crate::tree::{Iter, RbTree};

fn natural(a: i32, b: i32) -> Ordering {
    a.cmp(&b)
}

/// Int-to-int map backed by an arena red-black tree.
#[derive(Default)]
pub struct IntIntMap {
    tree: RbTree<i32>,
}

impl IntIntMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    pub fn insert(&mut self, key: i32, value: i32) -> Option<i32> {
        self.tree.insert(key, value, natural)
    }

    /// Looks up the value for `key`.
    #[must_use]
    pub fn get(&self, key: i32) -> Option<i32> {
        let n = self.tree.find_first_eq(key, natural);
        if n.is_nil() {
            None
        } else {
            Some(*self.tree.value(n))
        }
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: i32) -> bool {
        !self.tree.find_first_eq(key, natural).is_nil()
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: i32) -> Option<i32> {
        self.tree.remove(key, natural)
    }

    /// Returns an iterator over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.tree.iter().map(|(k, v)| (k, *v))
    }
}

/// Int-to-value map backed by an arena red-black tree.
pub struct IntValueMap<V> {
    tree: RbTree<V>,
}

impl<V> Default for IntValueMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IntValueMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RbTree::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    pub fn insert(&mut self, key: i32, value: V) -> Option<V> {
        self.tree.insert(key, value, natural)
    }

    /// Looks up the value for `key`.
    #[must_use]
    pub fn get(&self, key: i32) -> Option<&V> {
        let n = self.find(key);
        if n.is_nil() {
            None
        } else {
            Some(self.tree.value(n))
        }
    }

    /// Looks up the value for `key`, mutably.
    pub fn get_mut(&mut self, key: i32) -> Option<&mut V> {
        let n = self.find(key);
        if n.is_nil() {
            None
        } else {
            Some(self.tree.value_mut(n))
        }
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&mut self, key: i32) -> Option<V> {
        self.tree.remove(key, natural)
    }

    /// Returns an iterator over `(key, value)` pairs in key order.
    pub fn iter(&self) -> Iter<'_, V> {
        self.tree.iter()
    }

    fn find(&self, key: i32) -> NodeId {
        self.tree.find_first_eq(key, natural)
    }
}
