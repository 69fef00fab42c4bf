//! Arena node identifiers and the node record itself.

use std::fmt;

/// Identifier of a node slot in a tree arena.
///
/// [`NodeId::NIL`] (slot 0) is the shared leaf/root-parent sentinel of
/// every tree. Real nodes start at slot 1. Ids are `Copy` and stable for
/// the lifetime of the tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The sentinel node id.
    pub const NIL: NodeId = NodeId(0);

    /// Returns the raw slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns true if this is the sentinel.
    #[must_use]
    pub const fn is_nil(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "NodeId(nil)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

pub(crate) struct Node<V> {
    pub key: i32,
    pub left: NodeId,
    pub right: NodeId,
    pub parent: NodeId,
    pub color: Color,
    /// `None` only for the sentinel and for unlinked (deleted) slots.
    pub value: Option<V>,
}

impl<V> Node<V> {
    pub fn sentinel() -> Self {
        Self {
            key: 0,
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent: NodeId::NIL,
            color: Color::Black,
            value: None,
        }
    }
}
