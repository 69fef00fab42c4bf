//! Detached index cursors.

use cassette_foundation::{Error, FsRef, Result};
use cassette_tree::{NodeId, RbTree};
use cassette_typesystem::TypeId;

use crate::cas::Cas;

/// A position in one scoped index view.
///
/// Cursors hold no reference into the store; every operation takes the
/// owning [`Cas`]. A snapshot of the view's modification generation is
/// taken when the cursor is (re)positioned, and `get` / `move_to_next` /
/// `move_to_previous` fail with `ConcurrentModification` once the view
/// has changed underneath it. `move_to_first`, `move_to_last`, and
/// `move_to` re-snapshot, recovering a stale cursor.
#[derive(Copy, Clone, Debug)]
pub struct FsCursor {
    pub(crate) def: usize,
    pub(crate) scope: TypeId,
    node: NodeId,
    generation: u64,
}

impl FsCursor {
    pub(crate) fn detached(def: usize, scope: TypeId) -> Self {
        Self {
            def,
            scope,
            node: NodeId::NIL,
            generation: 0,
        }
    }

    /// Returns true if the cursor is positioned on a record.
    ///
    /// A stale cursor can still report valid; dereferencing it is what
    /// fails.
    #[must_use]
    pub fn is_valid(self) -> bool {
        !self.node.is_nil()
    }

    /// Returns the record at the cursor.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification` if the view changed since the
    /// cursor was positioned, and `NoSuchElement` if the cursor is
    /// invalid.
    #[allow(clippy::cast_sign_loss)]
    pub fn get(self, cas: &Cas) -> Result<FsRef> {
        self.check(cas)?;
        let tree = self.tree(cas).ok_or_else(Error::no_such_element)?;
        if self.node.is_nil() {
            return Err(Error::no_such_element());
        }
        Ok(FsRef::new(tree.key(self.node) as u32))
    }

    /// Repositions at the first record of the view, re-snapshotting.
    pub fn move_to_first(&mut self, cas: &Cas) {
        self.generation = cas.repository().generation(self.def, self.scope);
        self.node = self.tree(cas).map_or(NodeId::NIL, RbTree::first);
    }

    /// Repositions at the last record of the view, re-snapshotting.
    pub fn move_to_last(&mut self, cas: &Cas) {
        self.generation = cas.repository().generation(self.def, self.scope);
        self.node = self.tree(cas).map_or(NodeId::NIL, RbTree::last);
    }

    /// Steps forward. Stepping past the last record silently invalidates.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentModification` on a stale snapshot and
    /// `NoSuchElement` if the cursor is already invalid.
    pub fn move_to_next(&mut self, cas: &Cas) -> Result<()> {
        self.check(cas)?;
        if self.node.is_nil() {
            return Err(Error::no_such_element());
        }
        let tree = self.tree(cas).ok_or_else(Error::no_such_element)?;
        self.node = tree.next_node(self.node);
        Ok(())
    }

    /// Steps backward. Stepping before the first record silently
    /// invalidates.
    ///
    /// # Errors
    ///
    /// Same conditions as [`move_to_next`](Self::move_to_next).
    pub fn move_to_previous(&mut self, cas: &Cas) -> Result<()> {
        self.check(cas)?;
        if self.node.is_nil() {
            return Err(Error::no_such_element());
        }
        let tree = self.tree(cas).ok_or_else(Error::no_such_element)?;
        self.node = tree.prev_node(self.node);
        Ok(())
    }

    /// Repositions at the leftmost record comparing greater than or equal
    /// to the record at `fs` (the nearest-following position),
    /// re-snapshotting. Invalid if every record compares less.
    ///
    /// `fs` need not be indexed; it only supplies comparison keys.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` if `fs` is dead.
    #[allow(clippy::cast_possible_wrap)]
    pub fn move_to(&mut self, cas: &Cas, fs: FsRef) -> Result<()> {
        if !cas.heap().is_valid_ref(fs) {
            return Err(Error::invalid_handle(fs));
        }
        self.generation = cas.repository().generation(self.def, self.scope);
        self.node = match self.tree(cas) {
            None => NodeId::NIL,
            Some(tree) => {
                let cmp = cas.repository().definition(self.def).key_cmp(cas.heap());
                tree.find_insertion_point(fs.address() as i32, cmp)
            }
        };
        Ok(())
    }

    pub(crate) fn invalidate(&mut self) {
        self.node = NodeId::NIL;
    }

    fn check(self, cas: &Cas) -> Result<()> {
        if cas.repository().generation(self.def, self.scope) == self.generation {
            Ok(())
        } else {
            Err(Error::concurrent_modification())
        }
    }

    fn tree(self, cas: &Cas) -> Option<&RbTree<()>> {
        cas.repository().tree(self.def, self.scope)
    }
}
