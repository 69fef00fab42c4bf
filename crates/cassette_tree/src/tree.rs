//! The generic comparator-driven red-black tree.

use std::cmp::Ordering;

use rand::Rng;

use crate::node::{Color, Node, NodeId};

/// Arena-encoded red-black tree keyed by `i32` record handles.
///
/// The tree never interprets keys itself: every search and mutation takes
/// an external comparator `cmp(probe, stored)` so that keys can stand for
/// records ordered by their field values. Natural-order wrappers for plain
/// integer keys live in [`crate::IntIntMap`] and [`crate::IntValueMap`].
///
/// Two insertion modes exist:
/// - [`RbTree::insert`] keeps comparator-equal keys unique (the existing
///   node and key win; only the payload is replaced), and
/// - [`RbTree::insert_with_dups`] admits equal keys, descending left or
///   right of each equal node with probability ½ so that long runs of
///   duplicates do not degenerate the balance.
///
/// A cached greatest-node pointer turns monotonically increasing insertion
/// (the common case for annotations created in text order) into an O(1)
/// amortized append.
pub struct RbTree<V> {
    nodes: Vec<Node<V>>,
    root: NodeId,
    greatest: NodeId,
    len: usize,
}

impl<V> Default for RbTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RbTree<V> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel()],
            root: NodeId::NIL,
            greatest: NodeId::NIL,
            len: 0,
        }
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the key stored at `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is the sentinel or out of range.
    #[must_use]
    pub fn key(&self, node: NodeId) -> i32 {
        assert!(!node.is_nil(), "key() on sentinel node");
        self.nodes[node.0 as usize].key
    }

    /// Returns a reference to the payload stored at `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is the sentinel, out of range, or unlinked.
    #[must_use]
    pub fn value(&self, node: NodeId) -> &V {
        self.nodes[node.0 as usize]
            .value
            .as_ref()
            .expect("value() on sentinel or unlinked node")
    }

    /// Returns a mutable reference to the payload stored at `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is the sentinel, out of range, or unlinked.
    pub fn value_mut(&mut self, node: NodeId) -> &mut V {
        self.nodes[node.0 as usize]
            .value
            .as_mut()
            .expect("value_mut() on sentinel or unlinked node")
    }

    /// Returns the minimum node, or NIL if the tree is empty.
    #[must_use]
    pub fn first(&self) -> NodeId {
        self.subtree_min(self.root)
    }

    /// Returns the maximum node, or NIL if the tree is empty.
    #[must_use]
    pub fn last(&self) -> NodeId {
        self.greatest
    }

    /// Returns the in-order successor of `node`, or NIL past the end.
    #[must_use]
    pub fn next_node(&self, node: NodeId) -> NodeId {
        if node.is_nil() {
            return NodeId::NIL;
        }
        let right = self.right(node);
        if !right.is_nil() {
            return self.subtree_min(right);
        }
        let mut n = node;
        let mut p = self.parent(n);
        while !p.is_nil() && n == self.right(p) {
            n = p;
            p = self.parent(n);
        }
        p
    }

    /// Returns the in-order predecessor of `node`, or NIL past the start.
    #[must_use]
    pub fn prev_node(&self, node: NodeId) -> NodeId {
        if node.is_nil() {
            return NodeId::NIL;
        }
        let left = self.left(node);
        if !left.is_nil() {
            return self.subtree_max(left);
        }
        let mut n = node;
        let mut p = self.parent(n);
        while !p.is_nil() && n == self.left(p) {
            n = p;
            p = self.parent(n);
        }
        p
    }

    /// Inserts `key` without duplicates.
    ///
    /// If a comparator-equal node exists, its key is kept and its payload
    /// replaced; the previous payload is returned. Otherwise a new node is
    /// added and `None` returned.
    pub fn insert(
        &mut self,
        key: i32,
        value: V,
        cmp: impl Fn(i32, i32) -> Ordering,
    ) -> Option<V> {
        // Append fast path for monotonically increasing keys.
        if !self.greatest.is_nil() && cmp(key, self.key(self.greatest)) == Ordering::Greater {
            let y = self.greatest;
            let z = self.new_node(key, value);
            self.link_child(y, z, false);
            self.greatest = z;
            self.insert_fixup(z);
            self.len += 1;
            return None;
        }
        let mut y = NodeId::NIL;
        let mut x = self.root;
        let mut went_left = false;
        while !x.is_nil() {
            y = x;
            match cmp(key, self.key(x)) {
                Ordering::Equal => {
                    return self.nodes[x.0 as usize].value.replace(value);
                }
                Ordering::Less => {
                    went_left = true;
                    x = self.left(x);
                }
                Ordering::Greater => {
                    went_left = false;
                    x = self.right(x);
                }
            }
        }
        let z = self.new_node(key, value);
        if y.is_nil() {
            self.set_root(z);
            self.greatest = z;
        } else {
            self.link_child(y, z, went_left);
        }
        self.insert_fixup(z);
        self.len += 1;
        None
    }

    /// Inserts `key`, admitting comparator-equal duplicates.
    ///
    /// On an equal compare the descent continues left or right with
    /// probability ½, so repeated equal keys stay spread across the tree.
    /// Returns the id of the new node.
    pub fn insert_with_dups(
        &mut self,
        key: i32,
        value: V,
        rng: &mut impl Rng,
        cmp: impl Fn(i32, i32) -> Ordering,
    ) -> NodeId {
        // Append fast path: equal-or-greater keys go right of the maximum.
        if !self.greatest.is_nil() && cmp(key, self.key(self.greatest)) != Ordering::Less {
            let y = self.greatest;
            let z = self.new_node(key, value);
            self.link_child(y, z, false);
            self.greatest = z;
            self.insert_fixup(z);
            self.len += 1;
            return z;
        }
        let mut y = NodeId::NIL;
        let mut x = self.root;
        let mut went_left = false;
        while !x.is_nil() {
            y = x;
            went_left = match cmp(key, self.key(x)) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => rng.r#gen::<bool>(),
            };
            x = if went_left { self.left(x) } else { self.right(x) };
        }
        let z = self.new_node(key, value);
        if y.is_nil() {
            self.set_root(z);
            self.greatest = z;
        } else {
            self.link_child(y, z, went_left);
        }
        self.insert_fixup(z);
        self.len += 1;
        z
    }

    /// Returns the leftmost node whose key compares equal to `key`, or NIL.
    #[must_use]
    pub fn find_first_eq(&self, key: i32, cmp: impl Fn(i32, i32) -> Ordering) -> NodeId {
        let p = self.find_insertion_point(key, &cmp);
        if !p.is_nil() && cmp(key, self.key(p)) == Ordering::Equal {
            p
        } else {
            NodeId::NIL
        }
    }

    /// Returns the leftmost node whose key compares greater than or equal
    /// to `key` (the nearest-following position), or NIL if every node
    /// compares less.
    #[must_use]
    pub fn find_insertion_point(&self, key: i32, cmp: impl Fn(i32, i32) -> Ordering) -> NodeId {
        let mut n = self.root;
        let mut best = NodeId::NIL;
        while !n.is_nil() {
            if cmp(key, self.key(n)) == Ordering::Greater {
                n = self.right(n);
            } else {
                best = n;
                n = self.left(n);
            }
        }
        best
    }

    /// Removes the node whose stored key is exactly `key`, searching the
    /// run of comparator-equal nodes for the identity match. Returns the
    /// removed payload, or `None` if no such node exists.
    pub fn remove(&mut self, key: i32, cmp: impl Fn(i32, i32) -> Ordering) -> Option<V> {
        let mut n = self.find_insertion_point(key, &cmp);
        while !n.is_nil() && cmp(key, self.key(n)) == Ordering::Equal {
            if self.key(n) == key {
                return Some(self.remove_node(n));
            }
            n = self.next_node(n);
        }
        None
    }

    /// Returns an in-order iterator over `(key, payload)` pairs.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            tree: self,
            node: self.first(),
        }
    }

    // =========================================================================
    // Arena plumbing
    // =========================================================================

    fn node(&self, n: NodeId) -> &Node<V> {
        &self.nodes[n.0 as usize]
    }

    fn node_mut(&mut self, n: NodeId) -> &mut Node<V> {
        &mut self.nodes[n.0 as usize]
    }

    fn left(&self, n: NodeId) -> NodeId {
        self.node(n).left
    }

    fn right(&self, n: NodeId) -> NodeId {
        self.node(n).right
    }

    fn parent(&self, n: NodeId) -> NodeId {
        self.node(n).parent
    }

    fn color(&self, n: NodeId) -> Color {
        self.node(n).color
    }

    fn set_color(&mut self, n: NodeId, color: Color) {
        self.node_mut(n).color = color;
    }

    fn subtree_min(&self, mut n: NodeId) -> NodeId {
        if n.is_nil() {
            return NodeId::NIL;
        }
        while !self.left(n).is_nil() {
            n = self.left(n);
        }
        n
    }

    fn subtree_max(&self, mut n: NodeId) -> NodeId {
        if n.is_nil() {
            return NodeId::NIL;
        }
        while !self.right(n).is_nil() {
            n = self.right(n);
        }
        n
    }

    fn new_node(&mut self, key: i32, value: V) -> NodeId {
        let id = u32::try_from(self.nodes.len()).expect("tree arena exceeds u32 node ids");
        self.nodes.push(Node {
            key,
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent: NodeId::NIL,
            color: Color::Red,
            value: Some(value),
        });
        NodeId(id)
    }

    fn set_root(&mut self, n: NodeId) {
        self.root = n;
        self.node_mut(n).parent = NodeId::NIL;
    }

    fn link_child(&mut self, parent: NodeId, child: NodeId, as_left: bool) {
        if as_left {
            self.node_mut(parent).left = child;
        } else {
            self.node_mut(parent).right = child;
        }
        self.node_mut(child).parent = parent;
    }

    // =========================================================================
    // Rotations and fixups (CLRS, with the slot-0 sentinel standing in for
    // nil so fixup may scribble on its links)
    // =========================================================================

    fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x);
        let yl = self.left(y);
        self.node_mut(x).right = yl;
        if !yl.is_nil() {
            self.node_mut(yl).parent = x;
        }
        let xp = self.parent(x);
        self.node_mut(y).parent = xp;
        if xp.is_nil() {
            self.root = y;
        } else if x == self.left(xp) {
            self.node_mut(xp).left = y;
        } else {
            self.node_mut(xp).right = y;
        }
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
    }

    fn rotate_right(&mut self, x: NodeId) {
        let y = self.left(x);
        let yr = self.right(y);
        self.node_mut(x).left = yr;
        if !yr.is_nil() {
            self.node_mut(yr).parent = x;
        }
        let xp = self.parent(x);
        self.node_mut(y).parent = xp;
        if xp.is_nil() {
            self.root = y;
        } else if x == self.right(xp) {
            self.node_mut(xp).right = y;
        } else {
            self.node_mut(xp).left = y;
        }
        self.node_mut(y).right = x;
        self.node_mut(x).parent = y;
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color(self.parent(z)) == Color::Red {
            let p = self.parent(z);
            let g = self.parent(p);
            if p == self.left(g) {
                let u = self.right(g);
                if self.color(u) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(u, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.right(p) {
                        z = p;
                        self.rotate_left(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_right(g);
                }
            } else {
                let u = self.left(g);
                if self.color(u) == Color::Red {
                    self.set_color(p, Color::Black);
                    self.set_color(u, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                } else {
                    if z == self.left(p) {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.set_color(p, Color::Black);
                    self.set_color(g, Color::Red);
                    self.rotate_left(g);
                }
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let up = self.parent(u);
        if up.is_nil() {
            self.root = v;
        } else if u == self.left(up) {
            self.node_mut(up).left = v;
        } else {
            self.node_mut(up).right = v;
        }
        // The sentinel's parent is deliberately written here; delete_fixup
        // reads it when x is nil.
        self.node_mut(v).parent = up;
    }

    /// Unlinks `z` from the tree and returns its payload. The slot is not
    /// reclaimed, so other node ids stay valid.
    pub(crate) fn remove_node(&mut self, z: NodeId) -> V {
        let mut y = z;
        let mut y_color = self.color(y);
        let x;
        if self.left(z).is_nil() {
            x = self.right(z);
            self.transplant(z, x);
        } else if self.right(z).is_nil() {
            x = self.left(z);
            self.transplant(z, x);
        } else {
            y = self.subtree_min(self.right(z));
            y_color = self.color(y);
            x = self.right(y);
            if self.parent(y) == z {
                self.node_mut(x).parent = y;
            } else {
                self.transplant(y, x);
                let zr = self.right(z);
                self.node_mut(y).right = zr;
                self.node_mut(zr).parent = y;
            }
            self.transplant(z, y);
            let zl = self.left(z);
            self.node_mut(y).left = zl;
            self.node_mut(zl).parent = y;
            let zc = self.color(z);
            self.set_color(y, zc);
        }
        if y_color == Color::Black {
            self.delete_fixup(x);
        }
        self.len -= 1;
        if z == self.greatest {
            self.greatest = self.subtree_max(self.root);
        }
        // Detach the slot; its id must never resolve to live data again.
        let node = self.node_mut(z);
        node.left = NodeId::NIL;
        node.right = NodeId::NIL;
        node.parent = NodeId::NIL;
        node.value.take().expect("removing unlinked node")
    }

    fn delete_fixup(&mut self, mut x: NodeId) {
        while x != self.root && self.color(x) == Color::Black {
            let p = self.parent(x);
            if x == self.left(p) {
                let mut w = self.right(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_left(p);
                    w = self.right(self.parent(x));
                }
                if self.color(self.left(w)) == Color::Black
                    && self.color(self.right(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.right(w)) == Color::Black {
                        let wl = self.left(w);
                        self.set_color(wl, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_right(w);
                        w = self.right(self.parent(x));
                    }
                    let p = self.parent(x);
                    let pc = self.color(p);
                    self.set_color(w, pc);
                    self.set_color(p, Color::Black);
                    let wr = self.right(w);
                    self.set_color(wr, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.left(p);
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.set_color(p, Color::Red);
                    self.rotate_right(p);
                    w = self.left(self.parent(x));
                }
                if self.color(self.right(w)) == Color::Black
                    && self.color(self.left(w)) == Color::Black
                {
                    self.set_color(w, Color::Red);
                    x = self.parent(x);
                } else {
                    if self.color(self.left(w)) == Color::Black {
                        let wr = self.right(w);
                        self.set_color(wr, Color::Black);
                        self.set_color(w, Color::Red);
                        self.rotate_left(w);
                        w = self.left(self.parent(x));
                    }
                    let p = self.parent(x);
                    let pc = self.color(p);
                    self.set_color(w, pc);
                    self.set_color(p, Color::Black);
                    let wl = self.left(w);
                    self.set_color(wl, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        self.set_color(x, Color::Black);
        // Restore the sentinel in case fixup touched it.
        self.nodes[0].color = Color::Black;
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        assert_eq!(self.color(self.root), Color::Black, "root must be black");
        let black_height = self.check_subtree(self.root);
        let _ = black_height;
        let mut count = 0;
        let mut n = self.first();
        while !n.is_nil() {
            count += 1;
            n = self.next_node(n);
        }
        assert_eq!(count, self.len, "in-order walk disagrees with len");
        if !self.root.is_nil() {
            assert_eq!(
                self.greatest,
                self.subtree_max(self.root),
                "stale greatest-node pointer"
            );
        }
    }

    #[cfg(test)]
    fn check_subtree(&self, n: NodeId) -> usize {
        if n.is_nil() {
            return 1;
        }
        if self.color(n) == Color::Red {
            assert_ne!(
                self.color(self.parent(n)),
                Color::Red,
                "red node with red parent"
            );
        }
        let lh = self.check_subtree(self.left(n));
        let rh = self.check_subtree(self.right(n));
        assert_eq!(lh, rh, "unequal black heights");
        lh + usize::from(self.color(n) == Color::Black)
    }
}

/// In-order iterator over a tree's `(key, payload)` pairs.
pub struct Iter<'a, V> {
    tree: &'a RbTree<V>,
    node: NodeId,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (i32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.node.is_nil() {
            return None;
        }
        let n = self.node;
        self.node = self.tree.next_node(n);
        Some((self.tree.key(n), self.tree.value(n)))
    }
}
