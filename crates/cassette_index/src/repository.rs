//! The index repository.
//!
//! One red-black tree per (index definition, concrete type), instantiated
//! lazily on first touch. Inserting a record places its handle in the tree
//! of every type from the record's own type up to the definition's base,
//! so a view scoped anywhere on that path reads a single tree and still
//! sees every subtype record.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::Rng;

use cassette_foundation::{Error, ErrorKind, FsRef, Result};
use cassette_store::FsHeap;
use cassette_tree::{IntValueMap, RbTree};
use cassette_typesystem::{FeatureId, LinearTypeOrderBuilder, TypeId, TypeSystem};

use crate::comparator::{IndexComparator, SortDirection};

/// The label of the built-in sorted annotation index.
pub const ANNOTATION_INDEX: &str = "annotations";

/// How an index treats comparator-equal records.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IndexStrategy {
    /// Keyed by raw handle; every insertion coexists, no comparator.
    Bag,
    /// Comparator-equal records collapse; the first inserted wins.
    Set,
    /// Comparator order with duplicates admitted.
    Sorted,
}

/// A registered index: label, base type, strategy, and comparator.
#[derive(Clone, Debug)]
pub struct IndexDefinition {
    label: String,
    base: TypeId,
    strategy: IndexStrategy,
    comparator: IndexComparator,
}

impl IndexDefinition {
    /// Creates a definition. Validation happens at registration.
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        base: TypeId,
        strategy: IndexStrategy,
        comparator: IndexComparator,
    ) -> Self {
        Self {
            label: label.into(),
            base,
            strategy,
            comparator,
        }
    }

    /// The index label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The base type; the index covers this type and all its subtypes.
    #[must_use]
    pub fn base(&self) -> TypeId {
        self.base
    }

    /// The index strategy.
    #[must_use]
    pub fn strategy(&self) -> IndexStrategy {
        self.strategy
    }

    /// The comparator (empty for bag indexes).
    #[must_use]
    pub fn comparator(&self) -> &IndexComparator {
        &self.comparator
    }

    /// Tree-key comparator for this index: bag indexes order by raw
    /// handle, the others by record comparison.
    #[allow(clippy::cast_sign_loss)]
    pub(crate) fn key_cmp<'a>(&'a self, heap: &'a FsHeap) -> impl Fn(i32, i32) -> Ordering + 'a {
        move |a, b| match self.strategy {
            IndexStrategy::Bag => a.cmp(&b),
            IndexStrategy::Set | IndexStrategy::Sorted => {
                self.comparator
                    .compare(heap, FsRef::new(a as u32), FsRef::new(b as u32))
            }
        }
    }
}

/// The per-type slice of one index: its tree and its modification
/// generation, which fail-fast cursors snapshot.
#[derive(Default)]
struct TypeIndex {
    generation: u64,
    tree: RbTree<()>,
}

/// Holds every registered index over one type system.
pub struct IndexRepository {
    ts: Arc<TypeSystem>,
    defs: Vec<IndexDefinition>,
    labels: HashMap<String, usize>,
    // Parallel to `defs`: per-type trees keyed by type id.
    scoped: Vec<IntValueMap<TypeIndex>>,
    committed: bool,
}

impl IndexRepository {
    /// Creates a repository over `ts` with the built-in annotation index
    /// (label [`ANNOTATION_INDEX`]: sorted, begin ascending, end
    /// descending, default linear type order) already registered.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotCommitted`] if `ts` is not committed.
    pub fn new(ts: Arc<TypeSystem>) -> Result<Self> {
        if !ts.is_committed() {
            return Err(Error::new(ErrorKind::NotCommitted));
        }
        let order = LinearTypeOrderBuilder::new().build(&ts)?;
        let mut repo = Self {
            ts,
            defs: Vec::new(),
            labels: HashMap::new(),
            scoped: Vec::new(),
            committed: false,
        };
        let annotations = IndexDefinition::new(
            ANNOTATION_INDEX,
            TypeId::ANNOTATION,
            IndexStrategy::Sorted,
            IndexComparator::new()
                .key(FeatureId::BEGIN, SortDirection::Standard)
                .key(FeatureId::END, SortDirection::Reverse)
                .type_order(order),
        );
        repo.register(annotations)?;
        Ok(repo)
    }

    /// Returns the type system this repository indexes records of.
    #[must_use]
    pub fn type_system(&self) -> &Arc<TypeSystem> {
        &self.ts
    }

    /// Returns the registered definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &IndexDefinition> {
        self.defs.iter()
    }

    /// Registers an index definition.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::AlreadyCommitted`] after [`commit`](Self::commit),
    /// [`ErrorKind::DuplicateIndexLabel`] on label reuse,
    /// [`ErrorKind::MissingComparator`] for a set or sorted index without
    /// keys, and [`ErrorKind::BadComparatorKey`] for a non-integer key.
    pub fn register(&mut self, def: IndexDefinition) -> Result<()> {
        if self.committed {
            return Err(Error::new(ErrorKind::AlreadyCommitted));
        }
        if self.labels.contains_key(&def.label) {
            return Err(Error::new(ErrorKind::DuplicateIndexLabel { label: def.label }));
        }
        if def.strategy != IndexStrategy::Bag && def.comparator.is_empty() {
            return Err(Error::new(ErrorKind::MissingComparator { label: def.label }));
        }
        def.comparator.validate(&self.ts)?;
        self.labels.insert(def.label.clone(), self.defs.len());
        self.defs.push(def);
        self.scoped.push(IntValueMap::new());
        Ok(())
    }

    /// Freezes the definition set; records may be indexed afterwards.
    /// Idempotent.
    pub fn commit(&mut self) {
        self.committed = true;
    }

    /// Returns true once [`commit`](Self::commit) has run.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    // =========================================================================
    // Record indexing
    // =========================================================================

    /// Adds the record at `fs` to every index whose base subsumes its
    /// type, bumping each touched generation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotCommitted`] before [`commit`](Self::commit)
    /// and [`ErrorKind::InvalidHandle`] for a dead handle.
    pub fn add_fs(&mut self, heap: &FsHeap, rng: &mut impl Rng, fs: FsRef) -> Result<()> {
        let (key, paths) = self.prepare(heap, fs)?;
        for (d, path) in paths {
            let def = &self.defs[d];
            let cmp = def.key_cmp(heap);
            let map = &mut self.scoped[d];
            for ty in path {
                let entry = entry_for(map, ty);
                entry.generation += 1;
                match def.strategy {
                    IndexStrategy::Set => {
                        entry.tree.insert(key, (), &cmp);
                    }
                    IndexStrategy::Bag | IndexStrategy::Sorted => {
                        entry.tree.insert_with_dups(key, (), rng, &cmp);
                    }
                }
            }
        }
        Ok(())
    }

    /// Removes one instance of the record at `fs` from every index whose
    /// base subsumes its type. Every covered generation is bumped whether
    /// or not the record was present.
    ///
    /// # Errors
    ///
    /// Same conditions as [`add_fs`](Self::add_fs).
    pub fn remove_fs(&mut self, heap: &FsHeap, fs: FsRef) -> Result<()> {
        let (key, paths) = self.prepare(heap, fs)?;
        for (d, path) in paths {
            let def = &self.defs[d];
            let cmp = def.key_cmp(heap);
            let map = &mut self.scoped[d];
            for ty in path {
                let entry = entry_for(map, ty);
                entry.generation += 1;
                entry.tree.remove(key, &cmp);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Returns the number of records visible at `scope` in the labeled
    /// index. `None` scopes at the definition's base.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownIndexLabel`] for an unregistered label
    /// and [`ErrorKind::IncorrectIndexType`] if the base does not subsume
    /// `scope`.
    pub fn index_size(&self, label: &str, scope: Option<TypeId>) -> Result<usize> {
        let (d, scope) = self.resolve(label, scope)?;
        Ok(self.tree(d, scope).map_or(0, RbTree::len))
    }

    /// Looks up a record comparator-equal to `probe` in the labeled
    /// index. For bag indexes this is a handle-identity lookup. Returns
    /// the first (leftmost) match.
    ///
    /// # Errors
    ///
    /// Same conditions as [`index_size`](Self::index_size), plus
    /// [`ErrorKind::InvalidHandle`] for a dead probe.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn find(
        &self,
        heap: &FsHeap,
        label: &str,
        scope: Option<TypeId>,
        probe: FsRef,
    ) -> Result<Option<FsRef>> {
        let (d, scope) = self.resolve(label, scope)?;
        if !heap.is_valid_ref(probe) {
            return Err(Error::invalid_handle(probe));
        }
        let Some(tree) = self.tree(d, scope) else {
            return Ok(None);
        };
        let cmp = self.defs[d].key_cmp(heap);
        let n = tree.find_first_eq(probe.address() as i32, cmp);
        if n.is_nil() {
            Ok(None)
        } else {
            Ok(Some(FsRef::new(tree.key(n) as u32)))
        }
    }

    /// Collects every indexed record whose type is `t` or a subtype,
    /// across all indexes, deduplicated and in ascending handle order.
    #[allow(clippy::cast_sign_loss)]
    #[must_use]
    pub fn all_indexed_fs(&self, t: TypeId) -> Vec<FsRef> {
        let mut handles = BTreeSet::new();
        for (d, def) in self.defs.iter().enumerate() {
            let scope = if self.ts.subsumes(def.base, t) {
                t
            } else if self.ts.subsumes(t, def.base) {
                def.base
            } else {
                continue;
            };
            if let Some(tree) = self.tree(d, scope) {
                for (key, ()) in tree.iter() {
                    handles.insert(key);
                }
            }
        }
        handles
            .into_iter()
            .map(|k| FsRef::new(k as u32))
            .collect()
    }

    // =========================================================================
    // Cursor support
    // =========================================================================

    /// Resolves a label and optional scope to a definition slot and the
    /// effective scope type.
    pub(crate) fn resolve(&self, label: &str, scope: Option<TypeId>) -> Result<(usize, TypeId)> {
        let Some(&d) = self.labels.get(label) else {
            return Err(Error::new(ErrorKind::UnknownIndexLabel {
                label: label.to_string(),
            }));
        };
        let base = self.defs[d].base;
        let scope = scope.unwrap_or(base);
        if !self.ts.subsumes(base, scope) {
            return Err(Error::new(ErrorKind::IncorrectIndexType {
                scope: self.ts.type_name(scope).to_string(),
                base: self.ts.type_name(base).to_string(),
            }));
        }
        Ok((d, scope))
    }

    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn tree(&self, d: usize, scope: TypeId) -> Option<&RbTree<()>> {
        self.scoped[d]
            .get(scope.index() as i32)
            .map(|entry| &entry.tree)
    }

    #[allow(clippy::cast_possible_wrap)]
    pub(crate) fn generation(&self, d: usize, scope: TypeId) -> u64 {
        self.scoped[d]
            .get(scope.index() as i32)
            .map_or(0, |entry| entry.generation)
    }

    pub(crate) fn definition(&self, d: usize) -> &IndexDefinition {
        &self.defs[d]
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Validates `fs` and computes, per covering definition, the type
    /// path from the record's type up to the definition's base.
    #[allow(clippy::cast_possible_wrap)]
    fn prepare(&self, heap: &FsHeap, fs: FsRef) -> Result<(i32, Vec<(usize, Vec<i32>)>)> {
        if !self.committed {
            return Err(Error::new(ErrorKind::NotCommitted));
        }
        let t = heap.type_of(fs)?;
        let mut paths = Vec::new();
        for (d, def) in self.defs.iter().enumerate() {
            if !self.ts.subsumes(def.base, t) {
                continue;
            }
            let mut path = Vec::new();
            let mut cur = t;
            loop {
                path.push(cur.index() as i32);
                if cur == def.base {
                    break;
                }
                cur = self
                    .ts
                    .parent(cur)
                    .expect("base subsumes the record type, so the walk reaches it");
            }
            paths.push((d, path));
        }
        Ok((fs.address() as i32, paths))
    }
}

fn entry_for(map: &mut IntValueMap<TypeIndex>, ty: i32) -> &mut TypeIndex {
    if map.get(ty).is_none() {
        map.insert(ty, TypeIndex::default());
    }
    map.get_mut(ty).expect("entry just ensured")
}
