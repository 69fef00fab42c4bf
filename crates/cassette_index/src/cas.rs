//! The owning store facade.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cassette_foundation::{FsRef, Result};
use cassette_store::FsHeap;
use cassette_typesystem::{TypeId, TypeSystem};

use crate::cursor::FsCursor;
use crate::repository::{ANNOTATION_INDEX, IndexDefinition, IndexRepository};
use crate::subiterator::Subiterator;

/// A single-owner record store: heap, index repository, and the seeded
/// RNG that drives duplicate placement in sorted indexes.
///
/// The seed makes runs reproducible; nothing may depend on a particular
/// tie order among comparator-equal records.
pub struct Cas {
    ts: Arc<TypeSystem>,
    heap: FsHeap,
    repo: IndexRepository,
    rng: ChaCha8Rng,
}

impl Cas {
    /// Creates a store over a committed type system.
    ///
    /// The built-in sorted annotation index is registered; further
    /// indexes may be registered until [`commit_indexes`](Self::commit_indexes).
    ///
    /// # Errors
    ///
    /// Returns `NotCommitted` if `ts` is not committed.
    pub fn new(ts: Arc<TypeSystem>, seed: u64) -> Result<Self> {
        let heap = FsHeap::new(Arc::clone(&ts))?;
        let repo = IndexRepository::new(Arc::clone(&ts))?;
        Ok(Self {
            ts,
            heap,
            repo,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// The type system this store was built over.
    #[must_use]
    pub fn type_system(&self) -> &Arc<TypeSystem> {
        &self.ts
    }

    /// The record heap.
    #[must_use]
    pub fn heap(&self) -> &FsHeap {
        &self.heap
    }

    /// The record heap, mutably.
    ///
    /// Mutating a feature that an index sorts on, while the record is
    /// indexed, scrambles that index; remove the record first.
    pub fn heap_mut(&mut self) -> &mut FsHeap {
        &mut self.heap
    }

    /// The index repository.
    #[must_use]
    pub fn repository(&self) -> &IndexRepository {
        &self.repo
    }

    // =========================================================================
    // Index setup
    // =========================================================================

    /// Registers an index definition.
    ///
    /// # Errors
    ///
    /// See [`IndexRepository::register`].
    pub fn register_index(&mut self, def: IndexDefinition) -> Result<()> {
        self.repo.register(def)
    }

    /// Freezes the index definition set. Idempotent.
    pub fn commit_indexes(&mut self) {
        self.repo.commit();
    }

    // =========================================================================
    // Record creation
    // =========================================================================

    /// Creates a record of type `t`; it is not indexed until
    /// [`add_fs`](Self::add_fs).
    pub fn create_fs(&mut self, t: TypeId) -> FsRef {
        self.heap.create_fs(t)
    }

    /// Creates an annotation record spanning `[begin, end)`.
    ///
    /// # Errors
    ///
    /// See [`FsHeap::create_annotation`].
    pub fn create_annotation(&mut self, t: TypeId, begin: i32, end: i32) -> Result<FsRef> {
        self.heap.create_annotation(t, begin, end)
    }

    /// Creates a `cas.Integer[]` record of `len` zeroed elements.
    pub fn create_int_array(&mut self, len: u32) -> FsRef {
        self.heap.create_int_array(len)
    }

    // =========================================================================
    // Indexing
    // =========================================================================

    /// Indexes the record at `fs` in every covering index.
    ///
    /// # Errors
    ///
    /// See [`IndexRepository::add_fs`].
    pub fn add_fs(&mut self, fs: FsRef) -> Result<()> {
        self.repo.add_fs(&self.heap, &mut self.rng, fs)
    }

    /// Removes one indexed instance of the record at `fs`.
    ///
    /// # Errors
    ///
    /// See [`IndexRepository::remove_fs`].
    pub fn remove_fs(&mut self, fs: FsRef) -> Result<()> {
        self.repo.remove_fs(&self.heap, fs)
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Returns the record count of a scoped index view.
    ///
    /// # Errors
    ///
    /// See [`IndexRepository::index_size`].
    pub fn index_size(&self, label: &str, scope: Option<TypeId>) -> Result<usize> {
        self.repo.index_size(label, scope)
    }

    /// Looks up a record comparator-equal to `probe`.
    ///
    /// # Errors
    ///
    /// See [`IndexRepository::find`].
    pub fn find(&self, label: &str, scope: Option<TypeId>, probe: FsRef) -> Result<Option<FsRef>> {
        self.repo.find(&self.heap, label, scope, probe)
    }

    /// Collects every indexed record of type `t` or a subtype, in
    /// ascending handle order.
    #[must_use]
    pub fn all_indexed_fs(&self, t: TypeId) -> Vec<FsRef> {
        self.repo.all_indexed_fs(t)
    }

    /// Opens a cursor over a scoped index view, positioned at the first
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `UnknownIndexLabel` or `IncorrectIndexType` for a bad
    /// label or scope.
    pub fn cursor(&self, label: &str, scope: Option<TypeId>) -> Result<FsCursor> {
        let (d, scope) = self.repo.resolve(label, scope)?;
        let mut cursor = FsCursor::detached(d, scope);
        cursor.move_to_first(self);
        Ok(cursor)
    }

    /// Opens a span-bounded iterator over the built-in annotation index.
    ///
    /// Yields the annotations following `bound` whose `begin` lies within
    /// its span; see [`Subiterator`] for the `ambiguous` / `strict`
    /// knobs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHandle` or `NotAnAnnotationType` for an unusable
    /// bound.
    pub fn subiterator(&self, bound: FsRef, ambiguous: bool, strict: bool) -> Result<Subiterator> {
        Subiterator::new(self, ANNOTATION_INDEX, bound, ambiguous, strict)
    }
}
