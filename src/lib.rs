//! Cassette - Typed-record annotation store with indexed, span-bounded
//! iteration
//!
//! This crate re-exports all layers of the Cassette system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: cassette_index      — Index repository, cursors, subiterator, Cas
//! Layer 2: cassette_store      — Flat feature-structure heap
//!          cassette_tree       — Handle-addressed red-black trees
//! Layer 1: cassette_typesystem — Type hierarchy, features, linear orders
//! Layer 0: cassette_foundation — Core types (FsRef, Error)
//! ```

pub use cassette_foundation as foundation;
pub use cassette_index as index;
pub use cassette_store as store;
pub use cassette_tree as tree;
pub use cassette_typesystem as typesystem;
