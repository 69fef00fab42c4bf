//! Index repository and iteration for Cassette.
//!
//! This crate provides:
//! - [`IndexComparator`] - Multi-key record comparators over feature slots
//! - [`IndexDefinition`] / [`IndexStrategy`] - Bag, set, and sorted indexes
//! - [`IndexRepository`] - Per-type index trees with fail-fast generations
//! - [`FsCursor`] - Detached, repositionable index cursors
//! - [`Subiterator`] - Span-bounded iteration over the annotation index
//! - [`Cas`] - The owning facade tying heap, repository, and RNG together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cas;
mod comparator;
mod cursor;
mod repository;
mod subiterator;

pub use cas::Cas;
pub use comparator::{IndexComparator, SortDirection};
pub use cursor::FsCursor;
pub use repository::{ANNOTATION_INDEX, IndexDefinition, IndexRepository, IndexStrategy};
pub use subiterator::Subiterator;
