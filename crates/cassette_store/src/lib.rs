//! Flat feature-structure heap for Cassette.
//!
//! This crate provides:
//! - [`FsHeap`] - Append-only record storage addressed by [`FsRef`] handles
//!
//! Records live in one flat cell array; a handle is the record's offset.
//! Accessors are checked and return `Result`, with one documented
//! infallible escape hatch ([`FsHeap::feature_slot`]) for comparator hot
//! paths.
//!
//! [`FsRef`]: cassette_foundation::FsRef

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod heap;

pub use heap::FsHeap;
