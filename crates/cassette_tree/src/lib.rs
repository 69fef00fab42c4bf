//! Arena-encoded red-black trees keyed by record handles.
//!
//! This crate provides:
//! - [`RbTree`] - The generic comparator-driven tree backing every index
//! - [`IntIntMap`] - Natural-order int-to-int map specialization
//! - [`IntValueMap`] - Natural-order int-to-value map specialization
//!
//! Nodes live in a flat arena addressed by [`NodeId`]; an id, once
//! assigned, never moves and is never reused, so ids held by cursors stay
//! stable across unrelated mutations.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod map;
mod node;
mod tree;

pub use map::{IntIntMap, IntValueMap};
pub use node::NodeId;
pub use tree::{Iter, RbTree};
