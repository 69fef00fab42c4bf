//! Type hierarchy, features, and linear type orders for Cassette.
//!
//! This crate provides:
//! - [`TypeSystem`] - Single-rooted type tree with features and subsumption
//! - [`TypeId`] / [`FeatureId`] - Dense ids with reserved built-in constants
//! - [`LinearTypeOrderBuilder`] - Partial-order chains resolved into a
//!   total order over all committed types

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod order;
mod system;

pub use order::{LinearTypeOrder, LinearTypeOrderBuilder};
pub use system::{FeatureId, TypeId, TypeSystem};
