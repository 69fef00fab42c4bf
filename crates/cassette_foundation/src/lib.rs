//! Record handles and error types for Cassette.
//!
//! This crate provides:
//! - [`FsRef`] - Opaque handles to feature-structure records
//! - [`Error`] - Structured error kinds for schema-build and iteration failures

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod handle;

pub use error::{Error, ErrorKind, Result};
pub use handle::FsRef;
