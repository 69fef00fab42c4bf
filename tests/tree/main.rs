//! Integration tests for Layer 2: Red-black tree
//!
//! Tests for comparator-driven ordering, duplicate handling, and removal.

mod duplicates;
mod ordering;
