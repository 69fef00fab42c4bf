//! Integration tests for Layer 1: Type system
//!
//! Tests for the type hierarchy, feature declarations, commit semantics,
//! and linear type orders.

mod features;
mod hierarchy;
mod order;
