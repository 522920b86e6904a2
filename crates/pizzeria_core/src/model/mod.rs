//! Menu domain model.
//!
//! # Responsibility
//! - Define the entities read from and written to the menu store.
//! - Validate caller-supplied payloads before any storage access.
//!
//! # Invariants
//! - Every entity is identified by a positive integer id assigned by storage.
//! - A pizza references at most one category and any set of ingredients.

pub mod menu;
pub mod validation;
