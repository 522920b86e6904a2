//! Repository layer: menu data access over SQLite.
//!
//! # Responsibility
//! - Hydrate pizzas from join fan-out rows (`hydrate`).
//! - Maintain many-to-many links with full-replace writes (`relations`).
//! - Delete parents after their dependents (`cascade`).
//! - Expose per-entity repositories composing the three.
//!
//! # Invariants
//! - Repository writes validate payloads before executing any statement.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Statements bind every caller-supplied value as a parameter.

pub mod cascade;
pub mod category_repo;
pub mod error;
pub mod hydrate;
pub mod ingredient_repo;
pub mod pizza_repo;
pub mod relations;
mod schema;
