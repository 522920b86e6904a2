//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input, then orchestrate repository calls.
//! - Translate repository errors into use-case level errors.

pub mod catalog_service;
pub mod pizza_service;
