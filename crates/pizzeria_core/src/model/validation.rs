//! Payload validation for menu writes.
//!
//! # Responsibility
//! - Reject malformed caller input before any statement is executed.
//! - Normalize free-text names so storage never sees stray whitespace.
//!
//! # Invariants
//! - Validation is pure: it never touches the data source.
//! - A validated `PizzaDraft` has a normalized name and a deduplicated,
//!   ascending `ingredient_ids` list.

use crate::model::menu::PizzaDraft;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const PIZZA_NAME_MAX_CHARS: usize = 20;
pub const CATALOG_NAME_MAX_CHARS: usize = 100;
pub const PIZZA_PRICE_MIN: f64 = 0.1;
pub const PIZZA_PRICE_MAX: f64 = 10_000.0;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Caller-supplied shape is invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required name is blank after normalization.
    BlankName { field: &'static str },
    /// Name is longer than the allowed number of characters.
    NameTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Price is not finite or outside the accepted range.
    PriceOutOfRange(f64),
    /// Referenced id is zero or negative.
    InvalidId { field: &'static str, value: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName { field } => write!(f, "{field} must not be blank"),
            Self::NameTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} must be at most {max_chars} characters, got {actual_chars}"
            ),
            Self::PriceOutOfRange(price) => write!(
                f,
                "price must be between {PIZZA_PRICE_MIN} and {PIZZA_PRICE_MAX}, got {price}"
            ),
            Self::InvalidId { field, value } => {
                write!(f, "{field} must be a positive id, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims and collapses internal whitespace runs to a single space.
pub fn normalize_name(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Normalizes one required name and enforces its length limit.
pub fn validate_name(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let normalized = normalize_name(value);
    if normalized.is_empty() {
        return Err(ValidationError::BlankName { field });
    }
    let actual_chars = normalized.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::NameTooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(normalized)
}

/// Rejects non-positive ids.
pub fn validate_id(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::InvalidId { field, value });
    }
    Ok(value)
}

/// Validates and deduplicates a desired ingredient id set.
pub fn validate_ingredient_ids(ids: &[i64]) -> Result<Vec<i64>, ValidationError> {
    let mut unique = BTreeSet::new();
    for id in ids {
        unique.insert(validate_id("ingredient_id", *id)?);
    }
    Ok(unique.into_iter().collect())
}

impl PizzaDraft {
    /// Returns a normalized copy of this draft, or the first violation.
    pub fn validated(&self) -> Result<PizzaDraft, ValidationError> {
        let name = validate_name("name", &self.name, PIZZA_NAME_MAX_CHARS)?;
        if !self.price.is_finite() || self.price < PIZZA_PRICE_MIN || self.price > PIZZA_PRICE_MAX
        {
            return Err(ValidationError::PriceOutOfRange(self.price));
        }
        let category_id = self
            .category_id
            .map(|id| validate_id("category_id", id))
            .transpose()?;
        let ingredient_ids = validate_ingredient_ids(&self.ingredient_ids)?;

        Ok(PizzaDraft {
            name,
            description: self.description.trim().to_string(),
            price: self.price,
            category_id,
            ingredient_ids,
        })
    }
}
