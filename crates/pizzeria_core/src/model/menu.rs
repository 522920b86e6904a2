//! Menu entities.
//!
//! # Invariants
//! - `Pizza::ingredient_ids` and `Pizza::ingredients` describe the same set
//!   on hydrated read models, in the same order.
//! - `Pizza::category` is `Some` only when `category_id` is `Some`.

use serde::{Deserialize, Serialize};

/// Storage-assigned pizza id.
pub type PizzaId = i64;
/// Storage-assigned category id.
pub type CategoryId = i64;
/// Storage-assigned ingredient id.
pub type IngredientId = i64;

/// Optional grouping a pizza can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Ingredient linked to pizzas through `pizza_ingredients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
}

/// Hydrated pizza read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: PizzaId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Referenced category id, if any.
    pub category_id: Option<CategoryId>,
    /// Resolved category. Filled on reads only.
    pub category: Option<Category>,
    /// Linked ingredient ids in first-seen order.
    pub ingredient_ids: Vec<IngredientId>,
    /// Resolved ingredients. Filled on reads only.
    pub ingredients: Vec<Ingredient>,
}

impl Pizza {
    /// Creates a pizza with scalar fields only: no category, no ingredients.
    pub fn new(
        id: PizzaId,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            price,
            category_id: None,
            category: None,
            ingredient_ids: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    /// Returns ingredient names in hydrated order.
    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients
            .iter()
            .map(|ingredient| ingredient.name.as_str())
            .collect()
    }
}

/// Write payload for pizza insert and full update.
///
/// `ingredient_ids` is authoritative: after a successful write the persisted
/// relation set equals exactly these ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PizzaDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub ingredient_ids: Vec<IngredientId>,
}

impl PizzaDraft {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category_id: None,
            ingredient_ids: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_ingredients(
        mut self,
        ingredient_ids: impl IntoIterator<Item = IngredientId>,
    ) -> Self {
        self.ingredient_ids = ingredient_ids.into_iter().collect();
        self
    }
}
