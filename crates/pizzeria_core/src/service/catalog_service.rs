//! Category and ingredient use-case service.
//!
//! # Invariants
//! - Names are validated and normalized before reaching storage.
//! - Deletes cascade through repository plans; missing rows surface as
//!   `NotFound`.

use crate::model::menu::{Category, CategoryId, Ingredient, IngredientId};
use crate::model::validation::{validate_id, ValidationError};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::error::{EntityKind, RepoError};
use crate::repo::ingredient_repo::IngredientRepository;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for category and ingredient use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    Invalid(ValidationError),
    NotFound { entity: EntityKind, id: i64 },
    Repo(RepoError),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid catalog payload: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ValidationError> for CatalogServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogServiceError>;

/// Facade over category and ingredient repositories.
pub struct CatalogService<C: CategoryRepository, I: IngredientRepository> {
    categories: C,
    ingredients: I,
}

impl<C: CategoryRepository, I: IngredientRepository> CatalogService<C, I> {
    pub fn new(categories: C, ingredients: I) -> Self {
        Self {
            categories,
            ingredients,
        }
    }

    pub fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.categories.list_categories()?)
    }

    pub fn find_categories_by_name(&self, name: &str) -> CatalogResult<Vec<Category>> {
        Ok(self.categories.find_categories_by_name(name)?)
    }

    pub fn get_category(&self, id: CategoryId) -> CatalogResult<Category> {
        validate_id("category_id", id)?;
        self.categories
            .get_category(id)?
            .ok_or(CatalogServiceError::NotFound {
                entity: EntityKind::Category,
                id,
            })
    }

    pub fn create_category(&self, name: &str) -> CatalogResult<Category> {
        let id = self.categories.insert_category(name)?;
        self.get_category(id)
    }

    pub fn rename_category(&self, id: CategoryId, name: &str) -> CatalogResult<Category> {
        validate_id("category_id", id)?;
        self.categories.rename_category(id, name)?;
        self.get_category(id)
    }

    /// Detaches pizzas from the category, then deletes it.
    pub fn delete_category(&self, id: CategoryId) -> CatalogResult<usize> {
        validate_id("category_id", id)?;
        Ok(self.categories.delete_category(id)?)
    }

    pub fn list_ingredients(&self) -> CatalogResult<Vec<Ingredient>> {
        Ok(self.ingredients.list_ingredients()?)
    }

    pub fn get_ingredient(&self, id: IngredientId) -> CatalogResult<Ingredient> {
        validate_id("ingredient_id", id)?;
        self.ingredients
            .get_ingredient(id)?
            .ok_or(CatalogServiceError::NotFound {
                entity: EntityKind::Ingredient,
                id,
            })
    }

    pub fn create_ingredient(&self, name: &str) -> CatalogResult<Ingredient> {
        let id = self.ingredients.insert_ingredient(name)?;
        self.get_ingredient(id)
    }

    pub fn rename_ingredient(&self, id: IngredientId, name: &str) -> CatalogResult<Ingredient> {
        validate_id("ingredient_id", id)?;
        self.ingredients.rename_ingredient(id, name)?;
        self.get_ingredient(id)
    }

    /// Unlinks the ingredient from every pizza, then deletes it.
    pub fn delete_ingredient(&self, id: IngredientId) -> CatalogResult<usize> {
        validate_id("ingredient_id", id)?;
        Ok(self.ingredients.delete_ingredient(id)?)
    }
}
