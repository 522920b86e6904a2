//! Pizza use-case service.
//!
//! # Responsibility
//! - Validate pizza payloads before any storage access.
//! - Read pizzas back after writes so callers get the hydrated state.
//!
//! # Invariants
//! - Validation failures never reach the repository.
//! - List limits are normalized by `ListLimits` before querying.

use crate::config::ListLimits;
use crate::model::menu::{IngredientId, Pizza, PizzaDraft, PizzaId};
use crate::model::validation::{
    normalize_name, validate_id, validate_ingredient_ids, ValidationError,
};
use crate::repo::error::{EntityKind, RepoError};
use crate::repo::pizza_repo::{PizzaListQuery, PizzaRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for pizza use-cases.
#[derive(Debug)]
pub enum PizzaServiceError {
    /// Caller payload is malformed.
    Invalid(ValidationError),
    /// Target pizza does not exist.
    PizzaNotFound(PizzaId),
    /// Referenced category or ingredient does not exist.
    ReferenceNotFound { entity: EntityKind, id: i64 },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for PizzaServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid pizza payload: {err}"),
            Self::PizzaNotFound(id) => write!(f, "pizza not found: {id}"),
            Self::ReferenceNotFound { entity, id } => {
                write!(f, "referenced {entity} not found: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent pizza state: {details}"),
        }
    }
}

impl Error for PizzaServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for PizzaServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for PizzaServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: EntityKind::Pizza,
                id,
            } => Self::PizzaNotFound(id),
            RepoError::NotFound { entity, id } => Self::ReferenceNotFound { entity, id },
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

/// List result envelope used by service callers.
#[derive(Debug, Clone, PartialEq)]
pub struct PizzasListResult {
    /// Pizzas ordered by ascending id.
    pub items: Vec<Pizza>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Pizza service facade over repository implementations.
pub struct PizzaService<R: PizzaRepository> {
    repo: R,
    limits: ListLimits,
}

impl<R: PizzaRepository> PizzaService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_limits(repo, ListLimits::default())
    }

    pub fn with_limits(repo: R, limits: ListLimits) -> Self {
        Self { repo, limits }
    }

    /// Lists one page of pizzas.
    pub fn list_pizzas(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<PizzasListResult, PizzaServiceError> {
        let applied_limit = self.limits.normalize(limit);
        let items = self.repo.list_pizzas(&PizzaListQuery {
            limit: Some(applied_limit),
            offset,
        })?;
        Ok(PizzasListResult {
            items,
            applied_limit,
        })
    }

    /// Lists pizzas with exactly this name.
    pub fn find_pizzas_by_name(&self, name: &str) -> Result<Vec<Pizza>, PizzaServiceError> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Err(ValidationError::BlankName { field: "name" }.into());
        }
        Ok(self.repo.find_pizzas_by_name(&normalized)?)
    }

    /// Gets one pizza, failing with `PizzaNotFound` when absent.
    pub fn get_pizza(&self, id: PizzaId) -> Result<Pizza, PizzaServiceError> {
        validate_id("pizza_id", id)?;
        self.repo
            .get_pizza(id)?
            .ok_or(PizzaServiceError::PizzaNotFound(id))
    }

    /// Creates a pizza with its ingredient links.
    pub fn create_pizza(&self, draft: &PizzaDraft) -> Result<Pizza, PizzaServiceError> {
        let draft = draft.validated()?;
        let id = self.repo.insert_pizza(&draft)?;
        self.read_back(id, "created pizza not found in read-back")
    }

    /// Replaces pizza scalars, category and the whole ingredient set.
    pub fn update_pizza(
        &self,
        id: PizzaId,
        draft: &PizzaDraft,
    ) -> Result<Pizza, PizzaServiceError> {
        validate_id("pizza_id", id)?;
        let draft = draft.validated()?;
        self.repo.update_pizza(id, &draft)?;
        self.read_back(id, "updated pizza not found in read-back")
    }

    /// Replaces only the ingredient set of one pizza.
    pub fn set_pizza_ingredients(
        &self,
        id: PizzaId,
        ingredient_ids: &[IngredientId],
    ) -> Result<Pizza, PizzaServiceError> {
        validate_id("pizza_id", id)?;
        let ingredient_ids = validate_ingredient_ids(ingredient_ids)?;
        self.repo.set_pizza_ingredients(id, &ingredient_ids)?;
        self.read_back(id, "pizza missing after ingredient replacement")
    }

    /// Deletes a pizza and its ingredient links. Returns deleted pizza rows.
    pub fn delete_pizza(&self, id: PizzaId) -> Result<usize, PizzaServiceError> {
        validate_id("pizza_id", id)?;
        Ok(self.repo.delete_pizza(id)?)
    }

    fn read_back(&self, id: PizzaId, details: &'static str) -> Result<Pizza, PizzaServiceError> {
        self.repo
            .get_pizza(id)?
            .ok_or(PizzaServiceError::InconsistentState(details))
    }
}
