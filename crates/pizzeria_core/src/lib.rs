//! Core data access for the pizzeria menu.
//! This crate owns the relational invariants: join hydration, full-replace
//! ingredient links and ordered cascade deletes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{CoreConfig, ListLimits};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::menu::{
    Category, CategoryId, Ingredient, IngredientId, Pizza, PizzaDraft, PizzaId,
};
pub use model::validation::ValidationError;
pub use repo::cascade::{CascadeOutcome, CascadePlan, DependentStep};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::error::{EntityKind, RepoError, RepoResult};
pub use repo::hydrate::{hydrate_pizzas, PizzaHydrator, PizzaJoinRow};
pub use repo::ingredient_repo::{IngredientRepository, SqliteIngredientRepository};
pub use repo::pizza_repo::{PizzaListQuery, PizzaRepository, SqlitePizzaRepository};
pub use repo::relations::{LinkTable, PIZZA_INGREDIENTS};
pub use service::catalog_service::{CatalogService, CatalogServiceError};
pub use service::pizza_service::{PizzaService, PizzaServiceError, PizzasListResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
