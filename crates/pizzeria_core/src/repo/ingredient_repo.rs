//! Ingredient repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting an ingredient removes every pizza link to it before the
//!   ingredient row; linked pizzas keep their other ingredients.

use crate::model::menu::{Ingredient, IngredientId, PizzaId};
use crate::model::validation::{validate_name, CATALOG_NAME_MAX_CHARS};
use crate::repo::cascade::INGREDIENT_CASCADE;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::schema::{ensure_tables_ready, INGREDIENTS, PIZZA_INGREDIENTS};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for ingredient operations.
pub trait IngredientRepository {
    fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>>;
    fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>>;
    fn insert_ingredient(&self, name: &str) -> RepoResult<IngredientId>;
    fn rename_ingredient(&self, id: IngredientId, name: &str) -> RepoResult<()>;
    /// Ids of pizzas currently linked to the ingredient, ascending.
    fn pizzas_using_ingredient(&self, id: IngredientId) -> RepoResult<Vec<PizzaId>>;
    /// Unlinks the ingredient from all pizzas, then deletes it.
    fn delete_ingredient(&self, id: IngredientId) -> RepoResult<usize>;
}

/// SQLite-backed ingredient repository.
pub struct SqliteIngredientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIngredientRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(conn, &[INGREDIENTS, PIZZA_INGREDIENTS])?;
        Ok(Self { conn })
    }
}

impl IngredientRepository for SqliteIngredientRepository<'_> {
    fn list_ingredients(&self) -> RepoResult<Vec<Ingredient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM ingredients ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ingredients = Vec::new();
        while let Some(row) = rows.next()? {
            ingredients.push(parse_ingredient_row(row)?);
        }
        Ok(ingredients)
    }

    fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>> {
        self.conn
            .query_row(
                "SELECT id, name FROM ingredients WHERE id = ?1;",
                [id],
                |row| Ok(parse_ingredient_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn insert_ingredient(&self, name: &str) -> RepoResult<IngredientId> {
        let name = validate_name("ingredient name", name, CATALOG_NAME_MAX_CHARS)?;
        self.conn
            .execute("INSERT INTO ingredients (name) VALUES (?1);", [name])?;
        let id = self.conn.last_insert_rowid();
        info!("event=ingredient_insert module=repo status=ok ingredient_id={id}");
        Ok(id)
    }

    fn rename_ingredient(&self, id: IngredientId, name: &str) -> RepoResult<()> {
        let name = validate_name("ingredient name", name, CATALOG_NAME_MAX_CHARS)?;
        let changed = self.conn.execute(
            "UPDATE ingredients SET name = ?1 WHERE id = ?2;",
            params![name, id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Ingredient, id));
        }
        Ok(())
    }

    fn pizzas_using_ingredient(&self, id: IngredientId) -> RepoResult<Vec<PizzaId>> {
        let mut stmt = self.conn.prepare(
            "SELECT pizza_id
             FROM pizza_ingredients
             WHERE ingredient_id = ?1
             ORDER BY pizza_id ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut pizza_ids = Vec::new();
        while let Some(row) = rows.next()? {
            pizza_ids.push(row.get(0)?);
        }
        Ok(pizza_ids)
    }

    fn delete_ingredient(&self, id: IngredientId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let outcome = INGREDIENT_CASCADE.execute(&tx, id)?;
        if !outcome.parent_existed() {
            return Err(RepoError::not_found(EntityKind::Ingredient, id));
        }
        tx.commit()?;

        info!(
            "event=ingredient_delete module=repo status=ok ingredient_id={id} links_removed={}",
            outcome.dependents_affected
        );
        Ok(outcome.parent_deleted)
    }
}

fn parse_ingredient_row(row: &Row<'_>) -> RepoResult<Ingredient> {
    let id: i64 = row.get("id")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name in ingredients row {id}"
        )));
    }
    Ok(Ingredient { id, name })
}
