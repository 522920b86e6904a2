//! Pizza repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read pizzas through the join fan-out query and the hydrator.
//! - Write pizza scalars and their ingredient links together.
//! - Delete pizzas after their ingredient links.
//!
//! # Invariants
//! - Every write runs in one `BEGIN IMMEDIATE` transaction: the scalar
//!   write, the link clear and the link inserts commit or roll back
//!   together, and concurrent writers serialize on the SQLite write lock.
//! - `update_pizza` and `set_pizza_ingredients` replace the full link set.
//! - Zero affected pizza rows is reported as `NotFound`.

use crate::model::menu::{CategoryId, IngredientId, Pizza, PizzaDraft, PizzaId};
use crate::model::validation::{normalize_name, validate_ingredient_ids};
use crate::repo::cascade::PIZZA_CASCADE;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::hydrate::{PizzaHydrator, PizzaJoinRow, PIZZA_JOIN_SELECT_SQL};
use crate::repo::relations::{insert_links, replace_links, PIZZA_INGREDIENTS};
use crate::repo::schema::{
    ensure_tables_ready, row_exists, CATEGORIES, INGREDIENTS, PIZZAS, PIZZA_INGREDIENTS as LINKS,
};
use log::info;
use rusqlite::{params, Connection, Params, Transaction, TransactionBehavior};

/// Query options for pizza listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PizzaListQuery {
    /// Maximum number of pizzas (not rows) to return. `None` means all.
    pub limit: Option<u32>,
    /// Number of pizzas to skip, by ascending id.
    pub offset: u32,
}

/// Repository interface for pizza reads and writes.
pub trait PizzaRepository {
    /// Lists pizzas ordered by id, capped before the join fan-out.
    fn list_pizzas(&self, query: &PizzaListQuery) -> RepoResult<Vec<Pizza>>;
    /// Lists pizzas whose normalized name equals `name`.
    fn find_pizzas_by_name(&self, name: &str) -> RepoResult<Vec<Pizza>>;
    /// Gets one hydrated pizza by id.
    fn get_pizza(&self, id: PizzaId) -> RepoResult<Option<Pizza>>;
    /// Inserts one pizza with its ingredient links and returns the new id.
    fn insert_pizza(&self, draft: &PizzaDraft) -> RepoResult<PizzaId>;
    /// Replaces scalars, category and the full ingredient set.
    fn update_pizza(&self, id: PizzaId, draft: &PizzaDraft) -> RepoResult<()>;
    /// Replaces the full ingredient set only.
    fn set_pizza_ingredients(
        &self,
        id: PizzaId,
        ingredient_ids: &[IngredientId],
    ) -> RepoResult<()>;
    /// Deletes ingredient links, then the pizza. Returns deleted pizza rows.
    fn delete_pizza(&self, id: PizzaId) -> RepoResult<usize>;
}

/// SQLite-backed pizza repository.
pub struct SqlitePizzaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePizzaRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(conn, &[PIZZAS, CATEGORIES, INGREDIENTS, LINKS])?;
        Ok(Self { conn })
    }

    fn begin_write(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl PizzaRepository for SqlitePizzaRepository<'_> {
    fn list_pizzas(&self, query: &PizzaListQuery) -> RepoResult<Vec<Pizza>> {
        let limit = query.limit.map_or(-1, i64::from);
        query_pizzas(
            self.conn,
            "WHERE p.id IN (
                SELECT id FROM pizzas ORDER BY id ASC LIMIT ?1 OFFSET ?2
             )
             ORDER BY p.id ASC, i.id ASC;",
            params![limit, i64::from(query.offset)],
        )
    }

    fn find_pizzas_by_name(&self, name: &str) -> RepoResult<Vec<Pizza>> {
        query_pizzas(
            self.conn,
            "WHERE p.name = ?1
             ORDER BY p.id ASC, i.id ASC;",
            [normalize_name(name)],
        )
    }

    fn get_pizza(&self, id: PizzaId) -> RepoResult<Option<Pizza>> {
        let pizzas = query_pizzas(
            self.conn,
            "WHERE p.id = ?1
             ORDER BY i.id ASC;",
            [id],
        )?;
        Ok(pizzas.into_iter().next())
    }

    fn insert_pizza(&self, draft: &PizzaDraft) -> RepoResult<PizzaId> {
        let draft = draft.validated()?;
        let tx = self.begin_write()?;
        ensure_references_exist(&tx, draft.category_id, &draft.ingredient_ids)?;

        tx.execute(
            "INSERT INTO pizzas (name, description, price, category_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.name.as_str(),
                draft.description.as_str(),
                draft.price,
                draft.category_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        let linked = insert_links(&tx, &PIZZA_INGREDIENTS, id, &draft.ingredient_ids)?;
        tx.commit()?;

        info!("event=pizza_insert module=repo status=ok pizza_id={id} ingredients={linked}");
        Ok(id)
    }

    fn update_pizza(&self, id: PizzaId, draft: &PizzaDraft) -> RepoResult<()> {
        let draft = draft.validated()?;
        let tx = self.begin_write()?;
        if !row_exists(&tx, "pizzas", id)? {
            return Err(RepoError::not_found(EntityKind::Pizza, id));
        }
        ensure_references_exist(&tx, draft.category_id, &draft.ingredient_ids)?;

        let changed = tx.execute(
            "UPDATE pizzas
             SET
                name = ?1,
                description = ?2,
                price = ?3,
                category_id = ?4
             WHERE id = ?5;",
            params![
                draft.name.as_str(),
                draft.description.as_str(),
                draft.price,
                draft.category_id,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Pizza, id));
        }

        let linked = replace_links(&tx, &PIZZA_INGREDIENTS, id, &draft.ingredient_ids)?;
        tx.commit()?;

        info!("event=pizza_update module=repo status=ok pizza_id={id} ingredients={linked}");
        Ok(())
    }

    fn set_pizza_ingredients(
        &self,
        id: PizzaId,
        ingredient_ids: &[IngredientId],
    ) -> RepoResult<()> {
        let ingredient_ids = validate_ingredient_ids(ingredient_ids)?;
        let tx = self.begin_write()?;
        if !row_exists(&tx, "pizzas", id)? {
            return Err(RepoError::not_found(EntityKind::Pizza, id));
        }
        ensure_references_exist(&tx, None, &ingredient_ids)?;

        let linked = replace_links(&tx, &PIZZA_INGREDIENTS, id, &ingredient_ids)?;
        tx.commit()?;

        info!("event=pizza_set_ingredients module=repo status=ok pizza_id={id} ingredients={linked}");
        Ok(())
    }

    fn delete_pizza(&self, id: PizzaId) -> RepoResult<usize> {
        let tx = self.begin_write()?;
        let outcome = PIZZA_CASCADE.execute(&tx, id)?;
        if !outcome.parent_existed() {
            return Err(RepoError::not_found(EntityKind::Pizza, id));
        }
        tx.commit()?;

        info!(
            "event=pizza_delete module=repo status=ok pizza_id={id} links_removed={}",
            outcome.dependents_affected
        );
        Ok(outcome.parent_deleted)
    }
}

fn query_pizzas<P: Params>(
    conn: &Connection,
    filter_sql: &str,
    params: P,
) -> RepoResult<Vec<Pizza>> {
    let mut stmt = conn.prepare(&format!("{PIZZA_JOIN_SELECT_SQL}\n{filter_sql}"))?;
    let mut rows = stmt.query(params)?;
    let mut hydrator = PizzaHydrator::new();
    while let Some(row) = rows.next()? {
        hydrator.push(PizzaJoinRow::from_row(row)?);
    }
    Ok(hydrator.finish())
}

fn ensure_references_exist(
    conn: &Connection,
    category_id: Option<CategoryId>,
    ingredient_ids: &[IngredientId],
) -> RepoResult<()> {
    if let Some(category_id) = category_id {
        if !row_exists(conn, "categories", category_id)? {
            return Err(RepoError::not_found(EntityKind::Category, category_id));
        }
    }
    for ingredient_id in ingredient_ids {
        if !row_exists(conn, "ingredients", *ingredient_id)? {
            return Err(RepoError::not_found(EntityKind::Ingredient, *ingredient_id));
        }
    }
    Ok(())
}
