//! Category repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a category detaches its pizzas (`category_id = NULL`) before
//!   the category row is removed; pizzas themselves survive.

use crate::model::menu::{Category, CategoryId};
use crate::model::validation::{normalize_name, validate_name, CATALOG_NAME_MAX_CHARS};
use crate::repo::cascade::CATEGORY_CASCADE;
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::schema::{ensure_tables_ready, CATEGORIES, PIZZAS};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for category operations.
pub trait CategoryRepository {
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    /// Exact match on the normalized name.
    fn find_categories_by_name(&self, name: &str) -> RepoResult<Vec<Category>>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn insert_category(&self, name: &str) -> RepoResult<CategoryId>;
    fn rename_category(&self, id: CategoryId, name: &str) -> RepoResult<()>;
    /// Detaches pizzas, then deletes the category. Returns deleted rows.
    fn delete_category(&self, id: CategoryId) -> RepoResult<usize>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables_ready(conn, &[CATEGORIES, PIZZAS])?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn find_categories_by_name(&self, name: &str) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name
             FROM categories
             WHERE name = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([normalize_name(name)])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }
        Ok(categories)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT id, name FROM categories WHERE id = ?1;",
                [id],
                |row| Ok(parse_category_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn insert_category(&self, name: &str) -> RepoResult<CategoryId> {
        let name = validate_name("category name", name, CATALOG_NAME_MAX_CHARS)?;
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1);", [name])?;
        let id = self.conn.last_insert_rowid();
        info!("event=category_insert module=repo status=ok category_id={id}");
        Ok(id)
    }

    fn rename_category(&self, id: CategoryId, name: &str) -> RepoResult<()> {
        let name = validate_name("category name", name, CATALOG_NAME_MAX_CHARS)?;
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?1 WHERE id = ?2;",
            params![name, id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Category, id));
        }
        Ok(())
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let outcome = CATEGORY_CASCADE.execute(&tx, id)?;
        if !outcome.parent_existed() {
            return Err(RepoError::not_found(EntityKind::Category, id));
        }
        tx.commit()?;

        info!(
            "event=category_delete module=repo status=ok category_id={id} pizzas_detached={}",
            outcome.dependents_affected
        );
        Ok(outcome.parent_deleted)
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id: i64 = row.get("id")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name in categories row {id}"
        )));
    }
    Ok(Category { id, name })
}
