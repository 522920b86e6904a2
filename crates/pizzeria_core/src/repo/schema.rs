//! Connection readiness checks run when a repository is constructed.

use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Connection;

/// Table and the columns a repository reads or writes.
pub(crate) struct RequiredTable {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub(crate) const PIZZAS: RequiredTable = RequiredTable {
    name: "pizzas",
    columns: &["id", "name", "description", "price", "category_id"],
};

pub(crate) const CATEGORIES: RequiredTable = RequiredTable {
    name: "categories",
    columns: &["id", "name"],
};

pub(crate) const INGREDIENTS: RequiredTable = RequiredTable {
    name: "ingredients",
    columns: &["id", "name"],
};

pub(crate) const PIZZA_INGREDIENTS: RequiredTable = RequiredTable {
    name: "pizza_ingredients",
    columns: &["pizza_id", "ingredient_id"],
};

/// Fails with `MissingRequiredTable`/`MissingRequiredColumn` on the first
/// gap found, in declaration order.
pub(crate) fn ensure_tables_ready(conn: &Connection, tables: &[RequiredTable]) -> RepoResult<()> {
    for table in tables {
        if !table_exists(conn, table.name)? {
            return Err(RepoError::MissingRequiredTable(table.name));
        }
        for column in table.columns {
            if !table_has_column(conn, table.name, column)? {
                return Err(RepoError::MissingRequiredColumn {
                    table: table.name,
                    column: *column,
                });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Returns whether `table` holds a row with primary key `id`.
pub(crate) fn row_exists(conn: &Connection, table: &str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1);"),
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
