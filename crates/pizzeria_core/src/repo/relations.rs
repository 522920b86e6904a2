//! Many-to-many link maintenance with full-replace semantics.
//!
//! # Responsibility
//! - Clear all links of one owner (or one peer) in a join table.
//! - Make the persisted link set of an owner equal a desired id set.
//!
//! # Invariants
//! - `replace_links` never diffs against prior state: it clears, then
//!   inserts every desired id once.
//! - These functions do not open transactions. Callers that need the clear
//!   and the inserts to be atomic pass a `Transaction` (it derefs to
//!   `Connection`); repository write paths always do.

use crate::repo::error::RepoResult;
use log::debug;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

/// Join table keyed by `(owner_column, peer_column)` with no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTable {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub peer_column: &'static str,
}

/// Pizza to ingredient links.
pub const PIZZA_INGREDIENTS: LinkTable = LinkTable {
    table: "pizza_ingredients",
    owner_column: "pizza_id",
    peer_column: "ingredient_id",
};

/// Deletes every link of `owner_id`. Returns the number of removed rows;
/// zero when the owner had none.
pub fn clear_links(conn: &Connection, links: &LinkTable, owner_id: i64) -> RepoResult<usize> {
    let removed = conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            links.table, links.owner_column
        ),
        [owner_id],
    )?;
    debug!(
        "event=links_clear module=repo table={} side=owner removed={removed}",
        links.table
    );
    Ok(removed)
}

/// Deletes every link pointing at `peer_id`, whatever its owner.
pub fn clear_peer_links(conn: &Connection, links: &LinkTable, peer_id: i64) -> RepoResult<usize> {
    let removed = conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            links.table, links.peer_column
        ),
        [peer_id],
    )?;
    debug!(
        "event=links_clear module=repo table={} side=peer removed={removed}",
        links.table
    );
    Ok(removed)
}

/// Inserts one link per distinct id in `peer_ids`. Returns inserted rows.
///
/// Fails when a link already exists or a peer id has no target row.
pub fn insert_links(
    conn: &Connection,
    links: &LinkTable,
    owner_id: i64,
    peer_ids: &[i64],
) -> RepoResult<usize> {
    let unique: BTreeSet<i64> = peer_ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(0);
    }

    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, ?2);",
        links.table, links.owner_column, links.peer_column
    ))?;
    let mut inserted = 0;
    for peer_id in unique {
        inserted += stmt.execute(params![owner_id, peer_id])?;
    }
    Ok(inserted)
}

/// Replaces the full link set of `owner_id` with `peer_ids`.
///
/// An empty `peer_ids` detaches every peer. Calling twice with the same ids
/// leaves the same persisted state.
pub fn replace_links(
    conn: &Connection,
    links: &LinkTable,
    owner_id: i64,
    peer_ids: &[i64],
) -> RepoResult<usize> {
    clear_links(conn, links, owner_id)?;
    let inserted = insert_links(conn, links, owner_id, peer_ids)?;
    debug!(
        "event=links_replace module=repo table={} inserted={inserted}",
        links.table
    );
    Ok(inserted)
}

/// Lists the persisted peer ids of `owner_id`, ascending.
pub fn linked_peer_ids(
    conn: &Connection,
    links: &LinkTable,
    owner_id: i64,
) -> RepoResult<Vec<i64>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {peer} FROM {table} WHERE {owner} = ?1 ORDER BY {peer} ASC;",
        peer = links.peer_column,
        table = links.table,
        owner = links.owner_column,
    ))?;
    let mut rows = stmt.query([owner_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}
