//! Manually ordered cascade deletes.
//!
//! # Responsibility
//! - Remove or detach rows depending on a parent before the parent row.
//! - Report affected-row counts so callers can detect missing parents.
//!
//! # Invariants
//! - Dependent steps run in declaration order and strictly before the
//!   parent delete.
//! - The parent delete's affected-row count is the only existence signal;
//!   dependent steps are no-ops for a missing parent.

use crate::repo::error::RepoResult;
use crate::repo::relations::{clear_links, clear_peer_links, LinkTable, PIZZA_INGREDIENTS};
use log::debug;
use rusqlite::Connection;

/// One dependent cleanup executed before a parent row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentStep {
    /// Delete join rows whose owner column is the parent id.
    ClearOwnerLinks(LinkTable),
    /// Delete join rows whose peer column is the parent id.
    ClearPeerLinks(LinkTable),
    /// Null out an optional reference column pointing at the parent id.
    DetachReferences {
        table: &'static str,
        column: &'static str,
    },
}

impl DependentStep {
    fn run(&self, conn: &Connection, parent_id: i64) -> RepoResult<usize> {
        match self {
            Self::ClearOwnerLinks(links) => clear_links(conn, links, parent_id),
            Self::ClearPeerLinks(links) => clear_peer_links(conn, links, parent_id),
            Self::DetachReferences { table, column } => Ok(conn.execute(
                &format!("UPDATE {table} SET {column} = NULL WHERE {column} = ?1;"),
                [parent_id],
            )?),
        }
    }
}

/// Ordered cleanup followed by the parent row delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadePlan {
    pub parent_table: &'static str,
    pub dependents: &'static [DependentStep],
}

/// Affected-row counts of one cascade execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeOutcome {
    /// Rows removed or detached by dependent steps.
    pub dependents_affected: usize,
    /// Parent rows deleted: 0 when the parent does not exist.
    pub parent_deleted: usize,
}

impl CascadeOutcome {
    pub fn parent_existed(&self) -> bool {
        self.parent_deleted > 0
    }
}

/// Pizza delete: its ingredient links go first.
pub const PIZZA_CASCADE: CascadePlan = CascadePlan {
    parent_table: "pizzas",
    dependents: &[DependentStep::ClearOwnerLinks(PIZZA_INGREDIENTS)],
};

/// Ingredient delete: unlink it from every pizza first.
pub const INGREDIENT_CASCADE: CascadePlan = CascadePlan {
    parent_table: "ingredients",
    dependents: &[DependentStep::ClearPeerLinks(PIZZA_INGREDIENTS)],
};

/// Category delete: pizzas keep existing without a category.
pub const CATEGORY_CASCADE: CascadePlan = CascadePlan {
    parent_table: "categories",
    dependents: &[DependentStep::DetachReferences {
        table: "pizzas",
        column: "category_id",
    }],
};

impl CascadePlan {
    /// Runs every dependent step, then deletes the parent row by `id`.
    ///
    /// Does not open a transaction; pass one when a failure must not leave
    /// dependents cleared while the parent survives.
    pub fn execute(&self, conn: &Connection, id: i64) -> RepoResult<CascadeOutcome> {
        let mut outcome = CascadeOutcome::default();
        for step in self.dependents {
            outcome.dependents_affected += step.run(conn, id)?;
        }

        outcome.parent_deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", self.parent_table),
            [id],
        )?;

        debug!(
            "event=cascade_delete module=repo table={} dependents_affected={} parent_deleted={}",
            self.parent_table, outcome.dependents_affected, outcome.parent_deleted
        );
        Ok(outcome)
    }
}
