//! Repository error model shared by every menu repository.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity addressed by a repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Pizza,
    Category,
    Ingredient,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pizza => "pizza",
            Self::Category => "category",
            Self::Ingredient => "ingredient",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository error for menu persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Payload rejected before reaching storage.
    Validation(ValidationError),
    /// Data source failure, surfaced as-is.
    Db(DbError),
    /// Targeted fetch, update or delete matched zero rows.
    NotFound { entity: EntityKind, id: i64 },
    /// Persisted row cannot be converted into a read model.
    InvalidData(String),
    /// Connection schema lacks a table the repository needs.
    MissingRequiredTable(&'static str),
    /// Connection schema lacks a column the repository needs.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted menu data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "menu repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "menu repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
