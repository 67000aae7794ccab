//! Read-only store contracts and their SQLite implementations.
//!
//! # Responsibility
//! - `search_repo`: per-mode relational fetches feeding the search engine.
//! - `catalog_repo`: lookup/summary reads used next to the search.
//!
//! # Invariants
//! - Nothing in this layer writes application data.
//! - Joined rows are returned as typed graphs; shaping happens above.

pub mod catalog_repo;
pub mod search_repo;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error shared by search and catalog repositories.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A table the store cannot work without is absent.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be mapped into a typed record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "reporting store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) | Self::InvalidData(_) => None,
        }
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

/// Builds `?, ?, ?` for an `IN (...)` list of `count` values.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
