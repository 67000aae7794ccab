//! Core search and aggregation engine for SISRI disaster-impact reports.
//! This crate owns the report projection and every search-mode rule.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, resolve_log_level, LogConfig, LoggingError};
pub use model::projection::{PropertyRecord, ResidentRecord, NOT_AVAILABLE};
pub use repo::catalog_repo::{CatalogStore, SqliteCatalogStore};
pub use repo::search_repo::{FetchOptions, SearchStore, SqliteSearchStore};
pub use repo::{RepoError, RepoResult};
pub use search::error::{SearchError, SearchResult};
pub use search::request::{AgeRange, DateRange, SearchFilters, SearchMode, SearchRequest};
pub use search::response::SearchResponse;
pub use service::catalog_service::CatalogService;
pub use service::search_service::SearchService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
