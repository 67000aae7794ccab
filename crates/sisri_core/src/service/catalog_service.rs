//! Catalog use-case service.
//!
//! # Responsibility
//! - Expose catalog lookups with input normalization and metadata-only logs.
//!
//! # Invariants
//! - Blank family terms list every family up to the fixed limit.
//! - Lookups never write.

use crate::model::entities::RecordId;
use crate::model::projection::FamilyRecord;
use crate::repo::catalog_repo::{
    CatalogStore, GridCellOverview, MunicipalitySummary, ResidentOptions,
};
use crate::repo::RepoResult;
use crate::search::text::non_blank;
use log::info;

/// Use-case wrapper over a [`CatalogStore`].
pub struct CatalogService<C: CatalogStore> {
    store: C,
}

impl<C: CatalogStore> CatalogService<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// Municipality header, counts and bounded samples; `None` when unknown.
    pub fn municipality_summary(&self, id: RecordId) -> RepoResult<Option<MunicipalitySummary>> {
        let summary = self.store.municipality_summary(id)?;
        info!(
            "event=catalog_lookup module=catalog kind=municipality_summary found={}",
            summary.is_some()
        );
        Ok(summary)
    }

    pub fn resident_options(&self) -> RepoResult<ResidentOptions> {
        self.store.resident_options()
    }

    pub fn search_families(&self, term: &str) -> RepoResult<Vec<FamilyRecord>> {
        let families = self
            .store
            .search_families(non_blank(Some(term)).unwrap_or_default())?;
        info!(
            "event=catalog_lookup module=catalog kind=families results={}",
            families.len()
        );
        Ok(families)
    }

    /// Grid-cell overview; `None` for a blank or unknown code.
    pub fn grid_cell_overview(&self, code: &str) -> RepoResult<Option<GridCellOverview>> {
        let Some(code) = non_blank(Some(code)) else {
            return Ok(None);
        };
        let overview = self.store.grid_cell_overview(code)?;
        info!(
            "event=catalog_lookup module=catalog kind=grid_cell found={}",
            overview.is_some()
        );
        Ok(overview)
    }
}
