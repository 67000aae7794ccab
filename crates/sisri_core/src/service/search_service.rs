//! Search dispatch use-case.
//!
//! # Responsibility
//! - Validate a [`SearchRequest`], pick the mode strategy and run
//!   fetch → shape → filter.
//! - Convert store failures into a generic [`SearchError::Internal`].
//!
//! # Invariants
//! - Only resident mode accepts an empty query; that check runs before the
//!   mode check.
//! - A request id is active for the whole run so panics can be correlated.
//! - Store error text is logged under the request id and never returned.
//! - Logs carry ids, counts and timings only; no names or free text.

use crate::logging::RequestScope;
use crate::model::entities::{AffectedPropertyGraph, PropertyGraph, RecordId};
use crate::model::projection::PropertyRecord;
use crate::repo::search_repo::{EventQuery, ResidentQuery, SearchStore};
use crate::repo::RepoError;
use crate::search::damage::resolve_all;
use crate::search::error::{SearchError, SearchResult, SEARCH_TERM_REQUIRED, UNKNOWN_SEARCH_TYPE};
use crate::search::filters::{
    apply_event_filters, apply_grid_filters, apply_municipality_filters, apply_resident_filters,
};
use crate::search::notifications::NotificationIndex;
use crate::search::request::{SearchFilters, SearchMode, SearchRequest};
use crate::search::response::{
    EventSearchResponse, GridSearchResponse, MunicipalitySearchResponse, ResidentSearchResponse,
    SearchResponse,
};
use crate::search::shape::{shape_event, shape_notification, shape_property, shape_resident};
use log::{error, info, warn};
use std::time::Instant;
use uuid::Uuid;

/// Search facade over a [`SearchStore`].
pub struct SearchService<S: SearchStore> {
    store: S,
}

impl<S: SearchStore> SearchService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Runs one search request.
    ///
    /// A missing query is reported before an unknown mode; only resident mode
    /// accepts an empty query.
    ///
    /// # Errors
    /// - [`SearchError::InvalidRequest`] for a missing query or an unknown mode.
    /// - [`SearchError::Internal`] when the primary fetch fails.
    pub fn search(&self, request: &SearchRequest) -> SearchResult<SearchResponse> {
        let mode = SearchMode::parse(&request.search_type);
        let query = request.query();
        let query_required = mode.map_or(true, SearchMode::requires_query);
        if query_required && query.is_empty() {
            warn!(
                "event=search module=search status=rejected mode={} reason=missing_query",
                mode.map_or("unknown", SearchMode::as_str)
            );
            return Err(SearchError::InvalidRequest(SEARCH_TERM_REQUIRED));
        }
        let Some(mode) = mode else {
            warn!("event=search module=search status=rejected reason=unknown_search_type");
            return Err(SearchError::InvalidRequest(UNKNOWN_SEARCH_TYPE));
        };

        let request_id = Uuid::new_v4();
        let _scope = RequestScope::enter(request_id);
        let default_filters = SearchFilters::default();
        let filters = request.filters.as_ref().unwrap_or(&default_filters);
        let started = Instant::now();
        info!(
            "event=search module=search status=start mode={} request_id={}",
            mode.as_str(),
            request_id
        );

        let outcome = match mode {
            SearchMode::Event => self.search_event(query, filters).map(SearchResponse::Event),
            SearchMode::Grid => self
                .search_grid(query, filters, request_id)
                .map(SearchResponse::Grid),
            SearchMode::Municipality => self
                .search_municipality(query, filters, request_id)
                .map(SearchResponse::Municipality),
            SearchMode::Resident => self
                .search_residents(query, filters)
                .map(SearchResponse::Resident),
        };
        let duration_ms = started.elapsed().as_millis();

        match outcome {
            Ok(response) => {
                info!(
                    "event=search module=search status=ok mode={} request_id={} results={} duration_ms={}",
                    mode.as_str(),
                    request_id,
                    response.result_count(),
                    duration_ms
                );
                Ok(response)
            }
            Err(err) => {
                error!(
                    "event=search module=search status=error mode={} request_id={} duration_ms={} error={}",
                    mode.as_str(),
                    request_id,
                    duration_ms,
                    err
                );
                Err(SearchError::Internal { request_id })
            }
        }
    }

    fn search_event(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<EventSearchResponse, RepoError> {
        let event_query = EventQuery {
            title: query.to_string(),
            incident_type: filters.incident_type().map(str::to_string),
            date_range: filters.date_range(),
        };
        let Some(event) = self.store.find_event(&event_query)? else {
            return Ok(EventSearchResponse::empty());
        };

        let affected = self.store.affected_properties(event.id)?;
        let notifications = self.store.event_notifications(event.id)?;
        let property_ids: Vec<RecordId> = affected
            .iter()
            .map(|item| item.graph.property.id)
            .collect();
        let mut index = NotificationIndex::correlate(&notifications, &property_ids);

        let properties = affected
            .into_iter()
            .map(|AffectedPropertyGraph { damage, graph, .. }| {
                let property_notifications = index.take(graph.property.id);
                shape_property(graph, damage, property_notifications)
            })
            .collect();

        Ok(EventSearchResponse {
            event: Some(shape_event(event)),
            notifications: notifications.into_iter().map(shape_notification).collect(),
            properties: apply_event_filters(properties, filters),
        })
    }

    fn search_grid(
        &self,
        query: &str,
        filters: &SearchFilters,
        request_id: Uuid,
    ) -> Result<GridSearchResponse, RepoError> {
        let graphs = self.store.properties_by_grid_code(query)?;
        let properties = self.shape_with_damage(graphs, request_id);
        Ok(GridSearchResponse {
            query: query.to_string(),
            properties: apply_grid_filters(properties, filters),
        })
    }

    fn search_municipality(
        &self,
        query: &str,
        filters: &SearchFilters,
        request_id: Uuid,
    ) -> Result<MunicipalitySearchResponse, RepoError> {
        let graphs = self.store.properties_by_municipality(query)?;
        let properties = self.shape_with_damage(graphs, request_id);
        Ok(MunicipalitySearchResponse {
            query: query.to_string(),
            properties: apply_municipality_filters(properties, filters),
        })
    }

    fn search_residents(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<ResidentSearchResponse, RepoError> {
        let resident_query = ResidentQuery {
            name: (!query.is_empty()).then(|| query.to_string()),
            extra_name: filters.resident_name().map(str::to_string),
            category: filters.resident_category().map(str::to_string),
            age_range: filters.age_range(),
            family_name: filters.family_name().map(str::to_string),
        };
        let residents = self
            .store
            .find_residents(&resident_query)?
            .into_iter()
            .map(|hit| shape_resident(hit.graph, &hit.property))
            .collect();

        Ok(ResidentSearchResponse {
            query: query.to_string(),
            residents: apply_resident_filters(residents, filters),
        })
    }

    fn shape_with_damage(
        &self,
        graphs: Vec<PropertyGraph>,
        request_id: Uuid,
    ) -> Vec<PropertyRecord> {
        let property_ids: Vec<RecordId> = graphs.iter().map(|graph| graph.property.id).collect();
        let damages = resolve_all(&self.store, &property_ids, request_id);
        graphs
            .into_iter()
            .zip(damages)
            .map(|(graph, damage)| shape_property(graph, damage, Vec::new()))
            .collect()
    }
}
