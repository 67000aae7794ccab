//! Mode-tagged search responses.

use crate::model::projection::{EventSummary, NotificationRecord, PropertyRecord, ResidentRecord};
use crate::search::request::SearchMode;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSearchResponse {
    /// `None` when no event matched; not an error.
    #[serde(rename = "evento")]
    pub event: Option<EventSummary>,
    #[serde(rename = "notificaciones")]
    pub notifications: Vec<NotificationRecord>,
    #[serde(rename = "propiedades")]
    pub properties: Vec<PropertyRecord>,
}

impl EventSearchResponse {
    pub fn empty() -> Self {
        Self {
            event: None,
            notifications: Vec::new(),
            properties: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSearchResponse {
    #[serde(rename = "usngQuery")]
    pub query: String,
    #[serde(rename = "propiedades")]
    pub properties: Vec<PropertyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MunicipalitySearchResponse {
    #[serde(rename = "municipioQuery")]
    pub query: String,
    #[serde(rename = "propiedades")]
    pub properties: Vec<PropertyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentSearchResponse {
    #[serde(rename = "residentQuery")]
    pub query: String,
    #[serde(rename = "residentes")]
    pub residents: Vec<ResidentRecord>,
}

/// Response body, serialized with a leading `searchType` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "searchType")]
pub enum SearchResponse {
    #[serde(rename = "evento")]
    Event(EventSearchResponse),
    #[serde(rename = "usng")]
    Grid(GridSearchResponse),
    #[serde(rename = "municipio")]
    Municipality(MunicipalitySearchResponse),
    #[serde(rename = "residente")]
    Resident(ResidentSearchResponse),
}

impl SearchResponse {
    pub fn mode(&self) -> SearchMode {
        match self {
            Self::Event(_) => SearchMode::Event,
            Self::Grid(_) => SearchMode::Grid,
            Self::Municipality(_) => SearchMode::Municipality,
            Self::Resident(_) => SearchMode::Resident,
        }
    }

    /// Number of top-level records (properties or residents).
    pub fn result_count(&self) -> usize {
        match self {
            Self::Event(body) => body.properties.len(),
            Self::Grid(body) => body.properties.len(),
            Self::Municipality(body) => body.properties.len(),
            Self::Resident(body) => body.residents.len(),
        }
    }

    /// HTTP-style status of a successful response.
    pub fn status_code(&self) -> u16 {
        200
    }
}
