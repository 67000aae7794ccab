//! Canonical report projection shared by all search modes.
//!
//! # Responsibility
//! - Define the one nested shape every mode returns:
//!   `Property → [Resident → {Family, PropertyInfo, profile labels}]`.
//!
//! # Invariants
//! - Every declared key is always serialized; absent joined labels are
//!   [`NOT_AVAILABLE`], absent optional scalars are `null`, absent collections `[]`.
//! - Filters operate on these types only, after shaping.

use crate::model::entities::{EpochMs, RecordId};
use serde::Serialize;

/// Placeholder for a joined label whose reference is missing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Condition / limitation / disposition as exposed in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileLabel {
    pub name: String,
    pub description: Option<String>,
    pub observation: Option<String>,
}

impl ProfileLabel {
    /// Label used when the resident has no association.
    pub fn not_available() -> Self {
        Self {
            name: NOT_AVAILABLE.to_string(),
            description: None,
            observation: None,
        }
    }

    /// Returns the label name, or `None` for the placeholder.
    pub fn known_name(&self) -> Option<&str> {
        (self.name != NOT_AVAILABLE).then_some(self.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyRecord {
    pub id: RecordId,
    pub surnames: String,
    pub description: Option<String>,
}

/// Location fields of the resident's property, denormalized onto the resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyInfo {
    pub id: RecordId,
    pub property_type_id: Option<RecordId>,
    pub property_type_name: String,
    pub municipality: String,
    pub municipality_id: Option<RecordId>,
    pub neighborhood: String,
    pub neighborhood_id: Option<RecordId>,
    pub sector: String,
    pub sector_id: Option<RecordId>,
    pub usng: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentRecord {
    pub id: RecordId,
    pub name: String,
    pub lastname1: Option<String>,
    pub lastname2: Option<String>,
    pub age: Option<i64>,
    pub sex: Option<String>,
    pub category: Option<String>,
    pub contact: Option<String>,
    pub property_id: RecordId,
    pub family_id: Option<RecordId>,
    pub family: Option<FamilyRecord>,
    pub property_info: PropertyInfo,
    pub condition: ProfileLabel,
    pub limitation: ProfileLabel,
    pub disposition: ProfileLabel,
}

/// Notification summary attached to an affected property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationSummary {
    pub id: RecordId,
    pub message: String,
    pub date: EpochMs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRecord {
    pub id: RecordId,
    pub property_type_id: Option<RecordId>,
    pub property_type_name: String,
    pub damages: Option<String>,
    pub date: Option<EpochMs>,
    pub municipality: String,
    pub municipality_id: Option<RecordId>,
    pub neighborhood: String,
    pub neighborhood_id: Option<RecordId>,
    pub sector: String,
    pub sector_id: Option<RecordId>,
    pub usng: String,
    pub address: String,
    pub notifications: Vec<NotificationSummary>,
    pub residents: Vec<ResidentRecord>,
}

/// Event header of an event-mode response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub date: EpochMs,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub usng: Option<String>,
}

/// Full notification as listed at the top of an event-mode response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRecord {
    pub id: RecordId,
    pub event_id: RecordId,
    pub property_id: Option<RecordId>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: String,
    pub created_at: EpochMs,
    pub status: Option<String>,
    pub notification_number: Option<String>,
}
