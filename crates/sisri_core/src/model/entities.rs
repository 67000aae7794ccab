//! Typed records produced by the store for one search.
//!
//! # Responsibility
//! - Carry the joined relational graph exactly as fetched (ids + labels).
//! - Give the shaper one strongly-typed input per mode.
//!
//! # Invariants
//! - Joined reference labels are `None` when the reference is absent; placeholder
//!   substitution happens in the shaper, never here.
//! - Profile links hold only the first-found association per resident.

/// Row id type shared by every table in the reporting store.
pub type RecordId = i64;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// Event row as selected for event-mode searches.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub date: EpochMs,
    pub kind: Option<String>,
    pub status: Option<String>,
    /// Resolved grid-cell code, when the event is located.
    pub grid_code: Option<String>,
}

/// Property with every location reference already joined.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRow {
    pub id: RecordId,
    pub property_type_id: Option<RecordId>,
    pub property_type_name: Option<String>,
    pub municipality_id: Option<RecordId>,
    pub municipality_name: Option<String>,
    pub neighborhood_id: Option<RecordId>,
    pub neighborhood_name: Option<String>,
    pub sector_id: Option<RecordId>,
    pub sector_name: Option<String>,
    pub grid_code: Option<String>,
    pub address: Option<String>,
}

/// Scalar resident columns with canonical field names.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentRow {
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
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilyRow {
    pub id: RecordId,
    pub surnames: String,
    pub description: Option<String>,
}

/// One resident ↔ condition/limitation/disposition association with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLink {
    pub name: String,
    pub description: Option<String>,
    pub observation: Option<String>,
}

/// Resident plus family and first-found profile associations.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentGraph {
    pub resident: ResidentRow,
    pub family: Option<FamilyRow>,
    pub condition: Option<ProfileLink>,
    pub limitation: Option<ProfileLink>,
    pub disposition: Option<ProfileLink>,
}

/// Property plus its full resident graph.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGraph {
    pub property: PropertyRow,
    pub residents: Vec<ResidentGraph>,
}

/// Damage payload of one event ↔ property affectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRecord {
    pub damage: Option<String>,
    pub reported_at: Option<EpochMs>,
}

impl DamageRecord {
    /// No damage known for the property.
    pub fn empty() -> Self {
        Self {
            damage: None,
            reported_at: None,
        }
    }
}

/// Event ↔ property affectation carrying the affected property graph.
#[derive(Debug, Clone, PartialEq)]
pub struct AffectedPropertyGraph {
    pub event_id: RecordId,
    pub damage: DamageRecord,
    pub graph: PropertyGraph,
}

/// Resident matched in resident mode together with the property it lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentHit {
    pub graph: ResidentGraph,
    pub property: PropertyRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRow {
    pub id: RecordId,
    pub event_id: RecordId,
    pub property_id: Option<RecordId>,
    pub kind: Option<String>,
    pub message: String,
    pub created_at: EpochMs,
    pub status: Option<String>,
    pub notification_number: Option<String>,
}
