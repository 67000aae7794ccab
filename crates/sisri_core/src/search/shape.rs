//! Maps fetched graphs into the canonical report projection.
//!
//! # Responsibility
//! - Convert typed store graphs into [`PropertyRecord`] / [`ResidentRecord`].
//!
//! # Invariants
//! - Missing joined labels become `"N/A"`; missing profile associations
//!   become [`ProfileLabel::not_available`].
//! - Resident order is preserved from the store.

use crate::model::entities::{
    DamageRecord, EventRow, FamilyRow, NotificationRow, ProfileLink, PropertyGraph, PropertyRow,
    ResidentGraph,
};
use crate::model::projection::{
    EventSummary, FamilyRecord, NotificationRecord, NotificationSummary, ProfileLabel,
    PropertyInfo, PropertyRecord, ResidentRecord, NOT_AVAILABLE,
};

fn label_or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn profile_label(link: Option<ProfileLink>) -> ProfileLabel {
    match link {
        Some(link) => ProfileLabel {
            name: link.name,
            description: link.description,
            observation: link.observation,
        },
        None => ProfileLabel::not_available(),
    }
}

fn family_record(family: FamilyRow) -> FamilyRecord {
    FamilyRecord {
        id: family.id,
        surnames: family.surnames,
        description: family.description,
    }
}

pub fn property_info(property: &PropertyRow) -> PropertyInfo {
    PropertyInfo {
        id: property.id,
        property_type_id: property.property_type_id,
        property_type_name: label_or_na(property.property_type_name.as_deref()),
        municipality: label_or_na(property.municipality_name.as_deref()),
        municipality_id: property.municipality_id,
        neighborhood: label_or_na(property.neighborhood_name.as_deref()),
        neighborhood_id: property.neighborhood_id,
        sector: label_or_na(property.sector_name.as_deref()),
        sector_id: property.sector_id,
        usng: label_or_na(property.grid_code.as_deref()),
        address: label_or_na(property.address.as_deref()),
    }
}

pub fn shape_resident(graph: ResidentGraph, property: &PropertyRow) -> ResidentRecord {
    let ResidentGraph {
        resident,
        family,
        condition,
        limitation,
        disposition,
    } = graph;

    ResidentRecord {
        id: resident.id,
        name: resident.name,
        lastname1: resident.lastname1,
        lastname2: resident.lastname2,
        age: resident.age,
        sex: resident.sex,
        category: resident.category,
        contact: resident.contact,
        property_id: resident.property_id,
        family_id: resident.family_id,
        family: family.map(family_record),
        property_info: property_info(property),
        condition: profile_label(condition),
        limitation: profile_label(limitation),
        disposition: profile_label(disposition),
    }
}

/// Shapes one property with its damage payload and notification summaries.
pub fn shape_property(
    graph: PropertyGraph,
    damage: DamageRecord,
    notifications: Vec<NotificationSummary>,
) -> PropertyRecord {
    let PropertyGraph {
        property,
        residents,
    } = graph;
    let info = property_info(&property);
    let residents = residents
        .into_iter()
        .map(|resident| shape_resident(resident, &property))
        .collect();

    PropertyRecord {
        id: info.id,
        property_type_id: info.property_type_id,
        property_type_name: info.property_type_name,
        damages: damage.damage,
        date: damage.reported_at,
        municipality: info.municipality,
        municipality_id: info.municipality_id,
        neighborhood: info.neighborhood,
        neighborhood_id: info.neighborhood_id,
        sector: info.sector,
        sector_id: info.sector_id,
        usng: info.usng,
        address: info.address,
        notifications,
        residents,
    }
}

pub fn shape_event(event: EventRow) -> EventSummary {
    EventSummary {
        id: event.id,
        title: event.title,
        description: event.description,
        date: event.date,
        kind: event.kind,
        status: event.status,
        usng: event.grid_code,
    }
}

pub fn shape_notification(row: NotificationRow) -> NotificationRecord {
    NotificationRecord {
        id: row.id,
        event_id: row.event_id,
        property_id: row.property_id,
        kind: row.kind,
        message: row.message,
        created_at: row.created_at,
        status: row.status,
        notification_number: row.notification_number,
    }
}
