//! Per-property damage resolution for grid and municipality modes.
//!
//! # Invariants
//! - A failed lookup is logged and yields an empty [`DamageRecord`]; it never
//!   aborts the enclosing search.
//! - Output order matches input order.

use crate::model::entities::{DamageRecord, RecordId};
use crate::repo::search_repo::SearchStore;
use log::warn;
use uuid::Uuid;

/// Most recent damage of one property, or empty when missing or failed.
pub fn resolve_damage<S: SearchStore>(
    store: &S,
    property_id: RecordId,
    request_id: Uuid,
) -> DamageRecord {
    match store.latest_damage(property_id) {
        Ok(Some(damage)) => damage,
        Ok(None) => DamageRecord::empty(),
        Err(err) => {
            warn!(
                "event=damage_lookup module=search status=recovered request_id={} property_id={} error={}",
                request_id, property_id, err
            );
            DamageRecord::empty()
        }
    }
}

/// Resolves damage for every property id, preserving order.
pub fn resolve_all<S: SearchStore>(
    store: &S,
    property_ids: &[RecordId],
    request_id: Uuid,
) -> Vec<DamageRecord> {
    property_ids
        .iter()
        .map(|property_id| resolve_damage(store, *property_id, request_id))
        .collect()
}
