//! Event notification correlation.
//!
//! # Invariants
//! - Every affected property gets an entry, empty when nothing applies.
//! - A notification naming a property goes to that property only; one without
//!   a property applies to every affected property of the event.
//! - Entries are ordered `date DESC, id DESC`.

use crate::model::entities::{NotificationRow, RecordId};
use crate::model::projection::NotificationSummary;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Affected-property id to notification summaries of one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationIndex {
    by_property: HashMap<RecordId, Vec<NotificationSummary>>,
}

impl NotificationIndex {
    /// Correlates `notifications` of one event against its affected properties.
    pub fn correlate(notifications: &[NotificationRow], property_ids: &[RecordId]) -> Self {
        let mut ordered: Vec<&NotificationRow> = notifications.iter().collect();
        ordered.sort_by_key(|row| (Reverse(row.created_at), Reverse(row.id)));

        let mut by_property: HashMap<RecordId, Vec<NotificationSummary>> = property_ids
            .iter()
            .map(|property_id| (*property_id, Vec::new()))
            .collect();

        for row in ordered {
            let summary = NotificationSummary {
                id: row.id,
                message: row.message.clone(),
                date: row.created_at,
            };
            match row.property_id {
                Some(property_id) => {
                    if let Some(entries) = by_property.get_mut(&property_id) {
                        entries.push(summary);
                    }
                }
                None => {
                    for entries in by_property.values_mut() {
                        entries.push(summary.clone());
                    }
                }
            }
        }

        Self { by_property }
    }

    /// Removes and returns the summaries for one property.
    pub fn take(&mut self, property_id: RecordId) -> Vec<NotificationSummary> {
        self.by_property.remove(&property_id).unwrap_or_default()
    }
}
