//! Per-mode filter cascades over shaped records.
//!
//! # Responsibility
//! - Apply optional filters after shaping, in each mode's fixed order.
//!
//! # Invariants
//! - Event mode drops a property once no resident passes the profile filter;
//!   surviving properties keep every resident. Its age/type step likewise
//!   keeps or drops whole properties.
//! - Grid mode requires one resident to satisfy age and category together.
//! - Municipality mode evaluates every predicate independently; age and
//!   category may be satisfied by different residents.

use crate::model::projection::{ProfileLabel, PropertyRecord, ResidentRecord};
use crate::search::request::{AgeRange, SearchFilters};
use crate::search::synonyms::{limitation_matches, property_type_matches};
use crate::search::text::{contains_ci, eq_ci, grid_code_contains};
use log::debug;

/// Condition / limitation / disposition predicates against first-found labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileFilter<'a> {
    pub condition: Option<&'a str>,
    pub limitation: Option<&'a str>,
    pub disposition: Option<&'a str>,
}

impl<'a> ProfileFilter<'a> {
    pub fn from_filters(filters: &'a SearchFilters) -> Self {
        Self {
            condition: filters.resident_condition(),
            limitation: filters.resident_limitation(),
            disposition: filters.resident_disposition(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.condition.is_none() && self.limitation.is_none() && self.disposition.is_none()
    }

    /// Whether the resident's labels satisfy every set predicate.
    ///
    /// A resident without an association never matches a set predicate.
    pub fn matches(&self, resident: &ResidentRecord) -> bool {
        label_passes(&resident.condition, self.condition, contains_ci)
            && label_passes(&resident.limitation, self.limitation, limitation_matches)
            && label_passes(&resident.disposition, self.disposition, contains_ci)
    }
}

fn label_passes(
    label: &ProfileLabel,
    filter: Option<&str>,
    matches: impl Fn(&str, &str) -> bool,
) -> bool {
    match filter {
        None => true,
        Some(filter) => label.known_name().is_some_and(|name| matches(name, filter)),
    }
}

fn category_is(resident: &ResidentRecord, expected: &str) -> bool {
    resident
        .category
        .as_deref()
        .is_some_and(|category| eq_ci(category, expected))
}

/// One resident satisfies the age bound and category equality together.
fn resident_satisfies(
    resident: &ResidentRecord,
    age_range: Option<AgeRange>,
    category: Option<&str>,
) -> bool {
    age_range.map_or(true, |range| range.contains(resident.age))
        && category.map_or(true, |expected| category_is(resident, expected))
}

fn any_resident_satisfies(
    property: &PropertyRecord,
    age_range: Option<AgeRange>,
    category: Option<&str>,
) -> bool {
    if age_range.is_none() && category.is_none() {
        return true;
    }
    property
        .residents
        .iter()
        .any(|resident| resident_satisfies(resident, age_range, category))
}

fn damage_contains(property: &PropertyRecord, damage_type: Option<&str>) -> bool {
    damage_type.map_or(true, |expected| {
        property
            .damages
            .as_deref()
            .is_some_and(|damage| contains_ci(damage, expected))
    })
}

/// Event mode: profile cascade, then existential age + `propertyType` category.
pub fn apply_event_filters(
    mut properties: Vec<PropertyRecord>,
    filters: &SearchFilters,
) -> Vec<PropertyRecord> {
    let profile = ProfileFilter::from_filters(filters);
    if !profile.is_empty() {
        let before = properties.len();
        properties.retain(|property| {
            property
                .residents
                .iter()
                .any(|resident| profile.matches(resident))
        });
        debug!(
            "event=filter_cascade module=search mode=evento stage=profile before={} after={}",
            before,
            properties.len()
        );
    }

    let age_range = filters.age_range();
    let category = filters.property_type();
    let damage_type = filters.damage_type();
    properties.retain(|property| {
        any_resident_satisfies(property, age_range, category)
            && damage_contains(property, damage_type)
    });
    properties
}

/// Grid mode: one resident must match both age and `residentCategory`.
pub fn apply_grid_filters(
    mut properties: Vec<PropertyRecord>,
    filters: &SearchFilters,
) -> Vec<PropertyRecord> {
    let age_range = filters.age_range();
    let category = filters.resident_category();
    properties.retain(|property| any_resident_satisfies(property, age_range, category));
    properties
}

/// Municipality mode: independent AND-combined property predicates.
pub fn apply_municipality_filters(
    mut properties: Vec<PropertyRecord>,
    filters: &SearchFilters,
) -> Vec<PropertyRecord> {
    let usng = filters.usng();
    let municipality = filters.municipality();
    let neighborhood = filters.neighborhood();
    let sector = filters.sector();
    let property_type = filters.property_type();
    let age_range = filters.age_range();
    let category = filters.resident_category();
    let damage_type = filters.damage_type();

    properties.retain(|property| {
        usng.map_or(true, |term| grid_code_contains(&property.usng, term))
            && municipality.map_or(true, |term| contains_ci(&property.municipality, term))
            && neighborhood.map_or(true, |term| contains_ci(&property.neighborhood, term))
            && sector.map_or(true, |term| contains_ci(&property.sector, term))
            && property_type.map_or(true, |term| {
                property_type_matches(&property.property_type_name, term)
            })
            && any_resident_satisfies(property, age_range, None)
            && any_resident_satisfies(property, None, category)
            && damage_contains(property, damage_type)
    });
    properties
}

/// Resident mode: keeps residents whose first-found labels pass the profile filter.
pub fn apply_resident_filters(
    mut residents: Vec<ResidentRecord>,
    filters: &SearchFilters,
) -> Vec<ResidentRecord> {
    let profile = ProfileFilter::from_filters(filters);
    if !profile.is_empty() {
        residents.retain(|resident| profile.matches(resident));
    }
    residents
}

#[cfg(test)]
mod tests {
    use super::{
        apply_event_filters, apply_grid_filters, apply_municipality_filters, ProfileFilter,
    };
    use crate::model::projection::{
        ProfileLabel, PropertyInfo, PropertyRecord, ResidentRecord, NOT_AVAILABLE,
    };
    use crate::search::request::{AgeRange, SearchFilters};

    fn info(property_id: i64) -> PropertyInfo {
        PropertyInfo {
            id: property_id,
            property_type_id: None,
            property_type_name: NOT_AVAILABLE.to_string(),
            municipality: "San Juan".to_string(),
            municipality_id: Some(1),
            neighborhood: NOT_AVAILABLE.to_string(),
            neighborhood_id: None,
            sector: NOT_AVAILABLE.to_string(),
            sector_id: None,
            usng: "19Q GA 8942".to_string(),
            address: NOT_AVAILABLE.to_string(),
        }
    }

    fn resident(id: i64, property_id: i64, age: Option<i64>, category: &str) -> ResidentRecord {
        ResidentRecord {
            id,
            name: format!("resident-{id}"),
            lastname1: None,
            lastname2: None,
            age,
            sex: None,
            category: Some(category.to_string()),
            contact: None,
            property_id,
            family_id: None,
            family: None,
            property_info: info(property_id),
            condition: ProfileLabel::not_available(),
            limitation: ProfileLabel::not_available(),
            disposition: ProfileLabel::not_available(),
        }
    }

    fn property(id: i64, property_type: &str, residents: Vec<ResidentRecord>) -> PropertyRecord {
        let info = info(id);
        PropertyRecord {
            id,
            property_type_id: None,
            property_type_name: property_type.to_string(),
            damages: None,
            date: None,
            municipality: info.municipality,
            municipality_id: info.municipality_id,
            neighborhood: info.neighborhood,
            neighborhood_id: info.neighborhood_id,
            sector: info.sector,
            sector_id: info.sector_id,
            usng: info.usng,
            address: info.address,
            notifications: Vec::new(),
            residents,
        }
    }

    fn labelled(mut record: ResidentRecord, condition: &str) -> ResidentRecord {
        record.condition = ProfileLabel {
            name: condition.to_string(),
            description: None,
            observation: None,
        };
        record
    }

    #[test]
    fn profile_filter_never_matches_placeholder() {
        let filter = ProfileFilter {
            condition: Some("n/a"),
            ..ProfileFilter::default()
        };
        assert!(!filter.matches(&resident(1, 1, Some(30), "adult")));
    }

    #[test]
    fn event_profile_cascade_drops_properties_without_matching_resident() {
        let filters = SearchFilters {
            resident_condition: Some("encamado".to_string()),
            ..SearchFilters::default()
        };
        let kept = apply_event_filters(
            vec![
                property(
                    1,
                    "Residencial",
                    vec![
                        labelled(resident(1, 1, Some(80), "elder"), "Encamado"),
                        resident(3, 1, Some(12), "child"),
                    ],
                ),
                property(2, "Residencial", vec![resident(2, 2, Some(30), "adult")]),
            ],
            &filters,
        );

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
        assert_eq!(kept[0].residents.len(), 2);
    }

    #[test]
    fn event_age_and_type_step_keeps_whole_property() {
        let filters = SearchFilters {
            age_range: Some(AgeRange {
                min: Some(18),
                max: Some(65),
            }),
            property_type: Some("adult".to_string()),
            ..SearchFilters::default()
        };
        let kept = apply_event_filters(
            vec![property(
                1,
                "Residencial",
                vec![
                    resident(1, 1, Some(10), "child"),
                    resident(2, 1, Some(40), "adult"),
                ],
            )],
            &filters,
        );

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].residents.len(), 2);
    }

    #[test]
    fn grid_requires_same_resident_but_municipality_does_not() {
        let filters = SearchFilters {
            age_range: Some(AgeRange {
                min: Some(60),
                max: None,
            }),
            resident_category: Some("child".to_string()),
            ..SearchFilters::default()
        };
        let split = || {
            vec![property(
                1,
                "Residencial",
                vec![
                    resident(1, 1, Some(70), "elder"),
                    resident(2, 1, Some(8), "child"),
                ],
            )]
        };

        assert!(apply_grid_filters(split(), &filters).is_empty());
        assert_eq!(apply_municipality_filters(split(), &filters).len(), 1);
    }

    #[test]
    fn municipality_property_type_uses_synonym_classes() {
        let filters = SearchFilters {
            property_type: Some("Hospital".to_string()),
            ..SearchFilters::default()
        };
        let kept = apply_municipality_filters(
            vec![
                property(1, "Salud", Vec::new()),
                property(2, "Residential", Vec::new()),
            ],
            &filters,
        );
        assert_eq!(kept.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
    }
}
