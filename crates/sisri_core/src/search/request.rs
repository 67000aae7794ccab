//! Parsed search request and filter set.
//!
//! # Invariants
//! - Wire names follow the report client: camelCase keys, Spanish mode tags.
//! - Blank filter strings are equivalent to absent filters.
//! - `residentCategory = "all"` means no category restriction.

use crate::model::entities::EpochMs;
use crate::search::text::non_blank;
use serde::{Deserialize, Deserializer};

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "all";

/// The four search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    Event,
    Grid,
    Municipality,
    Resident,
}

impl SearchMode {
    /// Parses the wire tag (`evento|usng|municipio|residente`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "evento" => Some(Self::Event),
            "usng" => Some(Self::Grid),
            "municipio" => Some(Self::Municipality),
            "residente" => Some(Self::Resident),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "evento",
            Self::Grid => "usng",
            Self::Municipality => "municipio",
            Self::Resident => "residente",
        }
    }

    /// Resident mode is the only one that tolerates an empty query.
    pub fn requires_query(self) -> bool {
        !matches!(self, Self::Resident)
    }
}

/// Inclusive age bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AgeRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl AgeRange {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// An unknown age never satisfies a bounded range.
    pub fn contains(&self, age: Option<i64>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(age) = age else {
            return false;
        };
        self.min.map_or(true, |min| age >= min) && self.max.map_or(true, |max| age <= max)
    }
}

/// Inclusive epoch-millisecond bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: Option<EpochMs>,
    pub end: Option<EpochMs>,
}

impl DateRange {
    pub fn contains(&self, value: EpochMs) -> bool {
        self.start.map_or(true, |start| value >= start)
            && self.end.map_or(true, |end| value <= end)
    }
}

/// Optional filters; which ones apply depends on the mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    pub usng: Option<String>,
    pub municipio: Option<String>,
    pub barrio: Option<String>,
    pub sector: Option<String>,
    pub age_range: Option<AgeRange>,
    pub property_type: Option<String>,
    pub incident_type: Option<String>,
    pub damage_type: Option<String>,
    pub resident_category: Option<String>,
    pub resident_condition: Option<String>,
    pub resident_limitation: Option<String>,
    pub resident_disposition: Option<String>,
    pub resident_name: Option<String>,
    pub family_name: Option<String>,
    pub date_range: Option<DateRange>,
}

impl SearchFilters {
    pub fn usng(&self) -> Option<&str> {
        non_blank(self.usng.as_deref())
    }

    pub fn municipality(&self) -> Option<&str> {
        non_blank(self.municipio.as_deref())
    }

    pub fn neighborhood(&self) -> Option<&str> {
        non_blank(self.barrio.as_deref())
    }

    pub fn sector(&self) -> Option<&str> {
        non_blank(self.sector.as_deref())
    }

    /// Age range with at least one bound.
    pub fn age_range(&self) -> Option<AgeRange> {
        self.age_range.filter(|range| !range.is_unbounded())
    }

    pub fn property_type(&self) -> Option<&str> {
        non_blank(self.property_type.as_deref())
    }

    pub fn incident_type(&self) -> Option<&str> {
        non_blank(self.incident_type.as_deref())
    }

    pub fn damage_type(&self) -> Option<&str> {
        non_blank(self.damage_type.as_deref())
    }

    /// Resident category, with `"all"` treated as absent.
    pub fn resident_category(&self) -> Option<&str> {
        non_blank(self.resident_category.as_deref())
            .filter(|value| !value.eq_ignore_ascii_case(ALL_CATEGORIES))
    }

    pub fn resident_condition(&self) -> Option<&str> {
        non_blank(self.resident_condition.as_deref())
    }

    pub fn resident_limitation(&self) -> Option<&str> {
        non_blank(self.resident_limitation.as_deref())
    }

    pub fn resident_disposition(&self) -> Option<&str> {
        non_blank(self.resident_disposition.as_deref())
    }

    pub fn resident_name(&self) -> Option<&str> {
        non_blank(self.resident_name.as_deref())
    }

    pub fn family_name(&self) -> Option<&str> {
        non_blank(self.family_name.as_deref())
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    /// Whether any condition/limitation/disposition filter is set.
    pub fn has_profile_filters(&self) -> bool {
        self.resident_condition().is_some()
            || self.resident_limitation().is_some()
            || self.resident_disposition().is_some()
    }
}

/// Search request as received from the report client.
///
/// `search_type` stays a raw string so an unknown or missing value is reported
/// as a validation failure instead of a parse failure. Absent and `null`
/// strings read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub search_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub search_query: String,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

impl SearchRequest {
    pub fn new(search_type: impl Into<String>, search_query: impl Into<String>) -> Self {
        Self {
            search_type: search_type.into(),
            search_query: search_query.into(),
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn query(&self) -> &str {
        self.search_query.trim()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
