//! Catalog reads used by the report UI next to search.
//!
//! # Responsibility
//! - Municipality summary, resident profile options, family lookup and
//!   grid-cell overview.
//!
//! # Invariants
//! - Every list has a deterministic order and a fixed upper bound where the
//!   UI expects one.
//! - Profile option lists are empty when their lookup table is absent.

use crate::db::table_exists;
use crate::model::entities::{EpochMs, RecordId};
use crate::model::projection::FamilyRecord;
use crate::repo::search_repo::ProfileKind;
use crate::repo::{RepoError, RepoResult};
use crate::search::text::{compact_grid_code, contains_ci};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub const SUMMARY_PROPERTY_LIMIT: u32 = 20;
pub const SUMMARY_RESIDENT_LIMIT: u32 = 20;
pub const SUMMARY_EVENT_LIMIT: u32 = 15;
pub const FAMILY_SEARCH_LIMIT: usize = 30;

const REQUIRED_TABLES: &[&str] = &[
    "property_types",
    "municipalities",
    "neighborhoods",
    "grid_cells",
    "watersheds",
    "families",
    "properties",
    "residents",
    "events",
    "affected_properties",
    "incidents",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRef {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalityRef {
    pub id: RecordId,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MunicipalityCounts {
    pub properties: u64,
    pub residents: u64,
    pub events: u64,
    pub neighborhoods: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyBrief {
    pub id: RecordId,
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentBrief {
    pub id: RecordId,
    /// Given name and surnames joined with single spaces.
    pub full_name: String,
    pub category: Option<String>,
    pub age: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBrief {
    pub id: RecordId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub date: EpochMs,
    pub description: Option<String>,
}

/// Municipality header, counts and bounded sample lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalitySummary {
    pub municipality: MunicipalityRef,
    pub summary: MunicipalityCounts,
    pub properties: Vec<PropertyBrief>,
    pub residents: Vec<ResidentBrief>,
    pub events: Vec<EventBrief>,
    pub neighborhoods: Vec<NamedRef>,
}

/// Active profile options, each list sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResidentOptions {
    pub conditions: Vec<NamedRef>,
    pub limitations: Vec<NamedRef>,
    pub dispositions: Vec<NamedRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatershedRef {
    pub id: RecordId,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentRef {
    pub id: RecordId,
    pub event_id: RecordId,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
}

/// Properties, watersheds and incidents located in one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCellOverview {
    pub code: String,
    pub property_count: u64,
    pub watersheds: Vec<WatershedRef>,
    pub incidents: Vec<IncidentRef>,
}

/// Read interface for catalog lookups.
pub trait CatalogStore {
    /// Returns `None` for an unknown municipality id.
    fn municipality_summary(&self, id: RecordId) -> RepoResult<Option<MunicipalitySummary>>;
    fn resident_options(&self) -> RepoResult<ResidentOptions>;
    /// Families whose surnames contain `term`; all families when blank.
    fn search_families(&self, term: &str) -> RepoResult<Vec<FamilyRecord>>;
    /// Returns `None` when no cell has the code, ignoring whitespace and case.
    fn grid_cell_overview(&self, code: &str) -> RepoResult<Option<GridCellOverview>>;
}

/// SQLite-backed catalog reads.
pub struct SqliteCatalogStore<'conn> {
    conn: &'conn Connection,
    option_tables: Vec<ProfileKind>,
}

impl<'conn> SqliteCatalogStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }

        let mut option_tables = Vec::new();
        for kind in ProfileKind::ALL {
            if table_exists(conn, kind.lookup_table())? {
                option_tables.push(kind);
            }
        }

        Ok(Self {
            conn,
            option_tables,
        })
    }

    fn count(&self, sql: &str, id: RecordId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(sql, [id], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }

    fn active_options(&self, kind: ProfileKind) -> RepoResult<Vec<NamedRef>> {
        if !self.option_tables.contains(&kind) {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, name FROM {} WHERE is_active = 1 ORDER BY name ASC, id ASC;",
            kind.lookup_table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(NamedRef {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl CatalogStore for SqliteCatalogStore<'_> {
    fn municipality_summary(&self, id: RecordId) -> RepoResult<Option<MunicipalitySummary>> {
        let municipality = self
            .conn
            .query_row(
                "SELECT id, name, latitude, longitude FROM municipalities WHERE id = ?1;",
                [id],
                |row| {
                    Ok(MunicipalityRef {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        latitude: row.get(2)?,
                        longitude: row.get(3)?,
                    })
                },
            )
            .optional()?;
        let Some(municipality) = municipality else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.address, pt.name
             FROM properties p
             LEFT JOIN property_types pt ON pt.id = p.property_type_id
             WHERE p.municipality_id = ?1
             ORDER BY p.id ASC
             LIMIT ?2;",
        )?;
        let properties = stmt
            .query_map(params![id, SUMMARY_PROPERTY_LIMIT], |row| {
                Ok(PropertyBrief {
                    id: row.get(0)?,
                    address: row.get(1)?,
                    property_type: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.name, r.lastname1, r.lastname2, r.category, r.age
             FROM residents r
             INNER JOIN properties p ON p.id = r.property_id
             WHERE p.municipality_id = ?1
             ORDER BY r.id ASC
             LIMIT ?2;",
        )?;
        let residents = stmt
            .query_map(params![id, SUMMARY_RESIDENT_LIMIT], |row| {
                let parts: [Option<String>; 3] = [row.get(1)?, row.get(2)?, row.get(3)?];
                Ok(ResidentBrief {
                    id: row.get(0)?,
                    full_name: join_name_parts(&parts),
                    category: row.get(4)?,
                    age: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.title, e.type, e.status, e.date, e.description
             FROM events e
             WHERE e.id IN (
                 SELECT ap.event_id
                 FROM affected_properties ap
                 INNER JOIN properties p ON p.id = ap.property_id
                 WHERE p.municipality_id = ?1
             )
             ORDER BY e.date DESC, e.id ASC
             LIMIT ?2;",
        )?;
        let events = stmt
            .query_map(params![id, SUMMARY_EVENT_LIMIT], |row| {
                Ok(EventBrief {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    kind: row.get(2)?,
                    status: row.get(3)?,
                    date: row.get(4)?,
                    description: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, name FROM neighborhoods WHERE municipality_id = ?1 ORDER BY name ASC, id ASC;",
        )?;
        let neighborhoods = stmt
            .query_map([id], |row| {
                Ok(NamedRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let summary = MunicipalityCounts {
            properties: self.count(
                "SELECT COUNT(*) FROM properties WHERE municipality_id = ?1;",
                id,
            )?,
            residents: self.count(
                "SELECT COUNT(*)
                 FROM residents r
                 INNER JOIN properties p ON p.id = r.property_id
                 WHERE p.municipality_id = ?1;",
                id,
            )?,
            events: self.count(
                "SELECT COUNT(DISTINCT ap.event_id)
                 FROM affected_properties ap
                 INNER JOIN properties p ON p.id = ap.property_id
                 WHERE p.municipality_id = ?1;",
                id,
            )?,
            neighborhoods: neighborhoods.len() as u64,
        };

        Ok(Some(MunicipalitySummary {
            municipality,
            summary,
            properties,
            residents,
            events,
            neighborhoods,
        }))
    }

    fn resident_options(&self) -> RepoResult<ResidentOptions> {
        Ok(ResidentOptions {
            conditions: self.active_options(ProfileKind::Condition)?,
            limitations: self.active_options(ProfileKind::Limitation)?,
            dispositions: self.active_options(ProfileKind::Disposition)?,
        })
    }

    fn search_families(&self, term: &str) -> RepoResult<Vec<FamilyRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, surnames, description FROM families ORDER BY surnames ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut families = Vec::new();
        while let Some(row) = rows.next()? {
            let surnames: String = row.get(1)?;
            if !contains_ci(&surnames, term) {
                continue;
            }
            families.push(FamilyRecord {
                id: row.get(0)?,
                surnames,
                description: row.get(2)?,
            });
            if families.len() == FAMILY_SEARCH_LIMIT {
                break;
            }
        }
        Ok(families)
    }

    fn grid_cell_overview(&self, code: &str) -> RepoResult<Option<GridCellOverview>> {
        let wanted = compact_grid_code(code);
        if wanted.is_empty() {
            return Ok(None);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, code FROM grid_cells ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut cell = None;
        while let Some(row) = rows.next()? {
            let cell_code: String = row.get(1)?;
            if compact_grid_code(&cell_code) == wanted {
                cell = Some((row.get::<_, RecordId>(0)?, cell_code));
                break;
            }
        }
        let Some((cell_id, cell_code)) = cell else {
            return Ok(None);
        };

        let property_count = self.count(
            "SELECT COUNT(*) FROM properties WHERE grid_cell_id = ?1;",
            cell_id,
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT id, name, code FROM watersheds WHERE grid_cell_id = ?1 ORDER BY name ASC, id ASC;",
        )?;
        let watersheds = stmt
            .query_map([cell_id], |row| {
                Ok(WatershedRef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT i.id, i.event_id, i.type, i.description
             FROM incidents i
             INNER JOIN events e ON e.id = i.event_id
             WHERE e.grid_cell_id = ?1
             ORDER BY i.id ASC;",
        )?;
        let incidents = stmt
            .query_map([cell_id], |row| {
                Ok(IncidentRef {
                    id: row.get(0)?,
                    event_id: row.get(1)?,
                    kind: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(GridCellOverview {
            code: cell_code,
            property_count,
            watersheds,
            incidents,
        }))
    }
}

fn join_name_parts(parts: &[Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
