//! Relational fetcher for the four search modes.
//!
//! # Responsibility
//! - Read events, affected properties, properties, residents and their
//!   family/profile graphs for one search request.
//! - Resolve which optional relations exist once, at construction time.
//!
//! # Invariants
//! - Property, resident and profile lists come back in a deterministic order:
//!   properties by id, residents by id within a property, resident-mode hits by
//!   `lastname1, lastname2, name, id`.
//! - Only the first-found profile association per resident is surfaced; "first"
//!   means most recently created (`created_at DESC, id DESC`).
//! - Text predicates are matched case-insensitively in Rust so accented
//!   uppercase input behaves the same as ASCII.

use crate::db::{table_exists, table_has_column};
use crate::model::entities::{
    AffectedPropertyGraph, DamageRecord, EventRow, FamilyRow, NotificationRow, ProfileLink,
    PropertyGraph, PropertyRow, RecordId, ResidentGraph, ResidentHit, ResidentRow,
};
use crate::repo::{placeholders, RepoError, RepoResult};
use crate::search::request::{AgeRange, DateRange};
use crate::search::synonyms::RESIDENT_SEX_COLUMNS;
use crate::search::text::{contains_ci, eq_ci, grid_code_contains};
use log::info;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{BTreeSet, HashMap};

const ID_CHUNK_SIZE: usize = 500;

const REQUIRED_TABLES: &[&str] = &[
    "property_types",
    "municipalities",
    "neighborhoods",
    "sectors",
    "grid_cells",
    "families",
    "properties",
    "residents",
    "events",
    "affected_properties",
    "notifications",
];

const PROPERTY_SELECT_SQL: &str = "SELECT
    p.id AS id,
    p.property_type_id AS property_type_id,
    pt.name AS property_type_name,
    p.municipality_id AS municipality_id,
    m.name AS municipality_name,
    p.neighborhood_id AS neighborhood_id,
    n.name AS neighborhood_name,
    p.sector_id AS sector_id,
    s.name AS sector_name,
    g.code AS grid_code,
    p.address AS address
FROM properties p
LEFT JOIN property_types pt ON pt.id = p.property_type_id
LEFT JOIN municipalities m ON m.id = p.municipality_id
LEFT JOIN neighborhoods n ON n.id = p.neighborhood_id
LEFT JOIN sectors s ON s.id = p.sector_id
LEFT JOIN grid_cells g ON g.id = p.grid_cell_id";

/// Condition / limitation / disposition association kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Condition,
    Limitation,
    Disposition,
}

impl ProfileKind {
    pub const ALL: [Self; 3] = [Self::Condition, Self::Limitation, Self::Disposition];

    pub fn link_table(self) -> &'static str {
        match self {
            Self::Condition => "resident_conditions",
            Self::Limitation => "resident_limitations",
            Self::Disposition => "resident_dispositions",
        }
    }

    pub fn lookup_table(self) -> &'static str {
        match self {
            Self::Condition => "conditions",
            Self::Limitation => "limitations",
            Self::Disposition => "dispositions",
        }
    }

    fn lookup_column(self) -> &'static str {
        match self {
            Self::Condition => "condition_id",
            Self::Limitation => "limitation_id",
            Self::Disposition => "disposition_id",
        }
    }
}

/// Which optional relations the fetcher includes.
///
/// Resolved once from the schema by [`FetchOptions::detect`]; a relation whose
/// tables are missing is skipped and its label shapes to `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub include_conditions: bool,
    pub include_limitations: bool,
    pub include_dispositions: bool,
    /// Physical column holding resident sex, if any.
    pub resident_sex_column: Option<&'static str>,
}

impl FetchOptions {
    /// Inspects the connected schema.
    pub fn detect(conn: &Connection) -> RepoResult<Self> {
        let relation_available = |kind: ProfileKind| -> RepoResult<bool> {
            Ok(table_exists(conn, kind.link_table())? && table_exists(conn, kind.lookup_table())?)
        };

        let mut resident_sex_column = None;
        for column in RESIDENT_SEX_COLUMNS {
            if table_has_column(conn, "residents", column)? {
                resident_sex_column = Some(*column);
                break;
            }
        }

        Ok(Self {
            include_conditions: relation_available(ProfileKind::Condition)?,
            include_limitations: relation_available(ProfileKind::Limitation)?,
            include_dispositions: relation_available(ProfileKind::Disposition)?,
            resident_sex_column,
        })
    }

    pub fn includes(&self, kind: ProfileKind) -> bool {
        match kind {
            ProfileKind::Condition => self.include_conditions,
            ProfileKind::Limitation => self.include_limitations,
            ProfileKind::Disposition => self.include_dispositions,
        }
    }
}

/// Event-mode lookup criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Case-insensitive substring of the event title.
    pub title: String,
    /// Case-insensitive exact event type.
    pub incident_type: Option<String>,
    pub date_range: Option<DateRange>,
}

/// Scalar resident predicates evaluated by the store.
///
/// Profile-label predicates need first-found semantics and synonym handling,
/// so they run after shaping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentQuery {
    /// Substring of the given name or either surname.
    pub name: Option<String>,
    /// Second name predicate, AND-combined with `name`.
    pub extra_name: Option<String>,
    /// Case-insensitive exact category.
    pub category: Option<String>,
    pub age_range: Option<AgeRange>,
    /// Substring of the family surnames.
    pub family_name: Option<String>,
}

/// Read interface the search dispatcher runs against.
pub trait SearchStore {
    /// Relations this store includes in resident graphs.
    fn fetch_options(&self) -> FetchOptions;
    /// Most recent event matching the query, if any.
    fn find_event(&self, query: &EventQuery) -> RepoResult<Option<EventRow>>;
    /// Every affectation of an event, ordered by property id.
    fn affected_properties(&self, event_id: RecordId) -> RepoResult<Vec<AffectedPropertyGraph>>;
    /// Event notifications, newest first.
    fn event_notifications(&self, event_id: RecordId) -> RepoResult<Vec<NotificationRow>>;
    /// Properties whose grid code contains `term`, ordered by id.
    fn properties_by_grid_code(&self, term: &str) -> RepoResult<Vec<PropertyGraph>>;
    /// Properties whose municipality name contains `term`, ordered by id.
    fn properties_by_municipality(&self, term: &str) -> RepoResult<Vec<PropertyGraph>>;
    /// Most recently reported damage of a property across all events.
    fn latest_damage(&self, property_id: RecordId) -> RepoResult<Option<DamageRecord>>;
    /// Residents matching the scalar predicates, with their property.
    fn find_residents(&self, query: &ResidentQuery) -> RepoResult<Vec<ResidentHit>>;
}

impl<S: SearchStore + ?Sized> SearchStore for &S {
    fn fetch_options(&self) -> FetchOptions {
        (**self).fetch_options()
    }

    fn find_event(&self, query: &EventQuery) -> RepoResult<Option<EventRow>> {
        (**self).find_event(query)
    }

    fn affected_properties(&self, event_id: RecordId) -> RepoResult<Vec<AffectedPropertyGraph>> {
        (**self).affected_properties(event_id)
    }

    fn event_notifications(&self, event_id: RecordId) -> RepoResult<Vec<NotificationRow>> {
        (**self).event_notifications(event_id)
    }

    fn properties_by_grid_code(&self, term: &str) -> RepoResult<Vec<PropertyGraph>> {
        (**self).properties_by_grid_code(term)
    }

    fn properties_by_municipality(&self, term: &str) -> RepoResult<Vec<PropertyGraph>> {
        (**self).properties_by_municipality(term)
    }

    fn latest_damage(&self, property_id: RecordId) -> RepoResult<Option<DamageRecord>> {
        (**self).latest_damage(property_id)
    }

    fn find_residents(&self, query: &ResidentQuery) -> RepoResult<Vec<ResidentHit>> {
        (**self).find_residents(query)
    }
}

/// SQLite-backed search store over one borrowed connection.
pub struct SqliteSearchStore<'conn> {
    conn: &'conn Connection,
    options: FetchOptions,
}

impl<'conn> SqliteSearchStore<'conn> {
    /// Verifies required tables and resolves [`FetchOptions`] once.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }

        let options = FetchOptions::detect(conn)?;
        info!(
            "event=store_init module=repo status=ok conditions={} limitations={} dispositions={} sex_column={}",
            options.include_conditions,
            options.include_limitations,
            options.include_dispositions,
            options.resident_sex_column.unwrap_or("none")
        );

        Ok(Self { conn, options })
    }

    fn resident_select_sql(&self) -> String {
        let sex = match self.options.resident_sex_column {
            Some(column) => format!("r.{column}"),
            None => "NULL".to_string(),
        };
        format!(
            "SELECT
                r.id AS id,
                r.name AS name,
                r.lastname1 AS lastname1,
                r.lastname2 AS lastname2,
                r.age AS age,
                {sex} AS sex,
                r.category AS category,
                r.contact AS contact,
                r.property_id AS property_id,
                r.family_id AS family_id,
                f.id AS family_row_id,
                f.surnames AS family_surnames,
                f.description AS family_description
             FROM residents r
             LEFT JOIN families f ON f.id = r.family_id"
        )
    }

    fn load_properties(&self, ids: &[RecordId]) -> RepoResult<Vec<PropertyRow>> {
        query_by_ids(
            self.conn,
            ids,
            |list| format!("{PROPERTY_SELECT_SQL} WHERE p.id IN ({list}) ORDER BY p.id ASC"),
            parse_property_row,
        )
    }

    fn load_property_graphs(&self, ids: &[RecordId]) -> RepoResult<Vec<PropertyGraph>> {
        let properties = self.load_properties(ids)?;
        let select = self.resident_select_sql();
        let rows = query_by_ids(
            self.conn,
            ids,
            |list| {
                format!("{select} WHERE r.property_id IN ({list}) ORDER BY r.property_id ASC, r.id ASC")
            },
            parse_resident_row,
        )?;

        let mut by_property: HashMap<RecordId, Vec<ResidentGraph>> = HashMap::new();
        for graph in self.attach_profiles(rows)? {
            by_property
                .entry(graph.resident.property_id)
                .or_default()
                .push(graph);
        }

        Ok(properties
            .into_iter()
            .map(|property| PropertyGraph {
                residents: by_property.remove(&property.id).unwrap_or_default(),
                property,
            })
            .collect())
    }

    fn attach_profiles(
        &self,
        rows: Vec<(ResidentRow, Option<FamilyRow>)>,
    ) -> RepoResult<Vec<ResidentGraph>> {
        let ids: Vec<RecordId> = rows.iter().map(|(resident, _)| resident.id).collect();
        let mut profiles: HashMap<(ProfileKind, RecordId), ProfileLink> = HashMap::new();
        for kind in ProfileKind::ALL {
            if !self.options.includes(kind) {
                continue;
            }
            for (resident_id, link) in self.load_first_profiles(kind, &ids)? {
                profiles.insert((kind, resident_id), link);
            }
        }

        Ok(rows
            .into_iter()
            .map(|(resident, family)| {
                let id = resident.id;
                ResidentGraph {
                    condition: profiles.remove(&(ProfileKind::Condition, id)),
                    limitation: profiles.remove(&(ProfileKind::Limitation, id)),
                    disposition: profiles.remove(&(ProfileKind::Disposition, id)),
                    family,
                    resident,
                }
            })
            .collect())
    }

    fn load_first_profiles(
        &self,
        kind: ProfileKind,
        resident_ids: &[RecordId],
    ) -> RepoResult<HashMap<RecordId, ProfileLink>> {
        let link_table = kind.link_table();
        let lookup_table = kind.lookup_table();
        let lookup_column = kind.lookup_column();
        let rows = query_by_ids(
            self.conn,
            resident_ids,
            |list| {
                format!(
                    "SELECT
                        l.resident_id AS resident_id,
                        t.name AS name,
                        t.description AS description,
                        l.observation AS observation
                     FROM {link_table} l
                     INNER JOIN {lookup_table} t ON t.id = l.{lookup_column}
                     WHERE l.resident_id IN ({list})
                     ORDER BY l.resident_id ASC, l.created_at DESC, l.id DESC"
                )
            },
            |row| {
                Ok((
                    row.get::<_, RecordId>("resident_id")?,
                    ProfileLink {
                        name: row.get("name")?,
                        description: row.get("description")?,
                        observation: row.get("observation")?,
                    },
                ))
            },
        )?;

        let mut first = HashMap::new();
        for (resident_id, link) in rows {
            first.entry(resident_id).or_insert(link);
        }
        Ok(first)
    }

    /// Ids of reference rows whose label satisfies `matches`.
    fn matching_ids(
        &self,
        sql: &str,
        matches: impl Fn(&str) -> bool,
    ) -> RepoResult<Vec<RecordId>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let label: String = row.get(1)?;
            if matches(&label) {
                ids.push(row.get::<_, RecordId>(0)?);
            }
        }
        Ok(ids)
    }

    fn property_ids_where(&self, column: &str, ref_ids: &[RecordId]) -> RepoResult<Vec<RecordId>> {
        query_by_ids(
            self.conn,
            ref_ids,
            |list| format!("SELECT id FROM properties WHERE {column} IN ({list}) ORDER BY id ASC"),
            |row| Ok(row.get::<_, RecordId>(0)?),
        )
        .map(sorted_unique)
    }
}

impl SearchStore for SqliteSearchStore<'_> {
    fn fetch_options(&self) -> FetchOptions {
        self.options
    }

    fn find_event(&self, query: &EventQuery) -> RepoResult<Option<EventRow>> {
        let range = query.date_range.unwrap_or_default();
        let mut stmt = self.conn.prepare(
            "SELECT
                e.id AS id,
                e.title AS title,
                e.description AS description,
                e.date AS date,
                e.type AS kind,
                e.status AS status,
                g.code AS grid_code
             FROM events e
             LEFT JOIN grid_cells g ON g.id = e.grid_cell_id
             WHERE (?1 IS NULL OR e.date >= ?1)
               AND (?2 IS NULL OR e.date <= ?2)
             ORDER BY e.date DESC, e.id ASC;",
        )?;
        let mut rows = stmt.query(params![range.start, range.end])?;

        while let Some(row) = rows.next()? {
            let event = parse_event_row(row)?;
            if !contains_ci(&event.title, &query.title) {
                continue;
            }
            if let Some(incident_type) = query.incident_type.as_deref() {
                let type_matches = event
                    .kind
                    .as_deref()
                    .is_some_and(|kind| eq_ci(kind, incident_type));
                if !type_matches {
                    continue;
                }
            }
            return Ok(Some(event));
        }

        Ok(None)
    }

    fn affected_properties(&self, event_id: RecordId) -> RepoResult<Vec<AffectedPropertyGraph>> {
        let mut stmt = self.conn.prepare(
            "SELECT property_id, damage, reported_at
             FROM affected_properties
             WHERE event_id = ?1
             ORDER BY property_id ASC;",
        )?;
        let mut rows = stmt.query([event_id])?;
        let mut damages = Vec::new();
        while let Some(row) = rows.next()? {
            damages.push((
                row.get::<_, RecordId>("property_id")?,
                DamageRecord {
                    damage: row.get("damage")?,
                    reported_at: row.get("reported_at")?,
                },
            ));
        }

        let ids: Vec<RecordId> = damages.iter().map(|(id, _)| *id).collect();
        let mut graphs: HashMap<RecordId, PropertyGraph> = self
            .load_property_graphs(&ids)?
            .into_iter()
            .map(|graph| (graph.property.id, graph))
            .collect();

        damages
            .into_iter()
            .map(|(property_id, damage)| {
                let graph = graphs.remove(&property_id).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "affected property {property_id} of event {event_id} has no property row"
                    ))
                })?;
                Ok(AffectedPropertyGraph {
                    event_id,
                    damage,
                    graph,
                })
            })
            .collect()
    }

    fn event_notifications(&self, event_id: RecordId) -> RepoResult<Vec<NotificationRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                event_id,
                property_id,
                type AS kind,
                message,
                created_at,
                status,
                notification_number
             FROM notifications
             WHERE event_id = ?1
             ORDER BY created_at DESC, id DESC;",
        )?;
        let mut rows = stmt.query([event_id])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(NotificationRow {
                id: row.get("id")?,
                event_id: row.get("event_id")?,
                property_id: row.get("property_id")?,
                kind: row.get("kind")?,
                message: row.get("message")?,
                created_at: row.get("created_at")?,
                status: row.get("status")?,
                notification_number: row.get("notification_number")?,
            });
        }
        Ok(notifications)
    }

    fn properties_by_grid_code(&self, term: &str) -> RepoResult<Vec<PropertyGraph>> {
        let cell_ids = self.matching_ids("SELECT id, code FROM grid_cells ORDER BY id ASC;", |code| {
            grid_code_contains(code, term)
        })?;
        let property_ids = self.property_ids_where("grid_cell_id", &cell_ids)?;
        self.load_property_graphs(&property_ids)
    }

    fn properties_by_municipality(&self, term: &str) -> RepoResult<Vec<PropertyGraph>> {
        let municipality_ids = self.matching_ids(
            "SELECT id, name FROM municipalities ORDER BY id ASC;",
            |name| contains_ci(name, term),
        )?;
        let property_ids = self.property_ids_where("municipality_id", &municipality_ids)?;
        self.load_property_graphs(&property_ids)
    }

    fn latest_damage(&self, property_id: RecordId) -> RepoResult<Option<DamageRecord>> {
        let damage = self
            .conn
            .query_row(
                "SELECT damage, reported_at
                 FROM affected_properties
                 WHERE property_id = ?1
                 ORDER BY reported_at DESC, event_id DESC
                 LIMIT 1;",
                [property_id],
                |row| {
                    Ok(DamageRecord {
                        damage: row.get(0)?,
                        reported_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(damage)
    }

    fn find_residents(&self, query: &ResidentQuery) -> RepoResult<Vec<ResidentHit>> {
        let range = query.age_range.unwrap_or_default();
        let sql = format!(
            "{} WHERE (?1 IS NULL OR r.age >= ?1)
               AND (?2 IS NULL OR r.age <= ?2)
             ORDER BY r.lastname1 ASC, r.lastname2 ASC, r.name ASC, r.id ASC;",
            self.resident_select_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![range.min, range.max])?;
        let mut matched = Vec::new();
        while let Some(row) = rows.next()? {
            let (resident, family) = parse_resident_row(row)?;
            if resident_matches(query, &resident, family.as_ref()) {
                matched.push((resident, family));
            }
        }

        let property_ids = sorted_unique(
            matched
                .iter()
                .map(|(resident, _)| resident.property_id)
                .collect(),
        );
        let properties: HashMap<RecordId, PropertyRow> = self
            .load_properties(&property_ids)?
            .into_iter()
            .map(|property| (property.id, property))
            .collect();

        self.attach_profiles(matched)?
            .into_iter()
            .map(|graph| {
                let property_id = graph.resident.property_id;
                let property = properties.get(&property_id).cloned().ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "resident {} points at missing property {property_id}",
                        graph.resident.id
                    ))
                })?;
                Ok(ResidentHit { graph, property })
            })
            .collect()
    }
}

fn resident_matches(query: &ResidentQuery, resident: &ResidentRow, family: Option<&FamilyRow>) -> bool {
    let name_matches = |needle: &str| {
        contains_ci(&resident.name, needle)
            || resident
                .lastname1
                .as_deref()
                .is_some_and(|value| contains_ci(value, needle))
            || resident
                .lastname2
                .as_deref()
                .is_some_and(|value| contains_ci(value, needle))
    };

    if let Some(name) = query.name.as_deref() {
        if !name_matches(name) {
            return false;
        }
    }
    if let Some(name) = query.extra_name.as_deref() {
        if !name_matches(name) {
            return false;
        }
    }
    if let Some(category) = query.category.as_deref() {
        let category_matches = resident
            .category
            .as_deref()
            .is_some_and(|value| eq_ci(value, category));
        if !category_matches {
            return false;
        }
    }
    if let Some(family_name) = query.family_name.as_deref() {
        let family_matches = family.is_some_and(|family| contains_ci(&family.surnames, family_name));
        if !family_matches {
            return false;
        }
    }
    true
}

/// Runs `build_sql(placeholders)` for each chunk of `ids` and collects parsed rows.
///
/// Callers order by the id column first so chunk order preserves global order.
fn query_by_ids<T>(
    conn: &Connection,
    ids: &[RecordId],
    build_sql: impl Fn(&str) -> String,
    mut parse: impl FnMut(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut items = Vec::new();
    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        let sql = build_sql(&placeholders(chunk.len()));
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
    }
    Ok(items)
}

fn sorted_unique(ids: Vec<RecordId>) -> Vec<RecordId> {
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<EventRow> {
    Ok(EventRow {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        date: row.get("date")?,
        kind: row.get("kind")?,
        status: row.get("status")?,
        grid_code: row.get("grid_code")?,
    })
}

fn parse_property_row(row: &Row<'_>) -> RepoResult<PropertyRow> {
    Ok(PropertyRow {
        id: row.get("id")?,
        property_type_id: row.get("property_type_id")?,
        property_type_name: row.get("property_type_name")?,
        municipality_id: row.get("municipality_id")?,
        municipality_name: row.get("municipality_name")?,
        neighborhood_id: row.get("neighborhood_id")?,
        neighborhood_name: row.get("neighborhood_name")?,
        sector_id: row.get("sector_id")?,
        sector_name: row.get("sector_name")?,
        grid_code: row.get("grid_code")?,
        address: row.get("address")?,
    })
}

fn parse_resident_row(row: &Row<'_>) -> RepoResult<(ResidentRow, Option<FamilyRow>)> {
    let resident = ResidentRow {
        id: row.get("id")?,
        name: row.get("name")?,
        lastname1: row.get("lastname1")?,
        lastname2: row.get("lastname2")?,
        age: row.get("age")?,
        sex: row.get("sex")?,
        category: row.get("category")?,
        contact: row.get("contact")?,
        property_id: row.get("property_id")?,
        family_id: row.get("family_id")?,
    };

    let family = match row.get::<_, Option<RecordId>>("family_row_id")? {
        Some(id) => Some(FamilyRow {
            id,
            surnames: row.get("family_surnames")?,
            description: row.get("family_description")?,
        }),
        None => None,
    };

    Ok((resident, family))
}
