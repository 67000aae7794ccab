#![allow(dead_code)]

use rusqlite::{params, Connection};
use sisri_core::{
    open_db_in_memory, SearchFilters, SearchRequest, SearchResponse, SearchResult, SearchService,
    SqliteSearchStore,
};

pub const MARIA_DATE: i64 = 1_505_865_600_000;
pub const QUAKE_DATE: i64 = 1_578_355_200_000;
pub const FIONA_DATE: i64 = 1_663_459_200_000;

#[derive(Debug, Default)]
pub struct PropertySeed<'a> {
    pub property_type_id: Option<i64>,
    pub municipality_id: Option<i64>,
    pub neighborhood_id: Option<i64>,
    pub sector_id: Option<i64>,
    pub grid_cell_id: Option<i64>,
    pub address: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct ResidentSeed<'a> {
    pub property_id: i64,
    pub family_id: Option<i64>,
    pub name: &'a str,
    pub lastname1: Option<&'a str>,
    pub lastname2: Option<&'a str>,
    pub age: Option<i64>,
    pub category: Option<&'a str>,
}

pub fn insert_named(conn: &Connection, table: &str, name: &str) -> i64 {
    conn.execute(&format!("INSERT INTO {table} (name) VALUES (?1);"), [name])
        .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_neighborhood(conn: &Connection, municipality_id: i64, name: &str) -> i64 {
    conn.execute(
        "INSERT INTO neighborhoods (municipality_id, name) VALUES (?1, ?2);",
        params![municipality_id, name],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_sector(conn: &Connection, neighborhood_id: i64, name: &str) -> i64 {
    conn.execute(
        "INSERT INTO sectors (neighborhood_id, name) VALUES (?1, ?2);",
        params![neighborhood_id, name],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_grid_cell(conn: &Connection, code: &str) -> i64 {
    conn.execute("INSERT INTO grid_cells (code) VALUES (?1);", [code])
        .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_family(conn: &Connection, surnames: &str) -> i64 {
    conn.execute("INSERT INTO families (surnames) VALUES (?1);", [surnames])
        .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_property(conn: &Connection, seed: PropertySeed<'_>) -> i64 {
    conn.execute(
        "INSERT INTO properties (
            property_type_id, municipality_id, neighborhood_id, sector_id, grid_cell_id, address
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            seed.property_type_id,
            seed.municipality_id,
            seed.neighborhood_id,
            seed.sector_id,
            seed.grid_cell_id,
            seed.address
        ],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_resident(conn: &Connection, seed: ResidentSeed<'_>) -> i64 {
    conn.execute(
        "INSERT INTO residents (
            property_id, family_id, name, lastname1, lastname2, age, category
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            seed.property_id,
            seed.family_id,
            seed.name,
            seed.lastname1,
            seed.lastname2,
            seed.age,
            seed.category
        ],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_event(
    conn: &Connection,
    title: &str,
    date: i64,
    kind: &str,
    grid_cell_id: Option<i64>,
) -> i64 {
    conn.execute(
        "INSERT INTO events (title, description, date, type, status, grid_cell_id)
         VALUES (?1, NULL, ?2, ?3, 'cerrado', ?4);",
        params![title, date, kind, grid_cell_id],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn affect(conn: &Connection, event_id: i64, property_id: i64, damage: &str, reported_at: i64) {
    conn.execute(
        "INSERT INTO affected_properties (event_id, property_id, damage, reported_at)
         VALUES (?1, ?2, ?3, ?4);",
        params![event_id, property_id, damage, reported_at],
    )
    .unwrap();
}

pub fn insert_notification(
    conn: &Connection,
    event_id: i64,
    property_id: Option<i64>,
    message: &str,
    created_at: i64,
) -> i64 {
    conn.execute(
        "INSERT INTO notifications (event_id, property_id, type, message, created_at, status)
         VALUES (?1, ?2, 'alerta', ?3, ?4, 'enviada');",
        params![event_id, property_id, message, created_at],
    )
    .unwrap();
    conn.last_insert_rowid()
}

/// `table` is one of `resident_conditions|resident_limitations|resident_dispositions`.
pub fn link_profile(
    conn: &Connection,
    table: &str,
    column: &str,
    resident_id: i64,
    profile_id: i64,
    observation: Option<&str>,
    created_at: i64,
) {
    conn.execute(
        &format!(
            "INSERT INTO {table} (resident_id, {column}, observation, created_at)
             VALUES (?1, ?2, ?3, ?4);"
        ),
        params![resident_id, profile_id, observation, created_at],
    )
    .unwrap();
}

/// Ids of the shared hurricane dataset.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub san_juan: i64,
    pub ponce: i64,
    pub bayamon: i64,
    pub santurce: i64,
    pub cell_8942: i64,
    pub cell_8943: i64,
    pub cell_ha: i64,
    pub rivera_family: i64,
    pub house: i64,
    pub shop: i64,
    pub ponce_house: i64,
    pub clinic: i64,
    pub ana: i64,
    pub luis: i64,
    pub marta: i64,
    pub jose: i64,
    pub carmen: i64,
    pub maria: i64,
    pub fiona: i64,
    pub quake: i64,
    pub notice_house: i64,
    pub notice_all: i64,
    pub notice_shop: i64,
}

/// Opens an in-memory store seeded with [`Scenario`] data.
///
/// Layout:
/// - `house` (Residencial, San Juan/Santurce, 19Q GA 8942): Ana 72 elder
///   (Encamado, Diabética), Luis 10 child.
/// - `shop` (Comercial, San Juan, 19Q GA 8943): Marta 35 adult (Asma).
/// - `ponce_house` (Residencial, Ponce, 19Q HA 1000): José 40 adult (Albergue).
/// - `clinic` (Salud, Bayamón, no grid, no address): Carmen, age unknown, elder.
/// - María affects house, shop, ponce_house; Fiona affects house; the quake
///   affects ponce_house.
pub fn seeded() -> (Connection, Scenario) {
    let conn = open_db_in_memory().unwrap();

    let residential = insert_named(&conn, "property_types", "Residencial");
    let commercial = insert_named(&conn, "property_types", "Comercial");
    let health = insert_named(&conn, "property_types", "Salud");

    let san_juan = insert_named(&conn, "municipalities", "San Juan");
    let ponce = insert_named(&conn, "municipalities", "Ponce");
    let bayamon = insert_named(&conn, "municipalities", "Bayamón");
    let santurce = insert_neighborhood(&conn, san_juan, "Santurce");
    let sector = insert_sector(&conn, santurce, "Parada 18");
    insert_neighborhood(&conn, san_juan, "Condado");

    let cell_8942 = insert_grid_cell(&conn, "19Q GA 8942");
    let cell_8943 = insert_grid_cell(&conn, "19Q GA 8943");
    let cell_ha = insert_grid_cell(&conn, "19Q HA 1000");

    let rivera_family = insert_family(&conn, "Rivera Soto");
    insert_family(&conn, "Cruz Ortiz");

    let house = insert_property(
        &conn,
        PropertySeed {
            property_type_id: Some(residential),
            municipality_id: Some(san_juan),
            neighborhood_id: Some(santurce),
            sector_id: Some(sector),
            grid_cell_id: Some(cell_8942),
            address: Some("Calle Loíza 100"),
        },
    );
    let shop = insert_property(
        &conn,
        PropertySeed {
            property_type_id: Some(commercial),
            municipality_id: Some(san_juan),
            grid_cell_id: Some(cell_8943),
            address: Some("Ave. Ponce de León 200"),
            ..PropertySeed::default()
        },
    );
    let ponce_house = insert_property(
        &conn,
        PropertySeed {
            property_type_id: Some(residential),
            municipality_id: Some(ponce),
            grid_cell_id: Some(cell_ha),
            address: Some("Calle Comercio 3"),
            ..PropertySeed::default()
        },
    );
    let clinic = insert_property(
        &conn,
        PropertySeed {
            property_type_id: Some(health),
            municipality_id: Some(bayamon),
            ..PropertySeed::default()
        },
    );

    let ana = insert_resident(
        &conn,
        ResidentSeed {
            property_id: house,
            family_id: Some(rivera_family),
            name: "Ana",
            lastname1: Some("Rivera"),
            lastname2: Some("Soto"),
            age: Some(72),
            category: Some("elder"),
        },
    );
    let luis = insert_resident(
        &conn,
        ResidentSeed {
            property_id: house,
            family_id: Some(rivera_family),
            name: "Luis",
            lastname1: Some("Rivera"),
            lastname2: Some("Soto"),
            age: Some(10),
            category: Some("child"),
        },
    );
    let marta = insert_resident(
        &conn,
        ResidentSeed {
            property_id: shop,
            name: "Marta",
            lastname1: Some("Cruz"),
            age: Some(35),
            category: Some("adult"),
            ..ResidentSeed::default()
        },
    );
    let jose = insert_resident(
        &conn,
        ResidentSeed {
            property_id: ponce_house,
            name: "José",
            lastname1: Some("Cruz"),
            lastname2: Some("Ortiz"),
            age: Some(40),
            category: Some("adult"),
            ..ResidentSeed::default()
        },
    );
    let carmen = insert_resident(
        &conn,
        ResidentSeed {
            property_id: clinic,
            name: "Carmen",
            lastname1: Some("Díaz"),
            category: Some("elder"),
            ..ResidentSeed::default()
        },
    );

    let bedridden = insert_named(&conn, "conditions", "Encamado");
    let diabetic = insert_named(&conn, "limitations", "Diabética");
    let asthma = insert_named(&conn, "limitations", "Asma");
    let shelter = insert_named(&conn, "dispositions", "Albergue");
    link_profile(
        &conn,
        "resident_conditions",
        "condition_id",
        ana,
        bedridden,
        Some("requiere cama de posición"),
        1_000,
    );
    link_profile(&conn, "resident_limitations", "limitation_id", ana, diabetic, None, 1_000);
    link_profile(&conn, "resident_limitations", "limitation_id", marta, asthma, None, 1_000);
    link_profile(&conn, "resident_dispositions", "disposition_id", jose, shelter, None, 1_000);

    let maria = insert_event(&conn, "Huracán María", MARIA_DATE, "huracán", Some(cell_8942));
    let quake = insert_event(&conn, "Terremoto Sur", QUAKE_DATE, "terremoto", Some(cell_ha));
    let fiona = insert_event(&conn, "Huracán Fiona", FIONA_DATE, "huracán", None);

    affect(&conn, maria, house, "Techo destruido", MARIA_DATE + 34_400_000);
    affect(&conn, maria, shop, "Inundación", MARIA_DATE + 34_500_000);
    affect(&conn, maria, ponce_house, "Ventanas rotas", MARIA_DATE + 34_600_000);
    affect(&conn, fiona, house, "Filtraciones", FIONA_DATE + 40_000_000);
    affect(&conn, quake, ponce_house, "Grietas en columnas", QUAKE_DATE + 44_800_000);

    let notice_house = insert_notification(&conn, maria, Some(house), "Evacuar zona", MARIA_DATE + 1_000);
    let notice_all = insert_notification(&conn, maria, None, "Refugios abiertos", MARIA_DATE + 2_000);
    let notice_shop = insert_notification(&conn, maria, Some(shop), "Inspección programada", MARIA_DATE + 3_000);
    insert_notification(&conn, fiona, Some(house), "Aviso Fiona", FIONA_DATE + 1_000);

    (
        conn,
        Scenario {
            san_juan,
            ponce,
            bayamon,
            santurce,
            cell_8942,
            cell_8943,
            cell_ha,
            rivera_family,
            house,
            shop,
            ponce_house,
            clinic,
            ana,
            luis,
            marta,
            jose,
            carmen,
            maria,
            fiona,
            quake,
            notice_house,
            notice_all,
            notice_shop,
        },
    )
}

/// Runs one request through a fresh service over `conn`.
pub fn search(conn: &Connection, request: &SearchRequest) -> SearchResult<SearchResponse> {
    let store = SqliteSearchStore::try_new(conn).unwrap();
    SearchService::new(store).search(request)
}

pub fn search_with(
    conn: &Connection,
    mode: &str,
    query: &str,
    filters: SearchFilters,
) -> SearchResponse {
    search(conn, &SearchRequest::new(mode, query).with_filters(filters)).unwrap()
}
