mod support;

use sisri_core::search::response::ResidentSearchResponse;
use sisri_core::{AgeRange, SearchFilters, SearchRequest, SearchResponse, NOT_AVAILABLE};
use support::{search, search_with, seeded};

fn resident_search(
    conn: &rusqlite::Connection,
    query: &str,
    filters: SearchFilters,
) -> ResidentSearchResponse {
    match search_with(conn, "residente", query, filters) {
        SearchResponse::Resident(body) => body,
        other => panic!("unexpected response mode: {:?}", other.mode()),
    }
}

fn resident_ids(body: &ResidentSearchResponse) -> Vec<i64> {
    body.residents.iter().map(|resident| resident.id).collect()
}

#[test]
fn empty_query_with_all_category_returns_every_resident_in_surname_order() {
    let (conn, s) = seeded();
    let filters = SearchFilters {
        resident_category: Some("all".to_string()),
        ..SearchFilters::default()
    };
    let body = resident_search(&conn, "", filters);

    assert_eq!(body.query, "");
    assert_eq!(
        resident_ids(&body),
        vec![s.marta, s.jose, s.carmen, s.ana, s.luis]
    );
}

#[test]
fn empty_query_without_filters_is_not_an_error() {
    let (conn, _) = seeded();
    let response = search(&conn, &SearchRequest::new("residente", "   ")).unwrap();
    assert_eq!(response.result_count(), 5);
}

#[test]
fn query_matches_given_name_or_either_surname() {
    let (conn, s) = seeded();
    assert_eq!(
        resident_ids(&resident_search(&conn, "RIVERA", SearchFilters::default())),
        vec![s.ana, s.luis]
    );
    assert_eq!(
        resident_ids(&resident_search(&conn, "ortiz", SearchFilters::default())),
        vec![s.jose]
    );
    assert_eq!(
        resident_ids(&resident_search(&conn, "josé", SearchFilters::default())),
        vec![s.jose]
    );
}

#[test]
fn resident_name_and_family_filters_combine_with_query() {
    let (conn, s) = seeded();
    let filters = SearchFilters {
        resident_name: Some("luis".to_string()),
        family_name: Some("rivera".to_string()),
        ..SearchFilters::default()
    };
    assert_eq!(resident_ids(&resident_search(&conn, "soto", filters)), vec![s.luis]);

    let no_family = SearchFilters {
        family_name: Some("cruz".to_string()),
        ..SearchFilters::default()
    };
    assert!(resident_search(&conn, "", no_family).residents.is_empty());
}

#[test]
fn category_match_is_exact_and_case_insensitive() {
    let (conn, s) = seeded();
    let elder = SearchFilters {
        resident_category: Some("ELDER".to_string()),
        ..SearchFilters::default()
    };
    assert_eq!(
        resident_ids(&resident_search(&conn, "", elder)),
        vec![s.carmen, s.ana]
    );

    let partial = SearchFilters {
        resident_category: Some("eld".to_string()),
        ..SearchFilters::default()
    };
    assert!(resident_search(&conn, "", partial).residents.is_empty());
}

#[test]
fn profile_filters_match_first_found_labels() {
    let (conn, s) = seeded();
    let cases = [
        (
            SearchFilters {
                resident_limitation: Some("Diabetes".to_string()),
                ..SearchFilters::default()
            },
            vec![s.ana],
        ),
        (
            SearchFilters {
                resident_limitation: Some("asma".to_string()),
                ..SearchFilters::default()
            },
            vec![s.marta],
        ),
        (
            SearchFilters {
                resident_condition: Some("encam".to_string()),
                ..SearchFilters::default()
            },
            vec![s.ana],
        ),
        (
            SearchFilters {
                resident_disposition: Some("ALBER".to_string()),
                ..SearchFilters::default()
            },
            vec![s.jose],
        ),
    ];

    for (filters, expected) in cases {
        assert_eq!(resident_ids(&resident_search(&conn, "", filters)), expected);
    }
}

#[test]
fn age_range_is_inclusive_and_excludes_unknown_ages() {
    let (conn, s) = seeded();
    let filters = SearchFilters {
        age_range: Some(AgeRange {
            min: Some(35),
            max: Some(72),
        }),
        ..SearchFilters::default()
    };
    assert_eq!(
        resident_ids(&resident_search(&conn, "", filters)),
        vec![s.marta, s.jose, s.ana]
    );
}

#[test]
fn resident_records_carry_property_info_family_and_labels() {
    let (conn, s) = seeded();
    let body = resident_search(&conn, "", SearchFilters::default());

    let ana = body.residents.iter().find(|r| r.id == s.ana).unwrap();
    assert_eq!(ana.property_id, s.house);
    assert_eq!(ana.property_info.id, s.house);
    assert_eq!(ana.property_info.municipality, "San Juan");
    assert_eq!(ana.property_info.neighborhood, "Santurce");
    assert_eq!(ana.property_info.usng, "19Q GA 8942");
    assert_eq!(ana.property_info.property_type_name, "Residencial");
    assert_eq!(ana.family.as_ref().unwrap().id, s.rivera_family);
    assert_eq!(ana.condition.name, "Encamado");
    assert_eq!(
        ana.condition.observation.as_deref(),
        Some("requiere cama de posición")
    );
    assert_eq!(ana.disposition.name, NOT_AVAILABLE);

    let carmen = body.residents.iter().find(|r| r.id == s.carmen).unwrap();
    assert_eq!(carmen.age, None);
    assert_eq!(carmen.property_info.usng, NOT_AVAILABLE);
    assert_eq!(carmen.property_info.address, NOT_AVAILABLE);
    assert!(carmen.family.is_none());
}

#[test]
fn no_match_returns_empty_array() {
    let (conn, _) = seeded();
    let response = search_with(&conn, "residente", "zzz", SearchFilters::default());

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["searchType"], "residente");
    assert_eq!(json["residentQuery"], "zzz");
    assert_eq!(json["residentes"], serde_json::json!([]));
}

#[test]
fn most_recent_profile_association_is_first_found() {
    let (conn, s) = seeded();
    let newer = support::insert_named(&conn, "conditions", "Oxígeno");
    support::link_profile(
        &conn,
        "resident_conditions",
        "condition_id",
        s.ana,
        newer,
        None,
        5_000,
    );

    let body = resident_search(&conn, "ana", SearchFilters::default());
    assert_eq!(body.residents[0].condition.name, "Oxígeno");

    let old_label = SearchFilters {
        resident_condition: Some("encamado".to_string()),
        ..SearchFilters::default()
    };
    assert!(resident_search(&conn, "", old_label).residents.is_empty());
}
