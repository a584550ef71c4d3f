//! Integration tests for the persisted grant context.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use idadmin_persisted_grant::domain::aggregates::PersistedGrant;
use idadmin_test_support::fixed_now;

async fn seed(app: &common::TestApp) {
    for (key, subject_id, client_id, minutes_ago) in [
        ("g1", "alice", "spa", 30),
        ("g2", "alice", "spa", 20),
        ("g3", "alice", "mobile", 10),
        ("g4", "bob", "spa", 0),
    ] {
        app.store
            .insert_grant(PersistedGrant {
                key: key.to_owned(),
                grant_type: "refresh_token".to_owned(),
                subject_id: subject_id.to_owned(),
                client_id: client_id.to_owned(),
                creation_time: fixed_now() - Duration::minutes(minutes_ago),
                expiration: None,
                data: "{}".to_owned(),
            })
            .await;
    }
}

#[tokio::test]
async fn test_search_filters_and_pages_newest_first() {
    let app = common::build_test_app();
    seed(&app).await;

    let (status, json) = common::get_json(
        &app,
        "/api/v1/persisted-grants?subject_id=alice&offset=0&limit=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert_eq!(json["limit"], 2);
    let keys: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["g3", "g2"]);
}

#[tokio::test]
async fn test_remove_grant_then_remove_again() {
    let app = common::build_test_app();
    seed(&app).await;

    let (status, _) = common::delete(&app, "/api/v1/persisted-grants/g4", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = common::delete(&app, "/api/v1/persisted-grants/g4", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(common::subjects(&json), vec!["Persisted Grant"]);

    let (status, _) = common::get_json(&app, "/api/v1/persisted-grants/g4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
