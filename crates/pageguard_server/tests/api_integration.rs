//! Integration tests for the pageguard HTTP API.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{setup_server_with, setup_test_server, EDITOR_REFERER};

#[tokio::test]
async fn requests_without_referer_are_denied_when_no_bypass_is_configured() {
    let (server, _temp) = setup_test_server();

    let response = server.get("/api/locks").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn health_is_reachable_without_referer() {
    let (server, _temp) = setup_test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.assert_text("ok");
}

#[tokio::test]
async fn allowed_referer_host_is_admitted_and_unknown_host_is_denied() {
    let (server, _temp) = setup_test_server();

    let allowed = server
        .get("/api/locks")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
    let locks: serde_json::Value = allowed.json();
    assert_eq!(locks, json!([]));

    let denied = server
        .get("/api/locks")
        .add_header("referer", "https://evil.example.net/editor/page/7")
        .await;
    assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

    let garbage = server
        .get("/api/locks")
        .add_header("referer", "not a url at all")
        .await;
    assert_eq!(garbage.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bypass_patterns_admit_referer_less_requests_on_matching_paths_only() {
    let (server, _temp) = setup_server_with(|config| {
        config.bypass_patterns = Some(vec!["api/locks".to_string()]);
    });

    let listed = server.get("/api/locks").await;
    assert_eq!(listed.status_code(), StatusCode::OK);

    // `api/locks` is two segments; the per-page route has four.
    let page = server.get("/api/locks/page/1").await;
    assert_eq!(page.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wildcard_bypass_pattern_matches_one_segment() {
    let (server, _temp) = setup_server_with(|config| {
        config.bypass_patterns = Some(vec!["api/locks/*/*".to_string()]);
    });

    let page = server.get("/api/locks/page/1").await;
    assert_eq!(page.status_code(), StatusCode::NOT_FOUND);

    // Trailing wildcards also admit the shorter prefix path.
    let listed = server.get("/api/locks").await;
    assert_eq!(listed.status_code(), StatusCode::OK);

    let hashed = server
        .post("/api/credentials/hash")
        .json(&json!({ "password": "pw" }))
        .await;
    assert_eq!(hashed.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn page_lock_lifecycle_over_http() {
    let (server, _temp) = setup_test_server();

    let missing = server
        .get("/api/locks/page/7")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let acquired = server
        .post("/api/locks/page/7")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "actor_id": "alice" }))
        .await;
    assert_eq!(acquired.status_code(), StatusCode::OK);
    let body: serde_json::Value = acquired.json();
    assert_eq!(body["status"], "acquired");
    assert_eq!(body["lock"]["locked_by"], "alice");
    assert_eq!(body["lock"]["resource"], "page");
    assert_eq!(body["lock"]["resource_id"], 7);

    let denied = server
        .post("/api/locks/page/7")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "actor_id": "bob" }))
        .await;
    assert_eq!(denied.status_code(), StatusCode::LOCKED);
    let body: serde_json::Value = denied.json();
    assert_eq!(body["status"], "denied");
    assert_eq!(body["lock"]["locked_by"], "alice");

    let other_page = server
        .post("/api/locks/page/8")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "actor_id": "bob" }))
        .await;
    assert_eq!(other_page.status_code(), StatusCode::OK);

    let fetched = server
        .get("/api/locks/page/7")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    let record: serde_json::Value = fetched.json();
    assert_eq!(record["locked_by"], "alice");

    let listed = server
        .get("/api/locks")
        .add_header("referer", EDITOR_REFERER)
        .await;
    let locks: Vec<serde_json::Value> = listed.json();
    assert_eq!(locks.len(), 2);

    let refused = server
        .delete("/api/locks/page/7?actor_id=bob")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(refused.status_code(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = refused.json();
    assert_eq!(body["status"], "held_by_other");
    assert_eq!(body["lock"]["locked_by"], "alice");

    let released = server
        .delete("/api/locks/page/7?actor_id=alice")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(released.status_code(), StatusCode::OK);
    let body: serde_json::Value = released.json();
    assert_eq!(body["status"], "released");

    let reacquired = server
        .post("/api/locks/page/7")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "actor_id": "bob" }))
        .await;
    assert_eq!(reacquired.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn force_release_ignores_holder() {
    let (server, _temp) = setup_test_server();

    server
        .post("/api/locks/page/3")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "actor_id": "alice" }))
        .await;

    let forced = server
        .delete("/api/locks/page/3?force=true")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(forced.status_code(), StatusCode::OK);
    let body: serde_json::Value = forced.json();
    assert_eq!(body["status"], "released");

    let again = server
        .delete("/api/locks/page/3?force=true")
        .add_header("referer", EDITOR_REFERER)
        .await;
    let body: serde_json::Value = again.json();
    assert_eq!(body["status"], "not_locked");
}

#[tokio::test]
async fn lock_requests_validate_identifiers() {
    let (server, _temp) = setup_test_server();

    let blank_actor = server
        .post("/api/locks/page/1")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "actor_id": "   " }))
        .await;
    assert_eq!(blank_actor.status_code(), StatusCode::BAD_REQUEST);

    let missing_actor = server
        .delete("/api/locks/page/1")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(missing_actor.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing_actor.json();
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("actor_id"));

    let bad_id = server
        .get("/api/locks/page/not-a-number")
        .add_header("referer", EDITOR_REFERER)
        .await;
    assert_eq!(bad_id.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn credential_hash_and_verify_round_trip() {
    let (server, _temp) = setup_test_server();

    let hashed = server
        .post("/api/credentials/hash")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "password": "correct horse" }))
        .await;
    assert_eq!(hashed.status_code(), StatusCode::OK);
    let body: serde_json::Value = hashed.json();
    let salt = body["salt"].as_str().expect("salt").to_string();
    let hash = body["hash"].as_str().expect("hash").to_string();
    assert_eq!(salt.len(), 64);
    assert_eq!(hash.len(), 64);

    let verified = server
        .post("/api/credentials/verify")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "password": "correct horse", "salt": salt, "hash": hash }))
        .await;
    assert_eq!(verified.status_code(), StatusCode::OK);
    let body: serde_json::Value = verified.json();
    assert_eq!(body["valid"], true);

    let rejected = server
        .post("/api/credentials/verify")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "password": "wrong horse", "salt": salt, "hash": hash }))
        .await;
    let body: serde_json::Value = rejected.json();
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn referer_patterns_guard_credential_routes_only() {
    let (server, _temp) = setup_server_with(|config| {
        config.referer_patterns = Some(vec!["editor/*/*".to_string()]);
    });

    let admitted = server
        .post("/api/credentials/hash")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "password": "pw" }))
        .await;
    assert_eq!(admitted.status_code(), StatusCode::OK);

    let wrong_page = server
        .post("/api/credentials/hash")
        .add_header("referer", "https://app.example.com/settings")
        .json(&json!({ "password": "pw" }))
        .await;
    assert_eq!(wrong_page.status_code(), StatusCode::FORBIDDEN);

    let locks = server
        .get("/api/locks")
        .add_header("referer", "https://app.example.com/settings")
        .await;
    assert_eq!(locks.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let (server, _temp) = setup_test_server();

    let response = server.get("/health").await;
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
    response.assert_header("cache-control", "no-store");
}

#[tokio::test]
async fn locks_survive_server_restart_on_same_db() {
    let temp_dir = tempfile::TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test.db");

    {
        let server = support::test_server_for_config(support::test_config_for_db_path(&db_path));
        let acquired = server
            .post("/api/locks/page/9")
            .add_header("referer", EDITOR_REFERER)
            .json(&json!({ "actor_id": "alice" }))
            .await;
        assert_eq!(acquired.status_code(), StatusCode::OK);
    }

    let server = support::test_server_for_config(support::test_config_for_db_path(&db_path));
    let denied = server
        .post("/api/locks/page/9")
        .add_header("referer", EDITOR_REFERER)
        .json(&json!({ "actor_id": "bob" }))
        .await;
    assert_eq!(denied.status_code(), StatusCode::LOCKED);
}
