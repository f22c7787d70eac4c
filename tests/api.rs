use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use vigilo::api::{build_router, AppState};
use vigilo::catalog::mock::MockCatalogClient;
use vigilo::config::AppConfig;
use vigilo::db::Database;
use vigilo::feed::mock::MockFeedClient;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        vt_api_key: String::new(),
        vt_files_fallback_limit: 40,
        vt_scan_min_interval_minutes: 60,
        new_alert_min_sightings: 1,
        new_alert_min_distinct_days: 1,
        watchlist_techniques: Vec::new(),
        watchlist_min_sightings: 1,
        watchlist_min_distinct_days: 1,
        tactic_threshold_overrides: HashMap::new(),
    }
}

fn state_with(db: Database, feed: MockFeedClient, catalog: MockCatalogClient) -> AppState {
    AppState {
        db,
        feed: Arc::new(feed),
        catalog: Arc::new(catalog),
        config: Arc::new(test_config()),
    }
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("bad json: {e}, body={:?}", String::from_utf8_lossy(&bytes)))
}

async fn request(router: axum::Router, method: &str, uri: &str) -> axum::http::Response<Body> {
    let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
    router.oneshot(req).await.unwrap()
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn health_check_returns_ok(pool: PgPool) {
    let db = Database::from_pool(pool);
    let state = state_with(db, MockFeedClient::new(), MockCatalogClient::new(Vec::new()));
    let router = build_router(state);

    let response = request(router, "GET", "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn trigger_collection_runs_and_returns_summary(pool: PgPool) {
    let db = Database::from_pool(pool);
    sqlx::query(
        "INSERT INTO techniques (external_code, display_name, tactics) VALUES ('T1059', 'x', 'execution')",
    )
    .execute(db.pool())
    .await
    .unwrap();
    db.upsert_actor("actor-a", None, Some("CO"), "GTI").await.unwrap();

    let feed = MockFeedClient::new().with_collection("actor-a", "col-a").with_techniques("col-a", &["T1059"]);
    let state = state_with(db, feed, MockCatalogClient::new(Vec::new()));
    let router = build_router(state);

    let req = Request::builder()
        .method("POST")
        .uri("/collection/run")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["summary"]["total_actors"], 1);
    assert_eq!(body["summary"]["scanned"], 1);
    assert!(body["job_id"].is_number());
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn trigger_mitre_sync_upserts_catalog(pool: PgPool) {
    let db = Database::from_pool(pool);
    let patterns = vec![vigilo::catalog::AttackPattern {
        external_code: "T1059".to_string(),
        name: "Command and Scripting Interpreter".to_string(),
        description: None,
        tactics: "execution".to_string(),
    }];
    let state = state_with(db, MockFeedClient::new(), MockCatalogClient::new(patterns));
    let router = build_router(state);

    let req = Request::builder().method("POST").uri("/mitre/sync").body(Body::empty()).unwrap();
    let response = router.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["created"], 1);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn jobs_endpoints_list_and_fetch_by_id(pool: PgPool) {
    let db = Database::from_pool(pool);
    let job = db
        .start_job(vigilo::models::JobType::Collector.as_str(), "manual", None, None, 0)
        .await
        .unwrap();
    db.finish_job_success(job.id, "done", chrono::Utc::now()).await.unwrap();

    let state = state_with(db, MockFeedClient::new(), MockCatalogClient::new(Vec::new()));
    let router = build_router(state.clone());

    let response = request(router, "GET", "/jobs").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["job_type"], "collector");

    let router = build_router(state);
    let response = request(router, "GET", &format!("/jobs/{}", job.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "SUCCESS");
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn get_job_not_found_returns_404(pool: PgPool) {
    let db = Database::from_pool(pool);
    let state = state_with(db, MockFeedClient::new(), MockCatalogClient::new(Vec::new()));
    let router = build_router(state);

    let response = request(router, "GET", "/jobs/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn alerts_endpoint_lists_recent_alerts(pool: PgPool) {
    let db = Database::from_pool(pool);
    db.insert_alert(None, None, "title", "desc", "HIGH", chrono::Utc::now()).await.unwrap();

    let state = state_with(db, MockFeedClient::new(), MockCatalogClient::new(Vec::new()));
    let router = build_router(state);

    let response = request(router, "GET", "/alerts").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrator = "vigilo::MIGRATOR")]
async fn risk_endpoint_returns_latest_snapshot_or_404(pool: PgPool) {
    let db = Database::from_pool(pool);
    let state = state_with(db.clone(), MockFeedClient::new(), MockCatalogClient::new(Vec::new()));
    let router = build_router(state.clone());

    let response = request(router, "GET", "/risk/CO").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    db.insert_risk_snapshot("CO", 42.0, 3, 2, chrono::Utc::now()).await.unwrap();
    let router = build_router(state);
    let response = request(router, "GET", "/risk/CO").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["country"], "CO");
    assert_eq!(body["risk_score"], 42.0);
}
