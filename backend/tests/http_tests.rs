//! End-to-end checks of the REST API over an in-memory store.
#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use lunar_observatory::http::{create_router, AppState};
use serde_json::Value;
use support::{observatory_with, utc_config, MockOracle};
use tower::ServiceExt;

fn app() -> Router {
    let (observatory, _repo) = observatory_with(Arc::new(MockOracle::new()), utc_config());
    create_router(AppState::new(observatory))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"], "connected");
}

#[tokio::test]
async fn test_moon_snapshot() {
    let app = app();
    let (status, body) = get(&app, "/v1/moon?date=2026-02-24&lat=23.0&lon=72.5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calendar"]["date"], "2026-02-24");
    assert_eq!(body["calendar"]["weekday"], "Tuesday");
    assert_eq!(body["note"], "Tithi calculated at Sunrise (approx)");

    let (status, body) = get(&app, "/v1/moon?d=2026/02/24&sunrise=false&hour=21").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"], "Exact time calculation");
}

#[tokio::test]
async fn test_moon_rejects_bad_input() {
    let app = app();
    let (status, body) = get(&app, "/v1/moon?date=2026-02-31").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = get(&app, "/v1/moon?date=2026-02-24&lat=91&lon=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/v1/moon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_year_events_pending_then_job_visible() {
    let app = app();
    let (status, body) = get(&app, "/v1/events/year/2026").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["job_key"], "yearly-events:2026");

    let (status, job) = get(&app, "/v1/jobs/yearly-events:2026").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["key"], "yearly-events:2026");
}

#[tokio::test]
async fn test_year_out_of_range_is_bad_request() {
    let (status, _) = get(&app(), "/v1/events/year/1700").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let (status, body) = get(&app(), "/v1/jobs/yearly-events:1999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_visibility_endpoint() {
    let app = app();
    let (status, body) = get(&app, "/v1/visibility?date=2026-02-24").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jupiter"]["visibility_rating"], "Excellent");
    assert_eq!(body["saturn"]["visible"], false);

    let (status, _) = get(&app, "/v1/visibility?date=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_visibility_outside_supported_years_is_bad_request() {
    let app = app();
    for date in ["2201-01-01", "1799-12-31"] {
        let (status, body) = get(&app, &format!("/v1/visibility?date={}", date)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", date);
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_upcoming_window_is_bounded() {
    let app = app();
    let (status, body) = get(&app, "/v1/events/upcoming").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days"], 60);

    let (status, _) = get(&app, "/v1/events/upcoming?days=1000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
