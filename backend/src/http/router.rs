//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read-only public API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/moon", get(handlers::get_moon))
        .route("/events/year/{year}", get(handlers::get_year_events))
        .route("/events/upcoming", get(handlers::get_upcoming_events))
        .route("/events/next", get(handlers::get_next_event))
        .route("/visibility", get(handlers::get_visibility))
        .route("/brief", get(handlers::get_morning_brief))
        .route("/jobs/{key}", get(handlers::get_job_status));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
