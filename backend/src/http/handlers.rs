//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! observatory facade.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    HealthResponse, JobRecord, MoonQuery, MorningBrief, NextMajorEvent, UpcomingQuery,
    UpcomingResponse, VisibilityQuery, YearEventsResponse, YearStatus,
};
use super::error::AppError;
use super::state::AppState;
use crate::cache::{job_key, YearEvents};
use crate::db::CacheDomain;
use crate::models::{parse_date, DailySnapshot, DailyVisibility};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Default look-ahead of the upcoming-events endpoint.
pub const DEFAULT_UPCOMING_DAYS: u32 = 60;

/// Longest accepted look-ahead.
pub const MAX_UPCOMING_DAYS: u32 = 366;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the persistent
/// cache is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let cache_status = match state.observatory.cache().repository().health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        cache: cache_status,
    }))
}

// =============================================================================
// Moon
// =============================================================================

/// GET /v1/moon?date=YYYY-MM-DD&lat=&lon=&hour=&minute=&utc_offset=&sunrise=
pub async fn get_moon(
    State(state): State<AppState>,
    Query(query): Query<MoonQuery>,
) -> HandlerResult<DailySnapshot> {
    let snapshot = state.observatory.daily_snapshot(query.into()).await?;
    Ok(Json(snapshot))
}

// =============================================================================
// Events
// =============================================================================

/// GET /v1/events/year/{year}
///
/// 200 with the events when cached, 202 while generation runs in the background.
pub async fn get_year_events(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Result<(StatusCode, Json<YearEventsResponse>), AppError> {
    match state.observatory.year_events(year).await? {
        YearEvents::Ready(events) => Ok((
            StatusCode::OK,
            Json(YearEventsResponse {
                year,
                status: YearStatus::Ready,
                events,
                job_key: None,
            }),
        )),
        YearEvents::Pending => Ok((
            StatusCode::ACCEPTED,
            Json(YearEventsResponse {
                year,
                status: YearStatus::Pending,
                events: vec![],
                job_key: Some(job_key(CacheDomain::YearlyEvents, &year.to_string())),
            }),
        )),
    }
}

/// GET /v1/events/upcoming?days=N
pub async fn get_upcoming_events(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> HandlerResult<UpcomingResponse> {
    let days = query.days.unwrap_or(DEFAULT_UPCOMING_DAYS);
    if days > MAX_UPCOMING_DAYS {
        return Err(AppError::BadRequest(format!(
            "days must be at most {}, got {}",
            MAX_UPCOMING_DAYS, days
        )));
    }

    let events = state.observatory.upcoming_events(days).await?;
    Ok(Json(UpcomingResponse {
        days,
        total: events.len(),
        events,
    }))
}

/// GET /v1/events/next
pub async fn get_next_event(State(state): State<AppState>) -> HandlerResult<NextMajorEvent> {
    Ok(Json(state.observatory.next_major_event().await?))
}

// =============================================================================
// Visibility & Brief
// =============================================================================

/// GET /v1/visibility?date=YYYY-MM-DD
pub async fn get_visibility(
    State(state): State<AppState>,
    Query(query): Query<VisibilityQuery>,
) -> HandlerResult<DailyVisibility> {
    let date = match query.date {
        Some(raw) => parse_date(&raw)?,
        None => state.observatory.today(),
    };
    Ok(Json(state.observatory.visibility(date).await?))
}

/// GET /v1/brief
pub async fn get_morning_brief(State(state): State<AppState>) -> HandlerResult<MorningBrief> {
    Ok(Json(state.observatory.morning_brief().await?))
}

// =============================================================================
// Jobs
// =============================================================================

/// GET /v1/jobs/{key}
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> HandlerResult<JobRecord> {
    let job = state
        .observatory
        .job(&key)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", key)))?;
    Ok(Json(job))
}
