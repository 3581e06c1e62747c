use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use atria_core::{availability, expiry};
use atria_domain::Room;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms", get(list_rooms))
        .route("/v1/rooms/{id}/bookings", get(room_day_schedule))
        .route("/v1/rooms/{id}/availability", get(check_availability))
}

/// GET /v1/rooms
async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, ApiError> {
    let rooms = state.rooms.list_rooms().await?;
    Ok(Json(rooms))
}

#[derive(Debug, Deserialize)]
struct DayQuery {
    date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct SlotResponse {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

/// GET /v1/rooms/{id}/bookings?date=YYYY-MM-DD
/// The day's confirmed slots, times only. Used by clients to render a
/// schedule without exposing other users' booking details.
async fn room_day_schedule(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<SlotResponse>>, ApiError> {
    let from = query.date.and_time(chrono::NaiveTime::MIN).and_utc();
    let to = from + chrono::Duration::days(1);

    let bookings = state
        .bookings
        .bookings_for_room_between(room_id, from, to)
        .await?;

    let now = Utc::now();
    let grace = state.grace();
    let slots = bookings
        .iter()
        .filter(|b| b.is_live(now, grace))
        .map(|b| SlotResponse {
            start_time: b.start_time,
            end_time: b.end_time,
        })
        .collect();

    Ok(Json(slots))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    available: bool,
}

/// GET /v1/rooms/{id}/availability?start=..&end=..
/// Advisory check; the store's exclusion constraint stays authoritative at
/// insert time.
async fn check_availability(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    // Reclaim stale holds first so they do not read as occupied
    if let Err(e) = expiry::sweep_expired(state.bookings.as_ref(), state.grace()).await {
        warn!("Auto-expire failed: {}", e);
    }

    let available = availability::is_available(
        state.bookings.as_ref(),
        room_id,
        query.start,
        query.end,
        state.grace(),
    )
    .await?;

    Ok(Json(AvailabilityResponse { available }))
}
