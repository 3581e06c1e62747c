use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use atria_core::expiry;
use atria_domain::Booking;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    room_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(my_bookings))
}

/// POST /v1/bookings
/// Create a provisional hold: `confirmed`/`pending`, price snapshotted,
/// slot reserved until paid or swept.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    // 1. Reclaim stale holds so an abandoned hold cannot block the slot
    if let Err(e) = expiry::sweep_expired(state.bookings.as_ref(), state.grace()).await {
        warn!("Auto-expire failed: {}", e);
    }

    // 2. Create the hold; exclusivity is enforced by the store insert
    let booking = state
        .holds
        .create_hold(req.room_id, &claims.sub, req.start_time, req.end_time)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings
/// The caller's booking history, most recent first. Cancelled holds stay
/// visible; they are audit history, not deleted.
async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let bookings = state.bookings.bookings_for_user(&claims.sub).await?;
    Ok(Json(bookings))
}
