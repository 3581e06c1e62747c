use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use atria_core::expiry;
use atria_core::gateway::GatewayOrder;
use atria_core::payments::PaymentProof;
use atria_domain::Booking;

use crate::error::ApiError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    booking_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct VerifyPaymentRequest {
    booking_id: Uuid,
    payment_data: PaymentProof,
}

#[derive(Debug, Serialize)]
struct VerifyPaymentResponse {
    success: bool,
    booking: Booking,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/payments/create-order", post(create_order))
        .route("/v1/payments/verify-payment", post(verify_payment))
}

/// POST /v1/payments/create-order
/// Mint a gateway order for a booking the caller owns. The amount is
/// computed server-side; the response carries only the order's public
/// identifiers.
async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<GatewayOrder>, ApiError> {
    // Sweep first so an expired hold cannot reach the gateway
    if let Err(e) = expiry::sweep_expired(state.bookings.as_ref(), state.grace()).await {
        warn!("Auto-expire failed: {}", e);
    }

    let order = state.payments.create_order(req.booking_id, &claims.sub).await?;
    Ok(Json(order))
}

/// POST /v1/payments/verify-payment
/// Validate the gateway's payment proof and flip the booking to `paid`.
/// This is the only path that marks a booking paid.
async fn verify_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    if let Err(e) = expiry::sweep_expired(state.bookings.as_ref(), state.grace()).await {
        warn!("Auto-expire failed: {}", e);
    }

    let booking = state
        .payments
        .verify_payment(req.booking_id, &req.payment_data, &claims.sub)
        .await?;

    Ok(Json(VerifyPaymentResponse {
        success: true,
        booking,
    }))
}
