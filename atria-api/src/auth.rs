use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ApiError, middleware::auth::Claims, state::AppState};

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/guest", post(login_guest))
}

/// POST /v1/auth/guest
/// Issue a short-lived customer token. Production deployments put a real
/// identity provider in front; this endpoint keeps dev and test clients
/// unblocked.
async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, ApiError> {
    let my_claims = Claims {
        sub: format!("guest-{}", Uuid::new_v4()),
        email: None,
        role: "CUSTOMER".to_owned(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
