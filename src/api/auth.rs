use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    api::{ApiError, ApiState},
    token::Claims,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST /auth/login` — exchanges the configured credential pair for a
/// bearer token. No other outcome than 200-with-token or 401.
pub async fn login(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let credentials = state.credentials();
    if request.username != credentials.username || request.password != credentials.password {
        warn!(username = %request.username, "rejected login attempt");
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = state.tokens().issue(&request.username).map_err(|err| {
        warn!(?err, "failed to issue token");
        ApiError::Internal("failed to issue token".to_string())
    })?;

    Ok(Json(LoginResponse { token }))
}

/// Bearer guard applied by every endpoint except login. Missing, malformed,
/// expired or forged tokens all end the request here with a 401.
pub fn require_bearer(state: &ApiState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    Ok(state.tokens().validate(token)?)
}
