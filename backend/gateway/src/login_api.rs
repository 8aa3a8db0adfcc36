//! `POST /api/auth/login`: trade admin credentials for a session token.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use statusgate_core::GateError;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

pub async fn login(
    State(state): State<GatewayState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        debug!(error = %e, "Unreadable login body");
        ApiError::bad_request("Invalid request body")
    })?;

    let Some(role) = state
        .verifier
        .check_credentials(&req.username, &req.password)
        .await
    else {
        warn!(username = %req.username, verifier = state.verifier.name(), "Login rejected");
        return Err(GateError::AuthenticationFailure("Invalid credentials".into()).into());
    };

    let issued = state.tokens.issue(&req.username, role, Utc::now())?;
    info!(username = %req.username, %role, "Session token issued");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}
