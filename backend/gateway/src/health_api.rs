//! Gateway Health API
//!
//! Public liveness endpoint. No credentials, and exempt from rate limiting
//! unless configured otherwise.

use axum::{extract::State, Json};
use statusgate_core::HealthReport;

use crate::server::GatewayState;

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport::healthy(state.reporter.server()))
}
