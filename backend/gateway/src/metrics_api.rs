//! Admin metrics endpoint, reachable only with a verified session.

use axum::{extract::State, Json};
use serde::Serialize;
use statusgate_core::Claims;
use tracing::info;

use crate::auth::RequireSession;
use crate::error::ApiError;
use crate::host::{HostMetrics, MemoryUsage};
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub server: String,
    pub memory: MemoryUsage,
    /// Process uptime in seconds.
    pub uptime: f64,
    pub loadavg: [f64; 3],
    pub user: Claims,
}

/// Endpoint: `GET /api/admin/metrics`
pub async fn get_metrics(
    State(state): State<GatewayState>,
    RequireSession(claims): RequireSession,
) -> Result<Json<MetricsReport>, ApiError> {
    let host = tokio::task::spawn_blocking(HostMetrics::collect)
        .await
        .map_err(|e| anyhow::anyhow!("metrics collection panicked: {e}"))?;

    info!(username = %claims.username, "Admin metrics served");

    Ok(Json(MetricsReport {
        server: host.server,
        memory: host.memory,
        uptime: state.reporter.uptime().as_secs_f64(),
        loadavg: host.loadavg,
        user: claims,
    }))
}
