//! Status Reporter
//!
//! Builds the per-request [`StatusReport`]. A failing or slow database probe
//! degrades the report to `disconnected`; it never fails the request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use statusgate_core::{DatabaseProbe, DatabaseState, DependencyUnavailable, StatusReport};
use tracing::warn;

use crate::server::GatewayState;

pub struct StatusReporter {
    server: String,
    message: String,
    security: String,
    started: Instant,
    probe: Option<(Arc<dyn DatabaseProbe>, Duration)>,
}

impl StatusReporter {
    pub fn new(
        server: impl Into<String>,
        message: impl Into<String>,
        security: impl Into<String>,
        started: Instant,
    ) -> Self {
        Self {
            server: server.into(),
            message: message.into(),
            security: security.into(),
            started,
            probe: None,
        }
    }

    /// Probe the database on every report, giving up after `timeout`.
    pub fn with_probe(mut self, probe: Arc<dyn DatabaseProbe>, timeout: Duration) -> Self {
        self.probe = Some((probe, timeout));
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// `None` when no probe is configured.
    async fn probe_database(&self) -> Option<Result<(), DependencyUnavailable>> {
        let (probe, timeout) = self.probe.as_ref()?;
        let outcome = match tokio::time::timeout(*timeout, probe.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DependencyUnavailable::new(probe.name(), e.to_string())),
            Err(_) => Err(DependencyUnavailable::new(
                probe.name(),
                format!("timed out after {}ms", timeout.as_millis()),
            )),
        };
        Some(outcome)
    }

    pub async fn report(&self, now: DateTime<Utc>) -> StatusReport {
        let (database, database_error) = match self.probe_database().await {
            None => (None, None),
            Some(Ok(())) => (Some(DatabaseState::Connected), None),
            Some(Err(e)) => {
                warn!(probe = %e.dependency, error = %e.reason, "Database probe failed");
                (Some(DatabaseState::Disconnected), Some(e.reason))
            }
        };

        StatusReport {
            message: self.message.clone(),
            server: self.server.clone(),
            uptime: format!("{}s", self.uptime().as_secs()),
            database,
            database_error,
            security: Some(self.security.clone()),
            timestamp: now,
        }
    }
}

/// Handler for `GET /api/status` (also `/api` and `/api/`).
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusReport> {
    Json(state.reporter.report(Utc::now()).await)
}
