//! Access Audit Logger
//!
//! One structured event per admission decision, emitted under the
//! `access_audit` target so it can be routed or filtered on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessEvent {
    Admitted {
        caller: String,
        method: String,
        path: String,
        principal: Option<String>,
    },
    RateLimited {
        caller: String,
        path: String,
        group: String,
        retry_after_secs: u64,
    },
    Unauthorized {
        caller: String,
        path: String,
        reason: String,
    },
}

impl AccessEvent {
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AccessEvent::Admitted { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct AccessLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: AccessEvent,
}

pub struct AccessLogger;

impl AccessLogger {
    /// Builds the redacted entry for an event without emitting it.
    pub fn entry(request_id: &str, mut event: AccessEvent) -> AccessLogEntry {
        match &mut event {
            AccessEvent::Admitted { path, .. } | AccessEvent::RateLimited { path, .. } => {
                *path = redact_sensitive_data(path);
            }
            AccessEvent::Unauthorized { path, reason, .. } => {
                *path = redact_sensitive_data(path);
                *reason = redact_sensitive_data(reason);
            }
        }

        AccessLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Logs an admission decision, redacting anything that looks like a credential.
    pub fn log(request_id: &str, event: AccessEvent) {
        let entry = Self::entry(request_id, event);
        if entry.event.is_rejection() {
            warn!(target: "access_audit", event = ?entry, "Request rejected");
        } else {
            info!(target: "access_audit", event = ?entry, "Request admitted");
        }
    }
}
