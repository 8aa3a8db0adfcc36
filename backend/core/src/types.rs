use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role carried inside a session token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Role {
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Verified session claims. Timestamps are unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Reachability of the backing store as seen by the status endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseState {
    Connected,
    Disconnected,
}

/// Snapshot returned by the status endpoint. Built fresh per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub message: String,
    /// Server identity (hostname).
    pub server: String,
    pub uptime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Body of the public liveness endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub server: String,
}

impl HealthReport {
    pub fn healthy(server: impl Into<String>) -> Self {
        Self {
            status: "healthy".into(),
            server: server.into(),
        }
    }
}
