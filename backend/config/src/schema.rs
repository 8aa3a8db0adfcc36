//! statusgate configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section has defaults so a
//! missing file, a partial file, or an empty file all load.

use serde::{Deserialize, Serialize};

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusGateConfig {
    /// Deployment environment; production rejects placeholder secrets.
    pub environment: Environment,

    /// HTTP listener and response settings
    pub server: ServerConfig,

    /// API keys, token signing and the admin login
    pub auth: AuthConfig,

    /// Per endpoint-group request budgets
    pub rate_limits: RateLimitsConfig,

    /// Backing store probed by the status endpoint
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Dashboard poller client settings
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Message included in every status report
    pub message: String,
    /// Security summary included in every status report
    pub security_summary: String,
    /// Use the first `X-Forwarded-For` hop as the caller identity
    pub trust_proxy: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            message: DEFAULT_STATUS_MESSAGE.to_string(),
            security_summary: DEFAULT_SECURITY_SUMMARY.to_string(),
            trust_proxy: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    /// Session token lifetime in seconds
    pub token_lifetime_secs: u64,
    /// Accepted values for the `x-api-key` header
    pub api_keys: Vec<String>,
    pub admin_username: String,
    /// Plaintext admin password; hashed at startup and never kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    /// Argon2 PHC string; wins over `adminPassword` when both are set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password_hash: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            api_keys: Vec::new(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: None,
            admin_password_hash: None,
        }
    }
}

impl AuthConfig {
    /// Drops the plaintext admin password once the verifier has hashed it.
    pub fn forget_admin_password(&mut self) {
        self.admin_password = None;
    }
}

// ---------------------------------------------------------------------------
// Rate limits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRule {
    pub window_secs: u64,
    pub max_requests: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitsConfig {
    /// Budget for every `/api/*` route
    pub general: RateLimitRule,
    /// Stricter budget for `/api/auth/*`
    pub auth: RateLimitRule,
    /// Skip rate limiting for `/health`
    pub exempt_health: bool,
    /// How often expired windows are pruned
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            general: RateLimitRule {
                window_secs: DEFAULT_RATE_WINDOW_SECS,
                max_requests: DEFAULT_GENERAL_MAX_REQUESTS,
            },
            auth: RateLimitRule {
                window_secs: DEFAULT_RATE_WINDOW_SECS,
                max_requests: DEFAULT_AUTH_MAX_REQUESTS,
            },
            exempt_health: true,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseConfig {
    /// When false the status report omits the `database` field
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub name: String,
    /// Upper bound for one connect + `SELECT 1` round
    pub timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: None,
            name: DEFAULT_DB_NAME.to_string(),
            timeout_ms: DEFAULT_DB_TIMEOUT_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: "pretty".to_string(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub interval_secs: u64,
    /// Concurrent requests per polling round
    pub fan_out: usize,
    pub request_timeout_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{DEFAULT_PORT}"),
            api_key: None,
            interval_secs: DEFAULT_DASHBOARD_INTERVAL_SECS,
            fan_out: DEFAULT_DASHBOARD_FAN_OUT,
            request_timeout_ms: DEFAULT_DASHBOARD_TIMEOUT_MS,
        }
    }
}
