//! Config defaults: built-in values and environment-aware fallbacks.

use tracing::warn;

use crate::schema::StatusGateConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_STATUS_MESSAGE: &str = "Pi Cluster Web App - Security Enabled";
pub const DEFAULT_SECURITY_SUMMARY: &str = "JWT + API Keys + Rate Limiting";

/// One hour.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
/// Thirty days.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 30 * 24 * 3600;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Fifteen minutes, shared by both endpoint groups.
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 15 * 60;
pub const DEFAULT_GENERAL_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_AUTH_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_USER: &str = "webapp";
pub const DEFAULT_DB_NAME: &str = "webapp";
pub const DEFAULT_DB_TIMEOUT_MS: u64 = 2000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_DASHBOARD_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_DASHBOARD_FAN_OUT: usize = 10;
pub const DEFAULT_DASHBOARD_TIMEOUT_MS: u64 = 3000;

/// Development-only signing secret. Rejected in production.
pub const DEV_JWT_SECRET: &str = "your-secret-key";

/// Development-only API key. Rejected in production.
pub const DEV_API_KEY: &str = "default-api-key";

/// Apply all defaults to a loaded config.
pub fn apply_all_defaults(config: StatusGateConfig) -> StatusGateConfig {
    let config = normalize_api_keys(config);
    let config = apply_dev_secrets(config);
    let config = apply_logging_defaults(config);
    config
}

/// Trim keys, drop empty entries and duplicates while keeping order.
fn normalize_api_keys(mut config: StatusGateConfig) -> StatusGateConfig {
    let mut seen = std::collections::HashSet::new();
    config.auth.api_keys = config
        .auth
        .api_keys
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect();
    config
}

/// Outside production, fill missing secrets with well-known placeholders.
fn apply_dev_secrets(mut config: StatusGateConfig) -> StatusGateConfig {
    if config.environment.is_production() {
        return config;
    }

    let secret_missing = config
        .auth
        .jwt_secret
        .as_deref()
        .map(str::is_empty)
        .unwrap_or(true);
    if secret_missing {
        warn!("JWT_SECRET not set; using the development placeholder secret");
        config.auth.jwt_secret = Some(DEV_JWT_SECRET.to_string());
    }

    if config.auth.api_keys.is_empty() {
        warn!("API_KEYS not set; accepting the development placeholder key");
        config.auth.api_keys.push(DEV_API_KEY.to_string());
    }

    config
}

fn apply_logging_defaults(mut config: StatusGateConfig) -> StatusGateConfig {
    if config.logging.level.trim().is_empty() {
        config.logging.level = DEFAULT_LOG_LEVEL.to_string();
    }
    config
}
