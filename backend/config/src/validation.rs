//! Config validation: startup checks with user-friendly error messages.
//!
//! Errors are fatal at startup; warnings are logged and ignored.

use crate::defaults::{DEV_API_KEY, DEV_JWT_SECRET, MAX_TOKEN_LIFETIME_SECS};
use crate::schema::{RateLimitRule, StatusGateConfig};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// All error messages joined into one line.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &StatusGateConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_auth(config, &mut report);
    validate_rate_limits(config, &mut report);
    validate_database(config, &mut report);
    validate_dashboard(config, &mut report);
    report
}

fn validate_server(config: &StatusGateConfig, report: &mut ValidationReport) {
    let port = config.server.port;
    if port == 0 {
        report.error("server.port", "Port must be > 0");
    } else if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
    if config.server.bind_address.trim().is_empty() {
        report.error("server.bindAddress", "Bind address cannot be empty");
    }
}

/// Gated routes are always mounted, so at least one credential kind must exist,
/// and production must not run on the development placeholders.
fn validate_auth(config: &StatusGateConfig, report: &mut ValidationReport) {
    let auth = &config.auth;
    let secret = auth.jwt_secret.as_deref().filter(|s| !s.is_empty());

    if secret.is_none() && auth.api_keys.is_empty() {
        report.error(
            "auth",
            "Neither JWT_SECRET nor API_KEYS is configured; protected routes cannot be served",
        );
    }

    if auth.token_lifetime_secs == 0 {
        report.error("auth.tokenLifetimeSecs", "Token lifetime must be > 0");
    } else if auth.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
        report.error(
            "auth.tokenLifetimeSecs",
            format!("Token lifetime must be at most {MAX_TOKEN_LIFETIME_SECS} seconds"),
        );
    }

    if auth.admin_username.trim().is_empty() {
        report.error("auth.adminUsername", "Admin username cannot be empty");
    }

    if auth.admin_password.is_some() && auth.admin_password_hash.is_some() {
        report.warn(
            "auth.adminPassword",
            "Both ADMIN_PASSWORD and ADMIN_PASSWORD_HASH are set; the hash wins",
        );
    }

    if config.environment.is_production() {
        match secret {
            None => report.error("auth.jwtSecret", "JWT_SECRET is required in production"),
            Some(DEV_JWT_SECRET) => report.error(
                "auth.jwtSecret",
                "The development placeholder secret cannot be used in production",
            ),
            Some(s) if s.len() < 32 => report.warn(
                "auth.jwtSecret",
                "JWT_SECRET is shorter than 32 bytes; use a longer random value",
            ),
            Some(_) => {}
        }

        if auth.api_keys.is_empty() {
            report.error("auth.apiKeys", "API_KEYS is required in production");
        }
        if auth.api_keys.iter().any(|k| k == DEV_API_KEY) {
            report.error(
                "auth.apiKeys",
                "The development placeholder API key cannot be used in production",
            );
        }

        if auth.admin_password.is_none() && auth.admin_password_hash.is_none() {
            report.warn("auth.adminPassword", "No admin password configured; login is disabled");
        }
    }
}

fn validate_rule(path: &str, rule: &RateLimitRule, report: &mut ValidationReport) {
    if rule.window_secs == 0 {
        report.error(format!("{path}.windowSecs"), "Window must be > 0 seconds");
    }
    if rule.max_requests == 0 {
        report.error(format!("{path}.maxRequests"), "maxRequests must be >= 1");
    }
}

fn validate_rate_limits(config: &StatusGateConfig, report: &mut ValidationReport) {
    let limits = &config.rate_limits;
    validate_rule("rateLimits.general", &limits.general, report);
    validate_rule("rateLimits.auth", &limits.auth, report);

    if limits.auth.max_requests > limits.general.max_requests {
        report.warn(
            "rateLimits.auth.maxRequests",
            "Authentication budget is looser than the general budget",
        );
    }
    if limits.sweep_interval_secs == 0 {
        report.error("rateLimits.sweepIntervalSecs", "Sweep interval must be > 0");
    }
}

fn validate_database(config: &StatusGateConfig, report: &mut ValidationReport) {
    let db = &config.database;
    if !db.enabled {
        return;
    }
    if db.host.trim().is_empty() {
        report.error("database.host", "Database host cannot be empty");
    }
    if db.timeout_ms == 0 {
        report.error("database.timeoutMs", "Probe timeout must be > 0");
    }
}

fn validate_dashboard(config: &StatusGateConfig, report: &mut ValidationReport) {
    let dash = &config.dashboard;
    if dash.fan_out == 0 {
        report.error("dashboard.fanOut", "fanOut must be >= 1");
    }
    if dash.interval_secs == 0 {
        report.error("dashboard.intervalSecs", "Polling interval must be > 0");
    }
    if !(dash.base_url.starts_with("http://") || dash.base_url.starts_with("https://")) {
        report.error("dashboard.baseUrl", "Base URL must start with http:// or https://");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::Environment;

    fn production() -> StatusGateConfig {
        let mut cfg = StatusGateConfig::default();
        cfg.environment = Environment::Production;
        cfg.auth.jwt_secret = Some("a-very-long-random-production-secret-value".into());
        cfg.auth.api_keys = vec!["prod-key-1".into()];
        cfg.auth.admin_password_hash = Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into());
        cfg
    }

    #[test]
    fn development_defaults_are_valid() {
        let report = validate(&apply_all_defaults(StatusGateConfig::default()));
        assert!(report.is_valid(), "{}", report.error_summary());
    }

    #[test]
    fn production_requires_jwt_secret() {
        let mut cfg = production();
        cfg.auth.jwt_secret = None;
        let report = validate(&apply_all_defaults(cfg));
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.path == "auth.jwtSecret"));
    }

    #[test]
    fn production_rejects_placeholder_key() {
        let mut cfg = production();
        cfg.auth.api_keys.push(DEV_API_KEY.into());
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "auth.apiKeys"));
    }

    #[test]
    fn production_config_is_valid() {
        let report = validate(&production());
        assert!(report.is_valid(), "{}", report.error_summary());
    }

    #[test]
    fn no_credentials_at_all_is_fatal() {
        let mut cfg = StatusGateConfig::default();
        cfg.auth.jwt_secret = None;
        cfg.auth.api_keys.clear();
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "auth"));
    }

    #[test]
    fn token_lifetime_is_bounded() {
        let mut cfg = apply_all_defaults(StatusGateConfig::default());
        cfg.auth.token_lifetime_secs = u64::MAX;
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "auth.tokenLifetimeSecs"));

        cfg.auth.token_lifetime_secs = MAX_TOKEN_LIFETIME_SECS;
        assert!(validate(&cfg).is_valid());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let mut cfg = apply_all_defaults(StatusGateConfig::default());
        cfg.rate_limits.auth.max_requests = 0;
        let report = validate(&cfg);
        assert!(report.errors.iter().any(|e| e.path == "rateLimits.auth.maxRequests"));
    }
}
