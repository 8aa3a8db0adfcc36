//! `statusgate-config`: runtime configuration for the statusgate service.
//!
//! Provides:
//! - Typed config schema (server, auth, rate limits, database, logging, dashboard)
//! - YAML file loading with `${ENV_VAR}` substitution
//! - Well-known environment variable overrides (`PORT`, `JWT_SECRET`, `API_KEYS`, ...)
//! - Development fallbacks for secrets
//! - Config redaction for safe logging
//! - Startup validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, collect_referenced_vars, process_env, resolve_env_vars,
    resolve_env_vars_with, MissingEnvVarError, ENV_OVERRIDES,
};
pub use io::{load_config_value, resolve_config_path, CONFIG_FILE_NAME};
pub use redact::{collect_redacted_paths, redact};
pub use schema::{
    AuthConfig, DashboardConfig, DatabaseConfig, Environment, LoggingConfig, RateLimitRule,
    RateLimitsConfig, ServerConfig, StatusGateConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute, override, default and validate the runtime config.
///
/// This is the main entry point at startup. `path` is an explicit
/// `--config` argument; `env` is normally [`process_env`]. Validation errors
/// are returned as a single error, warnings are logged.
pub async fn load_and_prepare(
    path: Option<&Path>,
    env: &HashMap<String, String>,
) -> Result<StatusGateConfig> {
    let value = match resolve_config_path(path, env) {
        Some(path) => load_config_value(&path).await?,
        None => Value::Object(Default::default()),
    };

    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: StatusGateConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;

    let config = apply_env_overrides(config, env)?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        bail!("Invalid configuration: {}", report.error_summary());
    }

    Ok(config)
}

/// Redacted JSON view of a config, safe to log.
pub fn redacted_view(config: &StatusGateConfig) -> Value {
    serde_json::to_value(config)
        .map(|v| redact(&v))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn file_then_env_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  port: 8081\n  message: \"cluster ${{NODE_NAME}}\"\nauth:\n  apiKeys: [file-key]\n"
        )
        .unwrap();

        let env = env(&[("NODE_NAME", "pi-03"), ("API_KEYS", "env-key")]);
        let cfg = load_and_prepare(Some(file.path()), &env).await.unwrap();

        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.server.message, "cluster pi-03");
        assert_eq!(cfg.auth.api_keys, vec!["env-key"]);
    }

    #[tokio::test]
    async fn no_file_means_defaults() {
        let cfg = load_and_prepare(None, &HashMap::new()).await.unwrap();
        assert_eq!(cfg.server.port, defaults::DEFAULT_PORT);
        assert_eq!(cfg.auth.jwt_secret.as_deref(), Some(defaults::DEV_JWT_SECRET));
    }

    #[tokio::test]
    async fn production_without_secret_is_fatal() {
        let env = env(&[("STATUSGATE_ENV", "production"), ("API_KEYS", "k")]);
        let err = load_and_prepare(None, &env).await.unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn redacted_view_hides_secret() {
        let cfg = apply_all_defaults(StatusGateConfig::default());
        let view = redacted_view(&cfg);
        assert_ne!(view["auth"]["jwtSecret"], defaults::DEV_JWT_SECRET);
    }
}
