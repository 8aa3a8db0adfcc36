//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside YAML string values, resolved at load time
//!   (`$${VAR}` escapes to a literal `${VAR}`);
//! - well-known variables (`PORT`, `JWT_SECRET`, `API_KEYS`, ...) that override
//!   whatever the file says.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{Environment, StatusGateConfig};

/// Matches `${VAR}` and the escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Variables consulted by [`apply_env_overrides`], for diagnostics.
pub const ENV_OVERRIDES: &[&str] = &[
    "STATUSGATE_ENV",
    "STATUSGATE_BIND",
    "PORT",
    "TRUST_PROXY",
    "JWT_SECRET",
    "TOKEN_LIFETIME_SECS",
    "API_KEYS",
    "ADMIN_USERNAME",
    "ADMIN_PASSWORD",
    "ADMIN_PASSWORD_HASH",
    "DB_ENABLED",
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "LOG_DIR",
    "STATUSGATE_URL",
    "STATUSGATE_API_KEY",
];

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. Returns an error if any referenced env
/// var is not set or is empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &process_env())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in ENV_VAR_PATTERN.captures_iter(s) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&s[last..whole.start()]);
        let var_name = &caps[1];

        if whole.as_str().starts_with("$$") {
            out.push_str(&format!("${{{var_name}}}"));
        } else {
            match env.get(var_name) {
                Some(val) if !val.is_empty() => out.push_str(val),
                _ => bail!(MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                }),
            }
        }
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Ok(out)
}

/// Collect all env var names referenced in a config value tree (for diagnostics).
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => {
                for caps in ENV_VAR_PATTERN.captures_iter(s) {
                    if !caps[0].starts_with("$$") {
                        out.push(caps[1].to_string());
                    }
                }
            }
            Value::Array(arr) => arr.iter().for_each(|v| walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| walk(v, out)),
            _ => {}
        }
    }

    let mut vars = Vec::new();
    walk(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

/// Apply well-known environment variables on top of a loaded config.
pub fn apply_env_overrides(
    mut config: StatusGateConfig,
    env: &HashMap<String, String>,
) -> Result<StatusGateConfig> {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(raw) = get("STATUSGATE_ENV") {
        config.environment = Environment::parse(raw)
            .with_context(|| format!("STATUSGATE_ENV must be 'development' or 'production', got '{raw}'"))?;
    }

    if let Some(v) = get("STATUSGATE_BIND") {
        config.server.bind_address = v.to_string();
    }
    if let Some(v) = get("PORT") {
        config.server.port = v.parse().with_context(|| format!("PORT is not a valid port: '{v}'"))?;
    }
    if let Some(v) = get("TRUST_PROXY") {
        config.server.trust_proxy = parse_bool("TRUST_PROXY", v)?;
    }

    if let Some(v) = get("JWT_SECRET") {
        config.auth.jwt_secret = Some(v.to_string());
    }
    if let Some(v) = get("TOKEN_LIFETIME_SECS") {
        config.auth.token_lifetime_secs = v
            .parse()
            .with_context(|| format!("TOKEN_LIFETIME_SECS is not a number: '{v}'"))?;
    }
    if let Some(v) = get("API_KEYS") {
        config.auth.api_keys = v.split(',').map(|k| k.trim().to_string()).collect();
    }
    if let Some(v) = get("ADMIN_USERNAME") {
        config.auth.admin_username = v.to_string();
    }
    if let Some(v) = get("ADMIN_PASSWORD") {
        config.auth.admin_password = Some(v.to_string());
    }
    if let Some(v) = get("ADMIN_PASSWORD_HASH") {
        config.auth.admin_password_hash = Some(v.to_string());
    }

    if let Some(v) = get("DB_ENABLED") {
        config.database.enabled = parse_bool("DB_ENABLED", v)?;
    }
    if let Some(v) = get("DB_HOST") {
        config.database.host = v.to_string();
    }
    if let Some(v) = get("DB_PORT") {
        config.database.port = v.parse().with_context(|| format!("DB_PORT is not a valid port: '{v}'"))?;
    }
    if let Some(v) = get("DB_USER") {
        config.database.user = v.to_string();
    }
    if let Some(v) = get("DB_PASSWORD") {
        config.database.password = Some(v.to_string());
    }
    if let Some(v) = get("DB_NAME") {
        config.database.name = v.to_string();
    }

    if let Some(v) = get("LOG_LEVEL") {
        config.logging.level = v.to_string();
    }
    if let Some(v) = get("LOG_FORMAT") {
        config.logging.format = v.to_string();
    }
    if let Some(v) = get("LOG_DIR") {
        config.logging.dir = Some(v.to_string());
    }

    if let Some(v) = get("STATUSGATE_URL") {
        config.dashboard.base_url = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = get("STATUSGATE_API_KEY") {
        config.dashboard.api_key = Some(v.to_string());
    }

    Ok(config)
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{name} must be a boolean, got '{raw}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"auth": {"jwtSecret": "${SIGNING_KEY}"}});
        let result = resolve_env_vars_with(&v, &env(&[("SIGNING_KEY", "s3cret")])).unwrap();
        assert_eq!(result["auth"]["jwtSecret"], "s3cret");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"database": {"password": "${DB_PASS}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("DB_PASS"));
        assert!(msg.contains("database.password"));
    }

    #[test]
    fn escaped_reference_is_kept_literally() {
        let v = json!({"server": {"message": "cost: $${PRICE} and ${NAME}"}});
        let result = resolve_env_vars_with(&v, &env(&[("NAME", "pi")])).unwrap();
        assert_eq!(result["server"]["message"], "cost: ${PRICE} and pi");
    }

    #[test]
    fn substitutes_inside_arrays() {
        let v = json!({"auth": {"apiKeys": ["${KEY_A}", "static"]}});
        let result = resolve_env_vars_with(&v, &env(&[("KEY_A", "abc")])).unwrap();
        assert_eq!(result["auth"]["apiKeys"][0], "abc");
        assert_eq!(result["auth"]["apiKeys"][1], "static");
    }

    #[test]
    fn collects_referenced_vars() {
        let v = json!({"a": "${FOO}", "b": {"c": "${BAR} $${SKIPPED}"}});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR".to_string(), "FOO".to_string()]);
    }

    #[test]
    fn overrides_apply_on_top_of_file_values() {
        let mut cfg = StatusGateConfig::default();
        cfg.server.port = 8080;
        let cfg = apply_env_overrides(
            cfg,
            &env(&[
                ("PORT", "4000"),
                ("API_KEYS", "k1, k2 ,k3"),
                ("JWT_SECRET", "topsecret"),
                ("DB_HOST", "db.internal"),
                ("STATUSGATE_ENV", "production"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.auth.api_keys, vec!["k1", "k2", "k3"]);
        assert_eq!(cfg.auth.jwt_secret.as_deref(), Some("topsecret"));
        assert_eq!(cfg.database.host, "db.internal");
        assert!(cfg.environment.is_production());
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let cfg = apply_env_overrides(StatusGateConfig::default(), &env(&[("PORT", "  ")])).unwrap();
        assert_eq!(cfg.server.port, crate::defaults::DEFAULT_PORT);
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = apply_env_overrides(StatusGateConfig::default(), &env(&[("PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
