//! Config redaction: produce safe-to-log config snapshots by masking secrets.

use serde_json::Value;

/// Field names whose string values (or array of strings) are secrets.
static SENSITIVE_KEYS: &[&str] = &[
    "jwtSecret",
    "apiKeys",
    "apiKey",
    "adminPassword",
    "adminPasswordHash",
    "password",
    "secret",
    "token",
];

const MASK: &str = "***";

/// Redact a config JSON value, replacing every non-empty sensitive string
/// with a fixed mask.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_string(s: &str, key: &str) -> Value {
    if !is_sensitive_key(key) || s.is_empty() {
        return Value::String(s.to_string());
    }
    Value::String(MASK.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}

/// Collect all field paths that would be redacted (for diagnostics).
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    fn walk(value: &Value, path: &str, key: &str, out: &mut Vec<String>) {
        match value {
            Value::String(s) if !s.is_empty() && is_sensitive_key(key) => out.push(path.to_string()),
            Value::Array(arr) => {
                for (i, v) in arr.iter().enumerate() {
                    walk(v, &format!("{path}[{i}]"), key, out);
                }
            }
            Value::Object(map) => {
                for (k, v) in map {
                    let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                    walk(v, &child, k, out);
                }
            }
            _ => {}
        }
    }

    let mut paths = Vec::new();
    walk(value, "", "", &mut paths);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_jwt_secret() {
        let v = json!({ "auth": { "jwtSecret": "super-long-signing-secret" } });
        let redacted = redact(&v);
        assert_eq!(redacted["auth"]["jwtSecret"], "***");
    }

    #[test]
    fn redacts_every_api_key_without_a_prefix() {
        let v = json!({ "auth": { "apiKeys": ["key-one-abcdef", "short"] } });
        let redacted = redact(&v);
        assert_eq!(redacted["auth"]["apiKeys"], json!(["***", "***"]));
        assert!(!redacted.to_string().contains("key-"));
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({ "logging": { "level": "debug" }, "database": { "host": "db" } });
        assert_eq!(redact(&v), v);
    }

    #[test]
    fn lists_redacted_paths() {
        let v = json!({ "auth": { "apiKeys": ["a"], "adminUsername": "admin" }, "database": { "password": "pw" } });
        let mut paths = collect_redacted_paths(&v);
        paths.sort();
        assert_eq!(paths, vec!["auth.apiKeys[0]", "database.password"]);
    }
}
