//! Config file discovery and reading.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file looked up in the working directory when nothing else is given.
pub const CONFIG_FILE_NAME: &str = "statusgate.yaml";

/// Resolve which config file to read.
///
/// Priority: explicit path > `STATUSGATE_CONFIG` env > `./statusgate.yaml` if it exists.
/// An explicit or env-provided path is returned even if it does not exist, so
/// the caller reports it instead of silently falling back to defaults.
pub fn resolve_config_path(explicit: Option<&Path>, env: &HashMap<String, String>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env.get("STATUSGATE_CONFIG").filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    local.exists().then_some(local)
}

/// Read a YAML config file into a JSON value tree.
///
/// An empty file yields an empty object.
pub async fn load_config_value(path: &Path) -> Result<Value> {
    if !path.exists() {
        bail!("Config file not found: {}", path.display());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        debug!(path = %path.display(), "Config file is empty; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    if !value.is_object() {
        bail!("Config file must contain a mapping at the top level: {}", path.display());
    }

    info!(path = %path.display(), "Loaded config file");
    Ok(value)
}
