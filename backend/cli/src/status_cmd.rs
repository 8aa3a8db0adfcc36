//! CLI Status Command
//!
//! Queries `/health` and `/api/status` on a running server.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use statusgate_config::StatusGateConfig;
use statusgate_dashboard::terminal_output::{note_error, note_success, note_warn};

pub async fn run(config: &StatusGateConfig, url: Option<String>, api_key: Option<String>) -> Result<()> {
    let base = url
        .unwrap_or_else(|| config.dashboard.base_url.clone())
        .trim_end_matches('/')
        .to_string();
    let api_key = api_key
        .or_else(|| config.dashboard.api_key.clone())
        .or_else(|| config.auth.api_keys.first().cloned());

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_millis(config.dashboard.request_timeout_ms))
        .build()
        .context("Failed to build HTTP client")?;

    match client.get(format!("{base}/health")).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: Value = resp.json().await?;
            note_success(&format!(
                "{} is {}",
                body["server"].as_str().unwrap_or("server"),
                body["status"].as_str().unwrap_or("up")
            ));
        }
        Ok(resp) => note_warn(&format!("Health check returned {}", resp.status())),
        Err(e) => {
            note_error(&format!("statusgate is not reachable at {base}"));
            return Err(e).context(format!("GET {base}/health failed"));
        }
    }

    let Some(api_key) = api_key else {
        note_warn("No API key configured; skipping /api/status");
        return Ok(());
    };

    let resp = client
        .get(format!("{base}/api/status"))
        .header("x-api-key", api_key)
        .send()
        .await
        .context("Status request failed")?;
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&body)?);
        Ok(())
    } else {
        let reason = body["error"].as_str().unwrap_or("unknown error");
        note_error(&format!("/api/status returned {status}: {reason}"));
        bail!("/api/status returned {status}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let mut config = StatusGateConfig::default();
        config.dashboard.base_url = "http://127.0.0.1:1".into();
        config.dashboard.request_timeout_ms = 500;

        let err = run(&config, None, Some("k".into())).await.unwrap_err();
        assert!(format!("{err:#}").contains("/health"));
    }
}
