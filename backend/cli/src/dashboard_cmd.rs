//! CLI Dashboard Command

use std::time::Duration;

use anyhow::Result;
use statusgate_config::StatusGateConfig;
use statusgate_dashboard::terminal_output::{note_info, note_warn, supports_color};
use statusgate_dashboard::{DashboardPoller, PollerOptions};

pub struct Overrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub fan_out: Option<usize>,
    pub interval: Option<u64>,
    pub once: bool,
}

pub async fn run(config: &StatusGateConfig, overrides: Overrides) -> Result<()> {
    let mut options = PollerOptions::from_config(&config.dashboard);
    if let Some(url) = overrides.url {
        options.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(key) = overrides.api_key {
        options.api_key = Some(key);
    }
    if options.api_key.is_none() {
        options.api_key = config.auth.api_keys.first().cloned();
    }
    if let Some(fan_out) = overrides.fan_out {
        options.fan_out = fan_out.max(1);
    }
    if let Some(secs) = overrides.interval {
        options.interval = Duration::from_secs(secs.max(1));
    }

    let mut poller = DashboardPoller::new(options)?;

    if overrides.once {
        let summary = poller.poll_once().await;
        if summary.succeeded == 0 {
            note_warn("No status responses received");
        }
        print!("{}", poller.render(supports_color()));
        return Ok(());
    }

    note_info("Polling; press Ctrl-C to stop");
    poller
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
