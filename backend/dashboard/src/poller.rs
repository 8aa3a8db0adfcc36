//! Dashboard Poller
//!
//! Each round fires `fan_out` concurrent requests at the status endpoint.
//! Behind a load balancer those land on different hosts; the registry keeps
//! the newest answer per host.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use statusgate_config::DashboardConfig;
use statusgate_core::StatusReport;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::registry::ServerRegistry;
use crate::terminal_output::{render_dashboard, supports_color};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Base URL without trailing slash, e.g. `http://cluster.local:3000`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub fan_out: usize,
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl PollerOptions {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            fan_out: config.fan_out.max(1),
            interval: Duration::from_secs(config.interval_secs.max(1)),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    fn status_url(&self) -> String {
        format!("{}/api/status", self.base_url)
    }
}

/// Outcome of one polling round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub requested: usize,
    pub succeeded: usize,
    /// Reports that replaced or created a registry entry.
    pub updated: usize,
}

pub struct DashboardPoller {
    client: reqwest::Client,
    options: PollerOptions,
    registry: ServerRegistry,
    last_round: Option<DateTime<Utc>>,
}

impl DashboardPoller {
    pub fn new(options: PollerOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            options,
            registry: ServerRegistry::new(),
            last_round: None,
        })
    }

    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    async fn fetch_one(&self) -> Result<StatusReport> {
        let mut request = self.client.get(self.options.status_url());
        if let Some(key) = &self.options.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        let report = request
            .send()
            .await?
            .error_for_status()?
            .json::<StatusReport>()
            .await?;
        Ok(report)
    }

    /// Runs one fan-out round and folds the answers into the registry.
    pub async fn poll_once(&mut self) -> RoundSummary {
        let requested = self.options.fan_out;
        let results = join_all((0..requested).map(|_| self.fetch_one())).await;

        let mut summary = RoundSummary {
            requested,
            succeeded: 0,
            updated: 0,
        };
        for result in results {
            match result {
                Ok(report) => {
                    summary.succeeded += 1;
                    if self.registry.observe(report) {
                        summary.updated += 1;
                    }
                }
                Err(e) => warn!(error = %e, "Status request failed"),
            }
        }

        self.last_round = Some(Utc::now());
        debug!(?summary, servers = self.registry.len(), "Polling round done");
        summary
    }

    pub fn render(&self, color: bool) -> String {
        render_dashboard(
            &self.registry.snapshot(),
            self.last_round.unwrap_or_else(Utc::now),
            color,
        )
    }

    /// Polls every `interval` and redraws the table until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!(url = %self.options.status_url(), fan_out = self.options.fan_out, "Dashboard polling started");
        let color = supports_color();
        let mut ticker = tokio::time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let summary = self.poll_once().await;
                    if summary.succeeded == 0 {
                        warn!(requested = summary.requested, "No status responses this round");
                    }
                    let mut stdout = std::io::stdout().lock();
                    if color {
                        // Clear screen, cursor home.
                        write!(stdout, "\x1b[2J\x1b[H")?;
                    }
                    stdout.write_all(self.render(color).as_bytes())?;
                    stdout.flush()?;
                }
            }
        }

        info!("Dashboard polling stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_normalise_config() {
        let config = DashboardConfig {
            base_url: "http://cluster:3000///".into(),
            api_key: Some("k".into()),
            interval_secs: 5,
            fan_out: 0,
            request_timeout_ms: 1500,
        };
        let options = PollerOptions::from_config(&config);
        assert_eq!(options.status_url(), "http://cluster:3000/api/status");
        assert_eq!(options.fan_out, 1);
        assert_eq!(options.request_timeout, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn unreachable_endpoint_counts_failures() {
        let mut poller = DashboardPoller::new(PollerOptions {
            base_url: "http://127.0.0.1:1".into(),
            api_key: None,
            fan_out: 3,
            interval: Duration::from_secs(5),
            request_timeout: Duration::from_millis(500),
        })
        .unwrap();

        let summary = poller.poll_once().await;
        assert_eq!(summary, RoundSummary { requested: 3, succeeded: 0, updated: 0 });
        assert!(poller.registry().is_empty());
    }
}
