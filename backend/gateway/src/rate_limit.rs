//! Gateway Rate Limiting Module
//!
//! Fixed-window counters keyed by `(caller, endpoint group)`. The whole
//! check-expire-increment-decide step for a request runs under one mutex
//! guard, so a window never admits more than its budget, even when callers
//! race.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use statusgate_config::{RateLimitRule, RateLimitsConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Named bucket of routes sharing one policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointGroup {
    General,
    Authentication,
}

impl EndpointGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointGroup::General => "general",
            EndpointGroup::Authentication => "authentication",
        }
    }

    /// Body message used when this group rejects a request.
    pub fn rejection_message(&self) -> &'static str {
        match self {
            EndpointGroup::General => "Too many requests, please try again later",
            EndpointGroup::Authentication => "Too many authentication attempts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl From<&RateLimitRule> for RateLimitPolicy {
    fn from(rule: &RateLimitRule) -> Self {
        Self {
            window: Duration::from_secs(rule.window_secs),
            max_requests: rule.max_requests,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted {
        limit: u32,
        remaining: u32,
        reset_in: Duration,
    },
    Rejected {
        limit: u32,
        retry_after: Duration,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

#[derive(Debug)]
struct RateWindow {
    start: Instant,
    count: u32,
}

#[derive(Clone)]
pub struct RateLimiter {
    // (caller key, group) -> current window
    windows: Arc<Mutex<HashMap<(String, EndpointGroup), RateWindow>>>,
    general: RateLimitPolicy,
    authentication: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(general: RateLimitPolicy, authentication: RateLimitPolicy) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            general,
            authentication,
        }
    }

    pub fn from_config(config: &RateLimitsConfig) -> Self {
        Self::new((&config.general).into(), (&config.auth).into())
    }

    pub fn policy(&self, group: EndpointGroup) -> RateLimitPolicy {
        match group {
            EndpointGroup::General => self.general,
            EndpointGroup::Authentication => self.authentication,
        }
    }

    /// Charges one request against `(caller_key, group)` at `now`.
    pub async fn admit(&self, caller_key: &str, group: EndpointGroup, now: Instant) -> Admission {
        let policy = self.policy(group);
        let mut windows = self.windows.lock().await;

        let window = windows
            .entry((caller_key.to_string(), group))
            .or_insert(RateWindow { start: now, count: 0 });

        if now.saturating_duration_since(window.start) >= policy.window {
            debug!(caller = caller_key, group = group.as_str(), "Rate window reset");
            window.start = now;
            window.count = 0;
        }

        window.count = window.count.saturating_add(1);
        let reset_in = policy
            .window
            .saturating_sub(now.saturating_duration_since(window.start));

        if window.count <= policy.max_requests {
            Admission::Admitted {
                limit: policy.max_requests,
                remaining: policy.max_requests - window.count,
                reset_in,
            }
        } else {
            warn!(caller = caller_key, group = group.as_str(), "Rate limit exceeded");
            Admission::Rejected {
                limit: policy.max_requests,
                retry_after: reset_in,
            }
        }
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|(_, group), w| {
            now.saturating_duration_since(w.start) < self.policy(*group).window
        });
        before - windows.len()
    }

    pub async fn tracked_windows(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// Runs [`sweep`](Self::sweep) every `period` until the handle is aborted.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.sweep(Instant::now()).await;
                if removed > 0 {
                    debug!(removed, "Swept expired rate windows");
                }
            }
        })
    }
}
