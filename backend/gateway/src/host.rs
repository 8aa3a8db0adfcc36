//! Host metrics for the admin endpoint, read through `sysinfo`.

use serde::Serialize;
use sysinfo::System;

/// Hostname, or `"unknown"` when the OS does not report one.
pub fn hostname() -> String {
    System::host_name().unwrap_or_else(|| "unknown".to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub process_rss_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMetrics {
    pub server: String,
    pub memory: MemoryUsage,
    /// 1, 5 and 15 minute load averages.
    pub loadavg: [f64; 3],
}

impl HostMetrics {
    /// Blocking: reads `/proc` (or the platform equivalent).
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let pid = sysinfo::get_current_pid().ok();
        if let Some(pid) = pid {
            sys.refresh_process(pid);
        }
        let process_rss_bytes = pid
            .and_then(|pid| sys.process(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        let load = System::load_average();

        Self {
            server: hostname(),
            memory: MemoryUsage {
                total_bytes: sys.total_memory(),
                used_bytes: sys.used_memory(),
                available_bytes: sys.available_memory(),
                process_rss_bytes,
            },
            loadavg: [load.one, load.five, load.fifteen],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_something_sensible() {
        let metrics = HostMetrics::collect();
        assert!(!metrics.server.is_empty());
        assert!(metrics.memory.total_bytes >= metrics.memory.available_bytes);
        assert!(metrics.loadavg.iter().all(|l| *l >= 0.0));
    }

    #[test]
    fn serializes_camel_case() {
        let metrics = HostMetrics {
            server: "pi-02".into(),
            memory: MemoryUsage {
                total_bytes: 4,
                used_bytes: 3,
                available_bytes: 1,
                process_rss_bytes: 2,
            },
            loadavg: [0.5, 0.25, 0.1],
        };
        let v = serde_json::to_value(&metrics).unwrap();
        assert_eq!(v["memory"]["processRssBytes"], 2);
        assert_eq!(v["loadavg"][1], 0.25);
    }
}
