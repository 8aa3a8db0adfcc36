use std::collections::BTreeMap;

use statusgate_core::StatusReport;

/// Latest report per server identity.
///
/// An entry is replaced only by a strictly newer `timestamp`, so duplicate
/// or out-of-order answers from one polling round never move a row back.
#[derive(Debug, Default)]
pub struct ServerRegistry {
    servers: BTreeMap<String, StatusReport>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the report was stored.
    pub fn observe(&mut self, report: StatusReport) -> bool {
        match self.servers.get(&report.server) {
            Some(current) if report.timestamp <= current.timestamp => false,
            _ => {
                self.servers.insert(report.server.clone(), report);
                true
            }
        }
    }

    /// Reports ordered by server name.
    pub fn snapshot(&self) -> Vec<StatusReport> {
        self.servers.values().cloned().collect()
    }

    pub fn get(&self, server: &str) -> Option<&StatusReport> {
        self.servers.get(server)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn report(server: &str, uptime: &str, offset_secs: i64) -> StatusReport {
        StatusReport {
            message: "ok".into(),
            server: server.into(),
            uptime: uptime.into(),
            database: None,
            database_error: None,
            security: None,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn replaces_only_on_strictly_newer_timestamp() {
        let mut registry = ServerRegistry::new();
        assert!(registry.observe(report("pi-01", "10s", 10)));

        assert!(!registry.observe(report("pi-01", "same", 10)));
        assert_eq!(registry.get("pi-01").unwrap().uptime, "10s");

        assert!(!registry.observe(report("pi-01", "older", 5)));
        assert_eq!(registry.get("pi-01").unwrap().uptime, "10s");

        assert!(registry.observe(report("pi-01", "11s", 11)));
        assert_eq!(registry.get("pi-01").unwrap().uptime, "11s");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_is_sorted_by_server() {
        let mut registry = ServerRegistry::new();
        for name in ["pi-03", "pi-01", "pi-02"] {
            registry.observe(report(name, "1s", 0));
        }
        let names: Vec<_> = registry.snapshot().into_iter().map(|r| r.server).collect();
        assert_eq!(names, ["pi-01", "pi-02", "pi-03"]);
    }
}
