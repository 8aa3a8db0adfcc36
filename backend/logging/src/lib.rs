//! Telemetry and structured logging components for statusgate.
//!
//! Handles log redaction, console/JSON output, file rotation, and the access
//! audit trail written by the admission gateway.

pub mod access_logger;
pub mod logger;
pub mod redact;

pub use access_logger::{AccessEvent, AccessLogEntry, AccessLogger};
pub use logger::{LoggingOptions, init_logger};
pub use redact::redact_sensitive_data;
