//! Terminal dashboard for a statusgate cluster.

pub mod poller;
pub mod registry;
pub mod terminal_output;

pub use poller::{DashboardPoller, PollerOptions, RoundSummary};
pub use registry::ServerRegistry;
