use anyhow::Result;
use async_trait::async_trait;

use crate::types::Role;

/// Pluggable credential check used by the login endpoint.
///
/// Implementations decide which role, if any, a username/password pair maps
/// to. The gateway never inspects the credentials itself.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Human-readable name of this verifier (for logs).
    fn name(&self) -> &str;

    /// Returns the granted role, or `None` when the credentials are rejected.
    async fn check_credentials(&self, username: &str, password: &str) -> Option<Role>;
}

/// Reachability check for the backing store.
///
/// A probe should open a connection, run a trivial query and close it. Any
/// error means "disconnected"; callers bound the call with their own timeout.
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Probe name (e.g., "mysql").
    fn name(&self) -> &str;

    async fn ping(&self) -> Result<()>;
}
