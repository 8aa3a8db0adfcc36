//! statusgate HTTP gateway
//!
//! Rate limiting, API keys and session tokens in front of the status,
//! login, health and admin metrics endpoints.

pub mod auth;
pub mod credentials;
pub mod db_probe;
pub mod error;
pub mod health_api;
pub mod host;
pub mod identity;
pub mod login_api;
pub mod metrics_api;
pub mod policy;
pub mod rate_limit;
pub mod server;
pub mod status;
pub mod token;

pub use auth::{Principal, RequireSession};
pub use credentials::CredentialStore;
pub use error::ApiError;
pub use identity::{hash_password, AdminVerifier};
pub use policy::{Guard, RoutePolicy, RoutingOptions};
pub use rate_limit::{Admission, EndpointGroup, RateLimitPolicy, RateLimiter};
pub use server::{build_router, start_server, GatewayState};
pub use status::StatusReporter;
pub use token::{IssuedToken, TokenError, TokenService};
