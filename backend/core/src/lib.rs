pub mod error;
pub mod traits;
pub mod types;

pub use error::{DependencyUnavailable, GateError};
pub use traits::{DatabaseProbe, IdentityVerifier};
pub use types::{Claims, DatabaseState, HealthReport, Role, StatusReport};
