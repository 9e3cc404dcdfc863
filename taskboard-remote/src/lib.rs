//! taskboard-remote: the remote API seam and a simulated backend behind it.

pub mod api;
pub mod fixture;
pub mod simulated;

pub use api::{ApiResponse, Operation, RemoteApi, RemoteError};
pub use simulated::{ConfigError, SimulatedApi, SimulationConfig};
