//! taskboard-sync: the request orchestrator.
//!
//! Turns user intents into the optimistic apply, remote call, then reconcile
//! or roll back sequence, with bounded retry and last-wins task fetches.

pub mod dashboard;
pub mod error;
pub mod retry;
pub mod state;

pub use dashboard::{Dashboard, FetchOutcome};
pub use error::SyncError;
pub use retry::RetryPolicy;
pub use state::AppState;
