//! Simulated remote backend.
//!
//! An in-memory server with injectable latency and failures, standing in for
//! the real API in the CLI and in tests:
//!
//! - **Latency**: each call sleeps a duration drawn from
//!   `latency_min_ms..=latency_max_ms`.
//! - **Failure rate**: probability that a call fails with
//!   [`RemoteError::Unavailable`] after the delay.
//!
//! Draws come from a seeded `StdRng`, so a given seed replays the same
//! sequence of delays and failures.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use taskboard_core::{Project, Task, TaskChanges, TaskDraft, TaskFilters, User};
use thiserror::Error;

use crate::api::{ApiResponse, Operation, RemoteApi, RemoteError};
use crate::fixture;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    /// Probability of failing a call (0.0 - 1.0).
    pub failure_rate: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: 150,
            latency_max_ms: 600,
            failure_rate: 0.1,
            seed: 7,
        }
    }
}

impl SimulationConfig {
    /// No latency and no failures.
    pub fn instant() -> Self {
        Self {
            latency_min_ms: 0,
            latency_max_ms: 0,
            failure_rate: 0.0,
            seed: 0,
        }
    }

    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate;
        self
    }

    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_min_ms = min_ms;
        self.latency_max_ms = max_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::FailureRate(self.failure_rate));
        }
        if self.latency_min_ms > self.latency_max_ms {
            return Err(ConfigError::LatencyRange {
                min: self.latency_min_ms,
                max: self.latency_max_ms,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failure_rate must be within 0.0..=1.0, got {0}")]
    FailureRate(f64),
    #[error("latency_min_ms ({min}) exceeds latency_max_ms ({max})")]
    LatencyRange { min: u64, max: u64 },
}

#[derive(Debug)]
struct Backend {
    tasks: Vec<Task>,
    users: Vec<User>,
    projects: Vec<Project>,
    next_id: u64,
    rng: StdRng,
}

#[derive(Debug)]
pub struct SimulatedApi {
    config: SimulationConfig,
    backend: Mutex<Backend>,
}

impl SimulatedApi {
    /// Backend preloaded with the demo projects, users and tasks.
    pub fn seeded(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_data(config, fixture::projects(), fixture::users(), fixture::tasks())
    }

    pub fn with_data(
        config: SimulationConfig,
        projects: Vec<Project>,
        users: Vec<User>,
        tasks: Vec<Task>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let next_id = tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            backend: Mutex::new(Backend {
                tasks,
                users,
                projects,
                next_id,
                rng,
            }),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Server-side view of the tasks, for assertions and diagnostics.
    pub fn server_tasks(&self) -> Vec<Task> {
        self.backend.lock().tasks.clone()
    }

    // The lock is released before the caller sleeps.
    fn roll(&self) -> (Duration, bool) {
        let mut backend = self.backend.lock();
        let delay_ms = if self.config.latency_max_ms == 0 {
            0
        } else {
            backend
                .rng
                .random_range(self.config.latency_min_ms..=self.config.latency_max_ms)
        };
        let fail = self.config.failure_rate > 0.0 && backend.rng.random_bool(self.config.failure_rate);
        (Duration::from_millis(delay_ms), fail)
    }

    async fn simulate(&self, operation: Operation) -> Result<(), RemoteError> {
        let (delay, fail) = self.roll();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            tracing::debug!(%operation, "simulated failure");
            return Err(RemoteError::Unavailable(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for SimulatedApi {
    async fn fetch_tasks(&self, filters: &TaskFilters) -> Result<ApiResponse<Vec<Task>>, RemoteError> {
        self.simulate(Operation::FetchTasks).await?;
        let backend = self.backend.lock();
        let tasks = backend
            .tasks
            .iter()
            .filter(|t| filters.matches(t))
            .cloned()
            .collect();
        Ok(ApiResponse::ok(tasks))
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<ApiResponse<Task>, RemoteError> {
        self.simulate(Operation::CreateTask).await?;
        let mut backend = self.backend.lock();
        let id = backend.next_id.to_string();
        backend.next_id += 1;
        let task = draft.clone().into_task(id, Utc::now());
        backend.tasks.push(task.clone());
        Ok(ApiResponse::ok(task))
    }

    async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> Result<ApiResponse<Task>, RemoteError> {
        self.simulate(Operation::UpdateTask).await?;
        let mut backend = self.backend.lock();
        let Some(slot) = backend.tasks.iter_mut().find(|t| t.id == id) else {
            return Err(RemoteError::NotFound(id.to_string()));
        };
        *slot = changes.apply(slot);
        Ok(ApiResponse::ok(slot.clone()))
    }

    async fn delete_task(&self, id: &str) -> Result<ApiResponse<()>, RemoteError> {
        self.simulate(Operation::DeleteTask).await?;
        let mut backend = self.backend.lock();
        let Some(pos) = backend.tasks.iter().position(|t| t.id == id) else {
            return Err(RemoteError::NotFound(id.to_string()));
        };
        backend.tasks.remove(pos);
        Ok(ApiResponse::ok(()))
    }

    async fn fetch_users(&self) -> Result<ApiResponse<Vec<User>>, RemoteError> {
        self.simulate(Operation::FetchUsers).await?;
        Ok(ApiResponse::ok(self.backend.lock().users.clone()))
    }

    async fn fetch_projects(&self) -> Result<ApiResponse<Vec<Project>>, RemoteError> {
        self.simulate(Operation::FetchProjects).await?;
        Ok(ApiResponse::ok(self.backend.lock().projects.clone()))
    }
}
