//! Scripted fake of the remote API for orchestrator tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use taskboard_core::{Priority, Project, Task, TaskChanges, TaskDraft, TaskFilters, TaskStatus, User};
use taskboard_remote::{ApiResponse, Operation, RemoteApi, RemoteError};

#[derive(Debug, Default)]
struct Script {
    tasks: Vec<Task>,
    users: Vec<User>,
    projects: Vec<Project>,
    next_id: u64,
    failures: HashMap<Operation, u32>,
    rejections: HashMap<Operation, u32>,
    delays: HashMap<Operation, VecDeque<Duration>>,
    calls: HashMap<Operation, u32>,
}

enum Verdict {
    Fail,
    Reject,
    Serve,
}

/// In-memory server whose failures, rejections and latencies are set per
/// operation by the test.
#[derive(Debug)]
pub struct ScriptedApi {
    script: Mutex<Script>,
}

impl ScriptedApi {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            script: Mutex::new(Script {
                tasks,
                next_id: 42,
                ..Script::default()
            }),
        }
    }

    pub fn with_directory(self, users: Vec<User>, projects: Vec<Project>) -> Self {
        {
            let mut script = self.script.lock();
            script.users = users;
            script.projects = projects;
        }
        self
    }

    /// The next `n` calls of `op` fail at the network level.
    pub fn fail_next(&self, op: Operation, n: u32) {
        self.script.lock().failures.insert(op, n);
    }

    pub fn fail_always(&self, op: Operation) {
        self.fail_next(op, u32::MAX);
    }

    /// The next `n` calls of `op` answer with `success: false`.
    pub fn reject_next(&self, op: Operation, n: u32) {
        self.script.lock().rejections.insert(op, n);
    }

    /// Queue a latency for the next call of `op`.
    pub fn delay_next(&self, op: Operation, delay: Duration) {
        self.script
            .lock()
            .delays
            .entry(op)
            .or_default()
            .push_back(delay);
    }

    pub fn calls(&self, op: Operation) -> u32 {
        self.script.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn server_tasks(&self) -> Vec<Task> {
        self.script.lock().tasks.clone()
    }

    async fn begin(&self, op: Operation) -> Verdict {
        let (delay, verdict) = {
            let mut script = self.script.lock();
            *script.calls.entry(op).or_default() += 1;
            let delay = script.delays.get_mut(&op).and_then(VecDeque::pop_front);
            let verdict = if take(&mut script.failures, op) {
                Verdict::Fail
            } else if take(&mut script.rejections, op) {
                Verdict::Reject
            } else {
                Verdict::Serve
            };
            (delay, verdict)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        verdict
    }
}

fn take(counts: &mut HashMap<Operation, u32>, op: Operation) -> bool {
    match counts.get_mut(&op) {
        Some(n) if *n > 0 => {
            if *n != u32::MAX {
                *n -= 1;
            }
            true
        }
        _ => false,
    }
}

macro_rules! scripted {
    ($self:ident, $op:expr, $serve:expr) => {
        match $self.begin($op).await {
            Verdict::Fail => Err(RemoteError::Unavailable($op)),
            Verdict::Reject => Ok(ApiResponse::rejected()),
            Verdict::Serve => $serve,
        }
    };
}

#[async_trait]
impl RemoteApi for ScriptedApi {
    async fn fetch_tasks(&self, filters: &TaskFilters) -> Result<ApiResponse<Vec<Task>>, RemoteError> {
        scripted!(self, Operation::FetchTasks, {
            let script = self.script.lock();
            let tasks = script.tasks.iter().filter(|t| filters.matches(t)).cloned().collect();
            Ok(ApiResponse::ok(tasks))
        })
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<ApiResponse<Task>, RemoteError> {
        scripted!(self, Operation::CreateTask, {
            let mut script = self.script.lock();
            let task = draft.clone().into_task(script.next_id.to_string(), Utc::now());
            script.next_id += 1;
            script.tasks.push(task.clone());
            Ok(ApiResponse::ok(task))
        })
    }

    async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> Result<ApiResponse<Task>, RemoteError> {
        scripted!(self, Operation::UpdateTask, {
            let mut script = self.script.lock();
            match script.tasks.iter_mut().find(|t| t.id == id) {
                Some(slot) => {
                    *slot = changes.apply(slot);
                    Ok(ApiResponse::ok(slot.clone()))
                }
                None => Err(RemoteError::NotFound(id.to_string())),
            }
        })
    }

    async fn delete_task(&self, id: &str) -> Result<ApiResponse<()>, RemoteError> {
        scripted!(self, Operation::DeleteTask, {
            let mut script = self.script.lock();
            script.tasks.retain(|t| t.id != id);
            Ok(ApiResponse::ok(()))
        })
    }

    async fn fetch_users(&self) -> Result<ApiResponse<Vec<User>>, RemoteError> {
        scripted!(self, Operation::FetchUsers, {
            Ok(ApiResponse::ok(self.script.lock().users.clone()))
        })
    }

    async fn fetch_projects(&self) -> Result<ApiResponse<Vec<Project>>, RemoteError> {
        scripted!(self, Operation::FetchProjects, {
            Ok(ApiResponse::ok(self.script.lock().projects.clone()))
        })
    }
}

/// The two-task store used across the scenarios.
pub fn seed_tasks() -> Vec<Task> {
    let created = Utc
        .with_ymd_and_hms(2026, 1, 5, 12, 0, 0)
        .single()
        .unwrap();
    vec![
        Task::new("1", "Fix bug")
            .with_status(TaskStatus::Todo)
            .with_priority(Priority::High)
            .with_description("Crash on save")
            .with_created_at(created),
        Task::new("2", "Add login")
            .with_status(TaskStatus::Done)
            .with_priority(Priority::Low)
            .with_created_at(created),
    ]
}

pub fn user(id: &str, name: &str, projects: &[&str]) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{id}@example.com"),
        project_ids: projects.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
    }
}
