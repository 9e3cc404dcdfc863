use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskboard_core::{Project, Task, TaskChanges, TaskDraft, TaskFilters, User};
use thiserror::Error;

/// Remote calls the dashboard makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    FetchTasks,
    FetchUsers,
    FetchProjects,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchTasks => "fetch tasks",
            Self::FetchUsers => "fetch users",
            Self::FetchProjects => "fetch projects",
            Self::CreateTask => "create task",
            Self::UpdateTask => "update task",
            Self::DeleteTask => "delete task",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope every endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            data: None,
        }
    }

    /// A non-success envelope (or one missing its payload) becomes an error,
    /// so callers handle it exactly like a failed call.
    pub fn into_result(self, operation: Operation) -> Result<T, RemoteError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(RemoteError::Rejected(operation)),
        }
    }

    /// Like [`into_result`](Self::into_result) for endpoints that only
    /// acknowledge; the payload is not required.
    pub fn into_ack(self, operation: Operation) -> Result<(), RemoteError> {
        if self.success {
            Ok(())
        } else {
            Err(RemoteError::Rejected(operation))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The server answered, but not with success.
    #[error("Failed to {0}")]
    Rejected(Operation),
    #[error("Task not found: {0}")]
    NotFound(String),
    /// Network-level failure; nothing came back.
    #[error("Network error: could not {0}")]
    Unavailable(Operation),
}

/// The remote task API, consumed as an opaque collaborator.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn fetch_tasks(&self, filters: &TaskFilters) -> Result<ApiResponse<Vec<Task>>, RemoteError>;

    async fn create_task(&self, draft: &TaskDraft) -> Result<ApiResponse<Task>, RemoteError>;

    async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> Result<ApiResponse<Task>, RemoteError>;

    async fn delete_task(&self, id: &str) -> Result<ApiResponse<()>, RemoteError>;

    async fn fetch_users(&self) -> Result<ApiResponse<Vec<User>>, RemoteError>;

    async fn fetch_projects(&self) -> Result<ApiResponse<Vec<Project>>, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_envelopes_become_rejections() {
        assert_eq!(ApiResponse::ok(5).into_result(Operation::FetchTasks), Ok(5));
        assert_eq!(
            ApiResponse::<u8>::rejected().into_result(Operation::CreateTask),
            Err(RemoteError::Rejected(Operation::CreateTask))
        );

        let missing = ApiResponse::<u8> {
            success: true,
            data: None,
        };
        assert!(missing.into_result(Operation::UpdateTask).is_err());
    }

    #[test]
    fn rejection_message_names_the_operation() {
        assert_eq!(
            RemoteError::Rejected(Operation::DeleteTask).to_string(),
            "Failed to delete task"
        );
    }
}
