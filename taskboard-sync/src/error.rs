use taskboard_core::{ErrorChannel, ValidationError};
use taskboard_remote::{Operation, RemoteError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// The target id is not in the local store. Never retried.
    #[error("Task not found: {id}")]
    TaskNotFound { id: String },

    /// The target is a placeholder whose create has not resolved. Never retried.
    #[error("Task {id} is still being created")]
    CreatePending { id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The remote call failed on its last attempt.
    #[error("{source}")]
    Remote {
        operation: Operation,
        attempts: u32,
        source: RemoteError,
    },
}

impl SyncError {
    /// Channel the error is reported on for a given operation.
    pub fn channel_for(operation: Operation) -> ErrorChannel {
        match operation {
            Operation::CreateTask | Operation::UpdateTask => ErrorChannel::Form,
            Operation::DeleteTask | Operation::FetchTasks => ErrorChannel::Tasks,
            Operation::FetchUsers => ErrorChannel::Users,
            Operation::FetchProjects => ErrorChannel::Projects,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}
