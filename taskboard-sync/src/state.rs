use taskboard_core::{EntityStore, PendingOps, Project, Task, UiState, User, visible_tasks};

/// Everything the dashboard renders from.
///
/// Each collection is swapped for a new value on every change; nothing is
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub tasks: EntityStore<Task>,
    pub users: EntityStore<User>,
    pub projects: EntityStore<Project>,
    pub pending: PendingOps,
    pub ui: UiState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The filtered, sorted task list for the current filters.
    pub fn visible_tasks(&self) -> Vec<Task> {
        visible_tasks(&self.tasks, &self.ui.filters, &self.pending)
    }

    pub fn is_task_pending(&self, id: &str) -> bool {
        self.pending.is_pending(id)
    }

    /// Id of the optimistic entry carrying `token`, if it is still in the store.
    pub fn find_by_token(&self, token: &str) -> Option<String> {
        self.tasks
            .find(|t| t.temporary_token() == Some(token))
            .map(|t| t.id.clone())
    }
}
