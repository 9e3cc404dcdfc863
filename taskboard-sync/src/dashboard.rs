//! Dashboard: the request orchestrator over shared [`AppState`].
//!
//! Every intent follows the same shape:
//! 1. a synchronous optimistic step under the state lock
//! 2. the remote call, retried per [`RetryPolicy`], with the lock released
//! 3. a synchronous reconcile (success) or rollback (failure) step
//!
//! The lock is a `parking_lot::Mutex` and is only taken inside the
//! non-async `update` helper, so a guard never lives across an await point.
//!
//! Task fetches are last-issued-wins: each one takes a number from
//! `fetch_seq` and its result is dropped if a newer fetch has started since.
//! Creates, updates and deletes are never superseded. Two intents on the same
//! task id are not serialized here, but an update or delete aimed at a
//! placeholder whose create is still in flight is refused up front.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use taskboard_core::{
    EntityStore, ErrorChannel, FilterPatch, FormMode, OptimisticMarker, Resource, Task,
    TaskChanges, TaskDraft, TemporaryId, validate_changes, validate_draft,
};
use taskboard_remote::{Operation, RemoteApi};

use crate::error::SyncError;
use crate::retry::RetryPolicy;
use crate::state::AppState;

/// What happened to a fetch's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { count: usize },
    /// A newer task fetch was issued while this one was in flight.
    Superseded,
}

pub struct Dashboard<A> {
    api: Arc<A>,
    state: Arc<Mutex<AppState>>,
    retry: RetryPolicy,
    fetch_seq: Arc<AtomicU64>,
}

impl<A> Clone for Dashboard<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            retry: self.retry,
            fetch_seq: Arc::clone(&self.fetch_seq),
        }
    }
}

impl<A: RemoteApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        Self::from_arc(Arc::new(api))
    }

    pub fn from_arc(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(AppState::new())),
            retry: RetryPolicy::default(),
            fetch_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    // ---- Reads ----

    pub fn snapshot(&self) -> AppState {
        self.state.lock().clone()
    }

    pub fn visible_tasks(&self) -> Vec<Task> {
        self.state.lock().visible_tasks()
    }

    pub fn is_task_pending(&self, id: &str) -> bool {
        self.state.lock().is_task_pending(id)
    }

    pub fn loading(&self, resource: Resource) -> bool {
        self.state.lock().ui.loading.get(resource)
    }

    pub fn error(&self, channel: ErrorChannel) -> Option<String> {
        self.state.lock().ui.errors.get(channel).map(str::to_string)
    }

    // ---- Task intents ----

    /// Optimistically insert the draft under a temporary id, then swap in the
    /// server's entity or drop the placeholder.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<Task, SyncError> {
        self.update(|s| s.ui.errors.clear(ErrorChannel::Form));
        if let Err(err) = validate_draft(&draft) {
            return Err(self.report(ErrorChannel::Form, err.into()));
        }

        let temp = TemporaryId::mint();
        let temp_id = temp.id();
        let token = temp.token();

        let mut optimistic = draft.clone().into_task(temp_id.clone(), Utc::now());
        optimistic.optimistic = Some(OptimisticMarker {
            temporary_token: token.to_string(),
            is_saving: true,
        });
        self.update(|s| {
            s.tasks = s.tasks.upsert(optimistic);
            s.pending = s.pending.begin_create(&temp_id);
        });
        tracing::debug!(temp_id = %temp_id, "optimistic create applied");

        let api = self.api.as_ref();
        let draft = &draft;
        let result = self
            .retry
            .run(Operation::CreateTask, move || async move {
                api.create_task(draft)
                    .await?
                    .into_result(Operation::CreateTask)
            })
            .await;

        match result {
            Ok(task) => {
                self.update(|s| {
                    // The placeholder may have been wiped by a task fetch meanwhile.
                    let entry = s.find_by_token(token).unwrap_or_else(|| temp_id.clone());
                    s.tasks = s.tasks.remove(&entry).upsert(task.clone());
                    s.pending = s.pending.end_create(&temp_id);
                });
                tracing::debug!(temp_id = %temp_id, task_id = %task.id, "create confirmed");
                Ok(task)
            }
            Err(err) => {
                self.update(|s| {
                    if let Some(entry) = s.find_by_token(token) {
                        s.tasks = s.tasks.remove(&entry);
                    }
                    s.pending = s.pending.end_create(&temp_id);
                    s.ui.errors.set(ErrorChannel::Form, err.to_string());
                });
                tracing::warn!(temp_id = %temp_id, error = %err, "create rolled back");
                Err(err)
            }
        }
    }

    /// Apply `changes` locally, then overwrite with the server's copy or
    /// restore the pre-change snapshot.
    pub async fn update_task(&self, id: &str, changes: TaskChanges) -> Result<Task, SyncError> {
        self.update(|s| s.ui.errors.clear(ErrorChannel::Form));
        if let Err(err) = validate_changes(&changes) {
            return Err(self.report(ErrorChannel::Form, err.into()));
        }

        let snapshot = self.update(|s| -> Result<Task, SyncError> {
            let original = local_target(s, id)?;
            s.tasks = s.tasks.upsert(changes.apply(&original));
            s.pending = s.pending.begin_update(id, original.clone());
            Ok(original)
        });
        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(err) => return Err(self.report(ErrorChannel::Form, err)),
        };
        tracing::debug!(task_id = %id, "optimistic update applied");

        let api = self.api.as_ref();
        let changes = &changes;
        let result = self
            .retry
            .run(Operation::UpdateTask, move || async move {
                api.update_task(id, changes)
                    .await?
                    .into_result(Operation::UpdateTask)
            })
            .await;

        match result {
            Ok(task) => {
                self.update(|s| {
                    s.tasks = s.tasks.upsert(task.clone());
                    s.pending = s.pending.end_update(id);
                });
                tracing::debug!(task_id = %id, "update confirmed");
                Ok(task)
            }
            Err(err) => {
                self.update(|s| {
                    s.tasks = s.tasks.upsert(snapshot);
                    s.pending = s.pending.end_update(id);
                    s.ui.errors.set(ErrorChannel::Form, err.to_string());
                });
                tracing::warn!(task_id = %id, error = %err, "update rolled back");
                Err(err)
            }
        }
    }

    /// Remove the task locally, then either keep it gone or put it back.
    ///
    /// A rolled-back task is re-appended, so it may not return to its old
    /// position in store order.
    pub async fn delete_task(&self, id: &str) -> Result<(), SyncError> {
        self.update(|s| s.ui.errors.clear(ErrorChannel::Tasks));

        let original = self.update(|s| -> Result<Task, SyncError> {
            let original = local_target(s, id)?;
            s.pending = s.pending.begin_delete(id);
            s.tasks = s.tasks.remove(id);
            Ok(original)
        });
        let original = match original {
            Ok(original) => original,
            Err(err) => return Err(self.report(ErrorChannel::Tasks, err)),
        };
        tracing::debug!(task_id = %id, "optimistic delete applied");

        let api = self.api.as_ref();
        let result = self
            .retry
            .run(Operation::DeleteTask, move || async move {
                api.delete_task(id)
                    .await?
                    .into_ack(Operation::DeleteTask)
            })
            .await;

        match result {
            Ok(()) => {
                self.update(|s| s.pending = s.pending.end_delete(id));
                tracing::debug!(task_id = %id, "delete confirmed");
                Ok(())
            }
            Err(err) => {
                self.update(|s| {
                    s.tasks = s.tasks.upsert(original);
                    s.pending = s.pending.end_delete(id);
                    s.ui.errors.set(ErrorChannel::Tasks, err.to_string());
                });
                tracing::warn!(task_id = %id, error = %err, "delete rolled back");
                Err(err)
            }
        }
    }

    // ---- Fetches ----

    /// Fetch tasks with the current filters and replace the task store.
    ///
    /// If another task fetch starts before this one finishes, this result is
    /// discarded without touching the store, the loading flag or the error
    /// channel; the newer fetch owns those.
    pub async fn fetch_tasks(&self) -> Result<FetchOutcome, SyncError> {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let filters = self.update(|s| {
            s.ui.loading.set(Resource::Tasks, true);
            s.ui.errors.clear(ErrorChannel::Tasks);
            s.ui.filters.clone()
        });

        let api = self.api.as_ref();
        let filters = &filters;
        let result = self
            .retry
            .run(Operation::FetchTasks, move || async move {
                api.fetch_tasks(filters)
                    .await?
                    .into_result(Operation::FetchTasks)
            })
            .await;

        self.update(|s| {
            let latest = self.fetch_seq.load(Ordering::SeqCst);
            if latest != seq {
                tracing::info!(seq, latest, "discarding superseded task fetch");
                return Ok(FetchOutcome::Superseded);
            }
            finish_fetch(s, Resource::Tasks, result, |s, tasks| {
                s.tasks = EntityStore::replace_all(tasks);
            })
        })
    }

    pub async fn fetch_users(&self) -> Result<FetchOutcome, SyncError> {
        self.begin_fetch(Resource::Users);
        let api = self.api.as_ref();
        let result = self
            .retry
            .run(Operation::FetchUsers, move || async move {
                api.fetch_users().await?.into_result(Operation::FetchUsers)
            })
            .await;
        self.update(|s| {
            finish_fetch(s, Resource::Users, result, |s, users| {
                s.users = EntityStore::replace_all(users);
            })
        })
    }

    pub async fn fetch_projects(&self) -> Result<FetchOutcome, SyncError> {
        self.begin_fetch(Resource::Projects);
        let api = self.api.as_ref();
        let result = self
            .retry
            .run(Operation::FetchProjects, move || async move {
                api.fetch_projects()
                    .await?
                    .into_result(Operation::FetchProjects)
            })
            .await;
        self.update(|s| {
            finish_fetch(s, Resource::Projects, result, |s, projects| {
                s.projects = EntityStore::replace_all(projects);
            })
        })
    }

    /// Initial load: users, projects and tasks concurrently. Each failure is
    /// already on its own channel; the first one is returned.
    pub async fn load_all(&self) -> Result<(), SyncError> {
        let (users, projects, tasks) =
            tokio::join!(self.fetch_users(), self.fetch_projects(), self.fetch_tasks());
        users?;
        projects?;
        tasks?;
        Ok(())
    }

    // ---- Filters and form ----

    /// Merge `patch` into the filters and refetch tasks.
    pub async fn set_filters(&self, patch: FilterPatch) -> Result<FetchOutcome, SyncError> {
        self.update(|s| s.ui.set_filters(patch));
        self.fetch_tasks().await
    }

    pub async fn clear_filters(&self) -> Result<FetchOutcome, SyncError> {
        self.update(|s| s.ui.clear_filters());
        self.fetch_tasks().await
    }

    pub async fn set_search(&self, search: impl Into<String>) -> Result<FetchOutcome, SyncError> {
        let search = search.into();
        self.update(|s| s.ui.set_search(search));
        self.fetch_tasks().await
    }

    pub fn open_form(&self, mode: FormMode, task_id: Option<String>) {
        self.update(|s| s.ui.open_form(mode, task_id));
    }

    pub fn close_form(&self) {
        self.update(|s| s.ui.close_form());
    }

    // ---- Internals ----

    fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state)
    }

    fn begin_fetch(&self, resource: Resource) {
        self.update(|s| {
            s.ui.loading.set(resource, true);
            s.ui.errors.clear(resource.into());
        });
    }

    fn report(&self, channel: ErrorChannel, err: SyncError) -> SyncError {
        tracing::debug!(?channel, error = %err, "rejected locally");
        self.update(|s| s.ui.errors.set(channel, err.to_string()));
        err
    }
}

/// The stored task an update or delete may act on. A placeholder still
/// waiting on its create has no server id yet, so it is refused.
fn local_target(state: &AppState, id: &str) -> Result<Task, SyncError> {
    if state.pending.is_pending_create(id) {
        return Err(SyncError::CreatePending { id: id.to_string() });
    }
    state
        .tasks
        .get(id)
        .cloned()
        .ok_or_else(|| SyncError::TaskNotFound { id: id.to_string() })
}

fn finish_fetch<T>(
    state: &mut AppState,
    resource: Resource,
    result: Result<Vec<T>, SyncError>,
    apply: impl FnOnce(&mut AppState, Vec<T>),
) -> Result<FetchOutcome, SyncError> {
    state.ui.loading.set(resource, false);
    match result {
        Ok(items) => {
            let count = items.len();
            apply(state, items);
            tracing::info!(?resource, count, "fetch applied");
            Ok(FetchOutcome::Applied { count })
        }
        Err(err) => {
            state.ui.errors.set(resource.into(), err.to_string());
            Err(err)
        }
    }
}
