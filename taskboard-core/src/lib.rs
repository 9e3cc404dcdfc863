//! taskboard-core: domain model and pure state for the task dashboard.
//!
//! Nothing in this crate performs I/O or awaits. The request orchestration
//! that drives these values lives in `taskboard-sync`.

pub mod entity_store;
pub mod filters;
pub mod model;
pub mod pending;
pub mod temp_id;
pub mod ui;
pub mod validation;
pub mod view;

pub use entity_store::{Entity, EntityStore};
pub use filters::{FilterPatch, SortDirection, SortKey, SortSpec, TaskFilters};
pub use model::{
    OptimisticMarker, ParseEnumError, Priority, Project, Severity, Subtask, Task, TaskChanges,
    TaskDetails, TaskDraft, TaskStatus, TaskType, User,
};
pub use pending::PendingOps;
pub use temp_id::{is_temporary_id, TemporaryId, TEMP_ID_PREFIX};
pub use ui::{ErrorChannel, ErrorChannels, FormMode, LoadingFlags, Resource, TaskFormState, UiState};
pub use validation::{validate_changes, validate_draft, ValidationError};
pub use view::{users_for_project, visible_tasks, with_relations, TaskOrder, TaskRow};
