//! UI-facing state: task form, filters, per-resource loading flags and
//! per-channel error strings.

use serde::{Deserialize, Serialize};

use crate::filters::{FilterPatch, TaskFilters};

/// Something that is fetched and has its own loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Tasks,
    Users,
    Projects,
}

/// Where an error is shown. `Form` is scoped to the open task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorChannel {
    Tasks,
    Users,
    Projects,
    Form,
}

impl From<Resource> for ErrorChannel {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Tasks => Self::Tasks,
            Resource::Users => Self::Users,
            Resource::Projects => Self::Projects,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    pub tasks: bool,
    pub users: bool,
    pub projects: bool,
}

impl LoadingFlags {
    pub fn get(&self, resource: Resource) -> bool {
        match resource {
            Resource::Tasks => self.tasks,
            Resource::Users => self.users,
            Resource::Projects => self.projects,
        }
    }

    pub fn set(&mut self, resource: Resource, value: bool) {
        match resource {
            Resource::Tasks => self.tasks = value,
            Resource::Users => self.users = value,
            Resource::Projects => self.projects = value,
        }
    }
}

/// One error string per channel. A new error replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorChannels {
    pub tasks: Option<String>,
    pub users: Option<String>,
    pub projects: Option<String>,
    pub form: Option<String>,
}

impl ErrorChannels {
    pub fn get(&self, channel: ErrorChannel) -> Option<&str> {
        self.slot(channel).as_deref()
    }

    pub fn set(&mut self, channel: ErrorChannel, message: impl Into<String>) {
        *self.slot_mut(channel) = Some(message.into());
    }

    pub fn clear(&mut self, channel: ErrorChannel) {
        *self.slot_mut(channel) = None;
    }

    fn slot(&self, channel: ErrorChannel) -> &Option<String> {
        match channel {
            ErrorChannel::Tasks => &self.tasks,
            ErrorChannel::Users => &self.users,
            ErrorChannel::Projects => &self.projects,
            ErrorChannel::Form => &self.form,
        }
    }

    fn slot_mut(&mut self, channel: ErrorChannel) -> &mut Option<String> {
        match channel {
            ErrorChannel::Tasks => &mut self.tasks,
            ErrorChannel::Users => &mut self.users,
            ErrorChannel::Projects => &mut self.projects,
            ErrorChannel::Form => &mut self.form,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFormState {
    pub is_open: bool,
    pub mode: FormMode,
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub task_form: TaskFormState,
    pub filters: TaskFilters,
    pub loading: LoadingFlags,
    pub errors: ErrorChannels,
}

impl UiState {
    pub fn open_form(&mut self, mode: FormMode, task_id: Option<String>) {
        self.task_form = TaskFormState {
            is_open: true,
            mode,
            task_id,
        };
    }

    /// Closing the form also drops whatever error it was showing.
    pub fn close_form(&mut self) {
        self.task_form = TaskFormState::default();
        self.errors.clear(ErrorChannel::Form);
    }

    pub fn set_form_mode(&mut self, mode: FormMode) {
        self.task_form.mode = mode;
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.filters = self.filters.merge(patch);
    }

    pub fn clear_filters(&mut self) {
        self.filters = TaskFilters::default();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
    }
}
