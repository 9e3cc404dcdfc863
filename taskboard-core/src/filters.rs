//! Task list filters and sort settings.
//!
//! `None` on an equality filter means "all" (unconstrained). An empty search
//! string means no search.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{ParseEnumError, Task, TaskStatus, TaskType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    CreatedAt,
    DueDate,
    Priority,
    Status,
    Title,
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "createdat" | "created" => Ok(Self::CreatedAt),
            "duedate" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "title" => Ok(Self::Title),
            _ => Err(ParseEnumError {
                kind: "sort key",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilters {
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub search: String,
    pub sort: Option<SortSpec>,
}

impl TaskFilters {
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_assignee(mut self, assignee_id: impl Into<String>) -> Self {
        self.assignee_id = Some(assignee_id.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Equality filters, then case-insensitive substring search over title
    /// or description. Sorting is not a predicate and is ignored here.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(project_id) = &self.project_id {
            if task.project_id.as_ref() != Some(project_id) {
                return false;
            }
        }
        if let Some(assignee_id) = &self.assignee_id {
            if task.assignee_id.as_ref() != Some(assignee_id) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.task_type.is_some_and(|t| t != task.task_type()) {
            return false;
        }
        if !self.search.is_empty() {
            let q = self.search.to_lowercase();
            return task.title.to_lowercase().contains(&q)
                || task.description.to_lowercase().contains(&q);
        }
        true
    }

    /// Overlay the fields present in `patch`.
    #[must_use]
    pub fn merge(&self, patch: FilterPatch) -> Self {
        let mut next = self.clone();
        if let Some(project_id) = patch.project_id {
            next.project_id = project_id;
        }
        if let Some(assignee_id) = patch.assignee_id {
            next.assignee_id = assignee_id;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(task_type) = patch.task_type {
            next.task_type = task_type;
        }
        if let Some(search) = patch.search {
            next.search = search;
        }
        if let Some(sort) = patch.sort {
            next.sort = sort;
        }
        next
    }
}

/// A partial filter change. Outer `None` leaves the field alone; inner
/// `None` resets it to "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub project_id: Option<Option<String>>,
    pub assignee_id: Option<Option<String>>,
    pub status: Option<Option<TaskStatus>>,
    pub task_type: Option<Option<TaskType>>,
    pub search: Option<String>,
    pub sort: Option<Option<SortSpec>>,
}

impl FilterPatch {
    pub fn status(status: Option<TaskStatus>) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn project(project_id: Option<String>) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskDetails;

    #[test]
    fn unconstrained_matches_everything() {
        let f = TaskFilters::default();
        assert!(f.matches(&Task::new("1", "anything")));
    }

    #[test]
    fn equality_filters_require_exact_values() {
        let task = Task::new("1", "Fix bug")
            .with_project("p1")
            .with_assignee("u1")
            .with_status(TaskStatus::Review);

        assert!(TaskFilters::default().with_project("p1").matches(&task));
        assert!(!TaskFilters::default().with_project("p2").matches(&task));
        assert!(!TaskFilters::default().with_assignee("u2").matches(&task));
        assert!(TaskFilters::default().with_status(TaskStatus::Review).matches(&task));
        assert!(!TaskFilters::default().with_status(TaskStatus::Done).matches(&task));
        assert!(TaskFilters::default().with_task_type(TaskType::Bug).matches(&task));
        assert!(!TaskFilters::default().with_task_type(TaskType::Research).matches(&task));

        // a concrete project filter never matches a task without one
        let loose = Task::new("2", "Loose");
        assert!(!TaskFilters::default().with_project("p1").matches(&loose));
    }

    #[test]
    fn search_is_case_insensitive_over_title_or_description() {
        let task = Task::new("1", "Add Login")
            .with_description("OAuth flow for the Dashboard")
            .with_details(TaskDetails::empty(TaskType::Feature));

        assert!(TaskFilters::default().with_search("login").matches(&task));
        assert!(TaskFilters::default().with_search("DASHBOARD").matches(&task));
        assert!(!TaskFilters::default().with_search("logout").matches(&task));
    }

    #[test]
    fn merge_only_touches_patched_fields() {
        let base = TaskFilters::default()
            .with_project("p1")
            .with_status(TaskStatus::Todo)
            .with_search("bug");

        let merged = base.merge(FilterPatch::status(None));
        assert_eq!(merged.status, None);
        assert_eq!(merged.project_id.as_deref(), Some("p1"));
        assert_eq!(merged.search, "bug");

        let merged = merged.merge(FilterPatch::search(""));
        assert_eq!(merged.search, "");
    }

    #[test]
    fn sort_keys_parse_from_common_spellings() {
        assert_eq!("createdAt".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
        assert_eq!("due-date".parse::<SortKey>().unwrap(), SortKey::DueDate);
        assert_eq!("PRIORITY".parse::<SortKey>().unwrap(), SortKey::Priority);
        assert!("size".parse::<SortKey>().is_err());
    }
}
