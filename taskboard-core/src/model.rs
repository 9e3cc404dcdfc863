//! Task, user and project model for the dashboard.
//!
//! Tasks that exist only on the client (created but not yet confirmed by the
//! remote API) carry an [`OptimisticMarker`]. Everything else is the plain
//! server shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a status/priority/type/severity string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [Self::Todo, Self::InProgress, Self::Review, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Done => "Done",
        }
    }

    /// Workflow position, Todo=1 through Done=4.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Todo => 1,
            Self::InProgress => 2,
            Self::Review => 3,
            Self::Done => 4,
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "in progress" | "in_progress" | "in-progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Critical=4, High=3, Medium=2, Low=1.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseEnumError::new("priority", s)),
        }
    }
}

/// Bug severity. Medium unless the submitter picks something else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseEnumError::new("severity", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Bug,
    Feature,
    Enhancement,
    Research,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [Self::Bug, Self::Feature, Self::Enhancement, Self::Research];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "Bug",
            Self::Feature => "Feature",
            Self::Enhancement => "Enhancement",
            Self::Research => "Research",
        }
    }
}

impl FromStr for TaskType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "enhancement" => Ok(Self::Enhancement),
            "research" => Ok(Self::Research),
            _ => Err(ParseEnumError::new("task type", s)),
        }
    }
}

macro_rules! display_via_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_via_as_str!(TaskStatus, Priority, TaskType);

/// Fields that only make sense for one task type.
///
/// The variant *is* the task type, so a task can never carry acceptance
/// criteria while being a Bug, etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "taskType", rename_all_fields = "camelCase")]
pub enum TaskDetails {
    Bug {
        #[serde(default)]
        severity: Severity,
        #[serde(default)]
        steps_to_reproduce: String,
    },
    Feature {
        #[serde(default)]
        business_value: String,
        #[serde(default)]
        acceptance_criteria: Vec<String>,
    },
    Enhancement {
        #[serde(default)]
        current_behavior: String,
        #[serde(default)]
        proposed_behavior: String,
    },
    Research {
        #[serde(default)]
        research_questions: Vec<String>,
        #[serde(default)]
        expected_outcomes: String,
    },
}

impl TaskDetails {
    /// Empty details for the given type.
    pub fn empty(task_type: TaskType) -> Self {
        match task_type {
            TaskType::Bug => Self::Bug {
                severity: Severity::default(),
                steps_to_reproduce: String::new(),
            },
            TaskType::Feature => Self::Feature {
                business_value: String::new(),
                acceptance_criteria: Vec::new(),
            },
            TaskType::Enhancement => Self::Enhancement {
                current_behavior: String::new(),
                proposed_behavior: String::new(),
            },
            TaskType::Research => Self::Research {
                research_questions: Vec::new(),
                expected_outcomes: String::new(),
            },
        }
    }

    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Bug { .. } => TaskType::Bug,
            Self::Feature { .. } => TaskType::Feature,
            Self::Enhancement { .. } => TaskType::Enhancement,
            Self::Research { .. } => TaskType::Research,
        }
    }
}

impl Default for TaskDetails {
    fn default() -> Self {
        Self::empty(TaskType::Bug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Client-only bookkeeping on a task that the server has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimisticMarker {
    /// Correlates the eventual create success/failure with this entry.
    pub temporary_token: String,
    pub is_saving: bool,
}

/// Core task type, as stored in the entity store and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,

    pub priority: Priority,
    pub status: TaskStatus,

    pub project_id: Option<String>,
    pub assignee_id: Option<String>,

    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub details: TaskDetails,

    #[serde(default)]
    pub subtasks: Vec<Subtask>,

    /// Present only on speculative entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<OptimisticMarker>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            project_id: None,
            assignee_id: None,
            due_date: None,
            created_at: Utc::now(),
            details: TaskDetails::default(),
            subtasks: Vec::new(),
            optimistic: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
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

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_details(mut self, details: TaskDetails) -> Self {
        self.details = details;
        self
    }

    pub fn task_type(&self) -> TaskType {
        self.details.task_type()
    }

    pub fn is_optimistic(&self) -> bool {
        self.optimistic.is_some()
    }

    pub fn is_saving(&self) -> bool {
        self.optimistic.as_ref().is_some_and(|m| m.is_saving)
    }

    pub fn temporary_token(&self) -> Option<&str> {
        self.optimistic.as_ref().map(|m| m.temporary_token.as_str())
    }
}

/// Fields submitted from the task form when creating a task.
///
/// Has no id, timestamp or optimistic marker: those belong to whoever
/// materializes the draft (the orchestrator locally, the server remotely).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub details: TaskDetails,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            project_id: None,
            assignee_id: None,
            due_date: None,
            details: TaskDetails::default(),
            subtasks: Vec::new(),
        }
    }
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.details = TaskDetails::empty(task_type);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
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

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Materialize as a confirmed task (server side).
    pub fn into_task(self, id: impl Into<String>, created_at: DateTime<Utc>) -> Task {
        Task {
            id: id.into(),
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            project_id: self.project_id,
            assignee_id: self.assignee_id,
            due_date: self.due_date,
            created_at,
            details: self.details,
            subtasks: self.subtasks,
            optimistic: None,
        }
    }
}

/// A partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<TaskDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskChanges {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Return `task` with these changes laid over it. Id, creation time and
    /// any optimistic marker are never touched.
    pub fn apply(&self, task: &Task) -> Task {
        let mut out = task.clone();
        if let Some(title) = &self.title {
            out.title = title.clone();
        }
        if let Some(description) = &self.description {
            out.description = description.clone();
        }
        if let Some(priority) = self.priority {
            out.priority = priority;
        }
        if let Some(status) = self.status {
            out.status = status;
        }
        if let Some(project_id) = &self.project_id {
            out.project_id = project_id.clone();
        }
        if let Some(assignee_id) = &self.assignee_id {
            out.assignee_id = assignee_id.clone();
        }
        if let Some(due_date) = self.due_date {
            out.due_date = due_date;
        }
        if let Some(details) = &self.details {
            out.details = details.clone();
        }
        if let Some(subtasks) = &self.subtasks {
            out.subtasks = subtasks.clone();
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Projects this user can be assigned work in.
    #[serde(default)]
    pub project_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}
