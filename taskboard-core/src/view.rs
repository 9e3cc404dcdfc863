//! Filtered view projection: what the task list actually shows.
//!
//! Everything here is a pure function of its inputs; there is no cache.
//! Calling [`visible_tasks`] twice with the same inputs gives the same list.

use std::cmp::Ordering;
use std::collections::HashSet;

use feruca::Collator;

use crate::entity_store::EntityStore;
use crate::filters::{SortDirection, SortKey, SortSpec, TaskFilters};
use crate::model::{Project, Task, User};
use crate::pending::PendingOps;

/// Project the store through the filters.
///
/// Order of steps:
/// 1. store iteration order
/// 2. drop tasks pending delete
/// 3. equality filters (project, assignee, status, type)
/// 4. search over title/description
/// 5. optional sort, ties broken by id
/// 6. de-duplicate by id
pub fn visible_tasks(
    store: &EntityStore<Task>,
    filters: &TaskFilters,
    pending: &PendingOps,
) -> Vec<Task> {
    let mut out: Vec<Task> = store
        .iter()
        .filter(|t| !pending.is_pending_delete(&t.id))
        .filter(|t| filters.matches(t))
        .cloned()
        .collect();

    if let Some(spec) = filters.sort {
        let mut order = TaskOrder::new(spec);
        out.sort_by(|a, b| order.compare(a, b));
    }

    let mut seen = HashSet::with_capacity(out.len());
    out.retain(|t| seen.insert(t.id.clone()));
    out
}

/// Comparator for one [`SortSpec`].
///
/// Titles go through a root-locale Unicode collator after lowercasing, so
/// `Éclair` sorts with the other `e` words and case never decides the order.
pub struct TaskOrder {
    spec: SortSpec,
    collator: Collator,
}

impl TaskOrder {
    pub fn new(spec: SortSpec) -> Self {
        Self {
            spec,
            collator: Collator::default(),
        }
    }

    /// Direction flips the primary comparison only; the id tie-break is
    /// always ascending.
    pub fn compare(&mut self, a: &Task, b: &Task) -> Ordering {
        let primary = self.compare_by_key(a, b);
        let primary = match self.spec.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    fn compare_by_key(&mut self, a: &Task, b: &Task) -> Ordering {
        match self.spec.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            // missing due dates last
            SortKey::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortKey::Status => a.status.rank().cmp(&b.status.rank()),
            SortKey::Title => {
                let (x, y) = (a.title.to_lowercase(), b.title.to_lowercase());
                self.collator.collate(x.as_str(), y.as_str())
            }
        }
    }
}

/// Users selectable as assignee for a project; everyone when no project is picked.
pub fn users_for_project<'a>(users: &'a EntityStore<User>, project_id: Option<&str>) -> Vec<&'a User> {
    match project_id {
        None => users.iter().collect(),
        Some(pid) => users
            .iter()
            .filter(|u| u.project_ids.iter().any(|p| p == pid))
            .collect(),
    }
}

/// A visible task joined with its assignee and project.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow<'a> {
    pub task: &'a Task,
    pub assignee: Option<&'a User>,
    pub project: Option<&'a Project>,
}

pub fn with_relations<'a>(
    tasks: &'a [Task],
    users: &'a EntityStore<User>,
    projects: &'a EntityStore<Project>,
) -> Vec<TaskRow<'a>> {
    tasks
        .iter()
        .map(|task| TaskRow {
            task,
            assignee: task.assignee_id.as_deref().and_then(|id| users.get(id)),
            project: task.project_id.as_deref().and_then(|id| projects.get(id)),
        })
        .collect()
}
