//! Bookkeeping for operations that have been applied optimistically but not
//! yet confirmed or rejected by the remote API.
//!
//! Three independent collections:
//! - temporary ids awaiting create confirmation
//! - task id -> pre-mutation snapshot for in-flight updates (used for rollback)
//! - task ids awaiting delete confirmation
//!
//! Like [`EntityStore`](crate::EntityStore), every operation returns a new
//! value. Once every begun operation has been ended, the tracker is empty.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Task;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingOps {
    creates: BTreeSet<String>,
    updates: BTreeMap<String, Task>,
    deletes: BTreeSet<String>,
}

impl PendingOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent.
    #[must_use]
    pub fn begin_create(&self, temporary_id: &str) -> Self {
        let mut next = self.clone();
        next.creates.insert(temporary_id.to_string());
        next
    }

    /// Same removal for success and failure.
    #[must_use]
    pub fn end_create(&self, temporary_id: &str) -> Self {
        let mut next = self.clone();
        next.creates.remove(temporary_id);
        next
    }

    /// Keeps only the most recent snapshot for an id.
    #[must_use]
    pub fn begin_update(&self, task_id: &str, original: Task) -> Self {
        let mut next = self.clone();
        next.updates.insert(task_id.to_string(), original);
        next
    }

    #[must_use]
    pub fn end_update(&self, task_id: &str) -> Self {
        let mut next = self.clone();
        next.updates.remove(task_id);
        next
    }

    /// Idempotent.
    #[must_use]
    pub fn begin_delete(&self, task_id: &str) -> Self {
        let mut next = self.clone();
        next.deletes.insert(task_id.to_string());
        next
    }

    #[must_use]
    pub fn end_delete(&self, task_id: &str) -> Self {
        let mut next = self.clone();
        next.deletes.remove(task_id);
        next
    }

    /// True when the id is waiting on any create, update or delete.
    pub fn is_pending(&self, id: &str) -> bool {
        self.creates.contains(id) || self.updates.contains_key(id) || self.deletes.contains(id)
    }

    pub fn is_pending_create(&self, temporary_id: &str) -> bool {
        self.creates.contains(temporary_id)
    }

    pub fn is_pending_delete(&self, task_id: &str) -> bool {
        self.deletes.contains(task_id)
    }

    /// Snapshot taken before the in-flight update of `task_id`, if any.
    pub fn update_snapshot(&self, task_id: &str) -> Option<&Task> {
        self.updates.get(task_id)
    }

    pub fn pending_creates(&self) -> &BTreeSet<String> {
        &self.creates
    }

    pub fn pending_deletes(&self) -> &BTreeSet<String> {
        &self.deletes
    }

    pub fn pending_update_count(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use proptest::prelude::*;

    #[test]
    fn begin_create_is_idempotent() {
        let p = PendingOps::new().begin_create("temp_a").begin_create("temp_a");
        assert_eq!(p.pending_creates().len(), 1);
        assert!(p.end_create("temp_a").is_empty());
    }

    #[test]
    fn update_keeps_latest_snapshot() {
        let first = Task::new("1", "old");
        let second = Task::new("1", "older").with_status(TaskStatus::Review);
        let p = PendingOps::new().begin_update("1", first).begin_update("1", second.clone());

        assert_eq!(p.update_snapshot("1"), Some(&second));
        assert_eq!(p.pending_update_count(), 1);
        assert!(p.end_update("1").is_empty());
    }

    #[test]
    fn is_pending_covers_all_three_roles() {
        let p = PendingOps::new()
            .begin_create("temp_x")
            .begin_update("u", Task::new("u", "t"))
            .begin_delete("d");

        assert!(p.is_pending("temp_x"));
        assert!(p.is_pending("u"));
        assert!(p.is_pending("d"));
        assert!(!p.is_pending("other"));
        assert!(p.is_pending_delete("d"));
        assert!(!p.is_pending_delete("u"));
    }

    #[test]
    fn ending_unknown_ids_is_harmless() {
        let p = PendingOps::new().end_create("x").end_update("y").end_delete("z");
        assert!(p.is_empty());
    }

    #[derive(Debug, Clone, Copy)]
    enum Kind {
        Create,
        Update,
        Delete,
    }

    fn ops() -> impl Strategy<Value = Vec<(Kind, u8)>> {
        prop::collection::vec(
            (
                prop_oneof![Just(Kind::Create), Just(Kind::Update), Just(Kind::Delete)],
                0u8..6,
            ),
            0..32,
        )
    }

    proptest! {
        // Every begun operation gets exactly one terminal event, in any order.
        #[test]
        fn empty_after_all_operations_resolve((ops, order) in ops().prop_flat_map(|ops| {
            let n = ops.len();
            (Just(ops), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })) {
            let mut p = PendingOps::new();
            for (kind, n) in &ops {
                let id = format!("{n}");
                p = match kind {
                    Kind::Create => p.begin_create(&format!("temp_{id}")),
                    Kind::Update => p.begin_update(&id, Task::new(id.clone(), "t")),
                    Kind::Delete => p.begin_delete(&id),
                };
            }
            for i in order {
                let (kind, n) = ops[i];
                let id = format!("{n}");
                p = match kind {
                    Kind::Create => p.end_create(&format!("temp_{id}")),
                    Kind::Update => p.end_update(&id),
                    Kind::Delete => p.end_delete(&id),
                };
            }
            prop_assert!(p.is_empty());
        }
    }
}
