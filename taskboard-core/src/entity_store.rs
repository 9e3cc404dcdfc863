//! EntityStore: normalized, ordered storage for tasks, users and projects.
//!
//! Design:
//! - Keep canonical copies in a map (id -> entity).
//! - Keep a separate id list that fixes iteration order (insertion order;
//!   append-only except on removal).
//! - Every operation returns a new store and leaves `self` untouched, so a
//!   snapshot held by a reader never changes under it and equality is a
//!   usable change check.
//!
//! Invariant: every id in `all_ids` is a key of `by_id` exactly once, and
//! every key of `by_id` appears in `all_ids`.

use std::collections::HashMap;

use crate::model::{Project, Task, User};

/// Anything addressable by a string id.
pub trait Entity: Clone {
    fn id(&self) -> &str;
}

impl Entity for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Project {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore<T> {
    by_id: HashMap<String, T>,
    all_ids: Vec<String>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            all_ids: Vec::new(),
        }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from scratch (what a successful fetch does).
    ///
    /// Duplicate ids in the input keep their first position and their last value.
    pub fn replace_all(entities: impl IntoIterator<Item = T>) -> Self {
        let mut store = Self::new();
        for entity in entities {
            store.insert_in_place(entity);
        }
        store
    }

    /// Insert or overwrite by id. The id list only grows when the id is new.
    #[must_use]
    pub fn upsert(&self, entity: T) -> Self {
        let mut next = self.clone();
        next.insert_in_place(entity);
        next
    }

    /// Drop an entity. Absent ids are a no-op.
    #[must_use]
    pub fn remove(&self, id: &str) -> Self {
        if !self.by_id.contains_key(id) {
            return self.clone();
        }
        let mut next = self.clone();
        next.by_id.remove(id);
        next.all_ids.retain(|known| known != id);
        next
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.all_ids
    }

    /// Entities in store order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.all_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.iter().find(|e| predicate(e))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    fn insert_in_place(&mut self, entity: T) {
        let id = entity.id().to_string();
        if self.by_id.insert(id.clone(), entity).is_none() {
            self.all_ids.push(id);
        }
    }
}
