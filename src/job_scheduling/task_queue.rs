//! Ordered, deduplicated task store
//!
//! The queue is filled completely before the grabber drains it, so it needs
//! no locking.

use std::collections::HashSet;
use tracing::debug;

use super::types::{FetchTask, TaskKey};

#[derive(Debug, Default)]
pub struct TaskQueue {
    index: HashSet<TaskKey>,
    entries: Vec<(TaskKey, FetchTask)>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `task` under `key` unless the key is already queued.
    /// Returns whether the task was inserted; the first task for a key wins.
    pub fn put(&mut self, key: TaskKey, task: FetchTask) -> bool {
        if self.index.contains(&key) {
            debug!("Skipping duplicate task: {}", key);
            return false;
        }
        self.index.insert(key.clone());
        self.entries.push((key, task));
        true
    }

    /// Whether no task is queued under `key`
    pub fn missing(&self, key: &TaskKey) -> bool {
        !self.index.contains(key)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn get(&self, key: &TaskKey) -> Option<&FetchTask> {
        self.entries
            .iter()
            .find(|(queued, _)| queued == key)
            .map(|(_, task)| task)
    }

    /// Consume the queue, yielding every task in insertion order
    pub fn drain(self) -> Vec<FetchTask> {
        self.entries.into_iter().map(|(_, task)| task).collect()
    }
}
