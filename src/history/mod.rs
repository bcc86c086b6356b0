//! Linear history of generated trees
//!
//! A browser-style undo/redo stack of snapshots with a current pointer.
//! `push` is the sole write path; entries are never mutated after
//! insertion.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::tree::Tree;

/// One recorded generation result plus the prompt that produced it
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The generated tree
    pub tree: Arc<Tree>,
    /// The prompt this tree was generated from
    pub source_input: String,
    /// When the snapshot was recorded
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Create a snapshot stamped with the current time
    pub fn new(tree: Arc<Tree>, source_input: impl Into<String>) -> Self {
        Self {
            tree,
            source_input: source_input.into(),
            created_at: Utc::now(),
        }
    }
}

/// Linear undo/redo stack of snapshots
///
/// Invariant: `current` is `None` iff the store is empty; otherwise
/// `current < len()`. `current == Some(len() - 1)` means there is no
/// forward history.
#[derive(Debug, Default)]
pub struct HistoryStore {
    snapshots: Vec<Snapshot>,
    current: Option<usize>,
}

impl HistoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new snapshot.
    ///
    /// Everything after the current pointer is discarded first (the stale
    /// redo branch), then the snapshot is appended and becomes current.
    /// This is the only operation that can shrink reachable forward
    /// history.
    pub fn push(&mut self, snapshot: Snapshot) {
        if let Some(current) = self.current {
            self.snapshots.truncate(current + 1);
        }
        self.snapshots.push(snapshot);
        self.current = Some(self.snapshots.len() - 1);
    }

    /// Move the pointer one step back. No-op at the first entry or when
    /// empty; returns whether the pointer moved.
    pub fn back(&mut self) -> bool {
        match self.current {
            Some(i) if i > 0 => {
                self.current = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Move the pointer one step forward. No-op at the last entry or when
    /// empty; returns whether the pointer moved.
    pub fn forward(&mut self) -> bool {
        match self.current {
            Some(i) if i + 1 < self.snapshots.len() => {
                self.current = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    /// The snapshot at the current pointer, or `None` when empty
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.map(|i| &self.snapshots[i])
    }

    /// Whether `back()` would move
    pub fn can_go_back(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    /// Whether `forward()` would move
    pub fn can_go_forward(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.snapshots.len())
    }

    /// Index of the current snapshot, `None` when empty
    pub fn position(&self) -> Option<usize> {
        self.current
    }

    /// Number of recorded snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the store holds no snapshots
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
