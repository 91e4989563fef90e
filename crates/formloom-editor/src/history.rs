//! Snapshot-based undo/redo.
//!
//! Every snapshot is an owned deep copy of the schema, so restoring one can
//! never alias the live document or another snapshot.

use formloom_core::FormSchema;
use tracing::debug;

/// Default number of snapshots retained before the oldest are discarded.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// An immutable copy of the schema at one point in edit time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    index: usize,
    schema: FormSchema,
}

impl HistorySnapshot {
    /// Position of this snapshot in the history stack.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }
}

/// Bounded stack of snapshots with a cursor.
///
/// Recording after an undo discards the snapshots beyond the cursor.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<HistorySnapshot>,
    index: usize,
    capacity: usize,
}

impl History {
    /// Start a history whose first snapshot is `initial`.
    pub fn new(initial: &FormSchema, capacity: usize) -> Self {
        Self {
            snapshots: vec![HistorySnapshot {
                index: 0,
                schema: initial.clone(),
            }],
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append a copy of `schema` after the cursor, dropping any redo branch
    /// and evicting the oldest snapshots beyond capacity.
    pub fn record(&mut self, schema: &FormSchema) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(HistorySnapshot {
            index: self.snapshots.len(),
            schema: schema.clone(),
        });
        self.index = self.snapshots.len() - 1;

        if self.snapshots.len() > self.capacity {
            let excess = self.snapshots.len() - self.capacity;
            self.snapshots.drain(..excess);
            self.index -= excess;
            for (i, snapshot) in self.snapshots.iter_mut().enumerate() {
                snapshot.index = i;
            }
            debug!(evicted = excess, "history capacity reached");
        }
    }

    /// Step the cursor back and return the snapshot now under it.
    pub fn undo(&mut self) -> Option<&FormSchema> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(&self.snapshots[self.index].schema)
    }

    /// Step the cursor forward and return the snapshot now under it.
    pub fn redo(&mut self) -> Option<&FormSchema> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(&self.snapshots[self.index].schema)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Drop every snapshot and restart from `schema`.
    pub fn clear(&mut self, schema: &FormSchema) {
        *self = Self::new(schema, self.capacity);
    }

    pub fn current(&self) -> &HistorySnapshot {
        &self.snapshots[self.index]
    }

    pub fn snapshots(&self) -> &[HistorySnapshot] {
        &self.snapshots
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
