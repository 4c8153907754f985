//! Bounded per-layer undo/redo history.
//!
//! Snapshots are full detached pixel arrays keyed by [`LayerId`], so
//! history never cross-contaminates between layers or frames.

use canvas::{Layer, LayerId};
use common::Color;
use std::collections::HashMap;
use std::collections::VecDeque;

/// Default snapshot capacity per layer and direction.
pub const DEFAULT_UNDO_CAPACITY: usize = 60;

/// Most-recent-first snapshot stack that evicts its oldest entry at
/// capacity.
#[derive(Debug, Default)]
struct SnapshotStack {
    snapshots: VecDeque<Vec<Color>>,
}

impl SnapshotStack {
    fn push(&mut self, snapshot: Vec<Color>, capacity: usize) {
        if self.snapshots.len() == capacity {
            self.snapshots.pop_back();
        }
        self.snapshots.push_front(snapshot);
    }

    fn pop(&mut self) -> Option<Vec<Color>> {
        self.snapshots.pop_front()
    }

    fn clear(&mut self) {
        self.snapshots.clear();
    }

    fn len(&self) -> usize {
        self.snapshots.len()
    }
}

/// Per-layer undo and redo stacks.
#[derive(Debug)]
pub struct UndoHistory {
    capacity: usize,
    undo: HashMap<LayerId, SnapshotStack>,
    redo: HashMap<LayerId, SnapshotStack>,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_UNDO_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            undo: HashMap::new(),
            redo: HashMap::new(),
        }
    }

    /// Record the layer's current pixels before a mutating action: push onto
    /// its undo stack and clear its redo stack.
    pub fn snapshot(&mut self, layer: &Layer) {
        self.undo
            .entry(layer.id())
            .or_default()
            .push(layer.get_all(), self.capacity);
        self.redo.entry(layer.id()).or_default().clear();
    }

    /// Restore the layer's most recent snapshot, moving the current state
    /// onto the redo stack. Returns false (leaving the layer untouched) when
    /// there is nothing to undo.
    pub fn undo(&mut self, layer: &mut Layer) -> bool {
        let Some(previous) = self.undo.get_mut(&layer.id()).and_then(SnapshotStack::pop) else {
            return false;
        };

        self.redo
            .entry(layer.id())
            .or_default()
            .push(layer.get_all(), self.capacity);

        layer.set_all(&previous);
        layer.apply_to_render_target();
        true
    }

    /// Reapply the most recently undone state. Returns false when there is
    /// nothing to redo.
    pub fn redo(&mut self, layer: &mut Layer) -> bool {
        let Some(next) = self.redo.get_mut(&layer.id()).and_then(SnapshotStack::pop) else {
            return false;
        };

        self.undo
            .entry(layer.id())
            .or_default()
            .push(layer.get_all(), self.capacity);

        layer.set_all(&next);
        layer.apply_to_render_target();
        true
    }

    /// Drop all history for a layer (it was destroyed).
    pub fn forget(&mut self, id: LayerId) {
        self.undo.remove(&id);
        self.redo.remove(&id);
    }

    pub fn undo_depth(&self, id: LayerId) -> usize {
        self.undo.get(&id).map_or(0, SnapshotStack::len)
    }

    pub fn redo_depth(&self, id: LayerId) -> usize {
        self.redo.get(&id).map_or(0, SnapshotStack::len)
    }
}
