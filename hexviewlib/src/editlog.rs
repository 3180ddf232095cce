//! Reversible record of byte-level writes.
//!
//! The [`EditLog`] keeps a LIFO undo stack and redo stack of [`DataEdit`]
//! records plus the per-offset modification counters the presentation layer
//! uses to mark edited bytes. Committing a fresh edit discards the redo
//! stack; branching history is not supported.
//!
//! The log only manages the stacks and counters. Writing old/new values back
//! through the byte source and repositioning the caret is orchestrated by
//! [`HexView`](crate::HexView) so that failed preconditions leave the log
//! untouched.

use crate::view::ActiveView;
use std::collections::BTreeMap;

/// A single byte-level modification, immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataEdit {
    offset: u64,
    old_value: u8,
    new_value: u8,
    view: ActiveView,
}

impl DataEdit {
    #[must_use]
    pub const fn new(offset: u64, old_value: u8, new_value: u8, view: ActiveView) -> Self {
        Self {
            offset,
            old_value,
            new_value,
            view,
        }
    }

    /// Byte offset the edit applies to.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Byte value before the edit.
    #[must_use]
    pub const fn old_value(&self) -> u8 {
        self.old_value
    }

    /// Byte value after the edit.
    #[must_use]
    pub const fn new_value(&self) -> u8 {
        self.new_value
    }

    /// Sub-view that was active when the edit was made.
    #[must_use]
    pub const fn view(&self) -> ActiveView {
        self.view
    }
}

/// Undo/redo stacks plus the modified-offset counter map.
#[derive(Debug, Default, Clone)]
pub struct EditLog {
    undo_stack: Vec<DataEdit>,
    redo_stack: Vec<DataEdit>,
    /// Number of outstanding modifications per offset.
    modified: BTreeMap<u64, u32>,
}

impl EditLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            modified: BTreeMap::new(),
        }
    }

    /// Pushes a fresh edit and discards any redoable history.
    pub fn commit(&mut self, edit: DataEdit) {
        self.undo_stack.push(edit);
        self.redo_stack.clear();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Moves the most recent edit to the redo stack and returns a copy.
    pub fn undo_edit(&mut self) -> Option<DataEdit> {
        let edit = self.undo_stack.pop()?;
        self.redo_stack.push(edit);
        Some(edit)
    }

    /// Moves the most recently undone edit back to the undo stack and
    /// returns a copy.
    pub fn redo_edit(&mut self) -> Option<DataEdit> {
        let edit = self.redo_stack.pop()?;
        self.undo_stack.push(edit);
        Some(edit)
    }

    /// Number of edits currently undoable.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of edits currently redoable.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Increments the modification counter for `offset` and returns the
    /// previous count.
    pub fn set_modified(&mut self, offset: u64) -> u32 {
        let counter = self.modified.entry(offset).or_insert(0);
        let previous = *counter;
        *counter += 1;
        previous
    }

    /// Decrements the modification counter for `offset`, removing the entry
    /// when it reaches zero or when `force_remove` is set.
    ///
    /// Returns `true` if the offset had been modified.
    pub fn clear_modified(&mut self, offset: u64, force_remove: bool) -> bool {
        let Some(&count) = self.modified.get(&offset) else {
            return false;
        };
        if count > 1 && !force_remove {
            self.modified.insert(offset, count - 1);
        } else {
            self.modified.remove(&offset);
        }
        true
    }

    /// Whether the byte at `offset` has outstanding modifications.
    #[must_use]
    pub fn is_modified(&self, offset: u64) -> bool {
        self.modified.contains_key(&offset)
    }

    /// Outstanding modification count for `offset`.
    #[must_use]
    pub fn modified_count(&self, offset: u64) -> u32 {
        self.modified.get(&offset).copied().unwrap_or(0)
    }

    /// Whether any byte has outstanding modifications.
    #[must_use]
    pub fn any_modified(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Iterates over the modified offsets in ascending order.
    pub fn modified_offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.modified.keys().copied()
    }

    /// Drops every modification counter.
    pub fn clear_all_modified(&mut self) {
        self.modified.clear();
    }

    /// Clears both stacks and the counter map without touching the byte
    /// source.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.modified.clear();
    }
}
