//! # Cursor-Addressable List
//!
//! A [`BufferList`] is one named, ordered list of [`BufferItem`]s with a
//! movable cursor: the playlists view, a search result page, the play queue.
//!
//! ## Cursor rules
//!
//! - The cursor is `None` exactly when the list is empty, otherwise it points
//!   at a valid index.
//! - Single-step navigation never wraps. Hitting an edge is reported as
//!   [`Navigation::Boundary`] so the caller can play a boundary cue.
//! - Jumps clamp to the first/last item instead of failing.
//! - Removing items keeps the cursor on the same item when it survives, and
//!   otherwise moves it to the nearest remaining index at or before its old
//!   position.

use crate::item::BufferItem;
use bridge_traits::SearchSession;
use core_runtime::config::DEFAULT_JUMP_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a buffer inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(pub Uuid);

impl BufferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BufferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The cursor now points at this index.
    Moved(usize),
    /// Already at the edge; nothing changed.
    Boundary,
    /// The list has no items.
    Empty,
}

impl Navigation {
    pub fn moved(&self) -> bool {
        matches!(self, Navigation::Moved(_))
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Navigation::Moved(index) => Some(*index),
            _ => None,
        }
    }
}

/// Named, ordered, cursor-addressable list of items.
pub struct BufferList {
    id: BufferId,
    name: String,
    dismissable: bool,
    items: Vec<BufferItem>,
    current: Option<usize>,
    jump_size: usize,
    resource: Option<Box<dyn SearchSession>>,
}

impl BufferList {
    pub fn new(name: impl Into<String>, dismissable: bool) -> Self {
        Self {
            id: BufferId::new(),
            name: name.into(),
            dismissable,
            items: Vec::new(),
            current: None,
            jump_size: DEFAULT_JUMP_SIZE,
            resource: None,
        }
    }

    /// Items moved by [`next_jump`](Self::next_jump); values below 1 are raised to 1.
    pub fn with_jump_size(mut self, jump_size: usize) -> Self {
        self.set_jump_size(jump_size);
        self
    }

    /// Attach a backend resource released together with this list.
    pub fn with_resource(mut self, resource: Box<dyn SearchSession>) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = BufferItem>) -> Self {
        self.extend(items);
        self
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dismissable(&self) -> bool {
        self.dismissable
    }

    pub(crate) fn pin(&mut self) {
        self.dismissable = false;
    }

    pub fn jump_size(&self) -> usize {
        self.jump_size
    }

    pub fn set_jump_size(&mut self, jump_size: usize) {
        self.jump_size = jump_size.max(1);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[BufferItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&BufferItem> {
        self.items.get(index)
    }

    pub fn position(&self, item: &BufferItem) -> Option<usize> {
        self.items.iter().position(|candidate| candidate == item)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_item(&self) -> Option<&BufferItem> {
        self.current.and_then(|index| self.items.get(index))
    }

    pub fn has_resource(&self) -> bool {
        self.resource.is_some()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Appends `item` and returns its index.
    pub fn add(&mut self, item: BufferItem) -> usize {
        self.items.push(item);
        if self.current.is_none() {
            self.current = Some(0);
        }
        self.check_invariants();
        self.items.len() - 1
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = BufferItem>) {
        for item in items {
            self.add(item);
        }
    }

    /// Inserts at `index` (clamped to the end) and returns where it landed.
    pub fn insert(&mut self, index: usize, item: BufferItem) -> usize {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.current = match self.current {
            None => Some(0),
            Some(current) if index <= current => Some(current + 1),
            current => current,
        };
        self.check_invariants();
        index
    }

    /// Removes the first item equal to `item`.
    pub fn remove(&mut self, item: &BufferItem) -> bool {
        match self.position(item) {
            Some(index) => self.remove_at(index).is_some(),
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<BufferItem> {
        self.remove_range(index, 1).into_iter().next()
    }

    /// Removes up to `count` items starting at `start`. The range is clamped
    /// to the list; an empty range is a no-op.
    pub fn remove_range(&mut self, start: usize, count: usize) -> Vec<BufferItem> {
        let len = self.items.len();
        if start >= len || count == 0 {
            return Vec::new();
        }
        let end = start.saturating_add(count).min(len);
        let removed: Vec<BufferItem> = self.items.drain(start..end).collect();
        let removed_count = removed.len();

        self.current = match self.current {
            _ if self.items.is_empty() => None,
            Some(current) if current < start => Some(current),
            Some(current) if current >= end => Some(current - removed_count),
            Some(_) => Some(start.min(self.items.len() - 1)),
            None => None,
        };

        tracing::trace!(
            list = %self.name,
            start,
            removed = removed_count,
            current = ?self.current,
            "Removed items"
        );
        self.check_invariants();
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.current = None;
    }

    /// Points the cursor at `index`. Returns `false` and leaves the cursor
    /// alone when `index` is out of range.
    pub fn set_current_index(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.current = Some(index);
        true
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn next_item(&mut self) -> Navigation {
        self.navigate(|current, last, _| (current < last).then(|| current + 1))
    }

    pub fn previous_item(&mut self) -> Navigation {
        self.navigate(|current, _, _| current.checked_sub(1))
    }

    pub fn first_item(&mut self) -> Navigation {
        self.navigate(|current, _, _| (current != 0).then_some(0))
    }

    pub fn last_item(&mut self) -> Navigation {
        self.navigate(|current, last, _| (current != last).then_some(last))
    }

    pub fn next_jump(&mut self) -> Navigation {
        self.navigate(|current, last, jump| (current < last).then(|| (current + jump).min(last)))
    }

    pub fn previous_jump(&mut self) -> Navigation {
        self.navigate(|current, _, jump| (current > 0).then(|| current.saturating_sub(jump)))
    }

    /// `step(current, last_index, jump_size)` returns the new index, or
    /// `None` at a boundary.
    fn navigate<F>(&mut self, step: F) -> Navigation
    where
        F: FnOnce(usize, usize, usize) -> Option<usize>,
    {
        let Some(current) = self.current else {
            return Navigation::Empty;
        };
        let last = self.items.len() - 1;
        match step(current, last, self.jump_size) {
            Some(target) => {
                self.current = Some(target);
                self.check_invariants();
                Navigation::Moved(target)
            }
            None => Navigation::Boundary,
        }
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Closes the attached resource, if any. Safe to call repeatedly; the
    /// resource is closed at most once.
    pub fn release_resources(&mut self) -> bool {
        match self.resource.take() {
            Some(mut resource) => {
                tracing::debug!(list = %self.name, query = resource.query(), "Closing search session");
                resource.close();
                true
            }
            None => false,
        }
    }

    fn check_invariants(&self) {
        let valid = match self.current {
            None => self.items.is_empty(),
            Some(index) => index < self.items.len(),
        };
        if !valid {
            tracing::error!(
                list = %self.name,
                current = ?self.current,
                len = self.items.len(),
                "Buffer cursor out of range"
            );
        }
        debug_assert!(
            valid,
            "cursor {:?} invalid for buffer '{}' of length {}",
            self.current,
            self.name,
            self.items.len()
        );
    }
}

impl Drop for BufferList {
    fn drop(&mut self) {
        self.release_resources();
    }
}

impl fmt::Debug for BufferList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferList")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("dismissable", &self.dismissable)
            .field("len", &self.items.len())
            .field("current", &self.current)
            .field("has_resource", &self.resource.is_some())
            .finish()
    }
}

impl fmt::Display for BufferList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
