//! # Buffer List Collection
//!
//! The ordered set of buffers the user cycles through, with a current-buffer
//! cursor that wraps in both directions. One buffer is the play queue: it is
//! always present and can never be dismissed, so the collection is never
//! empty.

use crate::buffer_list::{BufferId, BufferList};
use crate::error::{BufferError, Result};

#[derive(Debug)]
pub struct BufferListCollection {
    lists: Vec<BufferList>,
    current: usize,
    play_queue: BufferId,
}

impl BufferListCollection {
    /// Creates a collection holding only `play_queue`.
    ///
    /// The play queue is forced to be non-dismissable.
    pub fn new(mut play_queue: BufferList) -> Self {
        play_queue.pin();
        let id = play_queue.id();
        Self {
            lists: vec![play_queue],
            current: 0,
            play_queue: id,
        }
    }

    /// Creates a collection from existing lists. `play_queue` must name one
    /// of them. The cursor starts on the first list.
    pub fn with_lists(mut lists: Vec<BufferList>, play_queue: BufferId) -> Result<Self> {
        let queue = lists
            .iter_mut()
            .find(|list| list.id() == play_queue)
            .ok_or_else(|| BufferError::NotFound(format!("play queue {}", play_queue)))?;
        queue.pin();
        Ok(Self {
            lists,
            current: 0,
            play_queue,
        })
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Always `false`; the play queue cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BufferList> {
        self.lists.iter()
    }

    pub fn position(&self, id: BufferId) -> Option<usize> {
        self.lists.iter().position(|list| list.id() == id)
    }

    pub fn get(&self, id: BufferId) -> Option<&BufferList> {
        self.lists.iter().find(|list| list.id() == id)
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut BufferList> {
        self.lists.iter_mut().find(|list| list.id() == id)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_list(&self) -> &BufferList {
        &self.lists[self.current]
    }

    pub fn current_list_mut(&mut self) -> &mut BufferList {
        &mut self.lists[self.current]
    }

    pub fn is_current_play_queue(&self) -> bool {
        self.current_list().id() == self.play_queue
    }

    pub fn play_queue_id(&self) -> BufferId {
        self.play_queue
    }

    pub fn play_queue(&self) -> &BufferList {
        let index = self.queue_index();
        &self.lists[index]
    }

    pub fn play_queue_mut(&mut self) -> &mut BufferList {
        let index = self.queue_index();
        &mut self.lists[index]
    }

    fn queue_index(&self) -> usize {
        // The play queue is pinned; losing it is a bug in this module.
        self.position(self.play_queue)
            .expect("play queue missing from buffer collection")
    }

    /// Appends a list without moving the cursor.
    pub fn add(&mut self, list: BufferList) -> BufferId {
        let id = list.id();
        tracing::debug!(list = %list.name(), "Buffer added");
        self.lists.push(list);
        id
    }

    pub fn set_current_index(&mut self, index: usize) -> bool {
        if index >= self.lists.len() {
            return false;
        }
        self.current = index;
        true
    }

    pub fn set_current(&mut self, id: BufferId) -> bool {
        match self.position(id) {
            Some(index) => self.set_current_index(index),
            None => false,
        }
    }

    /// Moves to the next list, wrapping to the first. Returns the new index.
    pub fn next_list(&mut self) -> usize {
        self.current = (self.current + 1) % self.lists.len();
        self.current
    }

    /// Moves to the previous list, wrapping to the last. Returns the new index.
    pub fn previous_list(&mut self) -> usize {
        let len = self.lists.len();
        self.current = (self.current + len - 1) % len;
        self.current
    }

    /// Removes a list and releases its resources.
    ///
    /// If it was the current list, the cursor moves to the previous list
    /// (wrapping), as if the user had navigated back.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` for the play queue
    /// - `NotFound` for an unknown id
    pub fn remove(&mut self, id: BufferId) -> Result<BufferList> {
        let index = self
            .position(id)
            .ok_or_else(|| BufferError::NotFound(id.to_string()))?;
        if id == self.play_queue {
            return Err(BufferError::InvalidOperation(
                "The play queue cannot be removed".to_string(),
            ));
        }

        if index == self.current {
            self.previous_list();
        }
        let mut removed = self.lists.remove(index);
        if self.current > index {
            self.current -= 1;
        }
        removed.release_resources();

        tracing::debug!(
            list = %removed.name(),
            current = self.current,
            "Buffer removed"
        );
        self.check_invariants();
        Ok(removed)
    }

    /// User-initiated removal. Only dismissable lists may go; anything else
    /// is rejected with the collection left untouched.
    pub fn dismiss(&mut self, id: BufferId) -> Result<BufferList> {
        let list = self
            .get(id)
            .ok_or_else(|| BufferError::NotFound(id.to_string()))?;
        if !list.is_dismissable() {
            return Err(BufferError::InvalidOperation(format!(
                "Cannot dismiss buffer {}",
                list.name()
            )));
        }
        self.remove(id)
    }

    pub fn dismiss_current(&mut self) -> Result<BufferList> {
        let id = self.current_list().id();
        self.dismiss(id)
    }

    fn check_invariants(&self) {
        let valid = self.current < self.lists.len() && self.position(self.play_queue).is_some();
        if !valid {
            tracing::error!(
                current = self.current,
                len = self.lists.len(),
                "Buffer collection invariant violated"
            );
        }
        debug_assert!(valid, "buffer collection invariant violated");
    }
}
