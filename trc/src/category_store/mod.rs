//! Category name to per-category ring buffer mapping (spec.md §4.3).
//!
//! Lazily creates a buffer for a category on first use, and supports an
//! atomic snapshot of the whole mapping so a search sees a consistent set
//! of buffers even if a concurrent producer is creating a brand new
//! category at the same moment.

mod __test__;

use crate::ring_buffer::RingBuffer;
use crate::trace::Trace;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// category name → bounded ring of traces. Reads (the common case: every
/// producer call and every search) only need a shared lock; a write lock
/// is taken only when a brand new category is created or on `resize`.
pub struct CategoryStore {
  capacity: RwLock<usize>,
  buffers: RwLock<HashMap<String, Arc<RingBuffer<Arc<Trace>>>>>,
}

impl CategoryStore {
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity: RwLock::new(capacity.max(1)),
      buffers: RwLock::new(HashMap::new()),
    }
  }

  /// Returns the buffer for `category`, creating it at the current
  /// configured capacity if it doesn't exist yet. Idempotent.
  pub fn get_or_create(&self, category: &str) -> Arc<RingBuffer<Arc<Trace>>> {
    if let Some(existing) = self.buffers.read().unwrap().get(category) {
      return Arc::clone(existing);
    }
    let mut buffers = self.buffers.write().unwrap();
    // another writer may have created it between the read unlock and this write lock.
    if let Some(existing) = buffers.get(category) {
      return Arc::clone(existing);
    }
    let capacity = *self.capacity.read().unwrap();
    let buffer = Arc::new(RingBuffer::new(capacity));
    buffers.insert(category.to_string(), Arc::clone(&buffer));
    buffer
  }

  /// An atomic shallow copy of the category → buffer mapping. Cheap:
  /// clones `Arc` handles, not the buffers themselves. Searches iterate
  /// this snapshot so a category created mid-search is simply absent
  /// from this particular search, never half-visible.
  pub fn snapshot(&self) -> HashMap<String, Arc<RingBuffer<Arc<Trace>>>> {
    self.buffers.read().unwrap().clone()
  }

  /// Updates the configured per-category capacity and resizes every
  /// existing buffer to match, dropping the oldest traces in any that
  /// shrink.
  pub fn resize(&self, new_capacity: usize) {
    let new_capacity = new_capacity.max(1);
    *self.capacity.write().unwrap() = new_capacity;
    let buffers = self.buffers.read().unwrap();
    for buffer in buffers.values() {
      buffer.resize(new_capacity);
    }
  }

  pub fn category_count(&self) -> usize {
    self.buffers.read().unwrap().len()
  }
}
