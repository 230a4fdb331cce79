//! Fixed-capacity, newest-first, overwrite-oldest container (spec.md §4.2).
//!
//! Storage shape is a generalization of the teacher's `buffer::TTlogBuffer`
//! circular array. Unlike the teacher's lock-free `lf_buffer`, `walk` here
//! needs to observe a consistent snapshot without removing elements and in
//! strict newest-to-oldest order, so a single `Mutex` serializes reads and
//! writes instead of a `crossbeam_queue::ArrayQueue`.

mod __test__;

use std::collections::VecDeque;
use std::sync::Mutex;

/// Returned by the closure passed to [`RingBuffer::walk`] to decide whether
/// iteration should continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
  Continue,
  Stop,
}

/// Head/tail/length snapshot of a buffer, per spec.md §4.2's `stats()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
  pub len: usize,
  pub capacity: usize,
}

struct Inner<T> {
  // front = newest, back = oldest.
  items: VecDeque<T>,
  capacity: usize,
}

/// Fixed-capacity newest-first ring buffer. Serializes all access behind a
/// single mutex; `walk` holds it for the duration of the traversal, which
/// spec.md §4.2 calls out as acceptable because producers are not bursty
/// enough to contend meaningfully and each buffer is small.
pub struct RingBuffer<T> {
  inner: Mutex<Inner<T>>,
}

impl<T> RingBuffer<T> {
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      inner: Mutex::new(Inner {
        items: VecDeque::with_capacity(capacity),
        capacity,
      }),
    }
  }

  /// Writes `v` as the newest element, evicting the oldest if full.
  /// Returns the evicted element, if any.
  pub fn add(&self, v: T) -> Option<T> {
    let mut inner = self.inner.lock().unwrap();
    let evicted = if inner.items.len() >= inner.capacity {
      inner.items.pop_back()
    } else {
      None
    };
    inner.items.push_front(v);
    evicted
  }

  /// Walks from newest to oldest over a consistent snapshot of the
  /// elements present when `walk` was called. `f` returns [`Walk::Stop`]
  /// to terminate early.
  pub fn walk<F>(&self, mut f: F)
  where
    F: FnMut(&T) -> Walk,
  {
    let inner = self.inner.lock().unwrap();
    for item in inner.items.iter() {
      if f(item) == Walk::Stop {
        break;
      }
    }
  }

  /// Shrinks or grows capacity. Shrinking below the current length drops
  /// the oldest elements, returned newest-to-oldest so callers can release
  /// them.
  pub fn resize(&self, new_capacity: usize) -> Vec<T> {
    let new_capacity = new_capacity.max(1);
    let mut inner = self.inner.lock().unwrap();
    inner.capacity = new_capacity;
    let mut dropped = Vec::new();
    while inner.items.len() > new_capacity {
      if let Some(v) = inner.items.pop_back() {
        dropped.push(v);
      } else {
        break;
      }
    }
    // `pop_back` yields oldest-first; reverse so callers see newest-to-oldest.
    dropped.reverse();
    dropped
  }

  pub fn stats(&self) -> BufferStats {
    let inner = self.inner.lock().unwrap();
    BufferStats {
      len: inner.items.len(),
      capacity: inner.capacity,
    }
  }

  pub fn len(&self) -> usize {
    self.inner.lock().unwrap().items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<T: Clone> RingBuffer<T> {
  /// Freshly-allocated copy of every element currently held, newest first.
  pub fn snapshot(&self) -> Vec<T> {
    let inner = self.inner.lock().unwrap();
    inner.items.iter().cloned().collect()
  }
}
