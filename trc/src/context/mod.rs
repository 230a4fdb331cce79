//! Ambient `(context, Trace)` binding for the Producer API's convenience
//! calls (spec.md §4.10, §9). Modeled as thread-local state: each thread
//! of execution handling one logical operation binds exactly one trace
//! at a time, mirroring how a request-scoped context is usually threaded
//! through a call stack in this kind of library.

mod __test__;

use crate::collector::{Collector, TraceHandle};
use crate::event::LazyArg;
use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
  static CURRENT: RefCell<Option<TraceHandle>> = const { RefCell::new(None) };
}

/// The trace bound to the current thread, if any.
pub fn get() -> Option<TraceHandle> {
  CURRENT.with(|cell| cell.borrow().clone())
}

/// Unconditionally creates a new trace and binds it, replacing whatever
/// was previously bound. This is the explicit `new()` spec.md §9 calls
/// out as always available alongside the convenience policy below.
pub fn new(collector: &Arc<Collector>, category: impl Into<String>) -> TraceHandle {
  let handle = collector.new_trace(category.into());
  CURRENT.with(|cell| *cell.borrow_mut() = Some(handle.clone()));
  handle
}

/// Convenience policy: if a trace is already bound, annotate it with a
/// `"(+ category)"` event and return it unchanged instead of creating a
/// new one. Only creates (and binds) a new trace if none was bound.
pub fn get_or_create(collector: &Arc<Collector>, category: impl Into<String>) -> TraceHandle {
  let category = category.into();
  if let Some(existing) = get() {
    existing.tracef("(+ {})", vec![LazyArg::from(category)]);
    return existing;
  }
  new(collector, category)
}

/// Clears the current thread's bound trace, if any.
pub fn clear() {
  CURRENT.with(|cell| *cell.borrow_mut() = None);
}
