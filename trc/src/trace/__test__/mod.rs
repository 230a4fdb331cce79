#![cfg(test)]

use crate::event::LazyArg;
use crate::trace::Trace;

#[test]
fn new_trace_is_active_and_not_errored() {
  let t = Trace::new("svc-a", "http", 32);
  assert!(t.is_active());
  assert!(!t.is_finished());
  assert!(!t.is_errored());
  assert_eq!(t.source(), "svc-a");
  assert_eq!(t.category(), "http");
}

#[test]
fn errorf_sets_sticky_errored_before_event_is_visible() {
  let t = Trace::new("svc-a", "http", 32);
  t.errorf("boom {}", vec![LazyArg::from(500i64)]);
  // errored must already be observable by the time the event is present.
  assert!(t.is_errored());
  let events = t.events();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].what, "boom 500");
  assert!(events[0].is_error);
}

#[test]
fn finish_fixes_duration_and_freezes_status() {
  let t = Trace::new("svc-a", "http", 32);
  t.tracef("step one", vec![]);
  t.finish();
  assert!(t.is_finished());
  assert!(!t.is_active());
  let d1 = t.duration();
  // idempotent: a second finish (or any mutation) must not change anything.
  t.finish();
  t.tracef("ignored after finish", vec![]);
  assert_eq!(t.duration(), d1);
  assert_eq!(t.events().len(), 1);
}

#[test]
fn events_max_is_enforced_with_truncation_marker() {
  let t = Trace::new("svc-a", "http", 32);
  for i in 0..49 {
    t.tracef("event {}", vec![LazyArg::from(i as i64)]);
  }
  let events = t.events();
  // 32 real events plus one synthetic truncation marker.
  assert_eq!(events.len(), 33);
  assert_eq!(events[32].what, "(truncated 17 events)");
  assert_eq!(events[0].what, "event 0");
}

#[test]
fn set_events_max_shrinks_and_counts_dropped_as_truncated() {
  let t = Trace::new("svc-a", "http", 100);
  for i in 0..20 {
    t.tracef("e{}", vec![LazyArg::from(i as i64)]);
  }
  t.set_events_max(5);
  let events = t.events();
  assert_eq!(events.len(), 6);
  assert_eq!(events[5].what, "(truncated 15 events)");
}

#[test]
fn set_events_max_clamps_to_spec_range() {
  let t = Trace::new("svc-a", "http", 100);
  t.set_events_max(1);
  // below the floor; clamp to 10, so 10 events should all fit with no truncation.
  for i in 0..10 {
    t.tracef("e{}", vec![LazyArg::from(i as i64)]);
  }
  assert_eq!(t.events().len(), 10);
}

#[test]
fn snapshot_applies_stack_depth_policy() {
  let t = Trace::new("svc-a", "http", 32);
  t.errorf_stack("boom", vec![]);
  let full = t.snapshot(0);
  assert!(!full.events[0].stack.is_empty());
  let stripped = t.snapshot(-1);
  assert!(stripped.events[0].stack.is_empty());
  let capped = t.snapshot(1);
  assert!(capped.events[0].stack.len() <= 1);
}

#[test]
fn stream_snapshot_omits_stacks_and_limits_active_to_latest_event() {
  let t = Trace::new("svc-a", "http", 32);
  t.errorf_stack("first", vec![]);
  t.tracef_stack("second", vec![]);
  let streamed = t.stream_snapshot();
  assert!(streamed.is_active());
  assert_eq!(streamed.events.len(), 1);
  assert_eq!(streamed.events[0].what, "second");
  assert!(streamed.events[0].stack.is_empty());

  t.finish();
  let streamed = t.stream_snapshot();
  assert_eq!(streamed.events.len(), 2);
  assert!(streamed.events.iter().all(|e| e.stack.is_empty()));
}

#[test]
fn trace_ids_are_unique_and_sort_with_creation_order() {
  let a = Trace::new("svc-a", "http", 10);
  let b = Trace::new("svc-a", "http", 10);
  assert_ne!(a.id(), b.id());
  assert!(a.id() <= b.id());
}
