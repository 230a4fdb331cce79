#![cfg(test)]

use crate::event::{Event, LazyArg};

#[test]
fn eager_event_is_rendered_immediately() {
  let ev = Event::eager("hello 7", false, false);
  assert_eq!(ev.what(), "hello 7");
  assert!(!ev.is_error());
}

#[test]
fn lazy_event_renders_on_first_read_and_memoizes() {
  let ev = Event::lazy("hello {}", vec![LazyArg::from(7i64)], false, false);
  assert_eq!(ev.what(), "hello 7");
  // second read must return the same memoized string
  assert_eq!(ev.what(), "hello 7");
}

#[test]
fn lazy_event_concurrent_reads_agree() {
  use std::sync::Arc;
  use std::thread;

  let ev = Arc::new(Event::lazy(
    "n={}",
    vec![LazyArg::from(42i64)],
    false,
    false,
  ));
  let handles: Vec<_> = (0..8)
    .map(|_| {
      let ev = Arc::clone(&ev);
      thread::spawn(move || ev.what())
    })
    .collect();
  let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  assert!(results.iter().all(|r| r == "n=42"));
}

#[test]
fn error_event_is_flagged() {
  let ev = Event::eager("boom", true, false);
  assert!(ev.is_error());
}

#[test]
fn synthetic_truncated_event_text() {
  let ev = Event::synthetic_truncated(17);
  assert_eq!(ev.what(), "(truncated 17 events)");
}

#[test]
fn stack_capture_is_optional() {
  let with_stack = Event::eager("x", false, true);
  let without_stack = Event::eager("x", false, false);
  assert!(with_stack.has_stack());
  assert!(!without_stack.has_stack());
  assert!(without_stack.stack_frames().is_empty());
}

#[test]
fn render_handles_missing_or_extra_args_gracefully() {
  let ev = Event::lazy("{} and {}", vec![LazyArg::from("a")], false, false);
  assert_eq!(ev.what(), "a and {}");
}
