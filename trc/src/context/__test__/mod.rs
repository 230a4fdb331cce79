#![cfg(test)]

use crate::collector::Collector;
use crate::config::CollectorConfig;
use crate::context;

#[test]
fn get_is_none_until_a_trace_is_bound() {
  context::clear();
  assert!(context::get().is_none());
  let collector = Collector::new("node-1", CollectorConfig::default());
  let handle = context::new(&collector, "http");
  assert_eq!(context::get().unwrap().id(), handle.id());
  context::clear();
}

#[test]
fn get_or_create_reuses_bound_trace_and_annotates_it() {
  context::clear();
  let collector = Collector::new("node-1", CollectorConfig::default());
  let first = context::get_or_create(&collector, "http");
  let second = context::get_or_create(&collector, "retry");
  assert_eq!(first.id(), second.id());
  let events = second.events();
  assert_eq!(events.last().unwrap().what, "(+ retry)");
  context::clear();
}

#[test]
fn new_always_creates_a_fresh_trace_even_with_one_bound() {
  context::clear();
  let collector = Collector::new("node-1", CollectorConfig::default());
  let first = context::new(&collector, "http");
  let second = context::new(&collector, "http");
  assert_ne!(first.id(), second.id());
  context::clear();
}
