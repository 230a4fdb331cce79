#![cfg(test)]

use crate::collector::Collector;
use crate::config::CollectorConfig;
use crate::filter::Filter;
use crate::search::SearchRequest;

#[test]
fn new_trace_is_searchable_immediately() {
  let collector = Collector::new("node-1", CollectorConfig::default());
  let handle = collector.new_trace("http");
  handle.tracef("hello {}", vec![crate::event::LazyArg::from(7i64)]);
  handle.finish();

  let response = collector.search(SearchRequest {
    filter: Filter {
      category: "http".into(),
      ..Filter::default()
    },
    limit: 10,
    ..SearchRequest::default()
  });
  assert_eq!(response.match_count, 1);
  assert_eq!(response.traces[0].id, handle.id());
}

#[test]
fn subscriber_receives_created_and_finished_changes() {
  let collector = Collector::new("node-1", CollectorConfig::default());
  let (handle_id, rx) = collector.subscribe(Filter::default());
  let trace = collector.new_trace("http");
  trace.tracef("step", vec![]);
  trace.finish();

  // created, one trace event, and finish — three publishes observed.
  let mut received = 0;
  while rx.try_recv().is_ok() {
    received += 1;
  }
  assert_eq!(received, 3);
  let stats = collector.unsubscribe(handle_id);
  assert_eq!(stats.sends, 3);
}

#[test]
fn resize_shrinks_every_category() {
  let collector = Collector::new("node-1", CollectorConfig::default().with_ring_capacity(10));
  for _ in 0..5 {
    collector.new_trace("http").finish();
  }
  collector.resize(2);
  let response = collector.search(SearchRequest {
    limit: 10,
    ..SearchRequest::default()
  });
  assert_eq!(response.total_count, 2);
}
