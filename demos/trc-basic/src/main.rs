//! Walks through the Producer API end to end: create a collector, trace
//! a couple of operations through the ambient context, search for them,
//! and read a live subscription.

use std::thread;
use std::time::Duration;
use trc::config::CollectorConfig;
use trc::event::LazyArg;
use trc::filter::Filter;
use trc::search::SearchRequest;
use trc::{collector::Collector, context};

fn handle_request(collector: &std::sync::Arc<Collector>, route: &str, user_id: u64) {
  let trace = context::new(collector, route.to_string());
  trace.tracef("dispatching to handler", vec![]);
  trace.lazy_tracef("loaded user {}", vec![LazyArg::from(user_id)]);
  if user_id == 0 {
    trace.errorf("rejected anonymous user", vec![]);
  }
  trace.finish();
  context::clear();
}

fn main() {
  let collector = Collector::new("demo-host:9090", CollectorConfig::default());

  let (_handle, stream) = collector.subscribe(Filter::default());

  handle_request(&collector, "/orders", 42);
  handle_request(&collector, "/orders", 0);
  handle_request(&collector, "/health", 1);

  // drain whatever the broker delivered while we were tracing above.
  while let Ok(change) = stream.try_recv() {
    println!("stream: {} {} finished={}", change.category, change.id, change.finished);
  }

  let response = collector.search(SearchRequest {
    filter: Filter {
      category: "/orders".into(),
      ..Filter::default()
    },
    limit: 10,
    ..SearchRequest::default()
  });

  println!(
    "search /orders: match_count={} total_count={}",
    response.match_count, response.total_count
  );
  for trace in &response.traces {
    println!(
      "  trace {} errored={} events={}",
      trace.id,
      trace.errored,
      trace.events.len()
    );
    for event in &trace.events {
      println!("    {} {}", event.when, event.what);
    }
  }

  let overall = response.stats.overall();
  println!(
    "overall: total={} succeeded={} errored={}",
    overall.total, overall.succeeded, overall.errored
  );

  thread::sleep(Duration::from_millis(1));
}
