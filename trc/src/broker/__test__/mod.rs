#![cfg(test)]

use crate::broker::Broker;
use crate::filter::Filter;
use crate::trace::Trace;

#[test]
fn matching_publish_is_received() {
  let broker = Broker::new();
  let (handle, rx) = broker.subscribe(Filter::default(), 4);
  let t = Trace::new("s", "http", 10);
  broker.publish(&t);
  let received = rx.try_recv().unwrap();
  assert_eq!(received.category, "http");
  let stats = broker.unsubscribe(handle);
  assert_eq!(stats.sends, 1);
  assert_eq!(stats.skips, 0);
  assert_eq!(stats.drops, 0);
}

#[test]
fn non_matching_publish_counts_as_skip() {
  let broker = Broker::new();
  let filter = Filter {
    category: "db".into(),
    ..Filter::default()
  };
  let (handle, rx) = broker.subscribe(filter, 4);
  let t = Trace::new("s", "http", 10);
  broker.publish(&t);
  assert!(rx.try_recv().is_err());
  let stats = broker.unsubscribe(handle);
  assert_eq!(stats.skips, 1);
  assert_eq!(stats.sends, 0);
}

#[test]
fn full_queue_drops_and_counts() {
  let broker = Broker::new();
  let (handle, rx) = broker.subscribe(Filter::default(), 1);
  let t = Trace::new("s", "http", 10);
  broker.publish(&t);
  broker.publish(&t);
  let stats = broker.unsubscribe(handle);
  assert_eq!(stats.sends, 1);
  assert_eq!(stats.drops, 1);
  assert_eq!(stats.skips + stats.sends + stats.drops, 2);
  drop(rx);
}

#[test]
fn unsubscribe_is_idempotent() {
  let broker = Broker::new();
  let (handle, _rx) = broker.subscribe(Filter::default(), 4);
  let t = Trace::new("s", "http", 10);
  broker.publish(&t);
  let first = broker.unsubscribe(handle);
  let second = broker.unsubscribe(handle);
  assert_eq!(first, second);
  assert_eq!(broker.subscriber_count(), 0);
}

#[test]
fn subscribe_named_rejects_duplicate_names() {
  let broker = Broker::new();
  assert!(broker.subscribe_named("dashboard", Filter::default(), 4).is_ok());
  assert!(broker.subscribe_named("dashboard", Filter::default(), 4).is_err());
}

#[test]
fn stats_reports_not_subscribed_for_unknown_handle() {
  let broker = Broker::new();
  let (handle, _rx) = broker.subscribe(Filter::default(), 4);
  let bogus = broker.unsubscribe(handle);
  let _ = bogus;
  // a handle value this broker never issued.
  let unknown = crate::broker::Broker::new().stats(handle);
  assert!(unknown.is_err());
}
