#![cfg(test)]

use crate::config::CollectorConfig;
use std::time::Duration;

#[test]
fn defaults_match_spec() {
  let cfg = CollectorConfig::default();
  assert_eq!(cfg.events_max, 1000);
  assert_eq!(cfg.ring_capacity, 1000);
  assert_eq!(cfg.search_limit_default, 10);
  assert_eq!(cfg.subscriber_queue, 16);
  assert_eq!(cfg.default_bucketing.first(), Some(&Duration::ZERO));
  assert_eq!(cfg.default_bucketing.len(), 9);
}

#[test]
fn events_max_is_clamped() {
  let cfg = CollectorConfig::default().with_events_max(3);
  assert_eq!(cfg.events_max, 10);
  let cfg = CollectorConfig::default().with_events_max(999_999);
  assert_eq!(cfg.events_max, 10_000);
}

#[test]
fn search_limit_is_clamped() {
  let cfg = CollectorConfig::default().with_search_limit_default(0);
  assert_eq!(cfg.search_limit_default, 1);
  let cfg = CollectorConfig::default().with_search_limit_default(1000);
  assert_eq!(cfg.search_limit_default, 250);
}

#[test]
fn bucketing_always_starts_with_zero() {
  let cfg = CollectorConfig::default()
    .with_bucketing(vec![Duration::from_millis(5), Duration::from_millis(1)]);
  assert_eq!(cfg.default_bucketing[0], Duration::ZERO);
  assert_eq!(cfg.default_bucketing[1], Duration::from_millis(1));
  assert_eq!(cfg.default_bucketing[2], Duration::from_millis(5));
}
