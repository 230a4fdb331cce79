#![cfg(test)]

use crate::stats::SearchStats;
use crate::trace::Trace;
use chrono::Duration;
use std::thread::sleep;
use std::time::Duration as StdDuration;

fn bucketing() -> Vec<Duration> {
  vec![Duration::zero(), Duration::milliseconds(1), Duration::milliseconds(10)]
}

#[test]
fn observe_counts_active_and_finished_separately() {
  let mut stats = SearchStats::new(bucketing());
  let active = Trace::new("s", "http", 10);
  let finished = Trace::new("s", "http", 10);
  finished.finish();
  stats.observe(&active);
  stats.observe(&finished);
  let cat = &stats.categories[0];
  assert_eq!(cat.total, 2);
  assert_eq!(cat.active, 1);
  assert_eq!(cat.succeeded, 1);
  assert_eq!(cat.errored, 0);
}

#[test]
fn observe_buckets_every_threshold_met() {
  let mut stats = SearchStats::new(bucketing());
  let t = Trace::new("s", "http", 10);
  sleep(StdDuration::from_millis(12));
  t.finish();
  stats.observe(&t);
  let cat = &stats.categories[0];
  // duration >= 12ms satisfies all three buckets (0, 1ms, 10ms).
  assert!(cat.buckets.iter().all(|b| b.count == 1));
}

#[test]
fn categories_are_kept_sorted_by_name() {
  let mut stats = SearchStats::new(bucketing());
  stats.observe(&Trace::new("s", "zeta", 10));
  stats.observe(&Trace::new("s", "alpha", 10));
  let names: Vec<_> = stats.categories.iter().map(|c| c.name.clone()).collect();
  assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn merge_adds_disjoint_shards() {
  let mut a = SearchStats::new(bucketing());
  let mut b = SearchStats::new(bucketing());
  let t1 = Trace::new("s1", "http", 10);
  t1.finish();
  a.observe(&t1);
  let t2 = Trace::new("s2", "http", 10);
  t2.finish();
  b.observe(&t2);
  a.merge(&b).unwrap();
  assert_eq!(a.categories[0].total, 2);
  assert_eq!(a.categories[0].succeeded, 2);
}

#[test]
fn merge_rejects_incompatible_bucketing() {
  let mut a = SearchStats::new(bucketing());
  let mut b = SearchStats::new(vec![Duration::zero(), Duration::milliseconds(5)]);
  a.observe(&Trace::new("s", "http", 10));
  b.observe(&Trace::new("s", "http", 10));
  assert!(a.merge(&b).is_err());
}

#[test]
fn overall_aggregates_every_category() {
  let mut stats = SearchStats::new(bucketing());
  stats.observe(&Trace::new("s", "a", 10));
  stats.observe(&Trace::new("s", "b", 10));
  let overall = stats.overall();
  assert_eq!(overall.name, "overall");
  assert_eq!(overall.total, 2);
}
