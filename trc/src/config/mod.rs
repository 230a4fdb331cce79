//! Operator-facing configuration constants and their defaults.
//!
//! Generalizes `Trace::init(capacity, channel_capacity)` from the teacher
//! crate's two positional constructor arguments into a builder-style struct,
//! since a [`Collector`](crate::collector::Collector) has five
//! independently tunable knobs instead of two.

mod __test__;

use std::time::Duration;

/// `events_max` must fall in this range; values outside are clamped.
pub const EVENTS_MAX_RANGE: (usize, usize) = (10, 10_000);
/// `search_limit` must fall in this range; values outside are clamped.
pub const SEARCH_LIMIT_RANGE: (usize, usize) = (1, 250);

const EVENTS_MAX_DEFAULT: usize = 1000;
const RING_CAPACITY_DEFAULT: usize = 1000;
const SEARCH_LIMIT_DEFAULT: usize = 10;
const SUBSCRIBER_QUEUE_DEFAULT: usize = 16;

/// Collector-wide tunables, clamped on the way in rather than rejected.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
  /// Maximum events retained per trace before truncation kicks in.
  pub events_max: usize,
  /// Capacity of each category's ring buffer.
  pub ring_capacity: usize,
  /// Default search result limit when a request doesn't specify one.
  pub search_limit_default: usize,
  /// Bounded queue depth for each broker subscriber.
  pub subscriber_queue: usize,
  /// Default duration bucketing for stats, always starting at zero.
  pub default_bucketing: Vec<Duration>,
}

impl CollectorConfig {
  /// The bucketing spec.md names: `{0, 100µs, 1ms, 5ms, 10ms, 25ms, 50ms,
  /// 100ms, 1s}`.
  pub fn default_bucketing() -> Vec<Duration> {
    vec![
      Duration::from_micros(0),
      Duration::from_micros(100),
      Duration::from_millis(1),
      Duration::from_millis(5),
      Duration::from_millis(10),
      Duration::from_millis(25),
      Duration::from_millis(50),
      Duration::from_millis(100),
      Duration::from_secs(1),
    ]
  }

  pub fn with_events_max(mut self, n: usize) -> Self {
    self.events_max = clamp(n, EVENTS_MAX_RANGE);
    self
  }

  pub fn with_ring_capacity(mut self, n: usize) -> Self {
    self.ring_capacity = n.max(1);
    self
  }

  pub fn with_search_limit_default(mut self, n: usize) -> Self {
    self.search_limit_default = clamp(n, SEARCH_LIMIT_RANGE);
    self
  }

  pub fn with_subscriber_queue(mut self, n: usize) -> Self {
    self.subscriber_queue = n.max(1);
    self
  }

  /// Validates and normalizes an arbitrary bucketing list: sorted,
  /// deduplicated, and forced to start with zero. Never fails — this is
  /// the same clamp-don't-reject policy spec.md §7 applies to search
  /// normalization.
  pub fn with_bucketing(mut self, mut bucketing: Vec<Duration>) -> Self {
    bucketing.sort();
    bucketing.dedup();
    if bucketing.first() != Some(&Duration::ZERO) {
      bucketing.insert(0, Duration::ZERO);
    }
    self.default_bucketing = bucketing;
    self
  }
}

impl Default for CollectorConfig {
  fn default() -> Self {
    Self {
      events_max: EVENTS_MAX_DEFAULT,
      ring_capacity: RING_CAPACITY_DEFAULT,
      search_limit_default: SEARCH_LIMIT_DEFAULT,
      subscriber_queue: SUBSCRIBER_QUEUE_DEFAULT,
      default_bucketing: Self::default_bucketing(),
    }
  }
}

fn clamp(n: usize, (lo, hi): (usize, usize)) -> usize {
  n.clamp(lo, hi)
}
