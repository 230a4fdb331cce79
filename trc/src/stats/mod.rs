//! Per-category and per-duration-bucket counters, mergeable across
//! federation shards (spec.md §3, §4.7).

mod __test__;

use crate::error::TrcError;
use crate::trace::Trace;
use chrono::{DateTime, Duration as ChronoDuration, Utc};

/// Count of finished traces whose duration is at least `min_duration`.
/// Histogram-style: every bucket whose threshold is met is incremented,
/// not just the tightest one.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BucketStats {
  #[serde(with = "duration_millis")]
  pub min_duration: ChronoDuration,
  pub count: u64,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CategoryStats {
  pub name: String,
  pub active: u64,
  pub errored: u64,
  pub succeeded: u64,
  pub total: u64,
  pub buckets: Vec<BucketStats>,
  pub oldest: Option<DateTime<Utc>>,
  pub newest: Option<DateTime<Utc>>,
  pub rate_per_second: Option<f64>,
}

impl CategoryStats {
  fn new(name: impl Into<String>, bucketing: &[ChronoDuration]) -> Self {
    Self {
      name: name.into(),
      active: 0,
      errored: 0,
      succeeded: 0,
      total: 0,
      buckets: bucketing
        .iter()
        .map(|min_duration| BucketStats {
          min_duration: *min_duration,
          count: 0,
        })
        .collect(),
      oldest: None,
      newest: None,
      rate_per_second: None,
    }
  }

  fn observe_one(&mut self, trace: &Trace) {
    self.total += 1;
    if trace.is_active() {
      self.active += 1;
    } else {
      if trace.is_errored() {
        self.errored += 1;
      } else {
        self.succeeded += 1;
      }
      let duration = trace.duration();
      for bucket in &mut self.buckets {
        if bucket.min_duration <= duration {
          bucket.count += 1;
        }
      }
    }
    let started = trace.started();
    self.oldest = Some(self.oldest.map_or(started, |o| o.min(started)));
    self.newest = Some(self.newest.map_or(started, |n| n.max(started)));
    self.recompute_rate();
  }

  fn recompute_rate(&mut self) {
    self.rate_per_second = match (self.oldest, self.newest) {
      (Some(o), Some(n)) if n > o => {
        let secs = (n - o).num_milliseconds() as f64 / 1000.0;
        (secs > 0.0).then(|| self.total as f64 / secs)
      }
      _ => None,
    };
  }

  /// Elementwise merge: counters add, timestamps extreme-combine, bucket
  /// lists must align exactly by `min_duration` or this is a hard error.
  fn merge(&mut self, other: &CategoryStats) -> Result<(), TrcError> {
    if self.buckets.len() != other.buckets.len()
      || self
        .buckets
        .iter()
        .zip(other.buckets.iter())
        .any(|(a, b)| a.min_duration != b.min_duration)
    {
      return Err(TrcError::MergeMismatch {
        expected: self
          .buckets
          .iter()
          .map(|b| b.min_duration.to_std().unwrap_or_default())
          .collect(),
        found: other
          .buckets
          .iter()
          .map(|b| b.min_duration.to_std().unwrap_or_default())
          .collect(),
      });
    }
    self.active += other.active;
    self.errored += other.errored;
    self.succeeded += other.succeeded;
    self.total += other.total;
    for (a, b) in self.buckets.iter_mut().zip(other.buckets.iter()) {
      a.count += b.count;
    }
    self.oldest = match (self.oldest, other.oldest) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, None) => a,
      (None, b) => b,
    };
    self.newest = match (self.newest, other.newest) {
      (Some(a), Some(b)) => Some(a.max(b)),
      (a, None) => a,
      (None, b) => b,
    };
    self.recompute_rate();
    Ok(())
  }
}

pub(crate) mod duration_millis {
  use chrono::Duration;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_milliseconds())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    Ok(Duration::milliseconds(i64::deserialize(d)?))
  }
}

/// A sorted list of per-category counters, accumulated during one search
/// and mergeable with the stats of another shard.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchStats {
  pub categories: Vec<CategoryStats>,
  #[serde(default)]
  bucketing: Vec<ChronoDuration>,
}

impl SearchStats {
  pub fn new(bucketing: Vec<ChronoDuration>) -> Self {
    Self {
      categories: Vec::new(),
      bucketing,
    }
  }

  pub fn observe(&mut self, trace: &Trace) {
    let idx = match self.categories.binary_search_by(|c| c.name.as_str().cmp(trace.category())) {
      Ok(idx) => idx,
      Err(idx) => {
        self
          .categories
          .insert(idx, CategoryStats::new(trace.category(), &self.bucketing));
        idx
      }
    };
    self.categories[idx].observe_one(trace);
  }

  /// Strict on bucketing alignment (per category), forgiving on category
  /// presence: categories present only in `other` are added wholesale.
  pub fn merge(&mut self, other: &SearchStats) -> Result<(), TrcError> {
    for incoming in &other.categories {
      match self
        .categories
        .binary_search_by(|c| c.name.as_str().cmp(incoming.name.as_str()))
      {
        Ok(idx) => self.categories[idx].merge(incoming)?,
        Err(idx) => self.categories.insert(idx, incoming.clone()),
      }
    }
    Ok(())
  }

  /// A derived `CategoryStats` named `"overall"` aggregating every real
  /// category currently present.
  pub fn overall(&self) -> CategoryStats {
    let mut overall = CategoryStats::new("overall", &self.bucketing);
    for category in &self.categories {
      overall.active += category.active;
      overall.errored += category.errored;
      overall.succeeded += category.succeeded;
      overall.total += category.total;
      for (o, c) in overall.buckets.iter_mut().zip(category.buckets.iter()) {
        o.count += c.count;
      }
      overall.oldest = match (overall.oldest, category.oldest) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
      };
      overall.newest = match (overall.newest, category.newest) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
      };
    }
    overall.recompute_rate();
    overall
  }
}
