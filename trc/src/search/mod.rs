//! The search engine: walks a [`CategoryStore`], evaluates a [`Filter`],
//! and produces sorted, limited results plus statistics (spec.md §4.6).

mod __test__;

use crate::category_store::CategoryStore;
use crate::config::CollectorConfig;
use crate::filter::Filter;
use crate::ring_buffer::Walk;
use crate::stats::SearchStats;
use crate::trace::StaticTrace;
use chrono::{Duration as ChronoDuration, Utc};

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
  pub filter: Filter,
  pub bucketing: Vec<ChronoDuration>,
  pub limit: usize,
  pub stack_depth: i64,
}

impl SearchRequest {
  /// Populates default bucketing, clamps `limit` into `[1, 250]`
  /// (default 10 if zero), and compiles the filter's query regex,
  /// returning any non-fatal problems encountered.
  fn normalize(&mut self, config: &CollectorConfig) -> Vec<String> {
    if self.bucketing.is_empty() {
      self.bucketing = config
        .default_bucketing
        .iter()
        .map(|d| ChronoDuration::from_std(*d).unwrap_or_default())
        .collect();
    }
    self.limit = if self.limit == 0 {
      config.search_limit_default
    } else {
      self.limit.clamp(1, 250)
    };
    self.filter.normalize()
  }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchResponse {
  pub sources: Vec<String>,
  pub total_count: u64,
  pub match_count: u64,
  pub traces: Vec<StaticTrace>,
  pub stats: SearchStats,
  pub problems: Vec<String>,
  #[serde(with = "crate::stats::duration_millis")]
  pub duration: ChronoDuration,
}

pub struct SearchEngine;

impl SearchEngine {
  /// Runs one search against a single collector's category store.
  pub fn search(
    store: &CategoryStore,
    source: &str,
    config: &CollectorConfig,
    mut request: SearchRequest,
  ) -> SearchResponse {
    let started = Utc::now();
    let problems = request.normalize(config);

    let mut stats = SearchStats::new(request.bucketing.clone());
    let mut total_count: u64 = 0;
    let mut match_count: u64 = 0;
    let mut traces = Vec::new();

    let snapshot = store.snapshot();
    for buffer in snapshot.values() {
      let mut selected_in_category = 0usize;
      buffer.walk(|candidate| {
        stats.observe(candidate);
        total_count += 1;
        if request.filter.allow(candidate) {
          match_count += 1;
          if selected_in_category < request.limit {
            traces.push(candidate.snapshot(request.stack_depth));
            selected_in_category += 1;
          }
        }
        Walk::Continue
      });
    }

    traces.sort_by(|a, b| b.started.cmp(&a.started));
    traces.truncate(request.limit);

    SearchResponse {
      sources: vec![source.to_string()],
      total_count,
      match_count,
      traces,
      stats,
      problems,
      duration: Utc::now() - started,
    }
  }
}
