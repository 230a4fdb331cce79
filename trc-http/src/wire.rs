//! JSON wire types for the HTTP federation collaborator (spec.md §6).
//! Field names here are normative — they are what a peer on the wire
//! actually sends and receives — and intentionally diverge from the
//! core crate's own internal `Serialize` derives where the spec
//! requires a different shape (notably `fileline`, not `file_line`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trc::search::{SearchRequest, SearchResponse};
use trc::trace::{EventView, StaticTrace, TraceId};
use trc::Filter;

fn format_duration(d: chrono::Duration) -> String {
  let nanos = d.num_nanoseconds().unwrap_or(0);
  if nanos == 0 {
    return "0s".to_string();
  }
  if nanos % 1_000_000_000 == 0 {
    format!("{}s", nanos / 1_000_000_000)
  } else if nanos % 1_000_000 == 0 {
    format!("{}ms", nanos / 1_000_000)
  } else if nanos % 1_000 == 0 {
    format!("{}\u{b5}s", nanos / 1_000)
  } else {
    format!("{nanos}ns")
  }
}

fn parse_duration(s: &str) -> Option<chrono::Duration> {
  let s = s.trim();
  let (digits, unit) = if let Some(rest) = s.strip_suffix("\u{b5}s") {
    (rest, "us")
  } else if let Some(rest) = s.strip_suffix("us") {
    (rest, "us")
  } else if let Some(rest) = s.strip_suffix("ms") {
    (rest, "ms")
  } else if let Some(rest) = s.strip_suffix("ns") {
    (rest, "ns")
  } else if let Some(rest) = s.strip_suffix('s') {
    (rest, "s")
  } else {
    return None;
  };
  let value: f64 = digits.parse().ok()?;
  let nanos = match unit {
    "ns" => value,
    "us" => value * 1_000.0,
    "ms" => value * 1_000_000.0,
    "s" => value * 1_000_000_000.0,
    _ => return None,
  };
  Some(chrono::Duration::nanoseconds(nanos.round() as i64))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireSearchRequest {
  #[serde(default)]
  pub sources: Vec<String>,
  #[serde(default)]
  pub ids: Vec<String>,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub is_active: Option<bool>,
  #[serde(default)]
  pub is_finished: Option<bool>,
  #[serde(default)]
  pub is_errored: Option<bool>,
  #[serde(default)]
  pub min_duration: Option<String>,
  #[serde(default)]
  pub query: String,
  #[serde(default)]
  pub bucketing: Vec<String>,
  #[serde(default)]
  pub limit: usize,
  #[serde(default)]
  pub stack_depth: i64,
}

impl From<&SearchRequest> for WireSearchRequest {
  fn from(request: &SearchRequest) -> Self {
    Self {
      sources: request.filter.sources.clone(),
      ids: request.filter.ids.iter().map(|id| id.to_string()).collect(),
      category: request.filter.category.clone(),
      is_active: request.filter.is_active,
      is_finished: request.filter.is_finished,
      is_errored: request.filter.is_errored,
      min_duration: request.filter.min_duration.map(format_duration),
      query: request.filter.query.clone(),
      bucketing: request.bucketing.iter().map(|d| format_duration(*d)).collect(),
      limit: request.limit,
      stack_depth: request.stack_depth,
    }
  }
}

impl From<WireSearchRequest> for SearchRequest {
  fn from(wire: WireSearchRequest) -> Self {
    let mut filter = Filter {
      sources: wire.sources,
      ids: wire.ids.iter().filter_map(|id| id.parse::<TraceId>().ok()).collect(),
      category: wire.category,
      is_active: wire.is_active,
      is_finished: wire.is_finished,
      is_errored: wire.is_errored,
      min_duration: wire.min_duration.as_deref().and_then(parse_duration),
      query: wire.query,
      ..Filter::default()
    };
    let _ = filter.normalize();
    Self {
      filter,
      bucketing: wire.bucketing.iter().filter_map(|s| parse_duration(s)).collect(),
      limit: wire.limit,
      stack_depth: wire.stack_depth,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFrame {
  pub function: String,
  pub fileline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
  pub when: DateTime<Utc>,
  pub what: String,
  #[serde(default)]
  pub stack: Vec<WireFrame>,
  pub is_error: bool,
}

impl From<&EventView> for WireEvent {
  fn from(view: &EventView) -> Self {
    Self {
      when: view.when,
      what: view.what.clone(),
      stack: view
        .stack
        .iter()
        .map(|f| WireFrame {
          function: f.function.clone(),
          fileline: f.file_line.clone(),
        })
        .collect(),
      is_error: view.is_error,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTrace {
  pub id: String,
  pub source: String,
  pub category: String,
  pub started: DateTime<Utc>,
  pub duration: String,
  pub finished: bool,
  pub errored: bool,
  pub events: Vec<WireEvent>,
}

impl From<&StaticTrace> for WireTrace {
  fn from(trace: &StaticTrace) -> Self {
    Self {
      id: trace.id.to_string(),
      source: trace.source.clone(),
      category: trace.category.clone(),
      started: trace.started,
      duration: format_duration(trace.duration),
      finished: trace.finished,
      errored: trace.errored,
      events: trace.events.iter().map(WireEvent::from).collect(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSearchResponse {
  pub request: WireSearchRequest,
  pub sources: Vec<String>,
  pub total_count: u64,
  pub match_count: u64,
  pub traces: Vec<WireTrace>,
  pub stats: trc::stats::SearchStats,
  pub problems: Vec<String>,
  pub duration: String,
}

impl WireSearchResponse {
  pub fn from_response(request: &SearchRequest, response: &SearchResponse) -> Self {
    Self {
      request: WireSearchRequest::from(request),
      sources: response.sources.clone(),
      total_count: response.total_count,
      match_count: response.match_count,
      traces: response.traces.iter().map(WireTrace::from).collect(),
      stats: response.stats.clone(),
      problems: response.problems.clone(),
      duration: format_duration(response.duration),
    }
  }

  /// Reconstructs a `SearchResponse`. The per-trace `events` are carried
  /// through as already-resolved [`EventView`]s (a wire trace has no live
  /// `Event`/`Stack` to re-resolve), and `id` strings that fail to parse
  /// are dropped rather than failing the whole response, consistent with
  /// this crate's clamp-don't-reject posture toward malformed input.
  pub fn into_search_response(self) -> SearchResponse {
    let traces = self
      .traces
      .into_iter()
      .map(|t| StaticTrace {
        id: t.id.parse().unwrap_or(TraceId::from_u128(0)),
        source: t.source,
        category: t.category,
        started: t.started,
        duration: parse_duration(&t.duration).unwrap_or_else(chrono::Duration::zero),
        finished: t.finished,
        errored: t.errored,
        events: t
          .events
          .into_iter()
          .map(|e| EventView {
            when: e.when,
            what: e.what,
            is_error: e.is_error,
            stack: e
              .stack
              .into_iter()
              .map(|f| trc::event::Frame {
                function: f.function,
                file_line: f.fileline,
              })
              .collect(),
          })
          .collect(),
      })
      .collect();
    SearchResponse {
      sources: self.sources,
      total_count: self.total_count,
      match_count: self.match_count,
      traces,
      stats: self.stats,
      problems: self.problems,
      duration: parse_duration(&self.duration).unwrap_or_else(chrono::Duration::zero),
    }
  }
}
