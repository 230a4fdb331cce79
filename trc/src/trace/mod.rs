//! Trace identity and the live/static trace pair (spec.md §3, §4.4).
//!
//! A [`Trace`] is the single mutable record of one traced operation: a
//! bounded, mutex-guarded event list plus a handful of status fields. All
//! mutations funnel through one lock so that `errored` is always visible
//! to a reader no later than the event that caused it — matching the
//! ordering guarantee in spec.md §4.4. Once [`Trace::finish`] has run,
//! every mutating method silently no-ops.
//!
//! [`StaticTrace`] is the read-only projection handed out to search
//! results and stream subscribers: a plain snapshot with no further
//! ability to mutate the original.

mod __test__;

use crate::event::{render, Event, Frame, LazyArg};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

static TRACE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique, creation-time-sortable trace identifier: the upper 64
/// bits are the creation timestamp in milliseconds since the epoch, the
/// lower 64 bits are a process-wide monotonic counter. Generalizes the
/// teacher's 64-bit `pack_meta`/`unpack_meta` bit-packing to 128 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TraceId(u128);

impl TraceId {
  fn new() -> Self {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let counter = TRACE_COUNTER.fetch_add(1, Ordering::Relaxed) as u128;
    Self((millis << 64) | counter)
  }

  /// The timestamp component, independent of the counter.
  pub fn created_millis(&self) -> u64 {
    (self.0 >> 64) as u64
  }

  pub fn as_u128(&self) -> u128 {
    self.0
  }

  pub fn from_u128(v: u128) -> Self {
    Self(v)
  }
}

impl fmt::Display for TraceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:032x}", self.0)
  }
}

impl std::str::FromStr for TraceId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    u128::from_str_radix(s, 16).map(TraceId)
  }
}

/// An event reduced to its final, immutable shape: formatted text and
/// resolved stack frames, ready for serialization or display. Events
/// inside a live [`Trace`] are only ever exposed this way — never as the
/// mutable [`Event`] they started as.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventView {
  pub when: DateTime<Utc>,
  pub what: String,
  pub is_error: bool,
  pub stack: Vec<Frame>,
}

impl Event {
  fn to_view(&self) -> EventView {
    EventView {
      when: self.when(),
      what: self.what(),
      is_error: self.is_error(),
      stack: self.stack_frames(),
    }
  }
}

/// Apply spec.md §4.6's stack-depth truncation convention to a view:
/// `0` keeps frames as captured, negative drops all frames, positive caps
/// the frame count.
fn apply_stack_depth(mut view: EventView, stack_depth: i64) -> EventView {
  if stack_depth < 0 {
    view.stack.clear();
  } else if stack_depth > 0 {
    view.stack.truncate(stack_depth as usize);
  }
  view
}

struct Inner {
  events: std::collections::VecDeque<Event>,
  truncated: u64,
  errored: bool,
  finished: bool,
  duration: Option<ChronoDuration>,
  events_max: usize,
}

/// A single traced operation: identity, status, and a bounded event log.
/// Cheaply shared via `Arc<Trace>` — ring buffers, the broker, and search
/// results all hold the same instance rather than a copy.
pub struct Trace {
  id: TraceId,
  source: String,
  category: String,
  started: DateTime<Utc>,
  inner: Mutex<Inner>,
}

impl Trace {
  pub fn new(source: impl Into<String>, category: impl Into<String>, events_max: usize) -> Self {
    Self {
      id: TraceId::new(),
      source: source.into(),
      category: category.into(),
      started: Utc::now(),
      inner: Mutex::new(Inner {
        events: std::collections::VecDeque::new(),
        truncated: 0,
        errored: false,
        finished: false,
        duration: None,
        events_max: events_max.max(1),
      }),
    }
  }

  pub fn id(&self) -> TraceId {
    self.id
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  pub fn category(&self) -> &str {
    &self.category
  }

  pub fn started(&self) -> DateTime<Utc> {
    self.started
  }

  /// Wall-clock duration since `finish()`, or elapsed time so far if the
  /// trace is still active.
  pub fn duration(&self) -> ChronoDuration {
    let inner = self.inner.lock().unwrap();
    inner.duration.unwrap_or_else(|| Utc::now() - self.started)
  }

  /// Sticky: once an error event is recorded the flag never clears, even
  /// if the trace is still active.
  pub fn is_errored(&self) -> bool {
    self.inner.lock().unwrap().errored
  }

  pub fn is_finished(&self) -> bool {
    self.inner.lock().unwrap().finished
  }

  pub fn is_active(&self) -> bool {
    !self.is_finished()
  }

  fn push(&self, event: Event, is_error: bool) {
    let mut inner = self.inner.lock().unwrap();
    if inner.finished {
      return;
    }
    if is_error {
      inner.errored = true;
    }
    if inner.events.len() >= inner.events_max {
      inner.truncated += 1;
    } else {
      inner.events.push_back(event);
    }
  }

  pub fn tracef(&self, format: &'static str, args: Vec<LazyArg>) {
    self.push(Event::eager(render(format, &args), false, false), false);
  }

  pub fn lazy_tracef(&self, format: &'static str, args: Vec<LazyArg>) {
    self.push(Event::lazy(format, args, false, false), false);
  }

  pub fn errorf(&self, format: &'static str, args: Vec<LazyArg>) {
    self.push(Event::eager(render(format, &args), true, false), true);
  }

  pub fn lazy_errorf(&self, format: &'static str, args: Vec<LazyArg>) {
    self.push(Event::lazy(format, args, true, false), true);
  }

  /// Like [`Trace::tracef`] but also captures the call stack; intended
  /// for the less frequent, higher-value call sites (typically alongside
  /// `errorf`) where the cost of capture is worth paying.
  pub fn tracef_stack(&self, format: &'static str, args: Vec<LazyArg>) {
    self.push(Event::eager(render(format, &args), false, true), false);
  }

  pub fn errorf_stack(&self, format: &'static str, args: Vec<LazyArg>) {
    self.push(Event::eager(render(format, &args), true, true), true);
  }

  /// Ends the trace, fixing its duration. Idempotent: calling `finish`
  /// again (or any mutating method afterward) is a no-op.
  pub fn finish(&self) {
    let mut inner = self.inner.lock().unwrap();
    if inner.finished {
      return;
    }
    inner.finished = true;
    inner.duration = Some(Utc::now() - self.started);
  }

  /// A freshly-allocated snapshot of recorded events, oldest first, with
  /// a synthetic `"(truncated N events)"` entry appended if the bounded
  /// list dropped any.
  pub fn events(&self) -> Vec<EventView> {
    let inner = self.inner.lock().unwrap();
    let mut views: Vec<EventView> = inner.events.iter().map(Event::to_view).collect();
    if inner.truncated > 0 {
      views.push(Event::synthetic_truncated(inner.truncated).to_view());
    }
    views
  }

  /// Raises or lowers the bounded event capacity; values outside
  /// `[10, 10_000]` are clamped rather than rejected (spec.md §7). If the
  /// new bound is smaller than the current event count, the oldest
  /// events are dropped and counted as truncated.
  pub fn set_events_max(&self, events_max: usize) {
    let clamped = events_max.clamp(10, 10_000);
    let mut inner = self.inner.lock().unwrap();
    inner.events_max = clamped;
    while inner.events.len() > clamped {
      inner.events.pop_front();
      inner.truncated += 1;
    }
  }

  /// Immutable snapshot for search results and polling reads. `stack_depth`
  /// follows spec.md §4.6: `0` keeps frames as-is, negative strips all
  /// frames, positive caps the frame count per event.
  pub fn snapshot(&self, stack_depth: i64) -> StaticTrace {
    let inner = self.inner.lock().unwrap();
    let mut events: Vec<EventView> = inner
      .events
      .iter()
      .map(|e| apply_stack_depth(e.to_view(), stack_depth))
      .collect();
    if inner.truncated > 0 {
      events.push(apply_stack_depth(
        Event::synthetic_truncated(inner.truncated).to_view(),
        stack_depth,
      ));
    }
    StaticTrace {
      id: self.id,
      source: self.source.clone(),
      category: self.category.clone(),
      started: self.started,
      duration: inner.duration.unwrap_or_else(|| Utc::now() - self.started),
      finished: inner.finished,
      errored: inner.errored,
      events,
    }
  }

  /// Reduced snapshot for broker delivery (spec.md §4.8): stacks are
  /// always omitted, and an active trace carries only its most recent
  /// event rather than the full list, to keep streamed payloads small.
  pub fn stream_snapshot(&self) -> StaticTrace {
    let inner = self.inner.lock().unwrap();
    let mut events: Vec<EventView> = if inner.finished {
      inner.events.iter().map(Event::to_view).collect()
    } else {
      inner.events.back().map(Event::to_view).into_iter().collect()
    };
    for ev in &mut events {
      ev.stack.clear();
    }
    if inner.finished && inner.truncated > 0 {
      let mut view = Event::synthetic_truncated(inner.truncated).to_view();
      view.stack.clear();
      events.push(view);
    }
    StaticTrace {
      id: self.id,
      source: self.source.clone(),
      category: self.category.clone(),
      started: self.started,
      duration: inner.duration.unwrap_or_else(|| Utc::now() - self.started),
      finished: inner.finished,
      errored: inner.errored,
      events,
    }
  }
}

/// Read-only projection of a [`Trace`] at a point in time. Returned by
/// search and streaming; holds no reference back to the live trace.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StaticTrace {
  pub id: TraceId,
  pub source: String,
  pub category: String,
  pub started: DateTime<Utc>,
  #[serde(with = "chrono_duration_millis")]
  pub duration: ChronoDuration,
  pub finished: bool,
  pub errored: bool,
  pub events: Vec<EventView>,
}

impl StaticTrace {
  pub fn is_active(&self) -> bool {
    !self.finished
  }
}

mod chrono_duration_millis {
  use chrono::Duration;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_milliseconds())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    Ok(Duration::milliseconds(i64::deserialize(d)?))
  }
}
