//! The facade composing per-category storage, search, and pub/sub into
//! the single entry point producers and operators use (spec.md §4.10).

mod __test__;

use crate::broker::{Broker, SubscriberHandle, SubscriberStats};
use crate::category_store::CategoryStore;
use crate::config::CollectorConfig;
use crate::event::LazyArg;
use crate::filter::Filter;
use crate::search::{SearchEngine, SearchRequest, SearchResponse};
use crate::trace::{StaticTrace, Trace, TraceId};
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// A producer-facing handle to one in-flight or finished trace. Every
/// mutating call is followed by a publish to the owning collector's
/// broker, so subscribers observe the same sequence of changes the
/// producer made.
#[derive(Clone)]
pub struct TraceHandle {
  trace: Arc<Trace>,
  collector: Arc<Collector>,
}

impl TraceHandle {
  pub fn id(&self) -> TraceId {
    self.trace.id()
  }

  pub fn source(&self) -> &str {
    self.trace.source()
  }

  pub fn category(&self) -> &str {
    self.trace.category()
  }

  pub fn is_active(&self) -> bool {
    self.trace.is_active()
  }

  pub fn is_finished(&self) -> bool {
    self.trace.is_finished()
  }

  pub fn is_errored(&self) -> bool {
    self.trace.is_errored()
  }

  pub fn events(&self) -> Vec<crate::trace::EventView> {
    self.trace.events()
  }

  pub fn tracef(&self, format: &'static str, args: Vec<LazyArg>) {
    self.trace.tracef(format, args);
    self.collector.broker.publish(&self.trace);
  }

  pub fn lazy_tracef(&self, format: &'static str, args: Vec<LazyArg>) {
    self.trace.lazy_tracef(format, args);
    self.collector.broker.publish(&self.trace);
  }

  pub fn errorf(&self, format: &'static str, args: Vec<LazyArg>) {
    self.trace.errorf(format, args);
    self.collector.broker.publish(&self.trace);
  }

  pub fn lazy_errorf(&self, format: &'static str, args: Vec<LazyArg>) {
    self.trace.lazy_errorf(format, args);
    self.collector.broker.publish(&self.trace);
  }

  pub fn tracef_stack(&self, format: &'static str, args: Vec<LazyArg>) {
    self.trace.tracef_stack(format, args);
    self.collector.broker.publish(&self.trace);
  }

  pub fn errorf_stack(&self, format: &'static str, args: Vec<LazyArg>) {
    self.trace.errorf_stack(format, args);
    self.collector.broker.publish(&self.trace);
  }

  pub fn finish(&self) {
    self.trace.finish();
    self.collector.broker.publish(&self.trace);
  }

  /// Escape hatch to the underlying trace value, for callers that need
  /// direct access (e.g. a snapshot with a specific stack depth).
  pub fn raw(&self) -> &Arc<Trace> {
    &self.trace
  }
}

/// Composition of a [`CategoryStore`], [`SearchEngine`], and [`Broker`]
/// for one process. Always handed out as `Arc<Collector>` since
/// [`TraceHandle`]s need to publish back through it for their lifetime.
pub struct Collector {
  config: CollectorConfig,
  source: String,
  store: CategoryStore,
  broker: Broker,
}

impl Collector {
  pub fn new(source: impl Into<String>, config: CollectorConfig) -> Arc<Self> {
    let store = CategoryStore::new(config.ring_capacity);
    Arc::new(Self {
      source: source.into(),
      store,
      broker: Broker::new(),
      config,
    })
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  pub fn config(&self) -> &CollectorConfig {
    &self.config
  }

  /// Unconditionally creates a new trace, inserts it into its category's
  /// ring buffer (evicting the oldest if the buffer was full), and
  /// publishes a "created" change.
  pub fn new_trace(self: &Arc<Self>, category: impl Into<String>) -> TraceHandle {
    let trace = Arc::new(Trace::new(self.source.clone(), category.into(), self.config.events_max));
    self.store.get_or_create(trace.category()).add(Arc::clone(&trace));
    self.broker.publish(&trace);
    TraceHandle {
      trace,
      collector: Arc::clone(self),
    }
  }

  pub fn search(&self, request: SearchRequest) -> SearchResponse {
    SearchEngine::search(&self.store, &self.source, &self.config, request)
  }

  pub fn subscribe(&self, filter: Filter) -> (SubscriberHandle, Receiver<StaticTrace>) {
    self.broker.subscribe(filter, self.config.subscriber_queue)
  }

  pub fn unsubscribe(&self, handle: SubscriberHandle) -> SubscriberStats {
    self.broker.unsubscribe(handle)
  }

  /// Updates the per-category ring capacity, resizing every existing
  /// category's buffer.
  pub fn resize(&self, ring_capacity: usize) {
    self.store.resize(ring_capacity);
  }

  pub fn category_count(&self) -> usize {
    self.store.category_count()
  }
}
