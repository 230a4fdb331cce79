//! Pub/sub delivery of trace changes to filtered subscribers with
//! bounded, non-blocking, drop-on-full queues (spec.md §4.8).

mod __test__;

use crate::error::TrcError;
use crate::filter::Filter;
use crate::trace::{StaticTrace, Trace};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Opaque subscription identifier returned by [`Broker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberHandle(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberStats {
  pub skips: u64,
  pub sends: u64,
  pub drops: u64,
}

struct Subscriber {
  filter: Filter,
  sender: Sender<StaticTrace>,
  skips: AtomicU64,
  sends: AtomicU64,
  drops: AtomicU64,
}

impl Subscriber {
  fn snapshot_stats(&self) -> SubscriberStats {
    SubscriberStats {
      skips: self.skips.load(Ordering::Relaxed),
      sends: self.sends.load(Ordering::Relaxed),
      drops: self.drops.load(Ordering::Relaxed),
    }
  }
}

/// Fans trace changes out to subscribers. The publish path only ever
/// holds the subscribers-map lock long enough to copy out the current
/// list of handles; the non-blocking sends themselves happen outside the
/// lock, so one slow subscriber can never block another or the
/// publisher.
pub struct Broker {
  next_id: AtomicU64,
  subscribers: RwLock<HashMap<u64, Arc<Subscriber>>>,
  archived: RwLock<HashMap<u64, SubscriberStats>>,
  named: RwLock<HashMap<String, SubscriberHandle>>,
}

impl Default for Broker {
  fn default() -> Self {
    Self::new()
  }
}

impl Broker {
  pub fn new() -> Self {
    Self {
      next_id: AtomicU64::new(1),
      subscribers: RwLock::new(HashMap::new()),
      archived: RwLock::new(HashMap::new()),
      named: RwLock::new(HashMap::new()),
    }
  }

  /// Registers a new subscriber with its own bounded queue, returning a
  /// handle (for later `unsubscribe`) and the receiving end of the
  /// channel.
  pub fn subscribe(
    &self,
    mut filter: Filter,
    queue_capacity: usize,
  ) -> (SubscriberHandle, Receiver<StaticTrace>) {
    let _problems = filter.normalize();
    let (tx, rx) = crossbeam_channel::bounded(queue_capacity.max(1));
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let subscriber = Arc::new(Subscriber {
      filter,
      sender: tx,
      skips: AtomicU64::new(0),
      sends: AtomicU64::new(0),
      drops: AtomicU64::new(0),
    });
    self.subscribers.write().unwrap().insert(id, subscriber);
    (SubscriberHandle(id), rx)
  }

  /// Like [`Broker::subscribe`] but registered under a caller-chosen
  /// name; a second subscription under the same name fails with
  /// `SubscriberConflict` instead of silently shadowing the first.
  pub fn subscribe_named(
    &self,
    name: impl Into<String>,
    filter: Filter,
    queue_capacity: usize,
  ) -> Result<(SubscriberHandle, Receiver<StaticTrace>), TrcError> {
    let name = name.into();
    let mut named = self.named.write().unwrap();
    if named.contains_key(&name) {
      return Err(TrcError::SubscriberConflict);
    }
    let (handle, rx) = self.subscribe(filter, queue_capacity);
    named.insert(name, handle);
    Ok((handle, rx))
  }

  /// Removes a subscriber and returns its final counters. Idempotent:
  /// calling again with the same handle returns the same, now-frozen
  /// counters rather than erroring.
  pub fn unsubscribe(&self, handle: SubscriberHandle) -> SubscriberStats {
    if let Some(stats) = self.archived.read().unwrap().get(&handle.0) {
      return *stats;
    }
    let removed = self.subscribers.write().unwrap().remove(&handle.0);
    let stats = removed.map(|sub| sub.snapshot_stats()).unwrap_or_default();
    self.archived.write().unwrap().insert(handle.0, stats);
    stats
  }

  /// Current counters for a still-active or already-unsubscribed handle;
  /// `NotSubscribed` if the handle was never issued by this broker.
  pub fn stats(&self, handle: SubscriberHandle) -> Result<SubscriberStats, TrcError> {
    if let Some(sub) = self.subscribers.read().unwrap().get(&handle.0) {
      return Ok(sub.snapshot_stats());
    }
    if let Some(stats) = self.archived.read().unwrap().get(&handle.0) {
      return Ok(*stats);
    }
    Err(TrcError::NotSubscribed)
  }

  /// Publishes one change in `trace` to every filter-matching subscriber.
  /// Never blocks: a full subscriber queue drops the message rather than
  /// waiting.
  pub fn publish(&self, trace: &Trace) {
    let subs: Vec<Arc<Subscriber>> = self.subscribers.read().unwrap().values().cloned().collect();
    if subs.is_empty() {
      return;
    }
    let stream_copy = trace.stream_snapshot();
    for sub in subs {
      if !sub.filter.allow(trace) {
        sub.skips.fetch_add(1, Ordering::Relaxed);
        continue;
      }
      match sub.sender.try_send(stream_copy.clone()) {
        Ok(()) => {
          sub.sends.fetch_add(1, Ordering::Relaxed);
        }
        Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
          sub.drops.fetch_add(1, Ordering::Relaxed);
        }
      }
    }
  }

  pub fn subscriber_count(&self) -> usize {
    self.subscribers.read().unwrap().len()
  }
}
