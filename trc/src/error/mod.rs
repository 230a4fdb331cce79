//! Error taxonomy (spec.md §7). Most conditions this crate encounters are
//! *not* fatal — they are recorded as `problems[]` entries or counters
//! instead of propagating. `TrcError` is reserved for the handful of
//! operations that do return a `Result` to the caller.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, serde::Serialize)]
pub enum TrcError {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("subscriber already registered for this sink")]
  SubscriberConflict,

  #[error("no such subscriber")]
  NotSubscribed,

  #[error("cannot merge stats with incompatible bucketing: expected {expected:?}, found {found:?}")]
  MergeMismatch {
    expected: Vec<Duration>,
    found: Vec<Duration>,
  },

  #[error("peer {peer} failed: {detail}")]
  PeerFailure { peer: String, detail: String },
}
