//! # trc
//!
//! In-process request tracing: a producer creates a [`Trace`](trace::Trace)
//! per logical operation, appends time-stamped [`Event`](event::Event)s to
//! it, and the [`Collector`](collector::Collector) retains finished and
//! in-flight traces in bounded per-category ring buffers so operators can
//! later search them and subscribe to a live stream of matching traces.
//!
//! ## Layout
//!
//! - [`event`] — immutable, lazily-formatted event records with optional
//!   captured call stacks.
//! - [`ring_buffer`] — the fixed-capacity newest-first container every
//!   category is stored in.
//! - [`trace`] — the mutable `Trace` value and its frozen `StaticTrace`
//!   snapshot.
//! - [`category_store`] — category name to ring buffer mapping.
//! - [`filter`] — compiled search/subscribe predicates.
//! - [`stats`] — per-category and per-bucket counters.
//! - [`search`] — the search engine that walks a [`category_store`] and
//!   applies a [`filter`].
//! - [`broker`] — pub/sub delivery of trace changes to filtered
//!   subscribers.
//! - [`federated`] — scatter-gather search across a fleet of peers.
//! - [`collector`] — the facade composing all of the above.
//! - [`context`] — the ambient `(context, Trace)` binding used by the
//!   Producer API's convenience calls.
//! - [`config`] — operator-facing tunables and their defaults.
//! - [`error`] — the error taxonomy for the few operations that can fail.

pub mod broker;
pub mod category_store;
pub mod collector;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod federated;
pub mod filter;
pub mod ring_buffer;
pub mod search;
pub mod stats;
pub mod trace;

pub use collector::Collector;
pub use config::CollectorConfig;
pub use error::TrcError;
pub use event::Event;
pub use filter::Filter;
pub use search::{SearchRequest, SearchResponse};
pub use trace::{Trace, TraceId};
