//! Scatter-gather search across a fleet of peers (spec.md §4.9).
//!
//! The teacher has no networked component of its own; this module's
//! shape — an async trait object fanned out with `tokio::spawn`, results
//! gathered as tagged tuples, merged with no early termination on
//! individual failure — is grounded in the wider retrieval pack's async
//! client code rather than the teacher.

mod __test__;

use crate::config::CollectorConfig;
use crate::error::TrcError;
use crate::search::{SearchRequest, SearchResponse};
use crate::stats::SearchStats;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// One searchable peer — typically an HTTP client, but local/test doubles
/// implement it directly.
#[async_trait]
pub trait Search: Send + Sync {
  async fn search(&self, request: SearchRequest) -> Result<SearchResponse, TrcError>;
  fn name(&self) -> &str;
}

/// A minimal cooperative cancellation signal, propagated to every
/// outstanding peer request (spec.md §5).
#[derive(Clone)]
pub struct CancellationToken {
  rx: tokio::sync::watch::Receiver<bool>,
}

pub struct CancellationSource {
  tx: tokio::sync::watch::Sender<bool>,
}

impl CancellationSource {
  pub fn new() -> (Self, CancellationToken) {
    let (tx, rx) = tokio::sync::watch::channel(false);
    (Self { tx }, CancellationToken { rx })
  }

  pub fn cancel(&self) {
    let _ = self.tx.send(true);
  }
}

impl CancellationToken {
  pub fn is_cancelled(&self) -> bool {
    *self.rx.borrow()
  }

  pub async fn cancelled(&self) {
    let mut rx = self.rx.clone();
    if *rx.borrow() {
      return;
    }
    while rx.changed().await.is_ok() {
      if *rx.borrow() {
        return;
      }
    }
  }
}

// A Result-typed peer search statically rules out the "nil response and
// nil error" / "both present" cases spec.md §4.9 describes for a
// two-value return convention; only Response/Error outcomes are
// reachable here.
enum PeerOutcome {
  Response(SearchResponse),
  Error(String),
}

pub struct FederatedSearcher {
  peers: Vec<Arc<dyn Search>>,
}

impl FederatedSearcher {
  pub fn new(peers: Vec<Arc<dyn Search>>) -> Self {
    Self { peers }
  }

  /// Fans `request` out to every peer concurrently, waits for all of
  /// them (no early termination — a peer error is recorded, not
  /// propagated), and merges the results: stats merged, traces
  /// concatenated then globally re-sorted/truncated, sources deduped.
  pub async fn search(&self, request: SearchRequest, cancel: CancellationToken) -> SearchResponse {
    let started = Utc::now();
    let limit = if request.limit == 0 {
      CollectorConfig::default().search_limit_default
    } else {
      request.limit.clamp(1, 250)
    };

    let mut tasks = Vec::with_capacity(self.peers.len());
    for peer in &self.peers {
      let peer = Arc::clone(peer);
      let req = request.clone();
      let cancel = cancel.clone();
      tasks.push(tokio::spawn(async move {
        let name = peer.name().to_string();
        let outcome = tokio::select! {
          _ = cancel.cancelled() => PeerOutcome::Error("cancelled".to_string()),
          result = peer.search(req) => match result {
            Ok(resp) => PeerOutcome::Response(resp),
            Err(err) => PeerOutcome::Error(err.to_string()),
          },
        };
        (name, outcome)
      }));
    }

    let mut total_count: u64 = 0;
    let mut match_count: u64 = 0;
    let mut traces = Vec::new();
    let mut stats = SearchStats::new(Vec::new());
    let mut problems = Vec::new();
    let mut sources: Vec<String> = Vec::new();

    for task in tasks {
      match task.await {
        Ok((name, PeerOutcome::Response(resp))) => {
          total_count += resp.total_count;
          match_count += resp.match_count;
          traces.extend(resp.traces);
          if let Err(err) = stats.merge(&resp.stats) {
            problems.push(format!("peer {name}: {err}"));
          }
          problems.extend(resp.problems.into_iter().map(|p| format!("peer {name}: {p}")));
          for source in resp.sources {
            if !sources.contains(&source) {
              sources.push(source);
            }
          }
        }
        Ok((name, PeerOutcome::Error(detail))) => {
          problems.push(
            TrcError::PeerFailure {
              peer: name,
              detail,
            }
            .to_string(),
          );
        }
        Err(join_err) => {
          problems.push(format!("peer task did not complete: {join_err}"));
        }
      }
    }

    traces.sort_by(|a, b| b.started.cmp(&a.started));
    traces.truncate(limit);

    SearchResponse {
      sources,
      total_count,
      match_count,
      traces,
      stats,
      problems,
      duration: Utc::now() - started,
    }
  }
}
