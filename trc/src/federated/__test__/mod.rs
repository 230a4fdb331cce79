#![cfg(test)]

use crate::error::TrcError;
use crate::federated::{CancellationSource, FederatedSearcher, Search};
use crate::search::{SearchRequest, SearchResponse};
use crate::stats::SearchStats;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

struct FixedPeer {
  name: String,
  response: SearchResponse,
}

#[async_trait]
impl Search for FixedPeer {
  async fn search(&self, _request: SearchRequest) -> Result<SearchResponse, TrcError> {
    Ok(self.response.clone())
  }

  fn name(&self) -> &str {
    &self.name
  }
}

struct FailingPeer {
  name: String,
}

#[async_trait]
impl Search for FailingPeer {
  async fn search(&self, _request: SearchRequest) -> Result<SearchResponse, TrcError> {
    Err(TrcError::InvalidArgument("synthetic peer failure".into()))
  }

  fn name(&self) -> &str {
    &self.name
  }
}

fn at(offset_secs: i64) -> DateTime<Utc> {
  Utc::now() + Duration::seconds(offset_secs)
}

fn fake_trace(started: DateTime<Utc>) -> crate::trace::StaticTrace {
  crate::trace::StaticTrace {
    id: crate::trace::Trace::new("peer", "cat", 10).id(),
    source: "peer".into(),
    category: "cat".into(),
    started,
    duration: Duration::zero(),
    finished: true,
    errored: false,
    events: Vec::new(),
  }
}

#[tokio::test]
async fn merges_one_success_and_records_one_peer_failure_matching_s7() {
  let t2 = fake_trace(at(2));
  let t0 = fake_trace(at(0));
  let peer1 = Arc::new(FixedPeer {
    name: "peer1".into(),
    response: SearchResponse {
      sources: vec!["peer1".into()],
      total_count: 3,
      match_count: 2,
      traces: vec![t2.clone(), t0.clone()],
      stats: SearchStats::new(Vec::new()),
      problems: Vec::new(),
      duration: Duration::zero(),
    },
  });
  let peer2 = Arc::new(FailingPeer { name: "peer2".into() });

  let searcher = FederatedSearcher::new(vec![peer1, peer2]);
  let (_source, token) = CancellationSource::new();
  let response = searcher
    .search(
      SearchRequest {
        limit: 10,
        ..SearchRequest::default()
      },
      token,
    )
    .await;

  assert_eq!(response.total_count, 3);
  assert_eq!(response.match_count, 2);
  assert_eq!(response.traces.len(), 2);
  assert_eq!(response.traces[0].started, t2.started);
  assert_eq!(response.traces[1].started, t0.started);
  assert_eq!(response.problems.len(), 1);
  assert!(response.problems[0].contains("peer2"));
}

#[tokio::test]
async fn cancellation_short_circuits_outstanding_peers() {
  struct SlowPeer;
  #[async_trait]
  impl Search for SlowPeer {
    async fn search(&self, _request: SearchRequest) -> Result<SearchResponse, TrcError> {
      tokio::time::sleep(std::time::Duration::from_secs(30)).await;
      unreachable!("cancellation should have preempted this");
    }
    fn name(&self) -> &str {
      "slow"
    }
  }

  let searcher = FederatedSearcher::new(vec![Arc::new(SlowPeer)]);
  let (source, token) = CancellationSource::new();
  source.cancel();
  let response = searcher.search(SearchRequest::default(), token).await;
  assert_eq!(response.problems.len(), 1);
  assert!(response.problems[0].contains("cancelled"));
}
