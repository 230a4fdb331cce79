//! `reqwest`-backed [`Search`](trc::federated::Search) implementation for
//! a single remote peer, posting the spec.md §6 wire format.

use crate::wire::{WireSearchRequest, WireSearchResponse};
use async_trait::async_trait;
use trc::error::TrcError;
use trc::federated::Search;
use trc::search::{SearchRequest, SearchResponse};

/// One remote collector reachable over HTTP.
pub struct HttpSearch {
  client: reqwest::Client,
  endpoint: String,
  name: String,
}

impl HttpSearch {
  /// `endpoint` is the peer's base URL (e.g. `http://10.0.0.4:8090`); the
  /// search route `/search` is appended. `name` identifies this peer in
  /// aggregated problems.
  pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      endpoint: endpoint.into(),
      name: name.into(),
    }
  }

  pub fn with_client(name: impl Into<String>, endpoint: impl Into<String>, client: reqwest::Client) -> Self {
    Self {
      client,
      endpoint: endpoint.into(),
      name: name.into(),
    }
  }
}

#[async_trait]
impl Search for HttpSearch {
  async fn search(&self, request: SearchRequest) -> Result<SearchResponse, TrcError> {
    let wire_request = WireSearchRequest::from(&request);
    let url = format!("{}/search", self.endpoint.trim_end_matches('/'));
    let http_response = self
      .client
      .post(&url)
      .json(&wire_request)
      .send()
      .await
      .map_err(|err| TrcError::PeerFailure {
        peer: self.name.clone(),
        detail: err.to_string(),
      })?;

    let http_response = http_response.error_for_status().map_err(|err| TrcError::PeerFailure {
      peer: self.name.clone(),
      detail: err.to_string(),
    })?;

    let wire_response: WireSearchResponse = http_response.json().await.map_err(|err| TrcError::PeerFailure {
      peer: self.name.clone(),
      detail: format!("malformed response body: {err}"),
    })?;

    Ok(wire_response.into_search_response())
  }

  fn name(&self) -> &str {
    &self.name
  }
}
