//! Two-instance federation setup: a "local" collector searched in-process
//! and a "remote" collector fronted by a minimal HTTP responder, fanned
//! out together through [`FederatedSearcher`].
//!
//! The HTTP side is a hand-rolled raw-socket responder rather than a web
//! framework: the only route it needs is `POST /search`, and no example
//! in the retrieval pack pulls in axum/warp for a single endpoint like
//! this, so a framework dependency would be unjustified here.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use trc::config::CollectorConfig;
use trc::error::TrcError;
use trc::event::LazyArg;
use trc::federated::{CancellationSource, FederatedSearcher, Search};
use trc::filter::Filter;
use trc::search::{SearchRequest, SearchResponse};
use trc::Collector;
use trc_http::{HttpSearch, WireSearchRequest, WireSearchResponse};

/// Adapts an in-process [`Collector`] to the [`Search`] trait so a local
/// node can sit in the same peer list as a remote [`HttpSearch`].
struct LocalSearch {
  collector: Arc<Collector>,
}

#[async_trait]
impl Search for LocalSearch {
  async fn search(&self, request: SearchRequest) -> Result<SearchResponse, TrcError> {
    Ok(self.collector.search(request))
  }

  fn name(&self) -> &str {
    self.collector.source()
  }
}

fn seed(collector: &Arc<Collector>, category: &str, route: &str, user_id: u64) {
  let trace = collector.new_trace(category);
  trace.tracef("dispatching to handler", vec![]);
  trace.lazy_tracef("handling {}", vec![LazyArg::from(route.to_string())]);
  trace.lazy_tracef("user {}", vec![LazyArg::from(user_id)]);
  if user_id == 0 {
    trace.errorf("rejected anonymous user", vec![]);
  }
  trace.finish();
}

/// Reads one HTTP request off `socket`, runs it through `collector`, and
/// writes back a `WireSearchResponse` as the body of a 200 response.
/// Only understands exactly what the demo client sends: a `POST /search`
/// with a JSON body sized by `Content-Length`.
async fn serve_one(mut socket: tokio::net::TcpStream, collector: Arc<Collector>) {
  let mut buf = vec![0u8; 8192];
  let mut filled = 0;
  let header_end = loop {
    let n = match socket.read(&mut buf[filled..]).await {
      Ok(0) | Err(_) => return,
      Ok(n) => n,
    };
    filled += n;
    if let Some(pos) = find_header_end(&buf[..filled]) {
      break pos;
    }
    if filled == buf.len() {
      buf.resize(buf.len() * 2, 0);
    }
  };

  let head = String::from_utf8_lossy(&buf[..header_end]);
  let content_length: usize = head
    .lines()
    .find_map(|line| line.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
    .and_then(|v| v.parse().ok())
    .unwrap_or(0);

  let body_start = header_end + 4;
  while filled < body_start + content_length {
    if filled == buf.len() {
      buf.resize(buf.len() * 2, 0);
    }
    match socket.read(&mut buf[filled..]).await {
      Ok(0) | Err(_) => return,
      Ok(n) => filled += n,
    }
  }

  let body = &buf[body_start..body_start + content_length];
  let wire_request: WireSearchRequest = match serde_json::from_slice(body) {
    Ok(r) => r,
    Err(_) => WireSearchRequest::default(),
  };
  let request: SearchRequest = wire_request.into();
  let response = collector.search(request.clone());
  let wire_response = WireSearchResponse::from_response(&request, &response);
  let json = serde_json::to_vec(&wire_response).unwrap_or_default();

  let header = format!(
    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
    json.len()
  );
  let _ = socket.write_all(header.as_bytes()).await;
  let _ = socket.write_all(&json).await;
  let _ = socket.shutdown().await;
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
  buf.windows(4).position(|w| w == b"\r\n\r\n")
}

#[tokio::main]
async fn main() {
  let node_a = Collector::new("node-a", CollectorConfig::default());
  seed(&node_a, "/orders", "/orders", 42);
  seed(&node_a, "/orders", "/orders", 0);

  let node_b = Collector::new("node-b", CollectorConfig::default());
  seed(&node_b, "/orders", "/orders", 7);
  seed(&node_b, "/health", "/health", 1);

  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind node-b listener");
  let addr = listener.local_addr().expect("local addr");
  let node_b_for_server = Arc::clone(&node_b);
  tokio::spawn(async move {
    loop {
      let (socket, _) = match listener.accept().await {
        Ok(pair) => pair,
        Err(_) => continue,
      };
      tokio::spawn(serve_one(socket, Arc::clone(&node_b_for_server)));
    }
  });

  let peers: Vec<Arc<dyn Search>> = vec![
    Arc::new(LocalSearch { collector: Arc::clone(&node_a) }),
    Arc::new(HttpSearch::new("node-b", format!("http://{addr}"))),
  ];
  let federated = FederatedSearcher::new(peers);

  let (_cancel_source, cancel_token) = CancellationSource::new();
  let request = SearchRequest {
    filter: Filter {
      category: "/orders".into(),
      ..Filter::default()
    },
    limit: 20,
    ..SearchRequest::default()
  };

  let response = federated.search(request, cancel_token).await;

  println!(
    "federated /orders: sources={:?} total_count={} match_count={}",
    response.sources, response.total_count, response.match_count
  );
  for trace in &response.traces {
    println!("  [{}] trace {} errored={}", trace.source, trace.id, trace.errored);
  }
  if !response.problems.is_empty() {
    println!("problems: {:?}", response.problems);
  }

  let overall = response.stats.overall();
  println!(
    "overall across both nodes: total={} succeeded={} errored={}",
    overall.total, overall.succeeded, overall.errored
  );
}
