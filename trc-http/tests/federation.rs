//! Exercises `HttpSearch` against a minimal hand-rolled HTTP responder,
//! confirming the wire request/response round-trips through real JSON
//! over a real socket rather than just through in-process `From` impls.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use trc::federated::Search;
use trc::search::SearchRequest;
use trc_http::HttpSearch;

const BODY: &str = r#"{
  "request": {"sources":[],"ids":[],"category":"","is_active":null,"is_finished":null,"is_errored":null,"min_duration":null,"query":"","bucketing":[],"limit":10,"stack_depth":0},
  "sources": ["peer-a"],
  "total_count": 3,
  "match_count": 2,
  "traces": [
    {
      "id": "00000000000000000000000000000001",
      "source": "peer-a",
      "category": "http",
      "started": "2024-01-01T00:00:00Z",
      "duration": "5ms",
      "finished": true,
      "errored": false,
      "events": [
        {"when": "2024-01-01T00:00:00Z", "what": "hello", "stack": [], "is_error": false}
      ]
    }
  ],
  "stats": {"categories": []},
  "problems": [],
  "duration": "1ms"
}"#;

async fn run_stub_server(listener: TcpListener) {
  let (mut socket, _) = listener.accept().await.unwrap();
  let mut buf = [0u8; 4096];
  // read (and discard) whatever the client sent; we don't need to parse it.
  let _ = socket.read(&mut buf).await;
  let response = format!(
    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
    BODY.len(),
    BODY
  );
  socket.write_all(response.as_bytes()).await.unwrap();
  socket.shutdown().await.ok();
}

#[tokio::test]
async fn http_search_parses_a_real_wire_response() {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let server = tokio::spawn(run_stub_server(listener));

  let peer = HttpSearch::new("peer-a", format!("http://{addr}"));
  let response = peer.search(SearchRequest::default()).await.unwrap();

  assert_eq!(response.total_count, 3);
  assert_eq!(response.match_count, 2);
  assert_eq!(response.traces.len(), 1);
  assert_eq!(response.traces[0].category, "http");
  assert_eq!(response.traces[0].events[0].what, "hello");

  server.await.unwrap();
}

#[tokio::test]
async fn http_search_reports_peer_failure_on_connection_refused() {
  // nothing listening on this port.
  let peer = HttpSearch::new("peer-b", "http://127.0.0.1:1");
  let result = peer.search(SearchRequest::default()).await;
  assert!(result.is_err());
}
