#![cfg(test)]

use crate::category_store::CategoryStore;
use crate::config::CollectorConfig;
use crate::filter::Filter;
use crate::search::{SearchEngine, SearchRequest};
use crate::trace::Trace;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration as StdDuration;

fn insert(store: &CategoryStore, category: &str) -> Arc<Trace> {
  let trace = Arc::new(Trace::new("s", category, 32));
  store.get_or_create(category).add(Arc::clone(&trace));
  trace
}

#[test]
fn search_by_category_matches_s4() {
  let store = CategoryStore::new(100);
  for _ in 0..3 {
    insert(&store, "a");
  }
  for _ in 0..2 {
    insert(&store, "b");
  }
  let config = CollectorConfig::default();
  let request = SearchRequest {
    filter: Filter {
      category: "b".into(),
      ..Filter::default()
    },
    limit: 10,
    ..SearchRequest::default()
  };
  let response = SearchEngine::search(&store, "node-1", &config, request);
  assert_eq!(response.match_count, 2);
  assert_eq!(response.traces.len(), 2);
  assert!(response.traces.iter().all(|t| t.category == "b"));
}

#[test]
fn search_newest_first_bound_matches_s5() {
  let store = CategoryStore::new(100);
  let mut last = None;
  for _ in 0..10 {
    last = Some(insert(&store, "x"));
    sleep(StdDuration::from_millis(1));
  }
  let config = CollectorConfig::default();
  let request = SearchRequest {
    limit: 1,
    ..SearchRequest::default()
  };
  let response = SearchEngine::search(&store, "node-1", &config, request);
  assert_eq!(response.traces.len(), 1);
  assert_eq!(response.traces[0].id, last.unwrap().id());
}

#[test]
fn search_regex_over_events_matches_s6() {
  let store = CategoryStore::new(100);
  let a = insert(&store, "cat");
  a.tracef("event 1 (foo)", vec![]);
  let b = insert(&store, "cat");
  b.tracef("event 4 (foo)", vec![]);
  b.tracef("event 6 (baz)", vec![]);
  let c = insert(&store, "cat");
  c.tracef("event 3 (baz)", vec![]);

  let config = CollectorConfig::default();
  let request = SearchRequest {
    filter: Filter {
      query: "foo".into(),
      ..Filter::default()
    },
    limit: 10,
    ..SearchRequest::default()
  };
  let response = SearchEngine::search(&store, "node-1", &config, request);
  assert_eq!(response.match_count, 2);
}

#[test]
fn limit_is_honored_and_results_sorted_descending() {
  let store = CategoryStore::new(100);
  for _ in 0..5 {
    insert(&store, "a");
    sleep(StdDuration::from_millis(1));
  }
  let config = CollectorConfig::default();
  let request = SearchRequest {
    limit: 2,
    ..SearchRequest::default()
  };
  let response = SearchEngine::search(&store, "node-1", &config, request);
  assert_eq!(response.traces.len(), 2);
  assert!(response.traces[0].started >= response.traces[1].started);
}

#[test]
fn counts_consistency_holds() {
  let store = CategoryStore::new(100);
  for _ in 0..20 {
    insert(&store, "a");
  }
  let config = CollectorConfig::default();
  let request = SearchRequest {
    limit: 5,
    ..SearchRequest::default()
  };
  let response = SearchEngine::search(&store, "node-1", &config, request);
  assert!(response.match_count >= response.traces.len() as u64);
  assert!(response.total_count >= response.match_count);
}

#[test]
fn invalid_query_regex_is_a_nonfatal_problem() {
  let store = CategoryStore::new(100);
  insert(&store, "a");
  let config = CollectorConfig::default();
  let request = SearchRequest {
    filter: Filter {
      query: "(unclosed".into(),
      ..Filter::default()
    },
    ..SearchRequest::default()
  };
  let response = SearchEngine::search(&store, "node-1", &config, request);
  assert_eq!(response.problems.len(), 1);
  // still matches, because query becomes a pass-through on compile failure.
  assert_eq!(response.match_count, 1);
}
