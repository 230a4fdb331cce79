#![cfg(test)]

use crate::filter::Filter;
use crate::trace::Trace;
use chrono::Duration;

#[test]
fn default_filter_allows_everything() {
  let f = Filter::default();
  let t = Trace::new("s", "http", 10);
  assert!(f.allow(&t));
}

#[test]
fn category_is_an_exact_match() {
  let mut f = Filter {
    category: "b".into(),
    ..Filter::default()
  };
  assert!(f.normalize().is_empty());
  let a = Trace::new("s", "a", 10);
  let b = Trace::new("s", "b", 10);
  assert!(!f.allow(&a));
  assert!(f.allow(&b));
}

#[test]
fn is_errored_requires_both_errored_and_finished() {
  let mut f = Filter {
    is_errored: Some(true),
    ..Filter::default()
  };
  f.normalize();
  let t = Trace::new("s", "http", 10);
  t.errorf("boom", vec![]);
  // errored but not finished yet: should not satisfy is_errored=true.
  assert!(!f.allow(&t));
  t.finish();
  assert!(f.allow(&t));
}

#[test]
fn min_duration_requires_finished_trace() {
  let mut f = Filter {
    min_duration: Some(Duration::milliseconds(0)),
    ..Filter::default()
  };
  f.normalize();
  let t = Trace::new("s", "http", 10);
  assert!(!f.allow(&t));
  t.finish();
  assert!(f.allow(&t));
}

#[test]
fn query_matches_event_text() {
  let mut f = Filter {
    query: "foo".into(),
    ..Filter::default()
  };
  assert!(f.normalize().is_empty());
  let matching = Trace::new("s", "http", 10);
  matching.tracef("event 1 (foo)", vec![]);
  let other = Trace::new("s", "http", 10);
  other.tracef("event 3 (baz)", vec![]);
  assert!(f.allow(&matching));
  assert!(!f.allow(&other));
}

#[test]
fn invalid_regex_is_reported_and_treated_as_pass_through() {
  let mut f = Filter {
    query: "(unclosed".into(),
    ..Filter::default()
  };
  let problems = f.normalize();
  assert_eq!(problems.len(), 1);
  let t = Trace::new("s", "http", 10);
  // pass-through: text constraint never applied, so it's still accepted.
  assert!(f.allow(&t));
}

#[test]
fn is_id_probe_detects_ids_only_filters() {
  let t = Trace::new("s", "http", 10);
  let probe = Filter {
    ids: vec![t.id()],
    ..Filter::default()
  };
  assert!(probe.is_id_probe());
  let not_probe = Filter {
    ids: vec![t.id()],
    category: "http".into(),
    ..Filter::default()
  };
  assert!(!not_probe.is_id_probe());
}
