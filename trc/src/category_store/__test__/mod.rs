#![cfg(test)]

use crate::category_store::CategoryStore;
use crate::ring_buffer::Walk;
use crate::trace::Trace;
use std::sync::Arc;

#[test]
fn get_or_create_is_idempotent() {
  let store = CategoryStore::new(10);
  let a = store.get_or_create("http");
  let b = store.get_or_create("http");
  assert!(Arc::ptr_eq(&a, &b));
  assert_eq!(store.category_count(), 1);
}

#[test]
fn separate_categories_get_separate_buffers() {
  let store = CategoryStore::new(10);
  let http = store.get_or_create("http");
  let db = store.get_or_create("db");
  http.add(Arc::new(Trace::new("s", "http", 10)));
  assert_eq!(http.len(), 1);
  assert_eq!(db.len(), 0);
  assert_eq!(store.category_count(), 2);
}

#[test]
fn resize_shrinks_every_existing_buffer() {
  let store = CategoryStore::new(10);
  let http = store.get_or_create("http");
  for _ in 0..5 {
    http.add(Arc::new(Trace::new("s", "http", 10)));
  }
  store.resize(2);
  assert_eq!(http.len(), 2);
  // a category created after the resize picks up the new capacity.
  let db = store.get_or_create("db");
  assert_eq!(db.stats().capacity, 2);
}

#[test]
fn snapshot_is_a_shallow_copy_of_current_categories() {
  let store = CategoryStore::new(10);
  store.get_or_create("http");
  let snap = store.snapshot();
  store.get_or_create("db");
  // the snapshot taken before "db" was created does not see it.
  assert_eq!(snap.len(), 1);
  assert_eq!(store.category_count(), 2);
}

#[test]
fn walk_over_snapshot_sees_newest_first() {
  let store = CategoryStore::new(10);
  let http = store.get_or_create("http");
  for i in 0..3 {
    http.add(Arc::new(Trace::new("s", "http", 10)));
    let _ = i;
  }
  let snap = store.snapshot();
  let buf = snap.get("http").unwrap();
  let mut count = 0;
  buf.walk(|_| {
    count += 1;
    Walk::Continue
  });
  assert_eq!(count, 3);
}
