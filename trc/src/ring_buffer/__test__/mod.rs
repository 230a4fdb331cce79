#![cfg(test)]

use crate::ring_buffer::{RingBuffer, Walk};

#[test]
fn newest_first_and_bounded() {
  let rb = RingBuffer::new(3);
  for i in 0..5 {
    rb.add(i);
  }
  let mut seen = Vec::new();
  rb.walk(|v| {
    seen.push(*v);
    Walk::Continue
  });
  // capacity 3: only the 3 newest (4, 3, 2) survive, newest first.
  assert_eq!(seen, vec![4, 3, 2]);
}

#[test]
fn add_returns_evicted_oldest() {
  let rb = RingBuffer::new(2);
  assert_eq!(rb.add(1), None);
  assert_eq!(rb.add(2), None);
  assert_eq!(rb.add(3), Some(1));
}

#[test]
fn walk_can_stop_early() {
  let rb = RingBuffer::new(5);
  for i in 0..5 {
    rb.add(i);
  }
  let mut seen = Vec::new();
  rb.walk(|v| {
    seen.push(*v);
    if *v == 3 {
      Walk::Stop
    } else {
      Walk::Continue
    }
  });
  assert_eq!(seen, vec![4, 3]);
}

#[test]
fn resize_drops_oldest_tail_newest_to_oldest() {
  let rb = RingBuffer::new(5);
  for i in 0..5 {
    rb.add(i);
  }
  // newest-first order is 4,3,2,1,0; shrinking to 2 keeps 4,3 and drops
  // 2,1,0, newest-of-the-dropped-first.
  let dropped = rb.resize(2);
  assert_eq!(dropped, vec![2, 1, 0]);
  assert_eq!(rb.len(), 2);
  let mut seen = Vec::new();
  rb.walk(|v| {
    seen.push(*v);
    Walk::Continue
  });
  assert_eq!(seen, vec![4, 3]);
}

#[test]
fn stats_reports_len_and_capacity() {
  let rb = RingBuffer::new(4);
  rb.add("a");
  rb.add("b");
  let stats = rb.stats();
  assert_eq!(stats.len, 2);
  assert_eq!(stats.capacity, 4);
}
