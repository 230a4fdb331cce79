use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use trc::collector::Collector;
use trc::config::CollectorConfig;
use trc::search::SearchRequest;

fn populate(collector: &std::sync::Arc<Collector>, categories: usize, per_category: usize) {
  for c in 0..categories {
    let category = format!("cat-{c}");
    for i in 0..per_category {
      let handle = collector.new_trace(category.clone());
      handle.tracef("event {}", vec![trc::event::LazyArg::from(i as i64)]);
      handle.finish();
    }
  }
}

fn bench_search(c: &mut Criterion) {
  let mut group = c.benchmark_group("search");
  for &per_category in &[100usize, 1_000] {
    let collector = Collector::new("bench", CollectorConfig::default().with_ring_capacity(per_category));
    populate(&collector, 8, per_category);
    group.bench_with_input(
      BenchmarkId::new("walk_and_filter", per_category),
      &per_category,
      |b, _| {
        b.iter(|| {
          collector.search(SearchRequest {
            limit: 50,
            ..SearchRequest::default()
          })
        });
      },
    );
  }
  group.finish();
}

fn bench_stats_merge(c: &mut Criterion) {
  use trc::stats::SearchStats;

  let collector_a = Collector::new("a", CollectorConfig::default());
  let collector_b = Collector::new("b", CollectorConfig::default());
  populate(&collector_a, 8, 200);
  populate(&collector_b, 8, 200);
  let response_a = collector_a.search(SearchRequest {
    limit: 50,
    ..SearchRequest::default()
  });
  let response_b = collector_b.search(SearchRequest {
    limit: 50,
    ..SearchRequest::default()
  });

  c.bench_function("stats_merge", |b| {
    b.iter(|| {
      let mut merged: SearchStats = response_a.stats.clone();
      merged.merge(&response_b.stats).unwrap();
      merged
    });
  });
}

criterion_group!(benches, bench_search, bench_stats_merge);
criterion_main!(benches);
