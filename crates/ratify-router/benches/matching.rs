//! Segment chain matching benchmarks.
//!
//! Run with: `cargo bench -p ratify-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ratify_core::Field;
use ratify_router::SegmentChain;
use serde_json::json;

fn build_chains(count: usize) -> Vec<SegmentChain> {
    let api = SegmentChain::root().literal("/api/v1");
    (0..count)
        .map(|i| {
            api.literal("/org/")
                .capture("orgId", Field::string())
                .literal(format!("/resource{i}/"))
                .capture("id", Field::number())
        })
        .collect()
}

fn bench_literal_match(c: &mut Criterion) {
    let chain = SegmentChain::root().literal("/api/v1/resource50");

    c.bench_function("literal_match", |b| {
        b.iter(|| black_box(chain.match_path("/api/v1/resource50")));
    });
}

fn bench_capture_match(c: &mut Criterion) {
    let chain = SegmentChain::root()
        .literal("/api/v1/resource/")
        .capture("id", Field::number());

    c.bench_function("capture_match", |b| {
        b.iter(|| black_box(chain.match_path("/api/v1/resource/12345")));
    });
}

fn bench_first_match_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_match_scan");

    for count in [10, 100, 1000] {
        let chains = build_chains(count);
        let path = format!("/api/v1/org/acme-corp/resource{}/12345", count - 1);
        group.bench_with_input(BenchmarkId::from_parameter(count), &path, |b, path| {
            b.iter(|| {
                black_box(chains.iter().find_map(|chain| chain.match_path(path).ok()));
            });
        });
    }

    group.finish();
}

fn bench_project(c: &mut Criterion) {
    let chain = build_chains(1).remove(0);
    let params = json!({"orgId": "acme corp", "id": 12345});

    c.bench_function("project", |b| {
        b.iter(|| black_box(chain.project(&params)));
    });
}

criterion_group!(
    benches,
    bench_literal_match,
    bench_capture_match,
    bench_first_match_scan,
    bench_project
);
criterion_main!(benches);
