//! Criterion benchmarks for the in-process parts of the harness
//!
//! ```bash
//! cargo bench --bench pipeline
//! cargo bench --bench pipeline snapshot
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use cg_harness::benchmark::{compute_speedups, ParallelTimings, SequentialTimings};
use cg_harness::visualize::parse_snapshot;

/// Snapshot text in the solver's layout for an `n` x `n` grid
fn solver_dump(n: usize) -> String {
    let mut text = String::from("[42], [");
    for i in 0..n {
        text.push_str(if i == 0 { "[" } else { ", [" });
        for j in 0..n {
            text.push_str(&format!("{:.6}, ", (i * j) as f64 / n as f64));
        }
        text.push(']');
    }
    text.push(']');
    text
}

fn bench_snapshot_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");
    for n in [32, 128, 256] {
        let text = solver_dump(n);
        group.bench_with_input(BenchmarkId::new("parse", n), &text, |b, text| {
            b.iter(|| parse_snapshot(black_box(text)))
        });
    }
    group.finish();
}

fn bench_speedups(c: &mut Criterion) {
    let sizes: Vec<u32> = (1..=50).map(|i| i * 100).collect();
    let threads = [2, 4, 6, 8, 12, 16, 24, 32];

    let sequential: SequentialTimings = sizes.iter().map(|&s| (s, s as f64 * 0.01)).collect();
    let parallel: ParallelTimings = sizes
        .iter()
        .flat_map(|&s| threads.iter().map(move |&t| (s, t, s as f64 * 0.01 / t as f64)))
        .collect();

    c.bench_function("speedup/compute_400", |b| {
        b.iter(|| compute_speedups(black_box(&sequential), black_box(&parallel)))
    });
}

criterion_group!(benches, bench_snapshot_parsing, bench_speedups);
criterion_main!(benches);
