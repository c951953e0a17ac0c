//! Criterion benchmarks for ANOSIM hot paths.
//!
//! Benchmarks:
//! 1. Rank transform (extract, sort, tie-correct the upper triangle)
//! 2. R statistic evaluation for one labeling
//! 3. Permutation search, sequential vs rayon-batched

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use anosim_core::domain::{DistanceMatrix, LabelAssignment};
use anosim_core::permutation::{PermutationSearch, PermutationStrategy};
use anosim_core::ranking::RankedPairList;
use anosim_core::statistic;

// ── Helpers ──────────────────────────────────────────────────────────

/// Deterministic pseudo-distances with frequent ties (values rounded to 0.01).
fn make_matrix(n: usize) -> DistanceMatrix {
    let mut values = vec![0.0; n * n];
    for row in 0..n {
        for column in row + 1..n {
            let d = ((row * 31 + column * 17) % 97) as f64 / 100.0 + (row / 4) as f64;
            values[row * n + column] = d;
            values[column * n + row] = d;
        }
    }
    DistanceMatrix::new(n, values).unwrap()
}

fn make_labels(n: usize, groups: i64) -> LabelAssignment {
    LabelAssignment::new((0..n as i64).map(|i| i % groups).collect())
}

// ── 1. Rank transform ────────────────────────────────────────────────

fn bench_rank_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_transform");
    for n in [20, 100, 400] {
        let matrix = make_matrix(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &matrix, |b, m| {
            b.iter(|| RankedPairList::from_matrix(black_box(m)));
        });
    }
    group.finish();
}

// ── 2. Statistic ─────────────────────────────────────────────────────

fn bench_statistic(c: &mut Criterion) {
    let mut group = c.benchmark_group("r_statistic");
    for n in [20, 100, 400] {
        let ranked = RankedPairList::from_matrix(&make_matrix(n));
        let labels = make_labels(n, 4);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| statistic::evaluate(black_box(&ranked), black_box(&labels)));
        });
    }
    group.finish();
}

// ── 3. Permutation search ────────────────────────────────────────────

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("permutation_search");
    group.sample_size(10);

    let n = 60;
    let ranked = RankedPairList::from_matrix(&make_matrix(n));
    let labels = make_labels(n, 3);

    for parallel in [false, true] {
        let id = if parallel { "batched" } else { "sequential" };
        group.bench_function(BenchmarkId::new("lexicographic", id), |b| {
            b.iter(|| {
                PermutationSearch::new(&ranked, 5_000)
                    .with_parallelism(parallel)
                    .run(black_box(&labels))
            });
        });
        group.bench_function(BenchmarkId::new("random", id), |b| {
            b.iter(|| {
                PermutationSearch::new(&ranked, 5_000)
                    .with_strategy(PermutationStrategy::Random { seed: 42 })
                    .with_parallelism(parallel)
                    .run(black_box(&labels))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rank_transform, bench_statistic, bench_search);
criterion_main!(benches);
