use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use bfs_tale::search::sort::radix_sort;
use bfs_tale::{CsrGraph, EngineConfig, HandoffPolicy, Node, Variant};

#[cfg(feature = "alloc-mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Deterministic sparse graph: every node gets `degree` pseudo-random
/// undirected neighbors.
fn random_graph(nodes: usize, degree: usize, seed: u64) -> CsrGraph {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    let mut edges = Vec::with_capacity(nodes * degree);
    for u in 0..nodes {
        for _ in 0..degree {
            edges.push((u as Node, (next() % nodes) as Node));
        }
    }
    CsrGraph::from_undirected_edges(nodes, &edges)
}

fn bench_variants(c: &mut Criterion) {
    // Same shape as the 10k-node / 500k-entry reference dataset.
    let graph = random_graph(10_000, 25, 42);
    let mut workers = vec![4, bfs_tale::config::default_workers()];
    workers.dedup();

    let mut group = c.benchmark_group("bfs_10k");
    group.throughput(Throughput::Elements(graph.edge_count() as u64));
    for &variant in Variant::all() {
        let counts: &[usize] = if variant.is_parallel() { &workers } else { &workers[..1] };
        for &count in counts {
            let policies: &[HandoffPolicy] = if variant == Variant::Worker {
                &HandoffPolicy::ALL
            } else {
                &HandoffPolicy::ALL[..1]
            };
            for &policy in policies {
                let config = EngineConfig::default().with_workers(count).with_policy(policy);
                let id = if variant == Variant::Worker {
                    format!("{count}x_{}", policy.name())
                } else {
                    format!("{count}x")
                };
                group.bench_with_input(BenchmarkId::new(variant.name(), id), &config, |b, config| {
                    b.iter_batched_ref(
                        || vec![0; graph.order()],
                        |levels| black_box(variant.run_with(&graph, 2, levels, config)),
                        BatchSize::LargeInput,
                    );
                });
            }
        }
    }
    group.finish();
}

fn bench_prefilter(c: &mut Criterion) {
    let graph = random_graph(100_000, 8, 7);
    let mut group = c.benchmark_group("bfs_prefilter");
    for prefilter in [false, true] {
        let config = EngineConfig::default().with_prefilter(prefilter);
        group.bench_with_input(BenchmarkId::from_parameter(prefilter), &config, |b, config| {
            b.iter_batched_ref(
                || vec![0; graph.order()],
                |levels| black_box(Variant::Worker.run_with(&graph, 0, levels, config)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_radix_sort(c: &mut Criterion) {
    let mut state = 1u64;
    let data: Vec<Node> = (0..100_000)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 40) as Node
        })
        .collect();
    let mut scratch = vec![0; data.len()];

    let mut group = c.benchmark_group("sort_100k");
    group.bench_function("radix_sort", |b| {
        b.iter_batched_ref(
            || data.clone(),
            |v| radix_sort(v, &mut scratch),
            BatchSize::LargeInput,
        );
    });
    group.bench_function("sort_unstable", |b| {
        b.iter_batched_ref(|| data.clone(), |v| v.sort_unstable(), BatchSize::LargeInput);
    });
    group.finish();
}

criterion_group!(benches, bench_variants, bench_prefilter, bench_radix_sort);
criterion_main!(benches);
