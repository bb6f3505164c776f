use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use graphlab::{EdmondsKarp, GraphStore, PathFinder, Prim};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 随机图：一条链保证连通，再加上随机边
fn build_random_graph(n: usize, extra_edges: usize) -> GraphStore {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let names: Vec<String> = (0..n).map(|i| format!("N{}", i)).collect();

    let mut store = GraphStore::new();
    for name in &names {
        store.add_node(name).expect("node");
    }
    for pair in names.windows(2) {
        store
            .add_edge(&pair[0], &pair[1], rng.gen_range(1..100))
            .expect("chain edge");
    }
    for _ in 0..extra_edges {
        let s = &names[rng.gen_range(0..n)];
        let t = &names[rng.gen_range(0..n)];
        store.add_edge(s, t, rng.gen_range(0..100)).expect("edge");
    }
    store
}

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithms");
    for &n in &[10usize, 100, 1_000] {
        let store = build_random_graph(n, n * 4);
        let last = format!("N{}", n - 1);
        group.throughput(Throughput::Elements(store.edge_count() as u64));

        group.bench_with_input(BenchmarkId::new("prim", n), &store, |b, store| {
            b.iter(|| black_box(Prim::new(store).run().total_cost))
        });
        group.bench_with_input(BenchmarkId::new("dijkstra", n), &store, |b, store| {
            b.iter(|| {
                let path = PathFinder::new(store).shortest_path("N0", &last);
                black_box(path.map(|p| p.cost).ok())
            })
        });
        group.bench_with_input(BenchmarkId::new("edmonds_karp", n), &store, |b, store| {
            b.iter(|| {
                let flow = EdmondsKarp::new(store).max_flow("N0", &last);
                black_box(flow.map(|f| f.value).ok())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_algorithms);
criterion_main!(benches);
