use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use vsstree::{
    SearchQuery,
    bench_utils::{TreeShape, generate_tree},
    export::leaf_paths,
    search,
};

const SEED: u64 = 0x5EA2;
const NODES: usize = 20_000;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

fn bench_search(c: &mut Criterion) {
    let tree = generate_tree(TreeShape::Balanced { fanout: 8 }, NODES, SEED);
    let root = tree.root();
    let queries = [
        ("literal", SearchQuery::new("N3.N5.N1.N7")),
        ("wildcard", SearchQuery::new("N3.*.*.*")),
        ("any_depth", SearchQuery::new("N2.*").with_any_depth(true)),
        (
            "bounded",
            SearchQuery::new("*.*.*.*").with_max_results(100),
        ),
    ];

    let mut group = c.benchmark_group("search");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for (label, query) in &queries {
        group.bench_function(*label, |b| {
            b.iter(|| search(&tree, root, query).expect("search"));
        });
    }
    group.finish();
}

fn bench_leaf_paths(c: &mut Criterion) {
    let tree = generate_tree(TreeShape::Random { max_children: 10 }, NODES, SEED);
    let mut group = c.benchmark_group("export");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    group.bench_function("leaf_paths", |b| {
        b.iter(|| leaf_paths(&tree, tree.root()));
    });
    group.finish();
}

criterion_group!(benches, bench_search, bench_leaf_paths);
criterion_main!(benches);
