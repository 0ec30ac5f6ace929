use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use vsstree::{
    CodecConfig, VssTree,
    bench_utils::{TreeShape, generate_tree},
    decode_tree, encode_tree,
};

const BALANCED_SEED: u64 = 0xB41A;
const RANDOM_SEED: u64 = 0x7A4D;
const NODES: usize = 20_000;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

fn prepared_trees() -> Vec<(&'static str, VssTree)> {
    vec![
        (
            "balanced",
            generate_tree(TreeShape::Balanced { fanout: 8 }, NODES, BALANCED_SEED),
        ),
        (
            "random",
            generate_tree(TreeShape::Random { max_children: 12 }, NODES, RANDOM_SEED),
        ),
    ]
}

fn bench_encode(c: &mut Criterion) {
    let trees = prepared_trees();
    let mut group = c.benchmark_group("encode_tree");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    group.throughput(Throughput::Elements(NODES as u64));
    for (label, tree) in &trees {
        for config in [CodecConfig::wide(), CodecConfig::narrow()] {
            let id = BenchmarkId::new(*label, config.layout.version());
            group.bench_with_input(id, &config, |b, config| {
                b.iter(|| encode_tree(tree, config).expect("encode"));
            });
        }
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let trees = prepared_trees();
    let mut group = c.benchmark_group("decode_tree");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    group.throughput(Throughput::Elements(NODES as u64));
    for (label, tree) in &trees {
        for config in [CodecConfig::wide(), CodecConfig::narrow()] {
            let bytes = encode_tree(tree, &config).expect("encode");
            let id = BenchmarkId::new(*label, config.layout.version());
            group.bench_with_input(id, &bytes, |b, bytes| {
                b.iter(|| decode_tree(bytes, &config).expect("decode"));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
