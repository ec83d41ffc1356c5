use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdc_algebra::{
    DenseBinaryStrategy, MetricAffineElasticStrategy, MetricAffineStrategy, SparsePolyStrategy,
    Strategy,
};

fn bench_dense_binary(c: &mut Criterion) {
    let s = DenseBinaryStrategy;
    let a = s.create_from_name("alpha", 2048, "bench").unwrap();
    let b = s.create_from_name("beta", 2048, "bench").unwrap();

    let mut group = c.benchmark_group("dense_binary");
    group.bench_function("bind", |bencher| {
        bencher.iter(|| s.bind(black_box(&a), black_box(&b)))
    });
    group.bench_function("bundle_3", |bencher| {
        bencher.iter(|| s.bundle(black_box(&[a.clone(), b.clone(), a.clone()]), None))
    });
    group.bench_function("similarity", |bencher| {
        bencher.iter(|| s.similarity(black_box(&a), black_box(&b)))
    });
    group.finish();
}

fn bench_metric_affine(c: &mut Criterion) {
    let s = MetricAffineStrategy;
    let a = s.create_from_name("alpha", 256, "bench").unwrap();
    let b = s.create_from_name("beta", 256, "bench").unwrap();

    let mut group = c.benchmark_group("metric_affine");
    group.bench_function("bind", |bencher| {
        bencher.iter(|| s.bind(black_box(&a), black_box(&b)))
    });
    group.bench_function("bundle_3", |bencher| {
        bencher.iter(|| s.bundle(black_box(&[a.clone(), b.clone(), a.clone()]), None))
    });
    group.bench_function("similarity", |bencher| {
        bencher.iter(|| s.similarity(black_box(&a), black_box(&b)))
    });
    group.finish();
}

fn bench_metric_affine_elastic(c: &mut Criterion) {
    let s = MetricAffineElasticStrategy::default();
    let atomics: Vec<_> = (0..64).map(|i| s.create_random(256, Some(i)).unwrap()).collect();
    let key = s.create_random(256, Some(999)).unwrap();
    let bundled = s.bundle(&atomics, None).unwrap();

    let mut group = c.benchmark_group("metric_affine_elastic");
    for size in [8usize, 32, 128] {
        let subset = &atomics[..size.min(atomics.len())];
        group.bench_with_input(BenchmarkId::new("bundle", size), subset, |bencher, subset| {
            bencher.iter(|| s.bundle(black_box(subset), None))
        });
    }
    group.bench_function("bind_bundle_to_key", |bencher| {
        bencher.iter(|| s.bind(black_box(&bundled), black_box(&key)))
    });
    group.finish();
}

fn bench_sparse_polynomial(c: &mut Criterion) {
    let s = SparsePolyStrategy::default();
    let a = s.create_from_name("role", 4, "bench").unwrap();
    let b = s.create_from_name("filler", 4, "bench").unwrap();

    let mut group = c.benchmark_group("sparse_polynomial");
    group.bench_function("bind", |bencher| {
        bencher.iter(|| s.bind(black_box(&a), black_box(&b)))
    });
    group.bench_function("similarity", |bencher| {
        bencher.iter(|| s.similarity(black_box(&a), black_box(&b)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_dense_binary,
    bench_metric_affine,
    bench_metric_affine_elastic,
    bench_sparse_polynomial
);
criterion_main!(benches);
