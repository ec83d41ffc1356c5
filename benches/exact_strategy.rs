use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdc_algebra::{exact_session, ExactConfig, Strategy};

fn bench_exact_bind_unbind(c: &mut Criterion) {
    let session = exact_session(ExactConfig::default());
    let a = session.create_from_name("alpha", 1000, "bench").unwrap();
    let b = session.create_from_name("beta", 1000, "bench").unwrap();
    let p = session.bind(&a, &b).unwrap();

    let mut group = c.benchmark_group("exact");
    group.bench_function("bind", |bencher| {
        bencher.iter(|| session.bind(black_box(&a), black_box(&b)))
    });
    group.bench_function("unbind_mode_a", |bencher| {
        bencher.iter(|| session.unbind(black_box(&p), black_box(&a)))
    });
    group.bench_function("similarity", |bencher| {
        bencher.iter(|| session.similarity(black_box(&p), black_box(&a)))
    });
    group.finish();
}

fn bench_exact_bundle_scaling(c: &mut Criterion) {
    let session = exact_session(ExactConfig::default());
    let atoms: Vec<_> = (0..256)
        .map(|i| session.create_from_name(&format!("atom{i}"), 1000, "bench").unwrap())
        .collect();

    let mut group = c.benchmark_group("exact_bundle_scaling");
    for size in [4usize, 16, 64, 256] {
        let subset = &atoms[..size];
        group.bench_with_input(BenchmarkId::new("bundle", size), subset, |bencher, subset| {
            bencher.iter(|| session.bundle(black_box(subset), None))
        });
    }
    group.finish();
}

fn bench_decode_unbound_candidates(c: &mut Criterion) {
    let session = exact_session(ExactConfig::default());
    let atoms: Vec<_> = (0..32)
        .map(|i| session.create_from_name(&format!("atom{i}"), 1000, "bench").unwrap())
        .collect();
    let bundled = session.bundle(&atoms, None).unwrap();

    c.bench_function("exact_decode_unbound_candidates", |bencher| {
        bencher.iter(|| session.decode_unbound_candidates(black_box(&bundled), &[], None, 10))
    });
}

criterion_group!(
    benches,
    bench_exact_bind_unbind,
    bench_exact_bundle_scaling,
    bench_decode_unbound_candidates
);
criterion_main!(benches);
