use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hyperloglog_estimator::{HyperLogLog64, HyperLogLogPlus};

/// Cardinalities are doubled per step up to this bound, covering the sparse
/// representation, the transition, and the dense regime.
const MAX_CARDINALITY: usize = 1 << 18;

fn benchmark(c: &mut Criterion) {
    let cardinalities: Vec<usize> = std::iter::once(0)
        .chain((0..).map(|i| 1 << i))
        .take_while(|&n| n <= MAX_CARDINALITY)
        .collect();

    let mut group = c.benchmark_group("add");
    for &n in &cardinalities {
        group.throughput(Throughput::Elements(n.max(1) as u64));
        group.bench_with_input(BenchmarkId::new("hllpp_p14", n), &n, |b, &n| {
            let hashes = hashes(n);
            b.iter(|| {
                let mut h = HyperLogLogPlus::new(14).unwrap();
                for &x in &hashes {
                    h.add(black_box(x));
                }
                h
            });
        });
        group.bench_with_input(BenchmarkId::new("hll64_p14", n), &n, |b, &n| {
            let hashes = hashes(n);
            b.iter(|| {
                let mut h = HyperLogLog64::new(14).unwrap();
                for &x in &hashes {
                    h.add(black_box(x));
                }
                h
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("count");
    group.throughput(Throughput::Elements(1));
    for &n in &cardinalities {
        group.bench_with_input(BenchmarkId::new("hllpp_p14", n), &n, |b, &n| {
            let mut h = HyperLogLogPlus::new(14).unwrap();
            for x in hashes(n) {
                h.add(x);
            }
            b.iter(|| black_box(&mut h).count());
        });
        group.bench_with_input(BenchmarkId::new("hll64_p14", n), &n, |b, &n| {
            let mut h = HyperLogLog64::new(14).unwrap();
            for x in hashes(n) {
                h.add(x);
            }
            b.iter(|| black_box(&h).count());
        });
    }
    group.finish();
}

fn hashes(n: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.gen()).collect()
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
