//! Heap-profile checks for the sparse-to-dense transition.

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use hyperloglog_estimator::{HyperLogLog64, HyperLogLogPlus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn peak_bytes(build: impl FnOnce()) -> usize {
    let _profiler = dhat::Profiler::builder().testing().build();
    build();
    dhat::HeapStats::get().max_bytes
}

// Single test: dhat supports one active profiler, and the default harness
// runs tests on parallel threads.
#[test]
fn test_sparse_memory_behavior() {
    const P: u8 = 14;

    // A few hundred elements: the sparse estimator must not come anywhere
    // near the 2^14-byte register file a dense estimator allocates up front.
    let sparse_peak = peak_bytes(|| {
        let mut h = HyperLogLogPlus::new(P).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            h.add(rng.gen());
        }
        assert!(h.is_sparse());
    });

    let dense_peak = peak_bytes(|| {
        let mut h = HyperLogLog64::new(P).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            h.add(rng.gen());
        }
    });

    assert!(dense_peak >= 1 << P);
    assert!(
        sparse_peak < dense_peak / 2,
        "sparse peak {sparse_peak} vs dense peak {dense_peak}"
    );

    // After the transition only the register file remains; the reported
    // footprint must be the dense one, not dense plus sparse leftovers.
    let mut h = HyperLogLogPlus::new(P).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    while h.is_sparse() {
        h.add(rng.gen());
    }
    let footprint = h.size_of();
    assert!(footprint >= 1 << P);
    assert!(footprint < (1 << P) + 1024, "footprint {footprint}");
}
