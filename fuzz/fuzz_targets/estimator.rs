#![no_main]

use hyperloglog_estimator::HyperLogLogPlus;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut estimator1 = HyperLogLogPlus::new(12).unwrap();
    for chunk in first_half.chunks(4) {
        estimator1.add(wyhash(chunk, 1));
        assert!(estimator1.count() > 0);
        assert!(estimator1.size_of() > 0);
    }

    let mut estimator2 = HyperLogLogPlus::new(12).unwrap();
    for chunk in second_half.chunks(4) {
        estimator2.add(wyhash(chunk, 1));
        assert!(estimator2.count() > 0);
        assert!(estimator2.size_of() > 0);
    }

    estimator1.merge(&estimator2).unwrap();
    assert!(estimator1.count() > 0);
    assert!(!estimator1.is_sparse());
});
