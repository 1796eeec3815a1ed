#![no_main]

use hll_sketch::HyperLogLog;
use libfuzzer_sys::fuzz_target;
use wyhash::{wyhash, WyHash};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let p = 4 + data[0] % 13;
    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut estimator1 = HyperLogLog::<WyHash>::new(p).unwrap();
    for chunk in first_half.chunks(4) {
        estimator1.insert(&chunk);
        assert!(estimator1.estimate() > 0);
    }

    let mut estimator2 = HyperLogLog::<WyHash>::new(p).unwrap();
    for chunk in second_half.chunks(4) {
        estimator2.insert(&chunk);
        assert!(estimator2.estimate() > 0);
    }

    let mut merged = estimator1.clone();
    merged.merge(&estimator2).unwrap();
    estimator2.merge(&estimator1).unwrap();
    assert_eq!(merged, estimator2);
});
