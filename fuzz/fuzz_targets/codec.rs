#![no_main]

use hll_sketch::HyperLogLog;
use libfuzzer_sys::fuzz_target;
use wyhash::WyHash;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut estimator) = HyperLogLog::<WyHash>::from_bytes(data) {
        assert_eq!(estimator.to_bytes(), data);
        estimator.insert(&1);
        estimator.estimate();
    }

    if let Ok(mut estimator) = HyperLogLog::<WyHash>::from_text(data) {
        let text = estimator.to_text().unwrap();
        assert_eq!(HyperLogLog::<WyHash>::from_text(&text).unwrap(), estimator);
        estimator.insert(&1);
        assert!(estimator.estimate() > 0);
    }
});
