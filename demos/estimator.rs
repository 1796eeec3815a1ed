use hll_sketch::HyperLogLog;

fn main() {
    let mut estimator1 = HyperLogLog::<wyhash::WyHash>::new(14).unwrap();
    for i in 0..10 {
        estimator1.insert(&i);
    }
    println!("estimator1 estimate = {}", estimator1.estimate());

    let mut estimator2 = HyperLogLog::<wyhash::WyHash>::new(14).unwrap();
    for i in 10..15 {
        estimator2.insert(&i);
    }
    println!("estimator2 estimate = {}", estimator2.estimate());

    estimator1.merge(&estimator2).unwrap();
    println!("merged estimate = {}", estimator1.estimate());

    let text = estimator1.to_text().unwrap();
    let restored = HyperLogLog::<wyhash::WyHash>::from_text(&text).unwrap();
    println!(
        "restored from {} base64 chars, estimate = {}",
        text.len(),
        restored.estimate()
    );
}
