use guacamole::combinators::any;
use guacamole::Guacamole;

use moments::MomentAccumulator;

const SAMPLE_SIZE: usize = 100_000;

fn uniform(seed: u64) -> Vec<f64> {
    let mut guac = Guacamole::new(seed);
    (0..SAMPLE_SIZE).map(|_| any::<f64>(&mut guac)).collect()
}

#[test]
fn uniform_distribution() {
    let acc: MomentAccumulator = uniform(42).into_iter().collect();
    assert_eq!(SAMPLE_SIZE as u64, acc.count());
    let mean = acc.mean().unwrap();
    let variance = acc.variance().unwrap();
    let skewness = acc.skewness().unwrap();
    let kurtosis = acc.kurtosis().unwrap();
    assert!((mean - 0.5).abs() < 0.01, "mean = {mean}");
    assert!((variance - 1.0 / 12.0).abs() < 0.002, "variance = {variance}");
    assert!(skewness.abs() < 0.05, "skewness = {skewness}");
    assert!((kurtosis + 1.2).abs() < 0.05, "kurtosis = {kurtosis}");
}

#[test]
fn shards_sum_to_sequential() {
    let xs = uniform(7);
    let sequential: MomentAccumulator = xs.iter().copied().collect();
    let num_shards = 16;
    let mut shards = vec![MomentAccumulator::new(); num_shards];
    for (idx, x) in xs.iter().enumerate() {
        shards[idx % num_shards].push(*x);
    }
    let merged: MomentAccumulator = shards.iter().sum();
    assert_eq!(sequential.count(), merged.count());
    let pairs = [
        (sequential.mean().unwrap(), merged.mean().unwrap()),
        (sequential.variance().unwrap(), merged.variance().unwrap()),
        (sequential.skewness().unwrap(), merged.skewness().unwrap()),
        (sequential.kurtosis().unwrap(), merged.kurtosis().unwrap()),
    ];
    for (expected, returned) in pairs {
        assert!(
            (expected - returned).abs() < 1e-9 * (1.0 + expected.abs()),
            "expected {expected}, returned {returned}"
        );
    }
}

#[test]
fn large_offset_keeps_precision() {
    const OFFSET: f64 = 1e9;
    let noise = uniform(1337);
    let expected: MomentAccumulator = noise.iter().copied().collect();
    let expected = expected.variance().unwrap();
    let shifted: MomentAccumulator = noise.iter().map(|x| OFFSET + x).collect();
    let returned = shifted.variance().unwrap();
    assert!(
        ((expected - returned) / expected).abs() < 1e-4,
        "expected {expected}, returned {returned}"
    );
    // Summing squares loses the noise entirely at this offset.
    let n = noise.len() as f64;
    let sum: f64 = noise.iter().map(|x| OFFSET + x).sum();
    let sum_sq: f64 = noise.iter().map(|x| (OFFSET + x) * (OFFSET + x)).sum();
    let naive = sum_sq / n - (sum / n) * (sum / n);
    assert!(
        ((expected - naive) / expected).abs() > 1e-2,
        "naive {naive} unexpectedly matched {expected}"
    );
}
