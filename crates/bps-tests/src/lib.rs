//! Shared fixtures for the BPS integration tests and benches.

use std::sync::Arc;

use bps_encoder::BatchEncoder;
use bps_server::BatchStore;
use bps_types::{f16, Batch, SampleRow};
use bps_wire::CodecKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SENSORS: [&str; 2] = ["temperature", "humidity"];

pub fn sensor_names() -> Vec<String> {
    SENSORS.iter().map(ToString::to_string).collect()
}

/// Deterministic temperature/humidity rows sampled at 10 Hz from `t0`.
///
/// Returns `(timestamp, row)` pairs.
#[allow(clippy::cast_precision_loss)]
pub fn sensor_rows(t0: f64, count: usize, seed: u64) -> Vec<(f64, SampleRow)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let t = t0 + i as f64 * 0.1;
            let temperature = 25.0 + 2.0 * (t / 120.0).sin() + rng.random_range(-0.05..=0.05);
            let humidity = 50.0 + 5.0 * (t / 150.0).cos() + rng.random_range(-0.2..=0.2);
            (t, vec![f16::from_f64(temperature), f16::from_f64(humidity)])
        })
        .collect()
}

/// Encode `count` consecutive batches of `batch_samples` rows starting at `t0`.
///
/// # Panics
///
/// Panics if encoding fails, which only a broken codec can cause.
pub fn encode_batches(kind: CodecKind, t0: f64, batch_samples: usize, count: usize) -> Vec<Batch> {
    let mut encoder = BatchEncoder::new(kind.codec(), SENSORS.len(), batch_samples)
        .expect("fixture sizes are non-zero");
    sensor_rows(t0, batch_samples * count, 42)
        .into_iter()
        .filter_map(|(t, row)| encoder.push_row(t, row).expect("fixture rows are well-formed"))
        .collect()
}

/// A store pre-filled with `count` batches.
pub fn filled_store(kind: CodecKind, batch_samples: usize, count: usize, capacity: usize) -> Arc<BatchStore> {
    let store = Arc::new(BatchStore::new(capacity));
    for batch in encode_batches(kind, 0.0, batch_samples, count) {
        store.append(batch);
    }
    store
}
