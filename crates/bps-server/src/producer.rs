use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bps_encoder::BatchEncoder;
use bps_types::SampleRow;
use tokio::time::{self, MissedTickBehavior};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::store::BatchStore;

/// Something that can be sampled once per tick.
///
/// Must return exactly one value per configured sensor, in sensor-name
/// order. A row of the wrong width is logged and skipped.
pub trait SampleSource: Send {
    fn sample(&mut self, timestamp: f64) -> SampleRow;
}

impl<F> SampleSource for F
where
    F: FnMut(f64) -> SampleRow + Send,
{
    fn sample(&mut self, timestamp: f64) -> SampleRow {
        self(timestamp)
    }
}

/// Periodic sampler that feeds completed batches into the store.
///
/// Each tick takes one row from the source and hands it to the
/// [`BatchEncoder`]. When a row completes a batch, encoding and
/// compression run inline on that tick and the batch is appended to
/// the [`BatchStore`]. A failed batch is logged at `error` and dropped.
pub struct Producer<S> {
    source: S,
    encoder: BatchEncoder,
    store: Arc<BatchStore>,
    period: Duration,
}

impl<S: SampleSource> Producer<S> {
    /// Build a producer from a validated config.
    ///
    /// # Errors
    ///
    /// - [`ServerError::InvalidConfig`] if `config` fails validation.
    /// - [`ServerError::Encode`] if the encoder rejects the sizes.
    pub fn new(source: S, config: &ServerConfig, store: Arc<BatchStore>) -> Result<Self, ServerError> {
        config.validate()?;
        let encoder = BatchEncoder::new(
            config.codec.codec(),
            config.sensor_names.len(),
            config.batch_samples,
        )?;
        Ok(Self {
            source,
            encoder,
            store,
            period: config.sample_period(),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sample once at `timestamp`. Returns `true` if a batch was stored.
    pub fn tick(&mut self, timestamp: f64) -> bool {
        let row = self.source.sample(timestamp);
        match self.encoder.push_row(timestamp, row) {
            Ok(None) => false,
            Ok(Some(batch)) => {
                let (start, end, samples) = (batch.start, batch.end, batch.samples);
                let compression_time_ms = batch.compression_time_ms;
                let evicted = self.store.append(batch);
                tracing::info!(
                    start,
                    end,
                    samples,
                    compression_time_ms,
                    cached = self.store.len(),
                    evicted,
                    "batch stored"
                );
                true
            }
            Err(e) => {
                tracing::error!(error = %e, timestamp, "encode failed, sample dropped");
                false
            }
        }
    }

    /// Sample forever at the configured rate.
    ///
    /// Late ticks are delayed rather than burst, so a slow batch encode
    /// shifts the schedule instead of producing back-to-back samples.
    pub async fn run(mut self) {
        tracing::info!(
            period_ms = self.period.as_secs_f64() * 1000.0,
            batch_samples = self.encoder.batch_samples(),
            codec = self.encoder.codec_name(),
            "producer started"
        );
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick(epoch_seconds());
        }
    }
}

/// Current wall-clock time as epoch seconds.
pub fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bps_types::f16;

    fn config(batch_samples: usize, cache_batches: usize) -> ServerConfig {
        ServerConfig {
            batch_samples,
            cache_batches,
            ..ServerConfig::default()
        }
    }

    fn constant(_: f64) -> SampleRow {
        vec![f16::from_f32(21.0), f16::from_f32(40.0)]
    }

    #[test]
    fn stores_a_batch_every_n_ticks() {
        let store = Arc::new(BatchStore::new(4));
        let mut producer = Producer::new(constant, &config(3, 4), Arc::clone(&store)).unwrap();
        let stored: Vec<bool> = (0..7).map(|i| producer.tick(f64::from(i))).collect();
        assert_eq!(stored, vec![false, false, true, false, false, true, false]);
        assert_eq!(store.len(), 2);

        let batches = store.query_range(0.0, 10.0);
        assert_eq!((batches[0].start, batches[0].end), (0.0, 2.0));
        assert_eq!((batches[1].start, batches[1].end), (3.0, 5.0));
    }

    #[test]
    fn cache_is_bounded() {
        let store = Arc::new(BatchStore::new(2));
        let mut producer = Producer::new(constant, &config(1, 2), Arc::clone(&store)).unwrap();
        for i in 0..5 {
            producer.tick(f64::from(i));
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.latest_end(), Some(4.0));
    }

    #[test]
    fn wrong_width_row_is_skipped() {
        let store = Arc::new(BatchStore::new(4));
        let mut calls = 0;
        let source = move |_: f64| {
            calls += 1;
            if calls == 2 {
                vec![f16::ONE]
            } else {
                vec![f16::ONE, f16::ONE]
            }
        };
        let mut producer = Producer::new(source, &config(2, 4), Arc::clone(&store)).unwrap();
        assert!(!producer.tick(0.0));
        assert!(!producer.tick(0.1));
        assert!(producer.tick(0.2));
        let batch = &store.query_range(0.0, 1.0)[0];
        assert_eq!((batch.start, batch.end), (0.0, 0.2));
    }

    #[test]
    fn rejects_invalid_config() {
        let store = Arc::new(BatchStore::new(1));
        let result = Producer::new(constant, &config(0, 1), store);
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_rate_without_tick_period() {
        for sample_hz in [1e-30, 1e10] {
            let config = ServerConfig { sample_hz, ..config(4, 4) };
            let result = Producer::new(constant, &config, Arc::new(BatchStore::new(4)));
            assert!(matches!(result, Err(ServerError::InvalidConfig(_))), "{sample_hz}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_samples_on_the_interval() {
        let store = Arc::new(BatchStore::new(8));
        let producer = Producer::new(constant, &config(5, 8), Arc::clone(&store)).unwrap();
        let task = tokio::spawn(producer.run());
        // 10 Hz: ticks at 0, 100, ..., 900 ms
        time::sleep(Duration::from_millis(950)).await;
        assert_eq!(store.len(), 2);
        task.abort();
    }
}
