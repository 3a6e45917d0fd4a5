use std::time::Duration;

use bps_wire::CodecKind;

use crate::error::ServerError;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:50007";
pub const DEFAULT_SAMPLE_HZ: f64 = 10.0;
pub const DEFAULT_BATCH_SAMPLES: usize = 256;
pub const DEFAULT_CACHE_BATCHES: usize = 120;
pub const DEFAULT_SENSORS: [&str; 2] = ["temperature", "humidity"];

/// Runtime settings for the producer and the query server.
///
/// With the defaults, a batch covers 25.6 s of data and the cache holds
/// the most recent ~51 minutes.
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub codec: CodecKind,
    pub sample_hz: f64,
    pub batch_samples: usize,
    pub cache_batches: usize,
    pub sensor_names: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            codec: CodecKind::default(),
            sample_hz: DEFAULT_SAMPLE_HZ,
            batch_samples: DEFAULT_BATCH_SAMPLES,
            cache_batches: DEFAULT_CACHE_BATCHES,
            sensor_names: DEFAULT_SENSORS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ServerConfig {
    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// [`ServerError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.listen_addr.is_empty() {
            return Err(ServerError::InvalidConfig("listen address cannot be empty".into()));
        }
        if !self.sample_hz.is_finite() || self.sample_hz <= 0.0 {
            return Err(ServerError::InvalidConfig(format!(
                "sample rate must be a positive number of Hz, got {}",
                self.sample_hz
            )));
        }
        match Duration::try_from_secs_f64(1.0 / self.sample_hz) {
            Ok(period) if !period.is_zero() => {}
            _ => {
                return Err(ServerError::InvalidConfig(format!(
                    "sample rate {} Hz gives no representable tick period",
                    self.sample_hz
                )));
            }
        }
        if self.batch_samples == 0 {
            return Err(ServerError::InvalidConfig("batch size must be at least 1".into()));
        }
        if self.cache_batches == 0 {
            return Err(ServerError::InvalidConfig("cache must hold at least 1 batch".into()));
        }
        if self.sensor_names.is_empty() {
            return Err(ServerError::InvalidConfig("at least one sensor is required".into()));
        }
        if self.sensor_names.iter().any(String::is_empty) {
            return Err(ServerError::InvalidConfig("sensor names cannot be empty".into()));
        }
        Ok(())
    }

    /// Time between two sampling ticks.
    ///
    /// # Panics
    ///
    /// Panics if `1 / sample_hz` does not fit a [`Duration`], which
    /// [`validate`](Self::validate) rules out.
    #[must_use]
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.sample_hz)
    }

    /// Wall-clock span covered by one batch, in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn batch_seconds(&self) -> f64 {
        self.batch_samples as f64 / self.sample_hz
    }
}
