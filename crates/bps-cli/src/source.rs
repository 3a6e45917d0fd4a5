use bps_server::SampleSource;
use bps_types::{f16, SampleRow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Slow sinusoid plus uniform jitter, one per sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Wave {
    base: f64,
    amplitude: f64,
    period_s: f64,
    jitter: f64,
    cosine: bool,
}

impl Wave {
    /// Known sensors get realistic ranges; anything else gets a
    /// distinct offset so columns stay distinguishable.
    #[allow(clippy::cast_precision_loss)]
    fn for_sensor(name: &str, index: usize) -> Self {
        match name {
            "temperature" => Self {
                base: 25.0,
                amplitude: 2.0,
                period_s: 120.0,
                jitter: 0.05,
                cosine: false,
            },
            "humidity" => Self {
                base: 50.0,
                amplitude: 5.0,
                period_s: 150.0,
                jitter: 0.2,
                cosine: true,
            },
            _ => Self {
                base: 10.0 * (index as f64 + 1.0),
                amplitude: 1.0,
                period_s: 90.0 + 30.0 * index as f64,
                jitter: 0.1,
                cosine: index % 2 == 1,
            },
        }
    }

    fn at(&self, t: f64, rng: &mut impl Rng) -> f64 {
        let phase = t / self.period_s;
        let wave = if self.cosine { phase.cos() } else { phase.sin() };
        self.base + self.amplitude * wave + rng.random_range(-self.jitter..=self.jitter)
    }
}

/// Simulated sensor bank used by `bps serve`.
pub struct SimulatedSensors {
    waves: Vec<Wave>,
    rng: StdRng,
}

impl SimulatedSensors {
    pub fn new(names: &[String]) -> Self {
        Self::with_rng(names, StdRng::from_os_rng())
    }

    pub fn with_rng(names: &[String], rng: StdRng) -> Self {
        let waves = names
            .iter()
            .enumerate()
            .map(|(i, name)| Wave::for_sensor(name, i))
            .collect();
        Self { waves, rng }
    }
}

impl SampleSource for SimulatedSensors {
    fn sample(&mut self, timestamp: f64) -> SampleRow {
        self.waves
            .iter()
            .map(|w| f16::from_f64(w.at(timestamp, &mut self.rng)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn one_value_per_sensor_within_range() {
        let mut source =
            SimulatedSensors::with_rng(&names(&["temperature", "humidity"]), StdRng::seed_from_u64(7));
        for i in 0..1000 {
            let row = source.sample(f64::from(i) * 0.1);
            assert_eq!(row.len(), 2);
            let (t, h) = (row[0].to_f64(), row[1].to_f64());
            assert!((22.9..=27.1).contains(&t), "temperature {t}");
            assert!((44.7..=55.3).contains(&h), "humidity {h}");
        }
    }

    #[test]
    fn unknown_sensors_get_distinct_bases() {
        let mut source =
            SimulatedSensors::with_rng(&names(&["a", "b", "c"]), StdRng::seed_from_u64(1));
        let row = source.sample(0.0);
        assert!(row[0] < row[1] && row[1] < row[2]);
    }
}
