use bps_wire::bitpack::packed_len;
use half::f16;

use crate::error::TypeError;

/// One sampling tick: a value per sensor, in sensor-name order.
pub type SampleRow = Vec<f16>;

/// One bit-plane, packed MSB-first.
///
/// `bytes.len()` is always `ceil(num_bits / 8)`; the low bits of the last
/// byte are zero padding and carry no data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedPlane {
    pub bytes: Vec<u8>,
    pub num_bits: usize,
}

impl PackedPlane {
    #[must_use]
    pub fn new(bytes: Vec<u8>, num_bits: usize) -> Self {
        Self { bytes, num_bits }
    }

    /// `true` if the byte length matches the bit count exactly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.bytes.len() == packed_len(self.num_bits)
    }
}

/// Decoded values, `samples × sensors`, stored row-major.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleMatrix {
    sensors: usize,
    values: Vec<f16>,
}

impl SampleMatrix {
    /// Wrap a row-major value buffer.
    ///
    /// # Errors
    ///
    /// [`TypeError::MatrixShape`] if `values.len()` is not a multiple of
    /// `sensors` (or values are present with zero sensors).
    pub fn new(values: Vec<f16>, sensors: usize) -> Result<Self, TypeError> {
        let shaped = if sensors == 0 {
            values.is_empty()
        } else {
            values.len() % sensors == 0
        };
        if !shaped {
            return Err(TypeError::MatrixShape {
                len: values.len(),
                sensors,
            });
        }
        Ok(Self { sensors, values })
    }

    #[must_use]
    pub fn sensors(&self) -> usize {
        self.sensors
    }

    /// Number of rows.
    #[must_use]
    pub fn samples(&self) -> usize {
        if self.sensors == 0 {
            0
        } else {
            self.values.len() / self.sensors
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values, row-major.
    #[must_use]
    pub fn values(&self) -> &[f16] {
        &self.values
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f16]> {
        self.values.chunks_exact(self.sensors.max(1))
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f16]> {
        let start = index.checked_mul(self.sensors)?;
        let end = start.checked_add(self.sensors)?;
        self.values.get(start..end)
    }

    /// One sensor's series across all rows.
    #[must_use]
    pub fn column(&self, sensor: usize) -> Vec<f16> {
        if sensor >= self.sensors {
            return Vec::new();
        }
        self.rows().map(|row| row[sensor]).collect()
    }

    /// Raw FP16 bit patterns, row-major.
    #[must_use]
    pub fn to_bits(&self) -> Vec<u16> {
        self.values.iter().map(|v| v.to_bits()).collect()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<f16> {
        self.values
    }
}
