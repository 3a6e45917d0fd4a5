use std::sync::Arc;
use std::time::Instant;

use bps_types::{Batch, SampleRow};
use bps_wire::BlockCodec;

use crate::bitplane::encode_rows;
use crate::compression::compress_planes;
use crate::error::EncodeError;

/// Accumulates sample rows and emits a compressed [`Batch`] every
/// `batch_samples` rows.
///
/// ```text
///   push_row(t0, r0) ─┐
///   push_row(t1, r1) ─┤  pending rows
///        ...          │
///   push_row(tn, rn) ─┴─▶ encode_rows ─▶ compress_planes ─▶ Batch
///                          (16 planes)    (4 KiB blocks)     start = t0
///                                                            end   = tn
/// ```
///
/// Batch boundaries come from the timestamps of the first and last row,
/// so a batch's span is exactly the ticks it holds.
///
/// # Usage
///
/// ```rust
/// use bps_encoder::BatchEncoder;
/// use bps_types::f16;
/// use bps_wire::CodecKind;
///
/// let mut encoder = BatchEncoder::new(CodecKind::Lz4.codec(), 2, 2).unwrap();
/// assert!(encoder.push_row(0.0, vec![f16::ONE, f16::ZERO]).unwrap().is_none());
/// let batch = encoder.push_row(0.1, vec![f16::ONE, f16::ZERO]).unwrap().unwrap();
/// assert_eq!(batch.samples, 2);
/// assert_eq!(batch.start, 0.0);
/// assert_eq!(batch.end, 0.1);
/// ```
pub struct BatchEncoder {
    codec: Arc<dyn BlockCodec>,
    sensors: usize,
    batch_samples: usize,
    rows: Vec<SampleRow>,
    first_timestamp: f64,
    last_timestamp: f64,
}

impl BatchEncoder {
    /// # Errors
    ///
    /// - [`EncodeError::NoSensors`] if `sensors` is zero.
    /// - [`EncodeError::EmptyBatch`] if `batch_samples` is zero.
    pub fn new(
        codec: Arc<dyn BlockCodec>,
        sensors: usize,
        batch_samples: usize,
    ) -> Result<Self, EncodeError> {
        if sensors == 0 {
            return Err(EncodeError::NoSensors);
        }
        if batch_samples == 0 {
            return Err(EncodeError::EmptyBatch);
        }
        Ok(Self {
            codec,
            sensors,
            batch_samples,
            rows: Vec::with_capacity(batch_samples),
            first_timestamp: 0.0,
            last_timestamp: 0.0,
        })
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    pub fn sensors(&self) -> usize {
        self.sensors
    }

    pub fn batch_samples(&self) -> usize {
        self.batch_samples
    }

    /// Rows buffered since the last emitted batch.
    pub fn pending(&self) -> usize {
        self.rows.len()
    }

    /// Buffer one row taken at `timestamp` (epoch seconds).
    ///
    /// Returns `Some(batch)` when this row completes a batch. The buffer
    /// is emptied whether or not encoding succeeds, so a failed batch is
    /// dropped rather than retried.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::RowWidthMismatch`] if the row does not hold one
    ///   value per sensor. The row is discarded and the buffer is untouched.
    /// - [`EncodeError::Codec`] if compressing the completed batch fails.
    pub fn push_row(
        &mut self,
        timestamp: f64,
        row: SampleRow,
    ) -> Result<Option<Batch>, EncodeError> {
        if row.len() != self.sensors {
            return Err(EncodeError::RowWidthMismatch {
                row: self.rows.len(),
                expected: self.sensors,
                actual: row.len(),
            });
        }
        if self.rows.is_empty() {
            self.first_timestamp = timestamp;
        }
        self.last_timestamp = timestamp;
        self.rows.push(row);

        if self.rows.len() < self.batch_samples {
            return Ok(None);
        }
        let rows = std::mem::replace(&mut self.rows, Vec::with_capacity(self.batch_samples));
        self.encode_batch(&rows, self.first_timestamp, self.last_timestamp)
            .map(Some)
    }

    /// Encode `rows` into a batch spanning `[start, end]`.
    ///
    /// `compression_time_ms` covers plane extraction and compression.
    ///
    /// # Errors
    ///
    /// Same as [`push_row`](Self::push_row).
    pub fn encode_batch(
        &self,
        rows: &[SampleRow],
        start: f64,
        end: f64,
    ) -> Result<Batch, EncodeError> {
        let started = Instant::now();
        let bit_planes = encode_rows(rows, self.sensors)?;
        let planes = compress_planes(self.codec.as_ref(), &bit_planes)?;
        let compression_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let batch = Batch {
            start,
            end,
            samples: rows.len(),
            sensors: self.sensors,
            planes,
            compression_time_ms,
        };
        tracing::debug!(
            samples = batch.samples,
            compressed_bytes = batch.planes.iter().map(|p| p.compressed_len()).sum::<usize>(),
            compression_time_ms,
            "batch encoded"
        );
        Ok(batch)
    }
}

impl std::fmt::Debug for BatchEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchEncoder")
            .field("codec", &self.codec.name())
            .field("sensors", &self.sensors)
            .field("batch_samples", &self.batch_samples)
            .field("pending", &self.rows.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bps_types::f16;
    use bps_wire::bitpack::packed_len;
    use bps_wire::chunk::{self, BLOCK_SIZE};
    use bps_wire::CodecKind;

    fn row(a: f32, b: f32) -> SampleRow {
        vec![f16::from_f32(a), f16::from_f32(b)]
    }

    fn encoder(kind: CodecKind, batch_samples: usize) -> BatchEncoder {
        BatchEncoder::new(kind.codec(), 2, batch_samples).unwrap()
    }

    #[test]
    fn emits_on_the_nth_row() {
        let mut enc = encoder(CodecKind::Lz4, 3);
        assert!(enc.push_row(1.0, row(20.0, 50.0)).unwrap().is_none());
        assert!(enc.push_row(1.1, row(20.1, 50.1)).unwrap().is_none());
        assert_eq!(enc.pending(), 2);
        let batch = enc.push_row(1.2, row(20.2, 50.2)).unwrap().unwrap();
        assert_eq!(enc.pending(), 0);
        assert_eq!(batch.samples, 3);
        assert_eq!(batch.sensors, 2);
        assert_eq!(batch.start, 1.0);
        assert_eq!(batch.end, 1.2);
        assert!(batch.compression_time_ms >= 0.0);
    }

    #[test]
    fn next_batch_starts_fresh() {
        let mut enc = encoder(CodecKind::Zstd, 2);
        enc.push_row(0.0, row(1.0, 1.0)).unwrap();
        enc.push_row(0.1, row(1.0, 1.0)).unwrap();
        enc.push_row(5.0, row(1.0, 1.0)).unwrap();
        let batch = enc.push_row(5.1, row(1.0, 1.0)).unwrap().unwrap();
        assert_eq!(batch.start, 5.0);
        assert_eq!(batch.end, 5.1);
    }

    #[test]
    fn planes_inflate_to_packed_len() {
        let mut enc = encoder(CodecKind::Zstd, 256);
        let mut batch = None;
        for i in 0..256u16 {
            let t = f32::from(i) * 0.1;
            batch = enc.push_row(f64::from(t), row(22.0 + t.sin(), 55.0 + t.cos())).unwrap();
        }
        let batch = batch.unwrap();
        let codec = CodecKind::Zstd.codec();
        for plane in &batch.planes {
            assert_eq!(plane.num_bits, 512);
            let parts: Vec<Vec<u8>> = plane
                .blocks
                .iter()
                .map(|b| codec.decompress(b, BLOCK_SIZE).unwrap())
                .collect();
            assert_eq!(chunk::join(&parts).len(), packed_len(512));
        }
    }

    #[test]
    fn wrong_width_is_rejected_without_losing_rows() {
        let mut enc = encoder(CodecKind::Lz4, 2);
        enc.push_row(0.0, row(1.0, 2.0)).unwrap();
        let err = enc.push_row(0.1, vec![f16::ONE]).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::RowWidthMismatch { row: 1, expected: 2, actual: 1 }
        ));
        assert_eq!(enc.pending(), 1);
        assert!(enc.push_row(0.2, row(1.0, 2.0)).unwrap().is_some());
    }

    #[test]
    fn rejects_degenerate_config() {
        assert!(matches!(
            BatchEncoder::new(CodecKind::Lz4.codec(), 0, 8),
            Err(EncodeError::NoSensors)
        ));
        assert!(matches!(
            BatchEncoder::new(CodecKind::Lz4.codec(), 2, 0),
            Err(EncodeError::EmptyBatch)
        ));
    }

    #[test]
    fn single_row_batches() {
        let mut enc = encoder(CodecKind::Lz4, 1);
        let batch = enc.push_row(7.0, row(0.5, -0.5)).unwrap().unwrap();
        assert_eq!(batch.start, batch.end);
        assert_eq!(batch.bits_per_plane(), 2);
    }

    #[test]
    fn debug_names_codec() {
        let enc = encoder(CodecKind::Zstd, 4);
        assert!(format!("{enc:?}").contains("zstd"));
    }
}
