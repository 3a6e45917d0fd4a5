use bps_types::plane::PLANE_COUNT;
use bps_types::{PackedPlane, SampleRow};
use bps_wire::bitpack::BitWriter;

use crate::error::EncodeError;

/// All 16 planes of a batch, indexed by bit position.
pub type BitPlanes = [PackedPlane; PLANE_COUNT];

/// Split FP16 bit patterns into 16 packed bit-planes.
///
/// Plane `b` holds bit `b` of every value, in input order, packed
/// MSB-first. Each plane carries `values.len()` meaningful bits.
///
/// ```text
///   values:   v0 = 0b1100_0000_0000_0001
///             v1 = 0b0100_0000_0000_0000
///   plane 0:  [v0.0, v1.0] = [1, 0]  ──▶ 0b1000_0000, 2 bits
///   plane 14: [v0.14, v1.14] = [1, 1] ──▶ 0b1100_0000, 2 bits
///   plane 15: [v0.15, v1.15] = [1, 0] ──▶ 0b1000_0000, 2 bits
/// ```
#[must_use]
pub fn encode_bits(values: &[u16]) -> BitPlanes {
    std::array::from_fn(|plane| {
        let mut writer = BitWriter::with_capacity(values.len());
        for &value in values {
            writer.push((value >> plane) & 1 == 1);
        }
        let (bytes, num_bits) = writer.finish();
        PackedPlane::new(bytes, num_bits)
    })
}

/// Split a batch of sample rows into bit-planes, row-major (row, then sensor).
///
/// Zero rows produce 16 empty planes with `num_bits == 0`.
///
/// # Errors
///
/// [`EncodeError::RowWidthMismatch`] if any row does not hold exactly
/// `sensors` values.
pub fn encode_rows(rows: &[SampleRow], sensors: usize) -> Result<BitPlanes, EncodeError> {
    let mut values = Vec::with_capacity(rows.len() * sensors);
    for (index, row) in rows.iter().enumerate() {
        if row.len() != sensors {
            return Err(EncodeError::RowWidthMismatch {
                row: index,
                expected: sensors,
                actual: row.len(),
            });
        }
        values.extend(row.iter().map(|v| v.to_bits()));
    }
    Ok(encode_bits(&values))
}
