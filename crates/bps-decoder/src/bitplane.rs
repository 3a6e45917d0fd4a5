use bps_types::plane::check_plane;
use bps_types::{f16, PackedPlane, SampleMatrix};
use bps_wire::bitpack::unpack_bits;

use crate::error::DecodeError;

/// Rebuild FP16 values from a subset of bit-planes.
///
/// Every value starts at zero; each supplied plane ORs its bit into
/// position `plane`. Planes not supplied stay zero, which is the lossy
/// path: dropping low mantissa planes truncates precision toward zero
/// while sign and exponent stay exact.
///
/// ```text
///   plane 15: 0 1    ┐
///   plane 14: 1 1    ├─▶ acc[i] |= bit << plane ─▶ f16::from_bits
///   plane 10: 1 0    ┘
/// ```
///
/// `samples == 0` decodes to an empty matrix.
///
/// # Errors
///
/// - [`DecodeError::InvalidPlane`] for a plane index above 15.
/// - [`DecodeError::PlaneLengthMismatch`] if a plane's bit count is not
///   `samples * sensors` or its bytes are too short to hold them.
pub fn decode_planes(
    planes: &[(u8, PackedPlane)],
    samples: usize,
    sensors: usize,
) -> Result<SampleMatrix, DecodeError> {
    let count = samples * sensors;
    for (plane, packed) in planes {
        check_plane(*plane).map_err(|_| DecodeError::InvalidPlane { plane: *plane })?;
        if packed.num_bits != count {
            return Err(DecodeError::PlaneLengthMismatch {
                plane: *plane,
                expected: count,
                actual: packed.num_bits,
            });
        }
    }

    let mut acc = vec![0u16; count];
    for (plane, packed) in planes {
        let bits = unpack_bits(&packed.bytes, count).map_err(|_| {
            DecodeError::PlaneLengthMismatch {
                plane: *plane,
                expected: count,
                actual: packed.bytes.len() * 8,
            }
        })?;
        for (value, bit) in acc.iter_mut().zip(bits) {
            if bit {
                *value |= 1 << *plane;
            }
        }
    }

    let values = acc.into_iter().map(f16::from_bits).collect();
    Ok(SampleMatrix::new(values, sensors)?)
}
