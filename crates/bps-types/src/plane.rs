use crate::error::TypeError;

/// Number of bit-planes in an FP16 value.
pub const PLANE_COUNT: usize = 16;

/// Sign bit.
pub const SIGN_PLANE: u8 = 15;

/// Most significant mantissa bit; optional planes are taken from here down.
pub const TOP_MANTISSA_PLANE: u8 = 9;

/// Sign plus the five exponent bits. Always transmitted, so every
/// reconstructed value keeps its sign and magnitude class exactly.
///
/// ```text
///   bit:  15 | 14 13 12 11 10 | 9 8 7 6 5 4 3 2 1 0
///         s  |   exponent     |      mantissa
///         └────── mandatory ──┘ └─ optional, high → low ─┘
/// ```
pub const MANDATORY_PLANES: [u8; 6] = [10, 11, 12, 13, 14, 15];

/// Resolve a requested plane count into the sorted set of plane indices
/// to transmit.
///
/// The mandatory planes are always included. Each requested plane beyond
/// six adds the next mantissa bit, from bit 9 downward, so precision
/// degrades from the least significant end. Requests above 16 saturate.
///
/// | requested | planes            |
/// |-----------|-------------------|
/// | 0..=6     | 10..=15           |
/// | 7         | 9..=15            |
/// | 12        | 4..=15            |
/// | 16+       | 0..=15            |
#[must_use]
pub fn choose_planes(requested: u32) -> Vec<u8> {
    let requested = usize::try_from(requested).map_or(PLANE_COUNT, |r| r.min(PLANE_COUNT));
    let extra = requested.saturating_sub(MANDATORY_PLANES.len());

    // extra <= 10, so TOP_MANTISSA_PLANE - i never underflows.
    #[allow(clippy::cast_possible_truncation)]
    let mut planes: Vec<u8> = (0..extra).map(|i| TOP_MANTISSA_PLANE - i as u8).collect();
    planes.extend_from_slice(&MANDATORY_PLANES);
    planes.sort_unstable();
    planes
}

/// Check that `plane` names one of the 16 bit positions.
///
/// # Errors
///
/// [`TypeError::InvalidPlane`] if `plane > 15`.
pub fn check_plane(plane: u8) -> Result<u8, TypeError> {
    if usize::from(plane) < PLANE_COUNT {
        Ok(plane)
    } else {
        Err(TypeError::InvalidPlane { plane })
    }
}

/// `true` if `planes` is strictly ascending and every index is valid.
#[must_use]
pub fn is_plane_set(planes: &[u8]) -> bool {
    planes.windows(2).all(|w| w[0] < w[1]) && planes.iter().all(|&p| check_plane(p).is_ok())
}
