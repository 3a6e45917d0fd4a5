use bps_types::plane::PLANE_COUNT;
use bps_types::{PackedPlane, PlaneBlocks};
use bps_wire::chunk;
use bps_wire::BlockCodec;

use crate::bitplane::BitPlanes;
use crate::error::EncodeError;

/// Compress one packed plane as a sequence of independent blocks.
///
/// The plane is cut into [`chunk::BLOCK_SIZE`] pieces and each piece is
/// compressed on its own, so any block can be inflated without its
/// neighbours. An empty plane yields no blocks.
///
/// # Errors
///
/// [`EncodeError::Codec`] if the codec rejects a block.
pub fn compress_plane(codec: &dyn BlockCodec, plane: &PackedPlane) -> Result<PlaneBlocks, EncodeError> {
    let blocks = chunk::split(&plane.bytes)
        .into_iter()
        .map(|block| codec.compress(block))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PlaneBlocks::new(blocks, plane.num_bits))
}

/// Compress all 16 planes of a batch, plane 0 first.
///
/// # Errors
///
/// [`EncodeError::Codec`] from the first plane that fails.
pub fn compress_planes(
    codec: &dyn BlockCodec,
    planes: &BitPlanes,
) -> Result<[PlaneBlocks; PLANE_COUNT], EncodeError> {
    let mut out: [PlaneBlocks; PLANE_COUNT] = Default::default();
    for (slot, plane) in out.iter_mut().zip(planes) {
        *slot = compress_plane(codec, plane)?;
    }
    Ok(out)
}
