use bps_types::PackedPlane;
use bps_wire::bitpack::packed_len;
use bps_wire::chunk::{self, BLOCK_SIZE};
use bps_wire::{BlockCodec, CodecError};

use crate::error::DecodeError;

/// A single block never inflates past the chunker's block size.
pub const MAX_BLOCK_DECOMPRESSED_SIZE: usize = BLOCK_SIZE;

/// Inflate one block.
///
/// # Errors
///
/// - [`DecodeError::BlockTooLarge`] if the block would exceed
///   [`MAX_BLOCK_DECOMPRESSED_SIZE`].
/// - [`DecodeError::Codec`] if the bytes are not a valid block.
pub fn inflate_block(codec: &dyn BlockCodec, block: &[u8]) -> Result<Vec<u8>, DecodeError> {
    codec
        .decompress(block, MAX_BLOCK_DECOMPRESSED_SIZE)
        .map_err(|e| match e {
            CodecError::DecompressionBomb { actual, limit } => {
                DecodeError::BlockTooLarge { size: actual, limit }
            }
            other => DecodeError::Codec(other),
        })
}

/// Inflate and join a plane's blocks, then cut the result to
/// `ceil(num_bits / 8)` bytes.
///
/// # Errors
///
/// [`DecodeError::PlaneLengthMismatch`] if the joined blocks hold fewer
/// than `num_bits` bits, plus anything [`inflate_block`] returns.
pub fn inflate_plane(
    codec: &dyn BlockCodec,
    plane: u8,
    blocks: &[&[u8]],
    num_bits: usize,
) -> Result<PackedPlane, DecodeError> {
    let parts = blocks
        .iter()
        .map(|block| inflate_block(codec, block))
        .collect::<Result<Vec<_>, _>>()?;
    let mut bytes = chunk::join(&parts);

    let needed = packed_len(num_bits);
    if bytes.len() < needed {
        return Err(DecodeError::PlaneLengthMismatch {
            plane,
            expected: num_bits,
            actual: bytes.len() * 8,
        });
    }
    bytes.truncate(needed);
    Ok(PackedPlane::new(bytes, num_bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bps_wire::{Lz4Codec, ZstdCodec};

    #[test]
    fn joins_blocks_in_order() {
        let codec = Lz4Codec;
        let first = codec.compress(&[1; BLOCK_SIZE]).unwrap();
        let second = codec.compress(&[2; 4]).unwrap();
        let plane = inflate_plane(&codec, 3, &[&first, &second], (BLOCK_SIZE + 4) * 8).unwrap();
        assert_eq!(plane.bytes.len(), BLOCK_SIZE + 4);
        assert_eq!(plane.bytes[BLOCK_SIZE - 1], 1);
        assert_eq!(plane.bytes[BLOCK_SIZE], 2);
    }

    #[test]
    fn truncates_to_bit_count() {
        let codec = ZstdCodec::default();
        let block = codec.compress(&[0xFF; 10]).unwrap();
        let plane = inflate_plane(&codec, 0, &[&block], 17).unwrap();
        assert_eq!(plane.bytes, vec![0xFF; 3]);
        assert_eq!(plane.num_bits, 17);
    }

    #[test]
    fn short_plane_is_rejected() {
        let codec = ZstdCodec::default();
        let block = codec.compress(&[0; 2]).unwrap();
        let err = inflate_plane(&codec, 9, &[&block], 24).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::PlaneLengthMismatch { plane: 9, expected: 24, actual: 16 }
        ));
    }

    #[test]
    fn oversized_block_is_rejected() {
        for codec in [&Lz4Codec as &dyn BlockCodec, &ZstdCodec::default()] {
            let block = codec.compress(&vec![0; BLOCK_SIZE + 1]).unwrap();
            let err = inflate_block(codec, &block).unwrap_err();
            assert!(matches!(err, DecodeError::BlockTooLarge { .. }), "{}", codec.name());
        }
    }

    #[test]
    fn garbage_block_is_codec_error() {
        let err = inflate_block(&ZstdCodec::default(), b"not zstd").unwrap_err();
        assert!(matches!(err, DecodeError::Codec(_)));
    }

    #[test]
    fn no_blocks_means_empty_plane() {
        let plane = inflate_plane(&Lz4Codec, 15, &[], 0).unwrap();
        assert!(plane.bytes.is_empty());
    }
}
