use bps_wire::bitpack::packed_len;

use crate::plane::PLANE_COUNT;

/// The compressed blocks of one bit-plane within a batch.
///
/// Block sizes are derived from the blocks themselves, so the sizes a
/// response header advertises always match the bytes it ships.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaneBlocks {
    /// Compressed blocks in split order. Each inflates to at most 4 KiB.
    pub blocks: Vec<Vec<u8>>,

    /// Meaningful bits in the uncompressed plane (`samples * sensors`).
    pub num_bits: usize,
}

impl PlaneBlocks {
    #[must_use]
    pub fn new(blocks: Vec<Vec<u8>>, num_bits: usize) -> Self {
        Self { blocks, num_bits }
    }

    #[must_use]
    pub fn block_sizes(&self) -> Vec<usize> {
        self.blocks.iter().map(Vec::len).collect()
    }

    /// Total compressed bytes across the plane's blocks.
    #[must_use]
    pub fn compressed_len(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    /// Packed size of the plane before compression, `ceil(num_bits / 8)`.
    #[must_use]
    pub fn raw_len(&self) -> usize {
        packed_len(self.num_bits)
    }
}

/// One immutable unit of cached history.
///
/// A batch covers `samples` consecutive rows of `sensors` values and
/// holds all 16 planes, whichever subset a given query ends up sending.
///
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │ Batch                                                    │
/// │   start, end           ← epoch seconds, inclusive span   │
/// │   samples, sensors     ← rows × columns                  │
/// │   planes[0..16]        ← PlaneBlocks per bit position    │
/// │   compression_time_ms  ← encode + compress wall time     │
/// └──────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    pub start: f64,
    pub end: f64,
    pub samples: usize,
    pub sensors: usize,
    pub planes: [PlaneBlocks; PLANE_COUNT],
    pub compression_time_ms: f64,
}

impl Batch {
    /// `true` unless the batch lies entirely before `t0` or after `t1`.
    ///
    /// Both ends are inclusive: a batch ending exactly at `t0` overlaps.
    #[must_use]
    pub fn overlaps(&self, t0: f64, t1: f64) -> bool {
        !(self.end < t0 || self.start > t1)
    }

    /// The blocks of plane `plane`.
    ///
    /// # Panics
    ///
    /// Panics if `plane >= 16`. Callers pass indices from
    /// [`choose_planes`](crate::plane::choose_planes) or a validated header.
    #[must_use]
    pub fn plane(&self, plane: u8) -> &PlaneBlocks {
        &self.planes[usize::from(plane)]
    }

    /// Bits per plane, `samples * sensors`.
    #[must_use]
    pub fn bits_per_plane(&self) -> usize {
        self.samples * self.sensors
    }

    /// Uncompressed size of all 16 planes in bits.
    #[must_use]
    pub fn raw_bits(&self) -> usize {
        self.bits_per_plane() * PLANE_COUNT
    }

    /// Compressed bytes of the given planes.
    #[must_use]
    pub fn compressed_len(&self, planes: &[u8]) -> usize {
        planes.iter().map(|&p| self.plane(p).compressed_len()).sum()
    }
}
