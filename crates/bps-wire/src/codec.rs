use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CodecError;

/// Default zstd compression level (1–22 scale).
///
/// Level 3 is zstd's own default and keeps per-batch encode time well
/// under the sampling interval on small ARM boards.
pub const ZSTD_LEVEL: i32 = 3;

/// Magic number opening every LZ4 frame, as written on the wire.
pub const LZ4_FRAME_MAGIC: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

/// A block compressor identified on the wire by its name.
///
/// Every block is compressed independently: there is no dictionary or
/// window shared between blocks, so blocks can be inflated in any order
/// and one corrupt block does not poison its neighbours.
///
/// ```text
/// ┌────────────┬────────┬──────────────────────────────────────┐
/// │ Codec      │ name   │ Notes                                │
/// ├────────────┼────────┼──────────────────────────────────────┤
/// │ Lz4Codec   │ "lz4"  │ standard lz4 frame                   │
/// │ ZstdCodec  │ "zstd" │ zstd frame, level 3                  │
/// └────────────┴────────┴──────────────────────────────────────┘
/// ```
pub trait BlockCodec: Send + Sync {
    /// Name carried in the response header's `algo` field.
    fn name(&self) -> &'static str;

    /// Compress one block.
    ///
    /// # Errors
    ///
    /// [`CodecError::CompressFailed`] if the underlying library fails.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Decompress one block, refusing output larger than `max_size`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::DecompressFailed`] if the input is not a valid block.
    /// - [`CodecError::DecompressionBomb`] if the output exceeds `max_size`.
    fn decompress(&self, data: &[u8], max_size: usize) -> Result<Vec<u8>, CodecError>;
}

/// Fast frame codec backed by `lz4_flex`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lz4Codec;

impl BlockCodec for Lz4Codec {
    fn name(&self) -> &'static str {
        CodecKind::Lz4.name()
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
        encoder
            .write_all(data)
            .map_err(|e| CodecError::CompressFailed(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| CodecError::CompressFailed(e.to_string()))
    }

    fn decompress(&self, data: &[u8], max_size: usize) -> Result<Vec<u8>, CodecError> {
        read_capped(lz4_flex::frame::FrameDecoder::new(data), max_size)
    }
}

/// Higher-ratio streaming codec backed by `zstd`.
#[derive(Clone, Copy, Debug)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Create a codec at the given level, clamped to zstd's 1–22 range.
    #[must_use]
    pub fn new(level: i32) -> Self {
        Self {
            level: level.clamp(1, 22),
        }
    }

    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(ZSTD_LEVEL)
    }
}

impl BlockCodec for ZstdCodec {
    fn name(&self) -> &'static str {
        CodecKind::Zstd.name()
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        zstd::encode_all(data, self.level).map_err(|e| CodecError::CompressFailed(e.to_string()))
    }

    fn decompress(&self, data: &[u8], max_size: usize) -> Result<Vec<u8>, CodecError> {
        let decoder = zstd::stream::read::Decoder::new(data)
            .map_err(|e| CodecError::DecompressFailed(e.to_string()))?;
        read_capped(decoder, max_size)
    }
}

/// Drain a streaming decoder, stopping one byte past `max_size` so an
/// oversized frame is detected without inflating all of it.
fn read_capped(decoder: impl Read, max_size: usize) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    decoder
        .take(max_size as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| CodecError::DecompressFailed(e.to_string()))?;
    if out.len() > max_size {
        return Err(CodecError::DecompressionBomb {
            actual: out.len(),
            limit: max_size,
        });
    }
    Ok(out)
}

/// The codecs this build knows, selectable by name.
///
/// The sender picks one at startup; the receiver resolves the header's
/// `algo` string through [`CodecKind::from_str`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CodecKind {
    #[default]
    Lz4,
    Zstd,
}

impl CodecKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }

    /// Build the codec instance for this kind.
    #[must_use]
    pub fn codec(self) -> Arc<dyn BlockCodec> {
        match self {
            Self::Lz4 => Arc::new(Lz4Codec),
            Self::Zstd => Arc::new(ZstdCodec::default()),
        }
    }
}

impl FromStr for CodecKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lz4" => Ok(Self::Lz4),
            "zstd" => Ok(Self::Zstd),
            other => Err(CodecError::Unsupported {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
