/// Errors raised while framing, bit-packing, or reading raw wire bytes.
///
/// ```text
///   WireError
///   ├── UnexpectedEof     ← buffer ended before a prefix or body was complete
///   ├── FrameTooLarge     ← declared or produced length exceeds the limit
///   ├── BitCountOverflow  ← bit count larger than the packed buffer holds
///   └── Io(std::io::Error)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete length prefix or body could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A length prefix announced (or a writer produced) more bytes than allowed.
    #[error("frame length {len} exceeds limit {limit}")]
    FrameTooLarge { len: usize, limit: usize },

    /// A packed plane claims more meaningful bits than its bytes can hold.
    #[error("bit count {bits} exceeds the {available} bits available")]
    BitCountOverflow { bits: usize, available: usize },

    /// I/O error during read or write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by a [`BlockCodec`](crate::codec::BlockCodec).
///
/// `Unsupported` is what a decoder sees when a response header names a
/// codec this build does not implement.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported codec {name:?}")]
    Unsupported { name: String },

    #[error("compression failed: {0}")]
    CompressFailed(String),

    #[error("decompression failed: {0}")]
    DecompressFailed(String),

    /// Decompressed output would exceed the caller's limit.
    #[error("decompressed size {actual} exceeds limit {limit}")]
    DecompressionBomb { actual: usize, limit: usize },
}
