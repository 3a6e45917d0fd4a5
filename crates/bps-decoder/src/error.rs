use bps_types::TypeError;
use bps_wire::{CodecError, WireError};

/// Errors that can occur while fetching or decoding a response.
///
/// Validation happens in layers: the frame envelope, the JSON header,
/// the per-segment layout, the payload length, then each block.
///
/// ```text
///   DecodeError
///   ├── InvalidHeader(serde_json::Error) ← header is not the expected JSON
///   ├── EncodeRequest(serde_json::Error) ← request body could not be built
///   ├── UnsupportedCodec                 ← `algo` names no known codec
///   ├── UnsupportedDtype                 ← `dtype` is not "fp16"
///   ├── InvalidPlane                     ← plane > 15, or not ascending/unique
///   ├── NoPlanes                         ← header transmits zero planes
///   ├── MalformedSegment                 ← per-plane lists disagree with `planes`
///   ├── PlaneLengthMismatch              ← plane bit count ≠ samples × sensors
///   ├── BlockTooLarge                    ← block inflates past 4 KiB
///   ├── PayloadTruncated                 ← fewer payload bytes than declared
///   ├── TrailingData                     ← more payload bytes than declared
///   ├── ConnectionClosed                 ← peer closed mid-message
///   ├── Codec(CodecError)                ← block failed to inflate
///   ├── Type(TypeError)                  ← decoded values could not be shaped
///   ├── Wire(WireError)                  ← framing error
///   └── Io(std::io::Error)               ← socket I/O
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid response header: {0}")]
    InvalidHeader(#[source] serde_json::Error),

    #[error("cannot serialize request: {0}")]
    EncodeRequest(#[source] serde_json::Error),

    #[error("unsupported codec {name:?}")]
    UnsupportedCodec { name: String },

    #[error("unsupported dtype {dtype:?}, expected \"fp16\"")]
    UnsupportedDtype { dtype: String },

    /// Plane indices must be within 0..=15, strictly ascending.
    #[error("invalid plane {plane} in header plane list")]
    InvalidPlane { plane: u8 },

    #[error("header transmits no planes")]
    NoPlanes,

    #[error("segment {segment} is malformed: {reason}")]
    MalformedSegment {
        segment: usize,
        reason: &'static str,
    },

    /// Bits are counted after padding is stripped.
    #[error("plane {plane} carries {actual} bits, expected {expected}")]
    PlaneLengthMismatch {
        plane: u8,
        expected: usize,
        actual: usize,
    },

    #[error("block inflates to {size} bytes, limit is {limit}")]
    BlockTooLarge { size: usize, limit: usize },

    #[error("payload truncated: header declares {declared} bytes, got {actual}")]
    PayloadTruncated { declared: usize, actual: usize },

    #[error("unexpected data after payload ({extra_bytes} bytes)")]
    TrailingData { extra_bytes: usize },

    /// The server closed the connection after sending part of a message.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
