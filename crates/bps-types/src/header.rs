use serde::{Deserialize, Serialize};

/// The only value datatype this protocol carries.
pub const DTYPE_FP16: &str = "fp16";

/// Response header, serialized as the JSON object at the front of every
/// response frame.
///
/// ```text
/// ┌──────────────────┬───────────────────────────────────────────────┐
/// │ Field            │ Meaning                                       │
/// ├──────────────────┼───────────────────────────────────────────────┤
/// │ algo             │ codec name ("lz4" / "zstd")                   │
/// │ dtype            │ always "fp16"                                 │
/// │ planes           │ transmitted plane indices, ascending          │
/// │ sensor_names     │ column names, in row order                    │
/// │ sensors          │ column count                                  │
/// │ segments         │ one entry per batch, in time order            │
/// │ compression_info │ aggregate size / ratio / latency              │
/// └──────────────────┴───────────────────────────────────────────────┘
/// ```
///
/// Per-plane lists inside a segment are parallel to `planes`: entry `i`
/// describes plane `planes[i]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub algo: String,
    pub dtype: String,
    pub planes: Vec<u8>,
    pub sensor_names: Vec<String>,
    pub sensors: usize,
    pub segments: Vec<SegmentInfo>,
    pub compression_info: CompressionInfo,
}

impl ResponseHeader {
    /// Rows across all segments.
    #[must_use]
    pub fn total_samples(&self) -> usize {
        self.segments.iter().map(|s| s.samples).sum()
    }

    /// Payload bytes the header announces.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.segments.iter().map(SegmentInfo::payload_len).sum()
    }
}

/// Metadata for one batch inside a response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub start: f64,
    pub end: f64,
    pub samples: usize,
    /// Compressed block sizes, one list per transmitted plane.
    pub plane_block_sizes: Vec<Vec<usize>>,
    /// Raw plane bytes / compressed plane bytes, 3 decimals.
    pub plane_block_ratios: Vec<f64>,
    /// Meaningful bits per plane (`samples * sensors`).
    pub plane_num_bits: Vec<usize>,
}

impl SegmentInfo {
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.plane_block_sizes.iter().flatten().sum()
    }
}

/// Aggregate statistics over every segment in a response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompressionInfo {
    pub compressed_bytes: usize,
    pub compression_ratio: f64,
    pub avg_compression_latency_ms: f64,
}

/// Round to `decimals` places, half away from zero.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Compression ratio `raw / compressed`, rounded to 3 decimals.
///
/// Zero compressed bytes means nothing was sent and nothing was saved,
/// which is reported as 1.0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(raw: usize, compressed: usize) -> f64 {
    if compressed == 0 {
        return 1.0;
    }
    round_to(raw as f64 / compressed as f64, 3)
}
