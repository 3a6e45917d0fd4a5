use bps_types::header::DTYPE_FP16;
use bps_types::plane::is_plane_set;
use bps_types::{PackedPlane, ResponseHeader, SampleMatrix, SegmentInfo};
use bps_wire::frame::ResponseFrame;
use bps_wire::{BlockCodec, CodecKind};

use crate::bitplane::decode_planes;
use crate::decompression::inflate_plane;
use crate::error::DecodeError;

/// The result of decoding one response frame.
///
/// ```text
/// ┌───────────────────────────────────────────────────────────┐
/// │ DecodedResponse                                           │
/// │   header:        ResponseHeader ← segments, ratios, algo  │
/// │   values:        SampleMatrix   ← samples × sensors, fp16 │
/// │   payload_bytes: usize          ← compressed bytes read   │
/// └───────────────────────────────────────────────────────────┘
/// ```
///
/// Rows from every segment are concatenated in segment order.
#[derive(Clone, Debug)]
pub struct DecodedResponse {
    pub header: ResponseHeader,
    pub values: SampleMatrix,
    pub payload_bytes: usize,
}

/// Size and ratio of one transmitted plane.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneStats {
    pub plane: u8,
    pub blocks: usize,
    pub compressed_bytes: usize,
    pub ratio: f64,
}

impl DecodedResponse {
    pub fn samples(&self) -> usize {
        self.values.samples()
    }

    pub fn planes(&self) -> &[u8] {
        &self.header.planes
    }

    pub fn compression_ratio(&self) -> f64 {
        self.header.compression_info.compression_ratio
    }

    pub fn avg_compression_latency_ms(&self) -> f64 {
        self.header.compression_info.avg_compression_latency_ms
    }

    /// Per-plane block count, size, and ratio for the first segment.
    ///
    /// Empty when the response carries no segments.
    pub fn per_plane_stats(&self) -> Vec<PlaneStats> {
        let Some(segment) = self.header.segments.first() else {
            return Vec::new();
        };
        self.header
            .planes
            .iter()
            .zip(&segment.plane_block_sizes)
            .zip(&segment.plane_block_ratios)
            .map(|((&plane, sizes), &ratio)| PlaneStats {
                plane,
                blocks: sizes.len(),
                compressed_bytes: sizes.iter().sum(),
                ratio,
            })
            .collect()
    }
}

/// Decoder for a complete in-memory response frame.
///
/// Decoding proceeds in five steps:
///
///   1. **Envelope**: split the frame into header JSON and payload.
///   2. **Header**: parse the JSON, require `dtype == "fp16"`, resolve
///      the codec named by `algo`, and check the plane list.
///   3. **Layout**: every segment must carry one block size list, ratio
///      and bit count per plane, and each bit count must equal
///      `samples * sensors`.
///   4. **Payload length**: the block sizes must add up to exactly the
///      payload length.
///   5. **Planes**: walk the payload segment by segment, plane by plane,
///      inflate each plane's blocks and rebuild the segment's values.
///
/// The frame is the bytes after the outer length prefix, as returned
/// by [`Client::fetch`](crate::client::Client::fetch)'s reader.
///
/// # Example
///
/// ```rust
/// use bps_decoder::{DecodeError, ResponseDecoder};
///
/// let err = ResponseDecoder::decode(b"\x00\x00\x00\x02{}").unwrap_err();
/// assert!(matches!(err, DecodeError::InvalidHeader(_)));
/// ```
pub struct ResponseDecoder;

impl ResponseDecoder {
    /// Decode one response frame.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] variant except the connection-level ones;
    /// see the step list above for which check raises which error.
    pub fn decode(frame: &[u8]) -> Result<DecodedResponse, DecodeError> {
        let frame = ResponseFrame::read_from(frame)?;
        let header: ResponseHeader =
            serde_json::from_slice(frame.header).map_err(DecodeError::InvalidHeader)?;

        if header.dtype != DTYPE_FP16 {
            return Err(DecodeError::UnsupportedDtype {
                dtype: header.dtype,
            });
        }
        let codec = header
            .algo
            .parse::<CodecKind>()
            .map_err(|_| DecodeError::UnsupportedCodec {
                name: header.algo.clone(),
            })?
            .codec();
        check_planes(&header.planes)?;

        let mut declared = 0usize;
        for (index, segment) in header.segments.iter().enumerate() {
            check_segment(index, segment, &header)?;
            declared = segment
                .plane_block_sizes
                .iter()
                .flatten()
                .try_fold(declared, |acc, &size| acc.checked_add(size))
                .ok_or(DecodeError::MalformedSegment {
                    segment: index,
                    reason: "block sizes overflow",
                })?;
        }
        let actual = frame.payload.len();
        if actual < declared {
            return Err(DecodeError::PayloadTruncated { declared, actual });
        }
        if actual > declared {
            return Err(DecodeError::TrailingData {
                extra_bytes: actual - declared,
            });
        }

        let mut values = Vec::new();
        let mut offset = 0;
        for segment in &header.segments {
            let (segment_values, consumed) =
                decode_segment(codec.as_ref(), &header, segment, &frame.payload[offset..])?;
            values.extend(segment_values.into_values());
            offset += consumed;
        }

        let values = SampleMatrix::new(values, header.sensors)?;
        tracing::debug!(
            samples = values.samples(),
            payload_bytes = actual,
            algo = %header.algo,
            "response decoded"
        );
        Ok(DecodedResponse {
            header,
            values,
            payload_bytes: actual,
        })
    }
}

fn check_planes(planes: &[u8]) -> Result<(), DecodeError> {
    if planes.is_empty() {
        return Err(DecodeError::NoPlanes);
    }
    if is_plane_set(planes) {
        return Ok(());
    }
    // Report the first index that breaks the ascending, in-range rule.
    let bad = planes
        .iter()
        .enumerate()
        .find(|&(i, &p)| p > 15 || (i > 0 && planes[i - 1] >= p))
        .map_or(planes[0], |(_, &p)| p);
    Err(DecodeError::InvalidPlane { plane: bad })
}

fn check_segment(
    index: usize,
    segment: &SegmentInfo,
    header: &ResponseHeader,
) -> Result<(), DecodeError> {
    let planes = header.planes.len();
    if segment.plane_block_sizes.len() != planes {
        return Err(DecodeError::MalformedSegment {
            segment: index,
            reason: "plane_block_sizes does not match planes",
        });
    }
    if segment.plane_num_bits.len() != planes {
        return Err(DecodeError::MalformedSegment {
            segment: index,
            reason: "plane_num_bits does not match planes",
        });
    }
    if segment.plane_block_ratios.len() != planes {
        return Err(DecodeError::MalformedSegment {
            segment: index,
            reason: "plane_block_ratios does not match planes",
        });
    }
    let expected = segment
        .samples
        .checked_mul(header.sensors)
        .ok_or(DecodeError::MalformedSegment {
            segment: index,
            reason: "samples × sensors overflows",
        })?;
    for (&plane, &num_bits) in header.planes.iter().zip(&segment.plane_num_bits) {
        if num_bits != expected {
            return Err(DecodeError::PlaneLengthMismatch {
                plane,
                expected,
                actual: num_bits,
            });
        }
    }
    Ok(())
}

/// Decode one segment from the front of `payload`, returning its values
/// and the number of payload bytes consumed.
fn decode_segment(
    codec: &dyn BlockCodec,
    header: &ResponseHeader,
    segment: &SegmentInfo,
    payload: &[u8],
) -> Result<(SampleMatrix, usize), DecodeError> {
    let mut offset = 0;
    let mut planes: Vec<(u8, PackedPlane)> = Vec::with_capacity(header.planes.len());
    for ((&plane, sizes), &num_bits) in header
        .planes
        .iter()
        .zip(&segment.plane_block_sizes)
        .zip(&segment.plane_num_bits)
    {
        let mut blocks = Vec::with_capacity(sizes.len());
        for &size in sizes {
            let block = payload.get(offset..offset + size).ok_or(DecodeError::PayloadTruncated {
                declared: offset + size,
                actual: payload.len(),
            })?;
            blocks.push(block);
            offset += size;
        }
        planes.push((plane, inflate_plane(codec, plane, &blocks, num_bits)?));
    }
    let values = decode_planes(&planes, segment.samples, header.sensors)?;
    Ok((values, offset))
}
