use std::sync::Arc;

use bps_types::header::{ratio, round_to, CompressionInfo, DTYPE_FP16};
use bps_types::{Batch, ResponseHeader, SegmentInfo};
use bps_wire::frame::ResponseFrame;

use crate::error::ServerError;

/// Describe one batch as a response segment, restricted to `planes`.
fn segment(batch: &Batch, planes: &[u8]) -> SegmentInfo {
    SegmentInfo {
        start: batch.start,
        end: batch.end,
        samples: batch.samples,
        plane_block_sizes: planes.iter().map(|&p| batch.plane(p).block_sizes()).collect(),
        plane_block_ratios: planes
            .iter()
            .map(|&p| {
                let plane = batch.plane(p);
                ratio(plane.raw_len(), plane.compressed_len())
            })
            .collect(),
        plane_num_bits: planes.iter().map(|&p| batch.plane(p).num_bits).collect(),
    }
}

/// Aggregate size, ratio and latency over the returned batches.
///
/// The ratio compares the full FP16 size of every returned batch (all 16
/// planes) with the bytes actually sent, so dropping planes raises it.
#[allow(clippy::cast_precision_loss)]
fn compression_info(batches: &[Arc<Batch>], planes: &[u8]) -> CompressionInfo {
    let compressed_bytes: usize = batches.iter().map(|b| b.compressed_len(planes)).sum();
    let raw_bits: usize = batches.iter().map(|b| b.raw_bits()).sum();
    let avg_compression_latency_ms = if batches.is_empty() {
        0.0
    } else {
        let total: f64 = batches.iter().map(|b| b.compression_time_ms).sum();
        round_to(total / batches.len() as f64, 2)
    };
    CompressionInfo {
        compressed_bytes,
        compression_ratio: ratio(raw_bits / 8, compressed_bytes),
        avg_compression_latency_ms,
    }
}

/// Build the response header for `batches` and `planes`.
///
/// `planes` must be a valid ascending plane set, as produced by
/// [`choose_planes`](bps_types::choose_planes).
#[must_use]
pub fn build_header(
    batches: &[Arc<Batch>],
    planes: &[u8],
    algo: &str,
    sensor_names: &[String],
) -> ResponseHeader {
    ResponseHeader {
        algo: algo.to_string(),
        dtype: DTYPE_FP16.to_string(),
        planes: planes.to_vec(),
        sensor_names: sensor_names.to_vec(),
        sensors: sensor_names.len(),
        segments: batches.iter().map(|b| segment(b, planes)).collect(),
        compression_info: compression_info(batches, planes),
    }
}

/// Serialize a complete response message, outer length prefix included.
///
/// Blocks follow the header in batch order, then ascending plane, then
/// block order, matching the header's `plane_block_sizes`.
///
/// # Errors
///
/// - [`ServerError::Header`] if the header fails to serialize.
/// - [`ServerError::Wire`] if the frame does not fit a `u32` length.
pub fn build_response(
    batches: &[Arc<Batch>],
    planes: &[u8],
    algo: &str,
    sensor_names: &[String],
) -> Result<Vec<u8>, ServerError> {
    let header = build_header(batches, planes, algo, sensor_names);
    let json = serde_json::to_vec(&header).map_err(ServerError::Header)?;
    let blocks = batches.iter().flat_map(|batch| {
        planes
            .iter()
            .flat_map(move |&p| batch.plane(p).blocks.iter().map(Vec::as_slice))
    });
    Ok(ResponseFrame::encode(&json, blocks)?)
}
