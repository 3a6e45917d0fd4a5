//! Roundtrip integration tests: rows → batches → response frame → values.
//!
//! Batches are encoded with [`BatchEncoder`], assembled into a frame with
//! the server's response builder, and decoded with [`ResponseDecoder`].
//!
//! - With all 16 planes the decoded values are bit-identical to the input.
//! - With `k` planes every value equals the input with the unsent low
//!   mantissa bits cleared.

use std::sync::Arc;

use bps_decoder::ResponseDecoder;
use bps_server::response::build_response;
use bps_tests::{encode_batches, sensor_names, sensor_rows};
use bps_types::{choose_planes, f16, Batch};
use bps_wire::frame::LENGTH_PREFIX_SIZE;
use bps_wire::CodecKind;
use proptest::prelude::*;

fn roundtrip(kind: CodecKind, batches: &[Batch], requested: u32) -> Vec<f16> {
    let batches: Vec<Arc<Batch>> = batches.iter().cloned().map(Arc::new).collect();
    let planes = choose_planes(requested);
    let message = build_response(&batches, &planes, kind.name(), &sensor_names()).unwrap();
    let decoded = ResponseDecoder::decode(&message[LENGTH_PREFIX_SIZE..]).unwrap();
    decoded.values.into_values()
}

fn input_values(t0: f64, batch_samples: usize, count: usize) -> Vec<f16> {
    sensor_rows(t0, batch_samples * count, 42)
        .into_iter()
        .flat_map(|(_, row)| row)
        .collect()
}

fn mask(requested: u32) -> u16 {
    choose_planes(requested).iter().fold(0, |m, &p| m | (1 << p))
}

// ── Full precision ───────────────────────────────────────────────────────────

#[test]
fn full_precision_is_lossless_lz4() {
    let batches = encode_batches(CodecKind::Lz4, 0.0, 256, 3);
    assert_eq!(roundtrip(CodecKind::Lz4, &batches, 16), input_values(0.0, 256, 3));
}

#[test]
fn full_precision_is_lossless_zstd() {
    let batches = encode_batches(CodecKind::Zstd, 100.0, 256, 2);
    assert_eq!(roundtrip(CodecKind::Zstd, &batches, 16), input_values(100.0, 256, 2));
}

#[test]
fn batch_larger_than_one_block_per_plane() {
    // 20 000 rows × 2 sensors = 40 000 bits = 5000 bytes per plane: 2 blocks.
    let batches = encode_batches(CodecKind::Lz4, 0.0, 20_000, 1);
    assert!(batches[0].planes.iter().all(|p| p.blocks.len() == 2));
    assert_eq!(roundtrip(CodecKind::Lz4, &batches, 16), input_values(0.0, 20_000, 1));
}

// ── Reduced precision ────────────────────────────────────────────────────────

#[test]
fn every_plane_count_masks_low_bits() {
    let batches = encode_batches(CodecKind::Zstd, 0.0, 128, 2);
    let input = input_values(0.0, 128, 2);
    for requested in 0..=20 {
        let mask = mask(requested);
        let got = roundtrip(CodecKind::Zstd, &batches, requested);
        assert_eq!(got.len(), input.len());
        for (g, v) in got.iter().zip(&input) {
            assert_eq!(g.to_bits(), v.to_bits() & mask, "requested {requested}");
        }
    }
}

#[test]
fn mandatory_planes_keep_magnitude() {
    let batches = encode_batches(CodecKind::Lz4, 0.0, 256, 1);
    let got = roundtrip(CodecKind::Lz4, &batches, 6);
    for (g, v) in got.iter().zip(input_values(0.0, 256, 1)) {
        // Sign and exponent intact: within a factor of two, same sign.
        assert_eq!(g.is_sign_negative(), v.is_sign_negative());
        assert!(g.to_f32() <= v.to_f32() && v.to_f32() < 2.0 * g.to_f32());
    }
}

#[test]
fn fewer_planes_send_fewer_bytes() {
    let batches: Vec<Arc<Batch>> = encode_batches(CodecKind::Lz4, 0.0, 256, 4)
        .into_iter()
        .map(Arc::new)
        .collect();
    let size = |requested| {
        build_response(&batches, &choose_planes(requested), "lz4", &sensor_names())
            .unwrap()
            .len()
    };
    assert!(size(6) < size(10));
    assert!(size(10) < size(16));
}

// ── Properties ───────────────────────────────────────────────────────────────

fn arb_rows() -> impl Strategy<Value = (usize, Vec<u16>)> {
    (1usize..4, 0usize..300).prop_flat_map(|(sensors, samples)| {
        (
            Just(sensors),
            proptest::collection::vec(any::<u16>(), sensors * samples),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arbitrary_bits_roundtrip((sensors, bits) in arb_rows(), requested in 0u32..=16) {
        let rows: Vec<Vec<f16>> = bits
            .chunks(sensors)
            .map(|c| c.iter().map(|&b| f16::from_bits(b)).collect())
            .collect();
        let planes = bps_encoder::encode_rows(&rows, sensors).unwrap();
        let chosen = choose_planes(requested);
        let selected: Vec<_> = chosen.iter().map(|&p| (p, planes[usize::from(p)].clone())).collect();
        let matrix = bps_decoder::decode_planes(&selected, rows.len(), sensors).unwrap();

        let mask = mask(requested);
        prop_assert_eq!(matrix.samples(), rows.len());
        for (g, b) in matrix.values().iter().zip(&bits) {
            prop_assert_eq!(g.to_bits(), b & mask);
        }
    }
}
