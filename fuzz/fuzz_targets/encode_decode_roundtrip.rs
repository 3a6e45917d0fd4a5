#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use bps_decoder::ResponseDecoder;
use bps_encoder::BatchEncoder;
use bps_server::response::build_response;
use bps_types::{choose_planes, f16};
use bps_wire::frame::LENGTH_PREFIX_SIZE;
use bps_wire::CodecKind;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sensors: u8,
    bits: Vec<u16>,
    planes: u8,
    zstd: bool,
}

// Fuzz target: rows → batch → response frame → decoded values.
//
// Every decoded value must equal its input with the unsent planes cleared.
fuzz_target!(|input: FuzzInput| {
    let sensors = usize::from(input.sensors % 4) + 1;
    let samples = input.bits.len() / sensors;
    if samples == 0 {
        return;
    }
    let kind = if input.zstd { CodecKind::Zstd } else { CodecKind::Lz4 };
    let rows: Vec<Vec<f16>> = input.bits[..samples * sensors]
        .chunks(sensors)
        .map(|c| c.iter().map(|&b| f16::from_bits(b)).collect())
        .collect();

    let encoder = BatchEncoder::new(kind.codec(), sensors, samples).unwrap();
    let batch = encoder.encode_batch(&rows, 0.0, 1.0).unwrap();
    let planes = choose_planes(u32::from(input.planes));
    let names: Vec<String> = (0..sensors).map(|i| format!("s{i}")).collect();
    let message = build_response(&[Arc::new(batch)], &planes, kind.name(), &names).unwrap();
    let decoded = ResponseDecoder::decode(&message[LENGTH_PREFIX_SIZE..]).unwrap();

    let mask = planes.iter().fold(0u16, |m, &p| m | (1 << p));
    assert_eq!(decoded.values.samples(), samples);
    for (got, want) in decoded.values.values().iter().zip(&input.bits) {
        assert_eq!(got.to_bits(), want & mask);
    }
});
