#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: client-side response decoder.
//
// Calls `ResponseDecoder::decode(data)` on an arbitrary frame body.
// Catches bugs in:
// - Header length and JSON parsing
// - Plane and segment validation
// - Declared block sizes vs actual payload length
// - Oversized block inflation
// - Bitplane reassembly
fuzz_target!(|data: &[u8]| {
    let _ = bps_decoder::ResponseDecoder::decode(data);
});
