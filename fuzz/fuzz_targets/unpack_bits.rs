#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    bytes: Vec<u8>,
    num_bits: u16,
}

// Fuzz target: bit unpacking must never read past the buffer, and a
// successful unpack must repack to the same prefix.
fuzz_target!(|input: FuzzInput| {
    let num_bits = usize::from(input.num_bits);
    let Ok(bits) = bps_wire::bitpack::unpack_bits(&input.bytes, num_bits) else {
        return;
    };
    let (repacked, len) = bps_wire::bitpack::pack_bits(bits);
    assert_eq!(len, num_bits);
    for (i, (a, b)) in repacked.iter().zip(&input.bytes).enumerate() {
        let used = u32::try_from((num_bits - i * 8).min(8)).unwrap();
        let keep = !0xFFu8.checked_shr(used).unwrap_or(0);
        assert_eq!(a & keep, b & keep);
    }
});
