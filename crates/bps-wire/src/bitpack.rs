use crate::error::WireError;

/// Number of bytes needed to hold `num_bits` packed bits.
///
/// | `num_bits` | bytes |
/// |------------|-------|
/// | 0          | 0     |
/// | 1          | 1     |
/// | 8          | 1     |
/// | 9          | 2     |
/// | 512        | 64    |
#[must_use]
pub const fn packed_len(num_bits: usize) -> usize {
    num_bits.div_ceil(8)
}

/// Appends bits to a byte buffer, most-significant bit first.
///
/// The first bit pushed lands in bit 7 of byte 0, the ninth in bit 7 of
/// byte 1, and so on. Unused low bits of the final byte stay zero. This
/// ordering is part of the wire format: every plane buffer in a response
/// payload is packed this way.
///
/// ```text
///   bits:  1 0 1 1 0 0 0 1 | 1
///   bytes: 0b1011_0001       0b1000_0000
/// ```
#[derive(Clone, Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    bits: usize,
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with room for `num_bits` bits.
    #[must_use]
    pub fn with_capacity(num_bits: usize) -> Self {
        Self {
            buf: Vec::with_capacity(packed_len(num_bits)),
            bits: 0,
        }
    }

    pub fn push(&mut self, bit: bool) {
        let offset = self.bits % 8;
        if offset == 0 {
            self.buf.push(0);
        }
        if bit {
            // Invariant: a byte was pushed above whenever offset == 0.
            if let Some(last) = self.buf.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bits += 1;
    }

    /// Number of bits pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Consume the writer, returning the packed bytes and the bit count.
    #[must_use]
    pub fn finish(self) -> (Vec<u8>, usize) {
        (self.buf, self.bits)
    }
}

/// Iterator over the first `len` bits of an MSB-first packed buffer.
///
/// Padding bits beyond `len` are never yielded.
#[derive(Clone, Debug)]
pub struct Bits<'a> {
    bytes: &'a [u8],
    pos: usize,
    len: usize,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.pos >= self.len {
            return None;
        }
        let byte = self.bytes[self.pos / 8];
        let bit = byte & (0x80 >> (self.pos % 8)) != 0;
        self.pos += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Bits<'_> {}

/// Unpack the first `num_bits` bits of `bytes`.
///
/// # Errors
///
/// [`WireError::BitCountOverflow`] if `bytes` holds fewer than
/// `num_bits` bits.
pub fn unpack_bits(bytes: &[u8], num_bits: usize) -> Result<Bits<'_>, WireError> {
    let available = bytes.len().saturating_mul(8);
    if num_bits > available {
        return Err(WireError::BitCountOverflow {
            bits: num_bits,
            available,
        });
    }
    Ok(Bits {
        bytes,
        pos: 0,
        len: num_bits,
    })
}

/// Pack a sequence of bits MSB-first.
pub fn pack_bits(bits: impl IntoIterator<Item = bool>) -> (Vec<u8>, usize) {
    let mut writer = BitWriter::new();
    for bit in bits {
        writer.push(bit);
    }
    writer.finish()
}
