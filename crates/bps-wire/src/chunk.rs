/// Maximum uncompressed size of one block (4 KiB).
pub const BLOCK_SIZE: usize = 4096;

/// Number of blocks [`split`] produces for a buffer of `len` bytes.
#[must_use]
pub const fn block_count(len: usize) -> usize {
    len.div_ceil(BLOCK_SIZE)
}

/// Split a packed plane buffer into consecutive blocks of at most
/// [`BLOCK_SIZE`] bytes.
///
/// Blocks cover the buffer front to back with no gaps; only the last
/// may be shorter. An empty buffer yields no blocks.
///
/// ```text
///   10 000 bytes ──▶ [4096] [4096] [1808]
/// ```
#[must_use]
pub fn split(buf: &[u8]) -> Vec<&[u8]> {
    buf.chunks(BLOCK_SIZE).collect()
}

/// Concatenate blocks back into one buffer, in the order given.
///
/// The inverse of [`split`] as long as the caller preserves block order.
#[must_use]
pub fn join<B: AsRef<[u8]>>(blocks: &[B]) -> Vec<u8> {
    let total = blocks.iter().map(|b| b.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for block in blocks {
        out.extend_from_slice(block.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_buffer_has_no_blocks() {
        assert!(split(&[]).is_empty());
        assert_eq!(block_count(0), 0);
        assert!(join::<&[u8]>(&[]).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let buf = vec![7u8; BLOCK_SIZE * 2];
        let blocks = split(&buf);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == BLOCK_SIZE));
    }

    #[test]
    fn short_tail_block() {
        let buf: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let blocks = split(&buf);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].len(), 10_000 - 2 * BLOCK_SIZE);
        assert_eq!(join(&blocks), buf);
    }

    proptest! {
        #[test]
        fn split_size_law(len in 0usize..20_000) {
            let buf: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
            let blocks = split(&buf);
            prop_assert_eq!(blocks.len(), len.div_ceil(BLOCK_SIZE));
            prop_assert_eq!(blocks.len(), block_count(len));
            if let Some((last, rest)) = blocks.split_last() {
                prop_assert!(rest.iter().all(|b| b.len() == BLOCK_SIZE));
                prop_assert!(!last.is_empty() && last.len() <= BLOCK_SIZE);
            }
            prop_assert_eq!(join(&blocks), buf);
        }
    }
}
