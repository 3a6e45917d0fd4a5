use std::io::Write;

use crate::error::WireError;

/// Every length on the wire is a 4-byte big-endian `u32`.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Upper bound on a whole response frame a reader will accept (256 MiB).
pub const MAX_FRAME_SIZE: usize = 256 * 1024 * 1024;

/// Upper bound on a request body (64 KiB). Requests are tiny JSON objects.
pub const MAX_REQUEST_SIZE: usize = 64 * 1024;

/// Encode a length as a 4-byte big-endian prefix.
///
/// # Errors
///
/// Returns [`WireError::FrameTooLarge`] if `len` does not fit in a `u32`.
pub fn encode_length(len: usize) -> Result<[u8; LENGTH_PREFIX_SIZE], WireError> {
    let len32 = u32::try_from(len).map_err(|_| WireError::FrameTooLarge {
        len,
        limit: u32::MAX as usize,
    })?;
    Ok(len32.to_be_bytes())
}

/// Decode a 4-byte big-endian prefix into a length.
#[must_use]
pub fn decode_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> usize {
    u32::from_be_bytes(prefix) as usize
}

/// Write `body` preceded by its length prefix.
///
/// # Returns
///
/// Total number of bytes written (prefix + body).
///
/// # Errors
///
/// [`WireError::FrameTooLarge`] if the body length overflows `u32`, or
/// [`WireError::Io`] from the writer.
pub fn write_prefixed(w: &mut impl Write, body: &[u8]) -> Result<usize, WireError> {
    w.write_all(&encode_length(body.len())?)?;
    w.write_all(body)?;
    Ok(LENGTH_PREFIX_SIZE + body.len())
}

/// Read one length-prefixed body from the front of `buf`.
///
/// # Returns
///
/// `(body, bytes_consumed)`.
///
/// # Errors
///
/// - [`WireError::UnexpectedEof`] if the prefix or body is incomplete.
/// - [`WireError::FrameTooLarge`] if the prefix exceeds `limit`.
pub fn read_prefixed(buf: &[u8], limit: usize) -> Result<(&[u8], usize), WireError> {
    let prefix: [u8; LENGTH_PREFIX_SIZE] = buf
        .get(..LENGTH_PREFIX_SIZE)
        .and_then(|p| p.try_into().ok())
        .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
    let len = decode_length(prefix);
    if len > limit {
        return Err(WireError::FrameTooLarge { len, limit });
    }

    let end = LENGTH_PREFIX_SIZE
        .checked_add(len)
        .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
    let body = buf
        .get(LENGTH_PREFIX_SIZE..end)
        .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;
    Ok((body, end))
}

/// Response frame — everything after the outer length prefix.
///
/// ```text
/// ┌────────────────────────────────────────────────────────┐
/// │ frame_len    (u32 BE)  ← length of everything below    │
/// ├────────────────────────────────────────────────────────┤
/// │ header_len   (u32 BE)                                  │
/// │ header       [header_len bytes, UTF-8 JSON]            │
/// │ payload      [all compressed blocks, concatenated:     │
/// │               segment-major, then ascending plane,     │
/// │               then block order within the plane]       │
/// └────────────────────────────────────────────────────────┘
/// ```
///
/// The payload carries no per-block framing; block boundaries come from
/// the header's `plane_block_sizes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseFrame<'a> {
    pub header: &'a [u8],
    pub payload: &'a [u8],
}

impl<'a> ResponseFrame<'a> {
    /// Parse a frame body (the outer `frame_len` prefix already stripped).
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if the header length prefix or the
    /// header bytes are truncated.
    pub fn read_from(frame: &'a [u8]) -> Result<Self, WireError> {
        let (header, consumed) = read_prefixed(frame, frame.len())?;
        Ok(Self {
            header,
            payload: &frame[consumed..],
        })
    }

    /// Serialize a complete response message, outer prefix included.
    ///
    /// Blocks are appended in the order given; the caller is responsible
    /// for the segment → plane → block ordering.
    ///
    /// # Errors
    ///
    /// [`WireError::FrameTooLarge`] if the frame length overflows `u32`.
    pub fn encode<'b>(
        header: &[u8],
        blocks: impl IntoIterator<Item = &'b [u8]>,
    ) -> Result<Vec<u8>, WireError> {
        let blocks: Vec<&[u8]> = blocks.into_iter().collect();
        let payload_len: usize = blocks.iter().map(|b| b.len()).sum();
        let frame_len = LENGTH_PREFIX_SIZE + header.len() + payload_len;

        let mut out = Vec::with_capacity(LENGTH_PREFIX_SIZE + frame_len);
        out.extend_from_slice(&encode_length(frame_len)?);
        write_prefixed(&mut out, header)?;
        for block in blocks {
            out.extend_from_slice(block);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_is_big_endian() {
        assert_eq!(encode_length(0x0102_0304).unwrap(), [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(decode_length([0x00, 0x00, 0x01, 0x00]), 256);
    }

    #[test]
    fn write_then_read_prefixed() {
        let mut buf = Vec::new();
        let written = write_prefixed(&mut buf, b"{\"to\":1}").unwrap();
        assert_eq!(written, 12);
        let (body, consumed) = read_prefixed(&buf, MAX_REQUEST_SIZE).unwrap();
        assert_eq!(body, b"{\"to\":1}");
        assert_eq!(consumed, 12);
    }

    #[test]
    fn read_prefixed_rejects_short_prefix() {
        let result = read_prefixed(&[0x00, 0x01], MAX_REQUEST_SIZE);
        assert!(matches!(result, Err(WireError::UnexpectedEof { offset: 2 })));
    }

    #[test]
    fn read_prefixed_rejects_truncated_body() {
        let buf = [0x00, 0x00, 0x00, 0x05, b'a', b'b'];
        let result = read_prefixed(&buf, MAX_REQUEST_SIZE);
        assert!(matches!(result, Err(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn read_prefixed_enforces_limit() {
        let buf = [0x00, 0x01, 0x00, 0x01];
        let result = read_prefixed(&buf, MAX_REQUEST_SIZE);
        assert!(matches!(
            result,
            Err(WireError::FrameTooLarge { len: 65_537, limit: MAX_REQUEST_SIZE })
        ));
    }

    #[test]
    fn response_frame_layout() {
        let header = br#"{"algo":"lz4"}"#;
        let blocks: [&[u8]; 2] = [b"abc", b"de"];
        let wire = ResponseFrame::encode(header, blocks).unwrap();

        let frame_len = decode_length(wire[..4].try_into().unwrap());
        assert_eq!(frame_len, wire.len() - 4);
        assert_eq!(frame_len, 4 + header.len() + 5);

        let frame = ResponseFrame::read_from(&wire[4..]).unwrap();
        assert_eq!(frame.header, header);
        assert_eq!(frame.payload, b"abcde");
    }

    #[test]
    fn response_frame_without_blocks() {
        let wire = ResponseFrame::encode(b"{}", std::iter::empty()).unwrap();
        let frame = ResponseFrame::read_from(&wire[4..]).unwrap();
        assert_eq!(frame.header, b"{}");
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn response_frame_rejects_truncated_header() {
        let frame = [0x00, 0x00, 0x00, 0x10, b'{'];
        assert!(ResponseFrame::read_from(&frame).is_err());
    }
}
