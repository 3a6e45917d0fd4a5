use std::time::{SystemTime, UNIX_EPOCH};

use bps_types::QueryRequest;
use bps_wire::frame::{self, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE};
use bps_wire::WireError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::decoder::{DecodedResponse, ResponseDecoder};
use crate::error::DecodeError;

/// Query client. Opens one connection per request.
///
/// ```rust,no_run
/// use bps_decoder::Client;
///
/// # async fn run() -> Result<(), bps_decoder::DecodeError> {
/// let client = Client::new("127.0.0.1:50007");
/// match client.fetch_recent(60.0, 12).await? {
///     Some(response) => println!("{} samples", response.samples()),
///     None => println!("no data in range"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    addr: String,
}

impl Client {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send `request` and decode the reply.
    ///
    /// Returns `Ok(None)` when the server closes without sending
    /// anything, which is how it reports an empty time range.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Io`] if the connection or write fails.
    /// - [`DecodeError::ConnectionClosed`] if the reply stops mid-message.
    /// - [`DecodeError::Wire`] if the reply announces more than
    ///   [`MAX_FRAME_SIZE`] bytes.
    /// - Anything [`ResponseDecoder::decode`] returns.
    pub async fn fetch(&self, request: &QueryRequest) -> Result<Option<DecodedResponse>, DecodeError> {
        let body = request.to_json().map_err(DecodeError::EncodeRequest)?;
        let mut message = Vec::with_capacity(LENGTH_PREFIX_SIZE + body.len());
        frame::write_prefixed(&mut message, &body)?;

        let mut stream = TcpStream::connect(&self.addr).await?;
        stream.write_all(&message).await?;
        tracing::debug!(addr = %self.addr, from = request.from, to = request.to, planes = request.planes, "request sent");

        let Some(frame) = read_response(&mut stream).await? else {
            tracing::debug!(addr = %self.addr, "no data in range");
            return Ok(None);
        };
        tracing::debug!(addr = %self.addr, frame_bytes = frame.len(), "response received");
        ResponseDecoder::decode(&frame).map(Some)
    }

    /// Fetch the last `seconds_back` seconds, `[now - seconds_back, now]`.
    ///
    /// # Errors
    ///
    /// Same as [`fetch`](Self::fetch).
    pub async fn fetch_recent(
        &self,
        seconds_back: f64,
        planes: u32,
    ) -> Result<Option<DecodedResponse>, DecodeError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        let request = QueryRequest::new(now - seconds_back, now).with_planes(planes);
        self.fetch(&request).await
    }
}

/// Read one length-prefixed response frame, prefix stripped.
///
/// A reader that ends before yielding any byte produces `Ok(None)`.
///
/// # Errors
///
/// - [`DecodeError::ConnectionClosed`] if the reader ends inside the
///   prefix or the frame.
/// - [`DecodeError::Wire`] if the prefix exceeds [`MAX_FRAME_SIZE`].
/// - [`DecodeError::Io`] on read failure.
pub async fn read_response<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Vec<u8>>, DecodeError> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    match read_full(reader, &mut prefix).await? {
        0 => return Ok(None),
        LENGTH_PREFIX_SIZE => {}
        received => {
            return Err(DecodeError::ConnectionClosed {
                expected: LENGTH_PREFIX_SIZE,
                received,
            });
        }
    }

    let len = frame::decode_length(prefix);
    if len > MAX_FRAME_SIZE {
        return Err(WireError::FrameTooLarge {
            len,
            limit: MAX_FRAME_SIZE,
        }
        .into());
    }
    let mut body = vec![0u8; len];
    let received = read_full(reader, &mut body).await?;
    if received < len {
        return Err(DecodeError::ConnectionClosed {
            expected: len,
            received,
        });
    }
    Ok(Some(body))
}

/// Fill `buf` until it is full or the reader hits EOF; returns bytes read.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn empty_stream_is_none() {
        let mut reader: &[u8] = &[];
        assert!(read_response(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reads_one_frame() {
        let mut reader: &[u8] = &[0, 0, 0, 3, b'a', b'b', b'c', b'x'];
        let frame = read_response(&mut reader).await.unwrap().unwrap();
        assert_eq!(frame, b"abc");
    }

    #[tokio::test]
    async fn partial_prefix_is_connection_closed() {
        let mut reader: &[u8] = &[0, 0];
        let err = read_response(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ConnectionClosed { expected: 4, received: 2 }
        ));
    }

    #[tokio::test]
    async fn partial_frame_is_connection_closed() {
        let mut reader: &[u8] = &[0, 0, 0, 10, 1, 2, 3];
        let err = read_response(&mut reader).await.unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ConnectionClosed { expected: 10, received: 3 }
        ));
    }

    #[tokio::test]
    async fn oversized_prefix_is_rejected_before_reading() {
        let mut reader: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF];
        let err = read_response(&mut reader).await.unwrap_err();
        assert!(matches!(err, DecodeError::Wire(WireError::FrameTooLarge { .. })));
    }

    #[tokio::test]
    async fn close_without_reply_is_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut prefix = [0u8; 4];
            socket.read_exact(&mut prefix).await.unwrap();
            let mut body = vec![0u8; frame::decode_length(prefix)];
            socket.read_exact(&mut body).await.unwrap();
            QueryRequest::from_json(&body).unwrap()
        });

        let client = Client::new(addr.to_string());
        let request = QueryRequest::new(1.0, 2.0).with_planes(9);
        assert!(client.fetch(&request).await.unwrap().is_none());
        assert_eq!(server.await.unwrap(), request);
    }

    #[tokio::test]
    async fn connect_failure_is_io() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = Client::new(addr.to_string())
            .fetch(&QueryRequest::new(0.0, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
