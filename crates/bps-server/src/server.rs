use std::net::SocketAddr;
use std::sync::Arc;

use bps_types::{choose_planes, QueryRequest};
use bps_wire::frame::{decode_length, LENGTH_PREFIX_SIZE, MAX_REQUEST_SIZE};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::response::build_response;
use crate::store::BatchStore;

/// Answers one query against the shared store.
///
/// Holds everything a response needs besides the batches themselves:
/// the codec name for `algo` and the sensor names for the header.
#[derive(Clone, Debug)]
pub struct QueryHandler {
    store: Arc<BatchStore>,
    algo: &'static str,
    sensor_names: Arc<[String]>,
}

impl QueryHandler {
    pub fn new(store: Arc<BatchStore>, algo: &'static str, sensor_names: Vec<String>) -> Self {
        Self {
            store,
            algo,
            sensor_names: sensor_names.into(),
        }
    }

    pub fn from_config(config: &ServerConfig, store: Arc<BatchStore>) -> Self {
        Self::new(store, config.codec.name(), config.sensor_names.clone())
    }

    pub fn store(&self) -> &Arc<BatchStore> {
        &self.store
    }

    /// Build the complete response message for `request`, or `None` when
    /// no cached batch overlaps the requested range.
    ///
    /// # Errors
    ///
    /// Propagates [`build_response`] errors.
    pub fn respond(&self, request: &QueryRequest) -> Result<Option<Vec<u8>>, ServerError> {
        let planes = choose_planes(request.planes);
        let batches = self.store.query_range(request.from, request.to);
        tracing::debug!(
            state = "select_batches",
            batches = batches.len(),
            planes = planes.len()
        );
        if batches.is_empty() {
            return Ok(None);
        }
        tracing::debug!(state = "build_response");
        build_response(&batches, &planes, self.algo, &self.sensor_names).map(Some)
    }
}

/// How a connection ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A response frame of this many bytes (prefix included) was written.
    Sent(usize),
    /// Nothing overlapped the range; closed without writing.
    NoData,
}

/// Serve one request on `stream`.
///
/// The connection walks `await_request → parse_request → select_batches
/// → build_response → send`, then the caller drops the stream. Any
/// error stops the walk; since the response is fully built before the
/// first byte is written, a build error never leaves a partial frame.
///
/// # Errors
///
/// - [`ServerError::Io`] if the request cannot be read or the response
///   cannot be written.
/// - [`ServerError::RequestTooLarge`] if the prefix exceeds
///   [`MAX_REQUEST_SIZE`].
/// - [`ServerError::MalformedRequest`] if the body is not a valid query.
pub async fn handle_connection<S>(
    stream: &mut S,
    handler: &QueryHandler,
) -> Result<Outcome, ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    tracing::debug!(state = "await_request");
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    stream.read_exact(&mut prefix).await?;
    let len = decode_length(prefix);
    if len > MAX_REQUEST_SIZE {
        return Err(ServerError::RequestTooLarge {
            len,
            limit: MAX_REQUEST_SIZE,
        });
    }
    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).await?;

    tracing::debug!(state = "parse_request", len);
    let request = QueryRequest::from_json(&body).map_err(ServerError::MalformedRequest)?;
    tracing::debug!(
        from = request.from,
        to = request.to,
        planes = request.planes,
        "query"
    );

    let Some(message) = handler.respond(&request)? else {
        tracing::debug!(state = "close", "no data in range");
        return Ok(Outcome::NoData);
    };

    tracing::debug!(state = "send", bytes = message.len());
    stream.write_all(&message).await?;
    stream.flush().await?;
    Ok(Outcome::Sent(message.len()))
}

/// TCP listener serving [`QueryHandler`] requests, one task per connection.
pub struct Server {
    listener: TcpListener,
    handler: QueryHandler,
}

impl Server {
    /// Bind `addr`. Use port 0 and [`local_addr`](Self::local_addr) in tests.
    ///
    /// # Errors
    ///
    /// [`ServerError::Io`] if the address cannot be bound.
    pub async fn bind(addr: &str, handler: QueryHandler) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        Ok(Self { listener, handler })
    }

    /// # Errors
    ///
    /// [`ServerError::Io`] if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever.
    ///
    /// Accept errors are logged and the loop continues; each connection
    /// runs in its own task and its errors never reach the loop.
    pub async fn serve(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let handler = self.handler.clone();
                    let span = tracing::debug_span!("connection", %peer);
                    tokio::spawn(serve_connection(stream, handler).instrument(span));
                }
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            }
        }
    }
}

async fn serve_connection(mut stream: TcpStream, handler: QueryHandler) {
    match handle_connection(&mut stream, &handler).await {
        Ok(Outcome::Sent(bytes)) => tracing::debug!(bytes, "response sent"),
        Ok(Outcome::NoData) => {}
        Err(e) => tracing::warn!(error = %e, "connection aborted"),
    }
    // `stream` drops here, closing the connection on every path.
}
