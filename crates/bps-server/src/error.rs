use bps_encoder::EncodeError;
use bps_wire::WireError;

/// Errors raised while configuring the server or serving one connection.
///
/// Connection-level errors never reach the client as a message: the
/// handler logs them at `warn` and closes the socket.
///
/// ```text
///   ServerError
///   ├── MalformedRequest(serde_json::Error) ← body is not a valid query
///   ├── RequestTooLarge                     ← length prefix above 64 KiB
///   ├── InvalidConfig                       ← ServerConfig::validate failed
///   ├── Header(serde_json::Error)           ← response header failed to serialize
///   ├── Encode(EncodeError)                 ← batch encoder could not be built
///   ├── Wire(WireError)                     ← response frame too large
///   └── Io(std::io::Error)                  ← bind, accept, read or write failed
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("malformed request: {0}")]
    MalformedRequest(#[source] serde_json::Error),

    #[error("request length {len} exceeds limit {limit}")]
    RequestTooLarge { len: usize, limit: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot serialize response header: {0}")]
    Header(#[source] serde_json::Error),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
