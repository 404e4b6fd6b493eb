use thiserror::Error;

/// Failures of a single feed connection. None of them end the feed task; they
/// are logged and followed by a reconnect.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("failed to encode client frame: {0}")]
    Encode(#[from] serde_json::Error),
}
