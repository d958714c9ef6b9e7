//! Common error types for all transports

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport-agnostic error type
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect client socket
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    /// Failed to queue or write outbound bytes
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Write or shutdown attempted after the transport was torn down
    #[error("Connection closed")]
    ConnectionClosed,

    /// Event handlers may be bound only once
    #[error("Transport events are already bound")]
    AlreadyBound,

    /// Transport has no stream to drive
    #[error("Transport is not running")]
    NotRunning,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<String> for TransportError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for TransportError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}
