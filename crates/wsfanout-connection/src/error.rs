//! Error types for the connection engine

use wsfanout_config::Role;
use wsfanout_transports::TransportError;

use crate::codec::OpCode;

/// Close status for a generic protocol violation
pub const CLOSE_PROTOCOL_ERROR: u16 = 1002;
/// Close status for a payload that is not valid for its type
pub const CLOSE_INVALID_PAYLOAD: u16 = 1007;
/// Close status for a message over the configured size limit
pub const CLOSE_MESSAGE_TOO_BIG: u16 = 1009;

/// Wire protocol violations found while decoding inbound frames
///
/// Every codec error is fatal for the connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("reserved bits set ({0:#05b}) without a negotiated extension")]
    ReservedBits(u8),

    #[error("reserved opcode {0:#x}")]
    ReservedOpcode(u8),

    #[error("{0:?} control frame is fragmented")]
    FragmentedControl(OpCode),

    #[error("control frame payload of {0} bytes exceeds 125")]
    ControlTooLarge(u64),

    #[error("inbound frame masking violates the {0} role")]
    MaskMismatch(Role),

    #[error("64-bit payload length {0:#x} has its most significant bit set")]
    InvalidLength(u64),

    #[error("continuation frame without a started message")]
    OrphanContinuation,

    #[error("new data frame while a fragmented message is in progress")]
    InterleavedData,

    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooBig { size: u64, limit: usize },

    #[error("invalid close frame: {0}")]
    InvalidClose(String),

    #[error("close reason is not valid UTF-8")]
    InvalidCloseReason,
}

impl CodecError {
    /// Status code to send when failing the connection for this error
    pub fn close_status(&self) -> u16 {
        match self {
            CodecError::MessageTooBig { .. } => CLOSE_MESSAGE_TOO_BIG,
            CodecError::InvalidCloseReason => CLOSE_INVALID_PAYLOAD,
            _ => CLOSE_PROTOCOL_ERROR,
        }
    }
}

/// A payload routed to text observers was not valid UTF-8
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payload is not valid UTF-8: {source}")]
pub struct DecodeError {
    #[from]
    source: std::str::Utf8Error,
}

impl DecodeError {
    /// Length of the valid UTF-8 prefix
    pub fn valid_up_to(&self) -> usize {
        self.source.valid_up_to()
    }
}

/// Errors surfaced while building a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid connection configuration: {0}")]
    InvalidConfig(String),
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_status_mapping() {
        assert_eq!(CodecError::OrphanContinuation.close_status(), 1002);
        assert_eq!(
            CodecError::MessageTooBig { size: 10, limit: 4 }.close_status(),
            1009
        );
        assert_eq!(CodecError::InvalidCloseReason.close_status(), 1007);
    }

    #[test]
    fn test_decode_error_reports_prefix() {
        let bytes = [b'o', b'k', 0xff];
        let err: DecodeError = std::str::from_utf8(&bytes).unwrap_err().into();
        assert_eq!(err.valid_up_to(), 2);
    }
}
