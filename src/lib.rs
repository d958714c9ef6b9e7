//! # wsfanout - WebSocket frame reassembly and message fan-out
//!
//! Models one end of an already-handshaken WebSocket connection: a raw,
//! arbitrarily fragmented byte stream goes in, complete messages come out and
//! are fanned out to observers that fire once or on every message. The
//! connection's terminal lifecycle (graceful close or abrupt failure) is
//! reported exactly once.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! wsfanout = "0.1"  # Default: TCP transport included
//! ```
//!
//! ```rust
//! use wsfanout::prelude::*;
//!
//! let transport = MemoryTransport::new();
//! let conn = Connection::new(transport.clone(), ConnectionConfig::default())?;
//!
//! conn.on_each_data(|msg| println!("{:?}: {} bytes", msg.kind(), msg.len()))
//!     .on_next_message(|text| println!("first text: {}", text))
//!     .on_finish(|| println!("done"));
//!
//! // One text frame "hi" followed by one binary frame [1, 2]
//! transport.deliver(&[0x81, 0x02, b'h', b'i', 0x82, 0x02, 0x01, 0x02]);
//! conn.close();
//! # Ok::<(), ConnectionError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`tcp`** (default): [`TcpTransport`](transports::TcpTransport) over tokio
//! - **`file-logging`**: JSON log file per run in addition to console output
//!
//! ## Crates
//!
//! - [`config`]: TOML configuration with environment and CLI overrides
//! - [`observability`]: logging initialization and per-crate debug flags
//! - [`transports`]: the byte transport boundary
//! - [`connection`]: codec, assembler, registry, dispatcher and lifecycle

// Re-export foundation
pub use wsfanout_config as config;
pub use wsfanout_observability as observability;

// Re-export I/O layer
pub use wsfanout_transports as transports;

// Re-export core
pub use wsfanout_connection as connection;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{ConnectionConfig, DecodeErrorPolicy, Role, WsFanoutConfig};
    pub use crate::connection::{
        Connection, ConnectionError, LifecycleState, Message, MessageKind, WeakConnection,
    };
    pub use crate::transports::{MemoryTransport, Transport, TransportError, TransportEvents};

    #[cfg(feature = "tcp")]
    pub use crate::transports::TcpTransport;
}
