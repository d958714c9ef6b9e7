//! # wsfanout-transports
//!
//! Byte-stream transport boundary for wsfanout connections.
//!
//! A transport moves raw bytes. It knows nothing about frames or messages:
//! it pushes inbound chunks, end-of-stream and failures to the
//! [`TransportEvents`] bound to it, and accepts outbound writes without
//! blocking.
//!
//! ## Implementations
//!
//! - [`MemoryTransport`]: driven by hand, for tests and embedding
//! - [`TcpTransport`] (feature `tcp`): tokio TCP stream on a `LocalSet`
//!
//! ## Example
//!
//! ```
//! use wsfanout_transports::prelude::*;
//!
//! let transport = MemoryTransport::new();
//! transport.bind(TransportEvents::new(
//!     |chunk| println!("read {} bytes", chunk.len()),
//!     |err| eprintln!("transport failed: {}", err),
//!     || println!("end of stream"),
//! ))?;
//!
//! transport.deliver(b"\x81\x02hi");
//! transport.write(bytes::Bytes::from_static(b"\x88\x00"))?;
//! transport.shutdown()?;
//! # Ok::<(), TransportError>(())
//! ```

pub mod common;
pub mod memory;
pub mod traits;

#[cfg(feature = "tcp")]
pub mod tcp;

// Re-export commonly used types
pub use common::{
    EofHandler, ErrorHandler, ReadHandler, TransportError, TransportEvents, TransportResult,
};
pub use memory::MemoryTransport;
pub use traits::{Transport, TransportStats};

#[cfg(feature = "tcp")]
pub use tcp::TcpTransport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::common::*;
    pub use crate::memory::MemoryTransport;
    pub use crate::traits::*;

    #[cfg(feature = "tcp")]
    pub use crate::tcp::TcpTransport;
}
