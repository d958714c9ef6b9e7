//! Common types shared by all transports

pub mod error;
pub mod events;
pub(crate) mod stats;

pub use error::{TransportError, TransportResult};
pub use events::{EofHandler, ErrorHandler, ReadHandler, TransportEvents};
