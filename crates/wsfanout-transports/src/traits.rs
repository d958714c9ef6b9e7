// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport trait definitions
//!
//! A transport is a non-blocking byte stream driven by a single-threaded
//! event loop. It pushes inbound bytes, errors and end-of-stream to the
//! events bound to it, and accepts outbound writes without blocking.

use bytes::Bytes;

use crate::common::{TransportEvents, TransportResult};

/// Base transport trait - implemented by all transports
pub trait Transport {
    /// Install the read/error/EOF callbacks
    ///
    /// May be called once; a second call fails with
    /// [`TransportError::AlreadyBound`](crate::TransportError::AlreadyBound).
    fn bind(&self, events: TransportEvents) -> TransportResult<()>;

    /// Queue bytes for the peer without blocking
    fn write(&self, bytes: Bytes) -> TransportResult<()>;

    /// Flush queued writes and tear the stream down
    ///
    /// Completion is reported through the bound EOF (or error) callback.
    fn shutdown(&self) -> TransportResult<()>;

    /// Whether writes are still accepted
    fn is_open(&self) -> bool;

    /// Get transport name/type
    fn transport_type(&self) -> &str;
}

/// Statistics tracking
///
/// For monitoring transport throughput and health.
pub trait TransportStats {
    /// Get total bytes written
    fn bytes_sent(&self) -> u64;

    /// Get total bytes read
    fn bytes_received(&self) -> u64;

    /// Get number of completed writes
    fn writes(&self) -> u64;

    /// Get error count
    fn error_count(&self) -> u64;
}
