//! In-memory transport
//!
//! A synchronous transport for tests and embedding: the owner drives it by
//! delivering chunks, end-of-stream and errors, and inspects what was written.
//! Clones share the same underlying stream, so one clone can be handed to a
//! consumer while another is kept as the driver.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::common::events::EventSlots;
use crate::common::stats::Counters;
use crate::common::{TransportError, TransportEvents, TransportResult};
use crate::traits::{Transport, TransportStats};

struct MemoryShared {
    events: EventSlots,
    written: RefCell<Vec<Bytes>>,
    open: Cell<bool>,
    shutdown_calls: Cell<usize>,
    eof_on_shutdown: Cell<bool>,
    delivering: Cell<usize>,
    pending_eof: Cell<bool>,
    counters: Counters,
}

/// In-memory [`Transport`] driven by its owner
#[derive(Clone)]
pub struct MemoryTransport {
    shared: Rc<MemoryShared>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    /// Create an open transport that reports EOF when shut down
    pub fn new() -> Self {
        Self {
            shared: Rc::new(MemoryShared {
                events: EventSlots::default(),
                written: RefCell::new(Vec::new()),
                open: Cell::new(true),
                shutdown_calls: Cell::new(0),
                eof_on_shutdown: Cell::new(true),
                delivering: Cell::new(0),
                pending_eof: Cell::new(false),
                counters: Counters::default(),
            }),
        }
    }

    /// Whether `shutdown()` is answered with an EOF signal (default: true)
    pub fn with_eof_on_shutdown(self, enabled: bool) -> Self {
        self.shared.eof_on_shutdown.set(enabled);
        self
    }

    /// Hand a chunk of inbound bytes to the bound read handler
    ///
    /// Always invokes the handler, even after EOF was signalled, so callers
    /// can check how the consumer treats late input. An EOF requested by a
    /// shutdown issued from inside the handler fires once it returns.
    pub fn deliver(&self, chunk: &[u8]) {
        if !self.shared.events.is_bound() {
            warn!("[MEM] Dropping {} bytes: no events bound", chunk.len());
            return;
        }
        trace!("[MEM] Delivering {} bytes", chunk.len());
        self.shared.counters.record_read(chunk.len());

        self.shared.delivering.set(self.shared.delivering.get() + 1);
        self.shared.events.fire_readable(chunk);
        self.shared.delivering.set(self.shared.delivering.get() - 1);

        if self.shared.delivering.get() == 0 && self.shared.pending_eof.replace(false) {
            self.shared.events.fire_eof();
        }
    }

    /// Deliver `bytes` split into chunks of at most `chunk_size` bytes
    pub fn deliver_chunked(&self, bytes: &[u8], chunk_size: usize) {
        for chunk in bytes.chunks(chunk_size.max(1)) {
            self.deliver(chunk);
        }
    }

    /// Report end-of-stream to the consumer
    pub fn signal_eof(&self) {
        debug!("[MEM] Signalling EOF");
        self.shared.events.fire_eof();
    }

    /// Report a transport failure to the consumer
    pub fn signal_error(&self, err: TransportError) {
        debug!("[MEM] Signalling error: {}", err);
        self.shared.counters.record_error();
        self.shared.events.fire_error(&err);
    }

    /// Every buffer written so far, in order
    pub fn written(&self) -> Vec<Bytes> {
        self.shared.written.borrow().clone()
    }

    /// Drain the written buffers
    pub fn take_written(&self) -> Vec<Bytes> {
        std::mem::take(&mut *self.shared.written.borrow_mut())
    }

    /// Number of times `shutdown()` was called
    pub fn shutdown_count(&self) -> usize {
        self.shared.shutdown_calls.get()
    }

    pub fn is_bound(&self) -> bool {
        self.shared.events.is_bound()
    }
}

impl Transport for MemoryTransport {
    fn bind(&self, events: TransportEvents) -> TransportResult<()> {
        self.shared.events.install(events)
    }

    fn write(&self, bytes: Bytes) -> TransportResult<()> {
        if !self.shared.open.get() {
            return Err(TransportError::ConnectionClosed);
        }
        self.shared.counters.record_write(bytes.len());
        self.shared.written.borrow_mut().push(bytes);
        Ok(())
    }

    fn shutdown(&self) -> TransportResult<()> {
        self.shared
            .shutdown_calls
            .set(self.shared.shutdown_calls.get() + 1);
        if !self.shared.open.replace(false) {
            return Ok(());
        }

        if self.shared.eof_on_shutdown.get() {
            if self.shared.delivering.get() > 0 {
                self.shared.pending_eof.set(true);
            } else {
                self.shared.events.fire_eof();
            }
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.shared.open.get()
    }

    fn transport_type(&self) -> &str {
        "memory"
    }
}

impl TransportStats for MemoryTransport {
    fn bytes_sent(&self) -> u64 {
        self.shared.counters.bytes_sent()
    }

    fn bytes_received(&self) -> u64 {
        self.shared.counters.bytes_received()
    }

    fn writes(&self) -> u64 {
        self.shared.counters.writes()
    }

    fn error_count(&self) -> u64 {
        self.shared.counters.errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(transport: &MemoryTransport) -> (Rc<RefCell<Vec<Vec<u8>>>>, Rc<Cell<usize>>) {
        let chunks = Rc::new(RefCell::new(Vec::new()));
        let eofs = Rc::new(Cell::new(0));
        let (c, e) = (Rc::clone(&chunks), Rc::clone(&eofs));
        transport
            .bind(TransportEvents::new(
                move |chunk| c.borrow_mut().push(chunk.to_vec()),
                |_| {},
                move || e.set(e.get() + 1),
            ))
            .unwrap();
        (chunks, eofs)
    }

    #[test]
    fn test_deliver_reaches_read_handler() {
        let transport = MemoryTransport::new();
        let (chunks, _) = recording(&transport);

        transport.deliver_chunked(b"abcde", 2);

        assert_eq!(*chunks.borrow(), vec![b"ab".to_vec(), b"cd".to_vec(), b"e".to_vec()]);
        assert_eq!(transport.bytes_received(), 5);
    }

    #[test]
    fn test_write_after_shutdown_fails() {
        let transport = MemoryTransport::new();
        let (_, eofs) = recording(&transport);

        transport.write(Bytes::from_static(b"x")).unwrap();
        transport.shutdown().unwrap();
        transport.shutdown().unwrap();

        assert!(matches!(
            transport.write(Bytes::from_static(b"y")),
            Err(TransportError::ConnectionClosed)
        ));
        assert_eq!(transport.written(), vec![Bytes::from_static(b"x")]);
        assert_eq!(transport.shutdown_count(), 2);
        assert_eq!(eofs.get(), 1);
    }

    #[test]
    fn test_shutdown_without_eof() {
        let transport = MemoryTransport::new().with_eof_on_shutdown(false);
        let (_, eofs) = recording(&transport);

        transport.shutdown().unwrap();
        assert_eq!(eofs.get(), 0);
        assert!(!transport.is_open());
    }

    #[test]
    fn test_shutdown_inside_read_handler_defers_eof() {
        let transport = MemoryTransport::new();
        let driver = transport.clone();
        let order = Rc::new(RefCell::new(Vec::new()));

        let (o1, o2) = (Rc::clone(&order), Rc::clone(&order));
        let inner = transport.clone();
        transport
            .bind(TransportEvents::new(
                move |_| {
                    inner.shutdown().unwrap();
                    o1.borrow_mut().push("read-done");
                },
                |_| {},
                move || o2.borrow_mut().push("eof"),
            ))
            .unwrap();

        driver.deliver(b"x");
        assert_eq!(*order.borrow(), vec!["read-done", "eof"]);
    }

    #[test]
    fn test_signal_error_counts() {
        let transport = MemoryTransport::new();
        let errors = Rc::new(Cell::new(0));
        let e = Rc::clone(&errors);
        transport
            .bind(TransportEvents::new(|_| {}, move |_| e.set(e.get() + 1), || {}))
            .unwrap();

        transport.signal_error(TransportError::from("reset"));
        assert_eq!(errors.get(), 1);
        assert_eq!(transport.error_count(), 1);
    }
}
