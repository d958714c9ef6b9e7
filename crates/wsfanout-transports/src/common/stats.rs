use std::cell::Cell;

/// Single-threaded counters backing `TransportStats`
#[derive(Debug, Default)]
pub(crate) struct Counters {
    bytes_sent: Cell<u64>,
    bytes_received: Cell<u64>,
    writes: Cell<u64>,
    errors: Cell<u64>,
}

impl Counters {
    pub(crate) fn record_write(&self, len: usize) {
        self.bytes_sent.set(self.bytes_sent.get() + len as u64);
        self.writes.set(self.writes.get() + 1);
    }

    pub(crate) fn record_read(&self, len: usize) {
        self.bytes_received.set(self.bytes_received.get() + len as u64);
    }

    pub(crate) fn record_error(&self) {
        self.errors.set(self.errors.get() + 1);
    }

    pub(crate) fn bytes_sent(&self) -> u64 {
        self.bytes_sent.get()
    }

    pub(crate) fn bytes_received(&self) -> u64 {
        self.bytes_received.get()
    }

    pub(crate) fn writes(&self) -> u64 {
        self.writes.get()
    }

    pub(crate) fn errors(&self) -> u64 {
        self.errors.get()
    }
}
