//! Event callbacks a transport delivers to its single consumer

use std::cell::{Cell, RefCell};

use crate::common::{TransportError, TransportResult};

/// Called with every chunk of bytes read from the peer
pub type ReadHandler = Box<dyn FnMut(&[u8])>;
/// Called when the transport fails
pub type ErrorHandler = Box<dyn FnMut(&TransportError)>;
/// Called when the byte stream ends
pub type EofHandler = Box<dyn FnMut()>;

/// The three callbacks bound to a transport
///
/// A transport accepts exactly one set of events for its lifetime.
pub struct TransportEvents {
    pub on_readable: ReadHandler,
    pub on_error: ErrorHandler,
    pub on_eof: EofHandler,
}

impl TransportEvents {
    pub fn new(
        on_readable: impl FnMut(&[u8]) + 'static,
        on_error: impl FnMut(&TransportError) + 'static,
        on_eof: impl FnMut() + 'static,
    ) -> Self {
        Self {
            on_readable: Box::new(on_readable),
            on_error: Box::new(on_error),
            on_eof: Box::new(on_eof),
        }
    }
}

impl std::fmt::Debug for TransportEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportEvents").finish_non_exhaustive()
    }
}

/// Storage for bound events, safe against same-thread reentrancy
///
/// A handler is taken out of its slot while it runs, so a handler that
/// triggers its own event again is skipped instead of double-borrowing.
#[derive(Default)]
pub(crate) struct EventSlots {
    bound: Cell<bool>,
    readable: RefCell<Option<ReadHandler>>,
    error: RefCell<Option<ErrorHandler>>,
    eof: RefCell<Option<EofHandler>>,
}

fn with_handler<H: ?Sized>(slot: &RefCell<Option<Box<H>>>, call: impl FnOnce(&mut H)) -> bool {
    let taken = slot.borrow_mut().take();
    match taken {
        Some(mut handler) => {
            call(&mut *handler);
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                *slot = Some(handler);
            }
            true
        }
        None => false,
    }
}

impl EventSlots {
    pub(crate) fn install(&self, events: TransportEvents) -> TransportResult<()> {
        if self.bound.replace(true) {
            return Err(TransportError::AlreadyBound);
        }
        *self.readable.borrow_mut() = Some(events.on_readable);
        *self.error.borrow_mut() = Some(events.on_error);
        *self.eof.borrow_mut() = Some(events.on_eof);
        Ok(())
    }

    pub(crate) fn is_bound(&self) -> bool {
        self.bound.get()
    }

    pub(crate) fn fire_readable(&self, chunk: &[u8]) -> bool {
        with_handler(&self.readable, |handler| handler(chunk))
    }

    pub(crate) fn fire_error(&self, err: &TransportError) -> bool {
        with_handler(&self.error, |handler| handler(err))
    }

    pub(crate) fn fire_eof(&self) -> bool {
        with_handler(&self.eof, |handler| handler())
    }
}
