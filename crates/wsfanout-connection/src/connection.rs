// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection lifecycle controller
//!
//! Binds to a [`Transport`], feeds inbound chunks through the frame
//! assembler and dispatcher, answers control frames, and turns the first
//! transport error or end-of-stream into a single finish notification.
//!
//! ```text
//!   Open ──close()/peer close/protocol error──▶ Closing ──EOF/error──▶ Finished
//!     └──────────────────────EOF/error─────────────────────────────────▲
//! ```
//!
//! The transport's callbacks hold only a weak reference to the connection,
//! so dropping the last [`Connection`] handle releases it even while the
//! transport is still alive.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bytes::Bytes;
use tracing::{debug, info, trace, warn};
use wsfanout_config::{is_sendable_close_status, ConnectionConfig, DecodeErrorPolicy};
use wsfanout_transports::{Transport, TransportEvents};

use crate::assembler::{Control, FrameAssembler, Inbound};
use crate::codec::{CloseFrame, FrameCodec, OpCode, Rfc6455Codec};
use crate::dispatcher::MessageDispatcher;
use crate::error::{CodecError, ConnectionError, ConnectionResult, CLOSE_INVALID_PAYLOAD};
use crate::message::Message;
use crate::registry::CallbackRegistry;

/// Status used when echoing a close frame that carried no status
const CLOSE_NORMAL: u16 = 1000;

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Reading and writing
    Open,
    /// A close frame was written and transport shutdown requested
    Closing,
    /// Terminal: finish observers have run
    Finished,
}

/// Why a connection finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    TransportError(String),
    EndOfStream,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinishReason::TransportError(e) => write!(f, "transport error: {}", e),
            FinishReason::EndOfStream => write!(f, "end of stream"),
        }
    }
}

struct ConnectionInner {
    config: ConnectionConfig,
    transport: Box<dyn Transport>,
    assembler: RefCell<FrameAssembler<Rfc6455Codec>>,
    registry: CallbackRegistry,
    dispatcher: MessageDispatcher,
    state: Cell<LifecycleState>,
    bound: Cell<bool>,
    // Set once a local failure closed the connection; later input is ignored.
    input_closed: Cell<bool>,
    sent_close: RefCell<Option<CloseFrame>>,
    protocol_error: RefCell<Option<CodecError>>,
}

impl ConnectionInner {
    fn encode(&self, opcode: OpCode, payload: &[u8]) -> Bytes {
        self.assembler.borrow().codec().encode(opcode, payload)
    }

    fn on_readable(&self, chunk: &[u8]) {
        if self.state.get() == LifecycleState::Finished || self.input_closed.get() {
            trace!("[CONN] Ignoring {} bytes after close", chunk.len());
            return;
        }

        // Collected first so no borrow is held while observers run.
        let items: Vec<Result<Inbound, CodecError>> =
            self.assembler.borrow_mut().feed(chunk).collect();

        for item in items {
            if self.state.get() == LifecycleState::Finished || self.input_closed.get() {
                break;
            }
            match item {
                Ok(Inbound::Message(message)) => self.dispatch(&message),
                Ok(Inbound::Control(control)) => self.handle_control(control),
                Err(e) => {
                    let (status, reason) = (e.close_status(), e.to_string());
                    *self.protocol_error.borrow_mut() = Some(e);
                    self.fail(status, &reason);
                }
            }
        }
    }

    fn dispatch(&self, message: &Message) {
        if let Err(e) = self.dispatcher.dispatch(&self.registry, message) {
            match self.config.text.on_decode_error {
                DecodeErrorPolicy::FailConnection => {
                    warn!("[CONN] {}, failing connection", e);
                    self.fail(CLOSE_INVALID_PAYLOAD, "invalid UTF-8 payload");
                }
                _ => warn!("[CONN] {}, skipping text observers", e),
            }
        }
    }

    fn handle_control(&self, control: Control) {
        match control {
            Control::Ping(payload) => {
                if self.config.auto_pong && self.state.get() == LifecycleState::Open {
                    trace!("[CONN] Answering ping ({} bytes)", payload.len());
                    self.write(self.encode(OpCode::Pong, &payload));
                }
            }
            Control::Pong(payload) => trace!("[CONN] Pong received ({} bytes)", payload.len()),
            Control::Close(frame) => {
                // Nothing may follow the peer's close frame.
                self.input_closed.set(true);
                match self.state.get() {
                    LifecycleState::Open => {
                        let code = frame.as_ref().map_or(CLOSE_NORMAL, |f| f.code);
                        debug!("[CONN] Peer sent close ({:?}), echoing {}", frame, code);
                        self.begin_close(code, "");
                    }
                    LifecycleState::Closing => debug!("[CONN] Closing handshake complete"),
                    LifecycleState::Finished => {}
                }
            }
        }
    }

    fn write(&self, bytes: Bytes) {
        if let Err(e) = self.transport.write(bytes) {
            debug!("[CONN] Write dropped: {}", e);
        }
    }

    fn send(&self, message: Message) {
        if self.state.get() != LifecycleState::Open {
            debug!(
                "[CONN] Dropping {:?} message of {} bytes: connection is {:?}",
                message.kind(),
                message.len(),
                self.state.get()
            );
            return;
        }
        self.write(self.encode(message.kind().opcode(), message.payload()));
    }

    /// Write a close frame and request shutdown; false if already closing
    fn begin_close(&self, code: u16, reason: &str) -> bool {
        if self.state.get() != LifecycleState::Open {
            return false;
        }
        self.state.set(LifecycleState::Closing);
        info!("[CONN] Closing with status {}", code);

        *self.sent_close.borrow_mut() = Some(CloseFrame::new(code, reason));
        self.write(self.assembler.borrow().codec().encode_close(code, reason));
        if let Err(e) = self.transport.shutdown() {
            debug!("[CONN] Transport shutdown failed: {}", e);
        }
        true
    }

    fn fail(&self, code: u16, reason: &str) {
        self.input_closed.set(true);
        if !self.begin_close(code, reason) {
            // Already closing: make sure the transport is going down.
            if let Err(e) = self.transport.shutdown() {
                debug!("[CONN] Transport shutdown failed: {}", e);
            }
        }
    }

    fn finish(&self, reason: FinishReason) {
        if self.state.replace(LifecycleState::Finished) == LifecycleState::Finished {
            trace!("[CONN] Already finished, ignoring {}", reason);
            return;
        }
        info!("[CONN] Finished: {}", reason);

        if self.transport.is_open() {
            if let Err(e) = self.transport.shutdown() {
                debug!("[CONN] Transport shutdown failed: {}", e);
            }
        }
        self.registry.clear_subscriptions();
        self.registry.finish.fire();
    }
}

impl Drop for ConnectionInner {
    fn drop(&mut self) {
        if !self.bound.get() {
            return;
        }
        if self.state.get() != LifecycleState::Finished && self.transport.is_open() {
            debug!("[CONN] Dropped while {:?}, tearing down transport", self.state.get());
            if let Err(e) = self.transport.shutdown() {
                debug!("[CONN] Transport shutdown failed: {}", e);
            }
        }
    }
}

/// One end of an established WebSocket connection
///
/// Cloning yields another handle to the same connection. All callbacks run on
/// the thread that drives the transport.
///
/// ```
/// use wsfanout_config::ConnectionConfig;
/// use wsfanout_connection::Connection;
/// use wsfanout_transports::MemoryTransport;
///
/// let transport = MemoryTransport::new();
/// let conn = Connection::new(transport.clone(), ConnectionConfig::default())?;
/// conn.on_each_message(|text| println!("got {}", text))
///     .on_finish(|| println!("finished"));
///
/// transport.deliver(&[0x81, 0x02, b'h', b'i']);
/// conn.send("hello");
/// conn.close();
/// assert!(conn.is_finished());
/// # Ok::<(), wsfanout_connection::ConnectionError>(())
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Rc<ConnectionInner>,
}

impl Connection {
    /// Bind a connection to `transport`
    ///
    /// # Errors
    ///
    /// Fails if the configuration cannot drive a connection or the transport
    /// was already bound.
    pub fn new(transport: impl Transport + 'static, config: ConnectionConfig) -> ConnectionResult<Self> {
        if config.max_message_size == 0 {
            return Err(ConnectionError::InvalidConfig(
                "max_message_size must be greater than 0".to_string(),
            ));
        }
        if !is_sendable_close_status(config.close_status) {
            return Err(ConnectionError::InvalidConfig(format!(
                "close_status {} cannot be sent in a close frame",
                config.close_status
            )));
        }

        let inner = Rc::new(ConnectionInner {
            assembler: RefCell::new(FrameAssembler::new(Rfc6455Codec::from_config(&config))),
            dispatcher: MessageDispatcher::new(config.text),
            registry: CallbackRegistry::new(),
            transport: Box::new(transport),
            state: Cell::new(LifecycleState::Open),
            bound: Cell::new(false),
            input_closed: Cell::new(false),
            sent_close: RefCell::new(None),
            protocol_error: RefCell::new(None),
            config,
        });

        let on_read = Rc::downgrade(&inner);
        let on_error = Rc::downgrade(&inner);
        let on_eof = Rc::downgrade(&inner);
        inner.transport.bind(TransportEvents::new(
            move |chunk| {
                if let Some(inner) = on_read.upgrade() {
                    inner.on_readable(chunk);
                }
            },
            move |err| {
                if let Some(inner) = on_error.upgrade() {
                    inner.finish(FinishReason::TransportError(err.to_string()));
                }
            },
            move || {
                if let Some(inner) = on_eof.upgrade() {
                    inner.finish(FinishReason::EndOfStream);
                }
            },
        ))?;
        inner.bound.set(true);

        info!(
            "[CONN] Bound {} connection over {} transport",
            inner.config.role,
            inner.transport.transport_type()
        );
        Ok(Self { inner })
    }

    /// Send a message as a single data frame
    ///
    /// `&str`/`String` go out as text, byte buffers as binary. A no-op once
    /// the connection is closing or finished.
    pub fn send(&self, message: impl Into<Message>) {
        self.inner.send(message.into());
    }

    pub fn send_text(&self, text: impl Into<String>) {
        self.inner.send(Message::text(text));
    }

    pub fn send_binary(&self, payload: impl Into<Bytes>) {
        self.inner.send(Message::binary(payload));
    }

    /// Close with the configured status; repeated calls do nothing
    ///
    /// Finish observers run when the transport reports the shutdown, not from
    /// inside this call.
    pub fn close(&self) {
        self.inner.begin_close(self.inner.config.close_status, "");
    }

    /// Close with an explicit status and reason
    ///
    /// Statuses that may not appear on the wire are replaced by the
    /// configured `close_status`.
    pub fn close_with(&self, code: u16, reason: &str) {
        let code = if is_sendable_close_status(code) {
            code
        } else {
            warn!("[CONN] Close status {} is not sendable, using {}", code, self.inner.config.close_status);
            self.inner.config.close_status
        };
        self.inner.begin_close(code, reason);
    }

    /// Call `observer` with the decoded text of every message
    pub fn on_each_message(&self, observer: impl FnMut(&str) + 'static) -> &Self {
        if !self.is_finished() {
            self.inner.registry.each_message.subscribe(observer);
        }
        self
    }

    /// Call `observer` with the decoded text of the next message only
    pub fn on_next_message(&self, observer: impl FnMut(&str) + 'static) -> &Self {
        if !self.is_finished() {
            self.inner.registry.next_message.subscribe(observer);
        }
        self
    }

    /// Call `observer` with every raw message
    pub fn on_each_data(&self, observer: impl FnMut(&Message) + 'static) -> &Self {
        if !self.is_finished() {
            self.inner.registry.each_data.subscribe(observer);
        }
        self
    }

    /// Call `observer` with the next raw message only
    pub fn on_next_data(&self, observer: impl FnMut(&Message) + 'static) -> &Self {
        if !self.is_finished() {
            self.inner.registry.next_data.subscribe(observer);
        }
        self
    }

    /// Call `observer` once when the connection finishes
    ///
    /// Runs immediately if it already has.
    pub fn on_finish(&self, observer: impl FnOnce() + 'static) -> &Self {
        self.inner.registry.finish.subscribe(observer);
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state() == LifecycleState::Open
    }

    pub fn is_finished(&self) -> bool {
        self.state() == LifecycleState::Finished
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// The close frame this end wrote, if any
    pub fn sent_close(&self) -> Option<CloseFrame> {
        self.inner.sent_close.borrow().clone()
    }

    /// The inbound protocol violation that failed this connection, if any
    pub fn protocol_error(&self) -> Option<CodecError> {
        self.inner.protocol_error.borrow().clone()
    }

    pub fn transport_type(&self) -> &str {
        self.inner.transport.transport_type()
    }

    /// Non-owning handle, for use inside observers
    pub fn downgrade(&self) -> WeakConnection {
        WeakConnection {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("role", &self.inner.config.role)
            .field("state", &self.state())
            .field("transport", &self.transport_type())
            .finish()
    }
}

/// Weak handle to a [`Connection`]
///
/// Every operation is a no-op once the connection has been dropped.
#[derive(Clone, Default)]
pub struct WeakConnection {
    inner: Weak<ConnectionInner>,
}

impl WeakConnection {
    pub fn upgrade(&self) -> Option<Connection> {
        self.inner.upgrade().map(|inner| Connection { inner })
    }

    pub fn send(&self, message: impl Into<Message>) {
        if let Some(conn) = self.upgrade() {
            conn.send(message);
        }
    }

    pub fn close(&self) {
        if let Some(conn) = self.upgrade() {
            conn.close();
        }
    }

    pub fn close_with(&self, code: u16, reason: &str) {
        if let Some(conn) = self.upgrade() {
            conn.close_with(code, reason);
        }
    }

    /// State of the connection, `None` once it was dropped
    pub fn state(&self) -> Option<LifecycleState> {
        self.upgrade().map(|conn| conn.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use wsfanout_config::Role;
    use wsfanout_transports::{MemoryTransport, TransportError};

    use crate::codec::{write_frame, Frame};

    fn frame(opcode: OpCode, payload: &[u8]) -> BytesMut {
        let mut out = BytesMut::new();
        write_frame(&mut out, true, opcode, payload, None);
        out
    }

    /// Decode what a client connection wrote, from the server's side
    fn written_frames(transport: &MemoryTransport) -> Vec<Frame> {
        let mut codec = Rfc6455Codec::new(Role::Server, usize::MAX);
        for bytes in transport.written() {
            codec.append(&bytes);
        }
        std::iter::from_fn(|| codec.next_complete_frame().unwrap()).collect()
    }

    fn connect(config: ConnectionConfig) -> (Connection, MemoryTransport) {
        let transport = MemoryTransport::new();
        let conn = Connection::new(transport.clone(), config).unwrap();
        (conn, transport)
    }

    fn finish_counter(conn: &Connection) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        conn.on_finish(move || c.set(c.get() + 1));
        count
    }

    #[test]
    fn test_invalid_config_rejected() {
        let transport = MemoryTransport::new();
        assert!(Connection::new(transport.clone(), ConnectionConfig::default().with_max_message_size(0)).is_err());
        assert!(Connection::new(transport, ConnectionConfig::default().with_close_status(1006)).is_err());
    }

    #[test]
    fn test_second_connection_on_bound_transport_fails() {
        let (conn, transport) = connect(ConnectionConfig::default());
        assert!(matches!(
            Connection::new(transport.clone(), ConnectionConfig::default()),
            Err(ConnectionError::Transport(TransportError::AlreadyBound))
        ));
        assert!(conn.is_open());
        assert_eq!(transport.shutdown_count(), 0);
    }

    #[test]
    fn test_send_writes_masked_frames() {
        let (conn, transport) = connect(ConnectionConfig::default());
        conn.send("hi");
        conn.send(vec![1u8, 2]);

        assert_eq!(
            written_frames(&transport),
            vec![
                Frame::new(OpCode::Text, "hi"),
                Frame::new(OpCode::Binary, vec![1u8, 2]),
            ]
        );
    }

    #[test]
    fn test_close_twice_writes_one_frame_and_finishes_once() {
        let (conn, transport) = connect(ConnectionConfig::default());
        let finished = finish_counter(&conn);

        conn.close();
        conn.close();

        let frames = written_frames(&transport);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].opcode, OpCode::Close);
        assert_eq!(&frames[0].payload[..], &1000u16.to_be_bytes());
        assert_eq!(transport.shutdown_count(), 1);
        assert_eq!(finished.get(), 1);
        assert!(conn.is_finished());
    }

    #[test]
    fn test_close_does_not_finish_until_transport_reports() {
        let transport = MemoryTransport::new().with_eof_on_shutdown(false);
        let conn = Connection::new(transport.clone(), ConnectionConfig::default()).unwrap();
        let finished = finish_counter(&conn);

        conn.close();
        assert_eq!(conn.state(), LifecycleState::Closing);
        assert_eq!(finished.get(), 0);

        transport.signal_eof();
        transport.signal_error(TransportError::from("late"));
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn test_send_after_finish_is_silent() {
        let (conn, transport) = connect(ConnectionConfig::default());
        transport.signal_eof();
        assert!(conn.is_finished());

        conn.send("x");
        conn.close();
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_close_from_finish_observer() {
        let (conn, transport) = connect(ConnectionConfig::default());
        let weak = conn.downgrade();
        conn.on_finish(move || weak.close());

        transport.signal_error(TransportError::from("reset"));
        assert!(conn.is_finished());
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_ping_answered_with_pong() {
        let (conn, transport) = connect(ConnectionConfig::default());
        transport.deliver(&frame(OpCode::Ping, b"beat"));

        assert_eq!(written_frames(&transport), vec![Frame::new(OpCode::Pong, "beat")]);
        assert!(conn.is_open());
    }

    #[test]
    fn test_auto_pong_disabled() {
        let (_conn, transport) = connect(ConnectionConfig::default().with_auto_pong(false));
        transport.deliver(&frame(OpCode::Ping, b"beat"));
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_peer_close_is_echoed() {
        let (conn, transport) = connect(ConnectionConfig::default());
        let finished = finish_counter(&conn);

        transport.deliver(&frame(OpCode::Close, &3001u16.to_be_bytes()));

        let frames = written_frames(&transport);
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0].payload[..], &3001u16.to_be_bytes());
        assert_eq!(conn.sent_close(), Some(CloseFrame::new(3001, "")));
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn test_data_after_peer_close_is_ignored() {
        let (conn, transport) = connect(ConnectionConfig::default());
        let texts = Rc::new(RefCell::new(Vec::new()));
        let t = Rc::clone(&texts);
        conn.on_each_message(move |text| t.borrow_mut().push(text.to_string()));

        let mut chunk = frame(OpCode::Close, &1000u16.to_be_bytes());
        chunk.extend_from_slice(&frame(OpCode::Text, b"after-close"));
        transport.deliver(&chunk);

        assert!(texts.borrow().is_empty());
        assert!(conn.is_finished());
    }

    #[test]
    fn test_data_after_local_close_still_dispatched() {
        let transport = MemoryTransport::new().with_eof_on_shutdown(false);
        let conn = Connection::new(transport.clone(), ConnectionConfig::default()).unwrap();
        let texts = Rc::new(RefCell::new(Vec::new()));
        let t = Rc::clone(&texts);
        conn.on_each_message(move |text| t.borrow_mut().push(text.to_string()));

        conn.close();
        let mut chunk = frame(OpCode::Text, b"in-flight");
        chunk.extend_from_slice(&frame(OpCode::Close, &1000u16.to_be_bytes()));
        chunk.extend_from_slice(&frame(OpCode::Text, b"after-close"));
        transport.deliver(&chunk);

        assert_eq!(*texts.borrow(), vec!["in-flight"]);
        assert_eq!(conn.state(), LifecycleState::Closing);
    }

    #[test]
    fn test_finish_inside_data_observer_skips_text_observers() {
        let (conn, transport) = connect(ConnectionConfig::default());
        let texts = Rc::new(RefCell::new(Vec::new()));

        let driver = transport.clone();
        conn.on_each_data(move |_| driver.signal_error(TransportError::from("reset")));
        let t = Rc::clone(&texts);
        conn.on_each_message(move |text| t.borrow_mut().push(text.to_string()));

        transport.deliver(&frame(OpCode::Text, b"hi"));

        assert!(texts.borrow().is_empty());
        assert!(conn.is_finished());
    }

    #[test]
    fn test_protocol_error_fails_connection() {
        let (conn, transport) = connect(ConnectionConfig::default());
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        conn.on_each_data(move |_| s.set(s.get() + 1));

        // Text frame, then a frame with a reserved opcode, then another text frame.
        transport.deliver(&[0x81, 0x01, b'a', 0x83, 0x00, 0x81, 0x01, b'b']);

        assert_eq!(seen.get(), 1);
        assert_eq!(conn.sent_close().map(|c| c.code), Some(1002));
        assert_eq!(conn.protocol_error(), Some(CodecError::ReservedOpcode(3)));
        assert!(conn.is_finished());
    }

    #[test]
    fn test_peer_close_with_protocol_status_is_not_a_local_failure() {
        let (conn, transport) = connect(ConnectionConfig::default());
        transport.deliver(&frame(OpCode::Close, &1002u16.to_be_bytes()));

        assert_eq!(conn.sent_close().map(|c| c.code), Some(1002));
        assert_eq!(conn.protocol_error(), None);
    }

    #[test]
    fn test_oversized_message_closes_with_1009() {
        let (conn, transport) = connect(ConnectionConfig::default().with_max_message_size(4));
        transport.deliver(&frame(OpCode::Binary, &[0u8; 5]));
        assert_eq!(conn.sent_close().map(|c| c.code), Some(1009));
    }

    #[test]
    fn test_fail_connection_policy() {
        let config = ConnectionConfig::default()
            .with_decode_error_policy(DecodeErrorPolicy::FailConnection);
        let (conn, transport) = connect(config);
        conn.on_each_message(|_| {});

        transport.deliver(&frame(OpCode::Binary, &[0xFF]));
        assert_eq!(conn.sent_close().map(|c| c.code), Some(1007));
        assert!(conn.is_finished());
    }

    #[test]
    fn test_drop_tears_down_without_finish() {
        let transport = MemoryTransport::new();
        let finished = Rc::new(Cell::new(false));
        {
            let conn = Connection::new(transport.clone(), ConnectionConfig::default()).unwrap();
            let f = Rc::clone(&finished);
            conn.on_finish(move || f.set(true));
        }
        assert_eq!(transport.shutdown_count(), 1);
        assert!(!finished.get());
    }

    #[test]
    fn test_weak_handle_after_drop() {
        let (conn, _transport) = connect(ConnectionConfig::default());
        let weak = conn.downgrade();
        assert_eq!(weak.state(), Some(LifecycleState::Open));

        drop(conn);
        assert_eq!(weak.state(), None);
        weak.send("ignored");
    }

    #[test]
    fn test_close_with_unsendable_status_uses_default() {
        let (conn, _transport) = connect(ConnectionConfig::default().with_close_status(1001));
        conn.close_with(1005, "nope");
        assert_eq!(conn.sent_close(), Some(CloseFrame::new(1001, "nope")));
    }
}
