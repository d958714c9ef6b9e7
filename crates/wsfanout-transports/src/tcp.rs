// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! TCP transport over an established (already handshaken) stream
//!
//! Reads and writes run as local tasks, so a `TcpTransport` must be bound
//! from inside a [`tokio::task::LocalSet`]. Bound callbacks run on that
//! local set's thread, which keeps every consumer single-threaded.

use std::cell::{Cell, RefCell};
use std::net::SocketAddr;
use std::rc::Rc;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};
use wsfanout_config::TransportSettings;

use crate::common::events::EventSlots;
use crate::common::stats::Counters;
use crate::common::{TransportError, TransportEvents, TransportResult};
use crate::traits::{Transport, TransportStats};

enum WriteCommand {
    Data(Bytes),
    Shutdown,
}

struct TcpShared {
    events: EventSlots,
    open: Cell<bool>,
    commands: RefCell<Option<mpsc::UnboundedSender<WriteCommand>>>,
    stop_reading: Notify,
    counters: Counters,
}

/// Non-blocking TCP [`Transport`]
pub struct TcpTransport {
    settings: TransportSettings,
    peer: Option<SocketAddr>,
    stream: RefCell<Option<TcpStream>>,
    shared: Rc<TcpShared>,
    reader: RefCell<Option<JoinHandle<()>>>,
    // Detached on drop so queued writes still reach the peer.
    writer: RefCell<Option<JoinHandle<()>>>,
}

impl TcpTransport {
    /// Connect to `settings.address`
    pub async fn connect(settings: TransportSettings) -> TransportResult<Self> {
        let stream = TcpStream::connect(&settings.address)
            .await
            .map_err(|e| TransportError::ConnectFailed(format!("{}: {}", settings.address, e)))?;
        info!("🦀 [TCP] Connected to {}", settings.address);
        Self::from_stream(stream, settings)
    }

    /// Wrap a stream whose upgrade handshake has already completed
    pub fn from_stream(stream: TcpStream, settings: TransportSettings) -> TransportResult<Self> {
        stream.set_nodelay(settings.nodelay)?;
        let peer = stream.peer_addr().ok();

        Ok(Self {
            settings,
            peer,
            stream: RefCell::new(Some(stream)),
            shared: Rc::new(TcpShared {
                events: EventSlots::default(),
                open: Cell::new(true),
                commands: RefCell::new(None),
                stop_reading: Notify::new(),
                counters: Counters::default(),
            }),
            reader: RefCell::new(None),
            writer: RefCell::new(None),
        })
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl Transport for TcpTransport {
    fn bind(&self, events: TransportEvents) -> TransportResult<()> {
        self.shared.events.install(events)?;
        let stream = self
            .stream
            .borrow_mut()
            .take()
            .ok_or(TransportError::NotRunning)?;

        let (reader, writer) = stream.into_split();
        let (tx, rx) = mpsc::unbounded_channel();
        *self.shared.commands.borrow_mut() = Some(tx);

        let read_task = tokio::task::spawn_local(read_loop(
            reader,
            Rc::clone(&self.shared),
            self.settings.read_buffer_size.max(1),
        ));
        let write_task = tokio::task::spawn_local(write_loop(writer, rx, Rc::clone(&self.shared)));
        *self.reader.borrow_mut() = Some(read_task);
        *self.writer.borrow_mut() = Some(write_task);

        debug!("[TCP] Bound to peer {:?}", self.peer);
        Ok(())
    }

    fn write(&self, bytes: Bytes) -> TransportResult<()> {
        if !self.shared.open.get() {
            return Err(TransportError::ConnectionClosed);
        }
        let commands = self.shared.commands.borrow();
        let tx = commands.as_ref().ok_or(TransportError::NotRunning)?;
        tx.send(WriteCommand::Data(bytes))
            .map_err(|_| TransportError::SendFailed("writer task has stopped".to_string()))
    }

    fn shutdown(&self) -> TransportResult<()> {
        if !self.shared.open.replace(false) {
            return Ok(());
        }
        match self.shared.commands.borrow_mut().take() {
            Some(tx) => {
                if tx.send(WriteCommand::Shutdown).is_err() {
                    self.shared.stop_reading.notify_one();
                }
            }
            // Never bound: nothing is running, drop the stream.
            None => {
                self.stream.borrow_mut().take();
            }
        }
        debug!("[TCP] Shutdown requested");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.shared.open.get()
    }

    fn transport_type(&self) -> &str {
        "tcp"
    }
}

impl TransportStats for TcpTransport {
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

impl Drop for TcpTransport {
    fn drop(&mut self) {
        // Queues a shutdown behind any pending writes; no-op if already requested.
        if let Err(e) = self.shutdown() {
            debug!("[TCP] Shutdown on drop failed: {}", e);
        }
        if let Some(task) = self.reader.borrow_mut().take() {
            task.abort();
        }
        if self.writer.borrow_mut().take().is_some() {
            trace!("[TCP] Writer detached to flush queued frames");
        }
    }
}

async fn read_loop(mut reader: OwnedReadHalf, shared: Rc<TcpShared>, buffer_size: usize) {
    let mut buffer = vec![0u8; buffer_size];
    loop {
        tokio::select! {
            _ = shared.stop_reading.notified() => {
                debug!("[TCP] Reader stopped after local shutdown");
                shared.events.fire_eof();
                return;
            }
            result = reader.read(&mut buffer) => match result {
                Ok(0) => {
                    debug!("[TCP] Peer closed the stream");
                    shared.open.set(false);
                    shared.events.fire_eof();
                    return;
                }
                Ok(n) => {
                    trace!("[TCP] Read {} bytes", n);
                    shared.counters.record_read(n);
                    shared.events.fire_readable(&buffer[..n]);
                }
                Err(e) => {
                    warn!("[TCP] Read failed: {}", e);
                    shared.open.set(false);
                    shared.counters.record_error();
                    shared.events.fire_error(&TransportError::Io(e));
                    return;
                }
            }
        }
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    mut commands: mpsc::UnboundedReceiver<WriteCommand>,
    shared: Rc<TcpShared>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            WriteCommand::Data(bytes) => {
                if let Err(e) = writer.write_all(&bytes).await {
                    warn!("[TCP] Write failed: {}", e);
                    shared.open.set(false);
                    shared.counters.record_error();
                    shared.events.fire_error(&TransportError::Io(e));
                    return;
                }
                shared.counters.record_write(bytes.len());
            }
            WriteCommand::Shutdown => {
                if let Err(e) = writer.shutdown().await {
                    debug!("[TCP] Write-half shutdown failed: {}", e);
                }
                shared.stop_reading.notify_one();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::task::LocalSet;

    #[tokio::test]
    async fn test_write_reaches_peer_and_shutdown_reports_eof() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        LocalSet::new()
            .run_until(async move {
                let transport = TcpTransport::connect(TransportSettings::new(addr.to_string()))
                    .await
                    .unwrap();
                let (mut peer, _) = listener.accept().await.unwrap();

                let eof = Rc::new(Notify::new());
                let eof_signal = Rc::clone(&eof);
                transport
                    .bind(TransportEvents::new(|_| {}, |_| {}, move || eof_signal.notify_one()))
                    .unwrap();

                transport.write(Bytes::from_static(b"hello")).unwrap();
                transport.shutdown().unwrap();
                assert!(!transport.is_open());

                let mut received = Vec::new();
                peer.read_to_end(&mut received).await.unwrap();
                assert_eq!(received, b"hello");

                eof.notified().await;
                assert_eq!(transport.bytes_sent(), 5);
            })
            .await;
    }

    #[tokio::test]
    async fn test_drop_flushes_queued_writes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        LocalSet::new()
            .run_until(async move {
                let transport = TcpTransport::connect(TransportSettings::new(addr.to_string()))
                    .await
                    .unwrap();
                let (mut peer, _) = listener.accept().await.unwrap();
                transport
                    .bind(TransportEvents::new(|_| {}, |_| {}, || {}))
                    .unwrap();

                transport.write(Bytes::from_static(b"queued")).unwrap();
                drop(transport);

                let mut received = Vec::new();
                peer.read_to_end(&mut received).await.unwrap();
                assert_eq!(received, b"queued");
            })
            .await;
    }

    #[tokio::test]
    async fn test_second_bind_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        LocalSet::new()
            .run_until(async move {
                let transport = TcpTransport::connect(TransportSettings::new(addr.to_string()))
                    .await
                    .unwrap();
                transport
                    .bind(TransportEvents::new(|_| {}, |_| {}, || {}))
                    .unwrap();
                assert!(matches!(
                    transport.bind(TransportEvents::new(|_| {}, |_| {}, || {})),
                    Err(TransportError::AlreadyBound)
                ));
            })
            .await;
    }
}
