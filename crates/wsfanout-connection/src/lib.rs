// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # wsfanout-connection
//!
//! Frame reassembly and message fan-out for one end of an established
//! WebSocket connection.
//!
//! ## Architecture
//!
//! ```text
//! Transport ──chunks──▶ FrameAssembler ──Inbound──▶ Connection
//!                        (Rfc6455Codec)               │  ├─ control frames: pong / close echo
//!                                                     │  └─ MessageDispatcher ──▶ CallbackRegistry
//! Transport ◀──frames── send() / close() ─────────────┘
//! Transport ──EOF/error──▶ finish observers (exactly once)
//! ```
//!
//! Everything runs on the thread that drives the transport. Observers may
//! register further observers, send, or close from inside a callback.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assembler;
pub mod codec;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod registry;

pub use assembler::{Control, FrameAssembler, Inbound};
pub use codec::{CloseFrame, Frame, FrameCodec, OpCode, Rfc6455Codec};
pub use connection::{Connection, FinishReason, LifecycleState, WeakConnection};
pub use dispatcher::MessageDispatcher;
pub use error::{CodecError, ConnectionError, ConnectionResult, DecodeError};
pub use message::{Message, MessageKind};
pub use registry::{CallbackRegistry, FinishList, Lifetime, SubscriptionList};
