//! Frame assembler: byte chunks in, messages and control frames out

use bytes::Bytes;
use tracing::warn;

use crate::codec::{CloseFrame, Frame, FrameCodec, OpCode, Rfc6455Codec};
use crate::error::CodecError;
use crate::message::{Message, MessageKind};

/// Control frames, consumed by the connection and never shown to observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Ping(Bytes),
    Pong(Bytes),
    Close(Option<CloseFrame>),
}

/// One decoded unit of inbound traffic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(Message),
    Control(Control),
}

impl Inbound {
    fn from_frame(frame: Frame) -> Result<Self, CodecError> {
        Ok(match frame.opcode {
            OpCode::Text => Inbound::Message(Message::new(MessageKind::Text, frame.payload)),
            OpCode::Binary => Inbound::Message(Message::new(MessageKind::Binary, frame.payload)),
            OpCode::Ping => Inbound::Control(Control::Ping(frame.payload)),
            OpCode::Pong => Inbound::Control(Control::Pong(frame.payload)),
            OpCode::Close => Inbound::Control(Control::Close(CloseFrame::parse(&frame.payload)?)),
            OpCode::Continuation => return Err(CodecError::OrphanContinuation),
        })
    }
}

/// Owns the decode buffer (through its codec) for one connection
///
/// Incomplete trailing bytes persist across [`feed`](Self::feed) calls. After
/// the first protocol error the assembler is poisoned and ignores all input.
pub struct FrameAssembler<C: FrameCodec = Rfc6455Codec> {
    codec: C,
    poisoned: bool,
}

impl<C: FrameCodec> FrameAssembler<C> {
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            poisoned: false,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Append `chunk` and iterate over every item it completes
    ///
    /// The iterator yields at most one `Err`, after which it ends.
    pub fn feed(&mut self, chunk: &[u8]) -> Inbounds<'_, C> {
        if !self.poisoned {
            self.codec.append(chunk);
        }
        Inbounds { assembler: self }
    }

    fn next_inbound(&mut self) -> Option<Result<Inbound, CodecError>> {
        if self.poisoned {
            return None;
        }
        let result = match self.codec.next_complete_frame() {
            Ok(None) => return None,
            Ok(Some(frame)) => Inbound::from_frame(frame),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!("[ASSEMBLER] Protocol violation, ignoring further input: {}", e);
            self.poisoned = true;
        }
        Some(result)
    }
}

/// Lazy sequence returned by [`FrameAssembler::feed`]
pub struct Inbounds<'a, C: FrameCodec> {
    assembler: &'a mut FrameAssembler<C>,
}

impl<C: FrameCodec> Iterator for Inbounds<'_, C> {
    type Item = Result<Inbound, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.assembler.next_inbound()
    }
}
