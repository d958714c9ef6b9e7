// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! RFC 6455 frame codec
//!
//! Incrementally decodes an inbound byte stream into complete frames and
//! encodes outbound frames. Fragmented data messages are reassembled here, so
//! consumers only ever see whole Text/Binary payloads plus control frames.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+ - - - - - - - - - - - - - - - +
//! |     Extended payload length continued, if payload len == 127  |
//! + - - - - - - - - - - - - - - - +-------------------------------+
//! |                               |Masking-key, if MASK set to 1  |
//! +-------------------------------+-------------------------------+
//! | Masking-key (continued)       |          Payload Data         |
//! +-------------------------------- - - - - - - - - - - - - - - - +
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;
use wsfanout_config::{is_sendable_close_status, ConnectionConfig, Role};

use crate::error::CodecError;

/// Maximum payload size for control frames
pub const MAX_CONTROL_PAYLOAD: usize = 125;

/// Frame opcodes defined by RFC 6455
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Continuation,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Result<Self, CodecError> {
        match value {
            0x0 => Ok(OpCode::Continuation),
            0x1 => Ok(OpCode::Text),
            0x2 => Ok(OpCode::Binary),
            0x8 => Ok(OpCode::Close),
            0x9 => Ok(OpCode::Ping),
            0xA => Ok(OpCode::Pong),
            other => Err(CodecError::ReservedOpcode(other)),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            OpCode::Continuation => 0x0,
            OpCode::Text => 0x1,
            OpCode::Binary => 0x2,
            OpCode::Close => 0x8,
            OpCode::Ping => 0x9,
            OpCode::Pong => 0xA,
        }
    }

    pub fn is_control(self) -> bool {
        matches!(self, OpCode::Close | OpCode::Ping | OpCode::Pong)
    }
}

/// One complete logical frame: a whole data message or a control frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: OpCode,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(opcode: OpCode, payload: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            payload: payload.into(),
        }
    }
}

/// Parsed close frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    pub code: u16,
    pub reason: String,
}

impl CloseFrame {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Parse a close payload; an empty payload carries no status
    pub fn parse(payload: &[u8]) -> Result<Option<Self>, CodecError> {
        match payload.len() {
            0 => Ok(None),
            1 => Err(CodecError::InvalidClose(
                "payload of 1 byte cannot hold a status code".to_string(),
            )),
            _ => {
                let code = u16::from_be_bytes([payload[0], payload[1]]);
                if !is_sendable_close_status(code) {
                    return Err(CodecError::InvalidClose(format!(
                        "status {} is not allowed on the wire",
                        code
                    )));
                }
                let reason = std::str::from_utf8(&payload[2..])
                    .map_err(|_| CodecError::InvalidCloseReason)?;
                Ok(Some(Self::new(code, reason)))
            }
        }
    }
}

/// Byte-stream framing used by a connection
pub trait FrameCodec {
    /// Append inbound bytes to the decode buffer
    fn append(&mut self, bytes: &[u8]);

    /// Pop the next complete frame, if the buffer holds one
    fn next_complete_frame(&mut self) -> Result<Option<Frame>, CodecError>;

    /// Encode a single final frame
    fn encode(&self, opcode: OpCode, payload: &[u8]) -> Bytes;

    /// Encode a close frame with a status code and reason
    fn encode_close(&self, code: u16, reason: &str) -> Bytes;

    /// Bytes received but not yet consumed by a complete frame
    fn buffered_len(&self) -> usize;
}

#[derive(Debug)]
struct Header {
    fin: bool,
    rsv: u8,
    opcode: OpCode,
    mask: Option<[u8; 4]>,
    payload_len: u64,
    header_len: usize,
}

/// Parse a frame header; `Ok(None)` when more bytes are needed.
fn parse_header(buf: &[u8]) -> Result<Option<Header>, CodecError> {
    if buf.len() < 2 {
        return Ok(None);
    }

    let fin = buf[0] & 0x80 != 0;
    let rsv = (buf[0] >> 4) & 0x07;
    let opcode = OpCode::from_u8(buf[0] & 0x0F)?;
    let masked = buf[1] & 0x80 != 0;

    let (payload_len, mut header_len) = match buf[1] & 0x7F {
        126 => {
            if buf.len() < 4 {
                return Ok(None);
            }
            (u64::from(u16::from_be_bytes([buf[2], buf[3]])), 4)
        }
        127 => {
            if buf.len() < 10 {
                return Ok(None);
            }
            let mut len = [0u8; 8];
            len.copy_from_slice(&buf[2..10]);
            let len = u64::from_be_bytes(len);
            if len >> 63 != 0 {
                return Err(CodecError::InvalidLength(len));
            }
            (len, 10)
        }
        len => (u64::from(len), 2),
    };

    let mask = if masked {
        if buf.len() < header_len + 4 {
            return Ok(None);
        }
        let mut key = [0u8; 4];
        key.copy_from_slice(&buf[header_len..header_len + 4]);
        header_len += 4;
        Some(key)
    } else {
        None
    };

    Ok(Some(Header {
        fin,
        rsv,
        opcode,
        mask,
        payload_len,
        header_len,
    }))
}

/// XOR `buf` with the 4-byte masking key
pub fn apply_mask(buf: &mut [u8], key: [u8; 4]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte ^= key[i & 3];
    }
}

/// Append one encoded frame to `out`
pub fn write_frame(out: &mut BytesMut, fin: bool, opcode: OpCode, payload: &[u8], mask: Option<[u8; 4]>) {
    let fin_bit = if fin { 0x80 } else { 0x00 };
    let mask_bit = if mask.is_some() { 0x80 } else { 0x00 };
    out.reserve(payload.len() + 14);
    out.put_u8(fin_bit | opcode.as_u8());

    match payload.len() {
        len if len <= 125 => out.put_u8(mask_bit | len as u8),
        len if len <= usize::from(u16::MAX) => {
            out.put_u8(mask_bit | 126);
            out.put_u16(len as u16);
        }
        len => {
            out.put_u8(mask_bit | 127);
            out.put_u64(len as u64);
        }
    }

    match mask {
        Some(key) => {
            out.put_slice(&key);
            let start = out.len();
            out.put_slice(payload);
            apply_mask(&mut out[start..], key);
        }
        None => out.put_slice(payload),
    }
}

struct Partial {
    opcode: OpCode,
    payload: BytesMut,
}

/// RFC 6455 codec for one end of a connection
pub struct Rfc6455Codec {
    role: Role,
    max_message_size: usize,
    buffer: BytesMut,
    partial: Option<Partial>,
}

impl Rfc6455Codec {
    pub fn new(role: Role, max_message_size: usize) -> Self {
        Self {
            role,
            max_message_size,
            buffer: BytesMut::new(),
            partial: None,
        }
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.role, config.max_message_size)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether a fragmented message is waiting for its final frame
    pub fn in_message(&self) -> bool {
        self.partial.is_some()
    }

    fn check_header(&self, header: &Header) -> Result<(), CodecError> {
        if header.rsv != 0 {
            return Err(CodecError::ReservedBits(header.rsv));
        }

        match (self.role, header.mask.is_some()) {
            (Role::Client, true) | (Role::Server, false) => {
                return Err(CodecError::MaskMismatch(self.role));
            }
            _ => {}
        }

        if header.opcode.is_control() {
            if !header.fin {
                return Err(CodecError::FragmentedControl(header.opcode));
            }
            if header.payload_len > MAX_CONTROL_PAYLOAD as u64 {
                return Err(CodecError::ControlTooLarge(header.payload_len));
            }
            return Ok(());
        }

        match (header.opcode, &self.partial) {
            (OpCode::Continuation, None) => return Err(CodecError::OrphanContinuation),
            (OpCode::Text | OpCode::Binary, Some(_)) => return Err(CodecError::InterleavedData),
            _ => {}
        }

        let buffered = self.partial.as_ref().map_or(0, |p| p.payload.len()) as u64;
        let size = buffered.saturating_add(header.payload_len);
        if size > self.max_message_size as u64 {
            return Err(CodecError::MessageTooBig {
                size,
                limit: self.max_message_size,
            });
        }
        Ok(())
    }

    fn outbound_mask(&self) -> Option<[u8; 4]> {
        match self.role {
            Role::Client => Some(rand::random::<[u8; 4]>()),
            Role::Server => None,
        }
    }
}

impl FrameCodec for Rfc6455Codec {
    fn append(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn next_complete_frame(&mut self) -> Result<Option<Frame>, CodecError> {
        loop {
            let header = match parse_header(&self.buffer)? {
                Some(header) => header,
                None => return Ok(None),
            };
            self.check_header(&header)?;

            // Bounded by max_message_size or 125 above, so it fits in usize.
            let payload_len = header.payload_len as usize;
            if self.buffer.len() < header.header_len + payload_len {
                return Ok(None);
            }

            self.buffer.advance(header.header_len);
            let mut payload = self.buffer.split_to(payload_len);
            if let Some(key) = header.mask {
                apply_mask(&mut payload, key);
            }
            trace!(
                "[CODEC] {:?} frame, fin={}, {} bytes",
                header.opcode,
                header.fin,
                payload_len
            );

            match header.opcode {
                opcode if opcode.is_control() => {
                    return Ok(Some(Frame::new(opcode, payload.freeze())));
                }
                OpCode::Continuation => {
                    let Some(partial) = self.partial.as_mut() else {
                        return Err(CodecError::OrphanContinuation);
                    };
                    partial.payload.unsplit(payload);
                    if header.fin {
                        if let Some(done) = self.partial.take() {
                            return Ok(Some(Frame::new(done.opcode, done.payload.freeze())));
                        }
                    }
                }
                opcode => {
                    if header.fin {
                        return Ok(Some(Frame::new(opcode, payload.freeze())));
                    }
                    self.partial = Some(Partial { opcode, payload });
                }
            }
        }
    }

    fn encode(&self, opcode: OpCode, payload: &[u8]) -> Bytes {
        let mut out = BytesMut::new();
        write_frame(&mut out, true, opcode, payload, self.outbound_mask());
        out.freeze()
    }

    fn encode_close(&self, code: u16, reason: &str) -> Bytes {
        let mut reason_len = reason.len().min(MAX_CONTROL_PAYLOAD - 2);
        while !reason.is_char_boundary(reason_len) {
            reason_len -= 1;
        }
        let mut payload = Vec::with_capacity(2 + reason_len);
        payload.extend_from_slice(&code.to_be_bytes());
        payload.extend_from_slice(&reason.as_bytes()[..reason_len]);
        self.encode(OpCode::Close, &payload)
    }

    fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
