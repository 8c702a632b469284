//! Length-prefix frame codec.
//!
//! Wire format:
//! ```text
//! ┌────────────┬──────────────────────────────────────┐
//! │ Length (4B)│ postcard { id: u16, ack: bool, event } │
//! │ LE u32     │                                      │
//! └────────────┴──────────────────────────────────────┘
//! ```
//!
//! Decoding works on the session's accumulation buffer. A call may see
//! part of the header, part of the payload, or several frames back to back;
//! the caller drops `consumed`/`discard` bytes and calls again.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::events::Event;
use crate::session::message::Message;

/// Maximum frame payload size (protects against memory exhaustion).
pub const MAX_FRAME_SIZE: usize = 512;

/// Frame header size (4-byte little-endian length).
pub const HEADER_SIZE: usize = 4;

/// Result of one decode attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    /// A whole frame was parsed; drop `consumed` bytes from the buffer.
    Complete { message: Message, consumed: usize },
    /// More bytes are needed. `declared` is the payload length once the
    /// header is readable.
    Incomplete { declared: Option<usize> },
    /// The bytes cannot be parsed; drop `discard` bytes from the buffer.
    Malformed { discard: usize },
}

/// Serialisation codec consumed by the session.
pub trait Codec {
    /// Append the encoded frame for `msg` to `out`. Returns bytes appended.
    fn encode(&mut self, msg: &Message, out: &mut Vec<u8>) -> Result<usize, CodecError>;

    /// Try to parse one frame from the front of `buf`.
    fn decode(&mut self, buf: &[u8]) -> Decoded;
}

#[derive(Serialize)]
struct WireOut<'a> {
    id: u16,
    ack: bool,
    event: &'a Event,
}

#[derive(Deserialize)]
struct WireIn {
    id: u16,
    ack: bool,
    event: Event,
}

/// Length-prefixed postcard framing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl Codec for FrameCodec {
    fn encode(&mut self, msg: &Message, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        if !msg.event().wire_safe() {
            return Err(CodecError::NotWireSafe);
        }

        let wire = WireOut {
            id: msg.id(),
            ack: msg.expects_ack(),
            event: msg.event(),
        };
        let payload = postcard::to_allocvec(&wire).map_err(|_| CodecError::Encode)?;
        if payload.is_empty() || payload.len() > MAX_FRAME_SIZE {
            return Err(CodecError::Oversize);
        }

        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(HEADER_SIZE + payload.len())
    }

    fn decode(&mut self, buf: &[u8]) -> Decoded {
        if buf.len() < HEADER_SIZE {
            return Decoded::Incomplete { declared: None };
        }

        let expected = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        if expected == 0 || expected > MAX_FRAME_SIZE {
            // No trustworthy length: nothing in the buffer can be framed.
            return Decoded::Malformed { discard: buf.len() };
        }

        let total = HEADER_SIZE + expected;
        if buf.len() < total {
            return Decoded::Incomplete {
                declared: Some(expected),
            };
        }

        match postcard::from_bytes::<WireIn>(&buf[HEADER_SIZE..total]) {
            Ok(wire) if wire.event.wire_safe() => Decoded::Complete {
                message: Message::inbound(wire.id, wire.event, wire.ack),
                consumed: total,
            },
            _ => Decoded::Malformed { discard: total },
        }
    }
}

/// Encode `payload` bytes as a raw frame (length prefix only). Test helper
/// for injecting frames whose body is not a valid message.
pub fn encode_raw_frame(payload: &[u8]) -> Option<Vec<u8>> {
    if payload.is_empty() || payload.len() > MAX_FRAME_SIZE {
        return None;
    }
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    Some(out)
}
