//! Length-prefixed binary envelope.
//!
//! Layout (all integers big-endian):
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 4 | length of everything after this field |
//! | 4 | 2 | message type |
//! | 6 | 16 | message identifier |
//! | 22 | n | payload |
//!
//! `length == 2 + 16 + n` always holds for frames produced here.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{LottoError, Result};
use crate::protocol::id::{MessageId, ID_LEN};

/// Bytes read before the identifier: length (u32) + type (u16).
pub const HEADER_LEN: usize = 6;

/// Smallest legal value of the length field (type + identifier, empty payload).
pub const MIN_FRAME_LEN: u32 = 2 + ID_LEN as u32;

/// Largest length field accepted or produced (1 MiB).
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Message kinds understood by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    /// Legacy single-record submission.
    Bet = 1,
    Ack = 2,
    Batch = 3,
    Finished = 4,
    AskForWinners = 5,
    WinnersResponse = 6,
}

impl MessageType {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for MessageType {
    type Error = LottoError;

    fn try_from(v: u16) -> Result<Self> {
        match v {
            1 => Ok(MessageType::Bet),
            2 => Ok(MessageType::Ack),
            3 => Ok(MessageType::Batch),
            4 => Ok(MessageType::Finished),
            5 => Ok(MessageType::AskForWinners),
            6 => Ok(MessageType::WinnersResponse),
            other => Err(LottoError::UnknownMessageType(other)),
        }
    }
}

/// Fixed 6-byte frame prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Length field as sent: type + identifier + payload.
    pub length: u32,
    pub msg_type: MessageType,
}

impl Header {
    /// Decode the length and type fields.
    ///
    /// Rejects lengths below [`MIN_FRAME_LEN`] or above [`MAX_FRAME_LEN`]
    /// before anything is allocated for the payload.
    pub fn decode(buf: &mut impl Buf) -> Result<Header> {
        if buf.remaining() < HEADER_LEN {
            return Err(LottoError::Truncated {
                declared: HEADER_LEN,
                available: buf.remaining(),
            });
        }

        let length = buf.get_u32();
        if length < MIN_FRAME_LEN {
            return Err(LottoError::InvalidLength(length));
        }
        if length as usize > MAX_FRAME_LEN {
            return Err(LottoError::FrameTooLarge(length as usize));
        }

        let msg_type = MessageType::try_from(buf.get_u16())?;
        Ok(Header { length, msg_type })
    }

    /// Number of payload bytes that follow the identifier.
    pub fn payload_len(&self) -> usize {
        (self.length - MIN_FRAME_LEN) as usize
    }
}

/// One complete wire message. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub msg_type: MessageType,
    pub id: MessageId,
    pub payload: Bytes,
}

impl Envelope {
    pub fn new(msg_type: MessageType, id: MessageId, payload: impl Into<Bytes>) -> Self {
        Self {
            msg_type,
            id,
            payload: payload.into(),
        }
    }

    /// Build a request whose identifier is derived from its own payload bytes.
    pub fn request(msg_type: MessageType, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let id = MessageId::derive(&payload);
        Self {
            msg_type,
            id,
            payload,
        }
    }

    /// Value of the length field for this envelope.
    pub fn length_field(&self) -> Result<u32> {
        let len = MIN_FRAME_LEN as usize + self.payload.len();
        if len > MAX_FRAME_LEN {
            return Err(LottoError::FrameTooLarge(len));
        }
        // MAX_FRAME_LEN fits in u32, so the cast is lossless.
        Ok(len as u32)
    }

    /// Serialize to the wire layout.
    pub fn encode(&self) -> Result<Bytes> {
        let length = self.length_field()?;
        let mut buf = BytesMut::with_capacity(4 + length as usize);
        buf.put_u32(length);
        buf.put_u16(self.msg_type.as_u16());
        buf.put_slice(self.id.as_bytes());
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Decode one complete frame from an in-memory buffer.
    pub fn decode(buf: &mut impl Buf) -> Result<Envelope> {
        let header = Header::decode(buf)?;
        let id = MessageId::decode(buf)?;
        let payload = decode_payload(buf, &header)?;
        Ok(Envelope {
            msg_type: header.msg_type,
            id,
            payload,
        })
    }

    /// Payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Read exactly `header.payload_len()` bytes.
pub fn decode_payload(buf: &mut impl Buf, header: &Header) -> Result<Bytes> {
    let len = header.payload_len();
    if buf.remaining() < len {
        return Err(LottoError::Truncated {
            declared: len,
            available: buf.remaining(),
        });
    }
    Ok(buf.copy_to_bytes(len))
}
