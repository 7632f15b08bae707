//! Content-derived message identifiers.
//!
//! The identifier is the first 16 bytes of the SHA-256 digest of the exact
//! payload bytes placed on the wire. Equal payloads always produce equal
//! identifiers, so two identical batches sent in different rounds cannot be
//! told apart by identifier alone.

use std::fmt::{Debug, Display, Formatter};

use bytes::Buf;
use sha2::{Digest, Sha256};

use crate::error::{LottoError, Result};

pub const ID_LEN: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId([u8; ID_LEN]);

impl MessageId {
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the identifier for a request payload. Pure and deterministic.
    pub fn derive(payload: &[u8]) -> Self {
        let digest = Sha256::digest(payload);
        let mut id = [0u8; ID_LEN];
        id.copy_from_slice(&digest[..ID_LEN]);
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, for logs only.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < ID_LEN {
            return Err(LottoError::Truncated {
                declared: ID_LEN,
                available: buf.remaining(),
            });
        }
        let mut id = [0u8; ID_LEN];
        buf.copy_to_slice(&mut id);
        Ok(Self(id))
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Debug for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageId({})", self.to_hex())
    }
}
