//! Wire protocol modules.
//!
//! - `frame`: the length-prefixed binary envelope (header, identifier, payload).
//! - `id`: content-derived 16-byte message identifiers used for ACK correlation.
//! - `payload`: the brace-delimited text grammar carried inside envelopes.
//!
//! All decoders are panic-free: they check `remaining()` before every read and
//! report short or inconsistent input as `LottoError`.

pub mod frame;
pub mod id;
pub mod payload;

pub use frame::{Envelope, Header, MessageType, HEADER_LEN, MAX_FRAME_LEN, MIN_FRAME_LEN};
pub use id::{MessageId, ID_LEN};
pub use payload::Reply;
