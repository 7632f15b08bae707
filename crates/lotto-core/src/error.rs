//! Shared error type across lotto crates.

use std::io;

use thiserror::Error;

use crate::protocol::{MessageId, MessageType};

/// Stable error classification, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The transport could not be established.
    Connection,
    /// The stream failed or ended before an exchange completed.
    Io,
    /// Unexpected message type, mismatched identifier or bad header.
    Protocol,
    /// Response text matches no known grammar.
    MalformedPayload,
    /// A source row could not be turned into a bet.
    RecordParse,
    /// Polling gave up while the draw was still pending.
    RetryBudgetExceeded,
    /// Cancellation was observed between exchanges.
    Cancelled,
    /// Invalid or unreadable configuration.
    Config,
}

impl ErrorKind {
    /// Upper-snake code used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::Io => "IO",
            ErrorKind::Protocol => "PROTOCOL",
            ErrorKind::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorKind::RecordParse => "RECORD_PARSE",
            ErrorKind::RetryBudgetExceeded => "RETRY_BUDGET_EXCEEDED",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Config => "CONFIG",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LottoError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum LottoError {
    #[error("connect to {addr} failed: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("short read ({wanted} bytes wanted): {source}")]
    ShortRead {
        wanted: usize,
        #[source]
        source: io::Error,
    },
    #[error("send failed: {0}")]
    Send(#[source] io::Error),
    #[error("record source read failed: {0}")]
    Source(#[source] io::Error),
    #[error("truncated frame: {declared} bytes declared, {available} available")]
    Truncated { declared: usize, available: usize },
    #[error("unexpected message type: expected {expected:?}, got {got:?}")]
    UnexpectedType {
        expected: MessageType,
        got: MessageType,
    },
    #[error("mismatched message id: expected {expected}, got {got}")]
    MismatchedId { expected: MessageId, got: MessageId },
    #[error("unknown message type: {0}")]
    UnknownMessageType(u16),
    #[error("invalid frame length: {0}")]
    InvalidLength(u32),
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("record parse error: {0}")]
    RecordParse(String),
    #[error("retry budget exceeded after {attempts} attempts")]
    RetryBudgetExceeded { attempts: u32 },
    #[error("cancelled")]
    Cancelled,
    #[error("config: {0}")]
    Config(String),
}

impl LottoError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LottoError::Connection { .. } => ErrorKind::Connection,
            LottoError::ShortRead { .. }
            | LottoError::Send(_)
            | LottoError::Source(_)
            | LottoError::Truncated { .. } => ErrorKind::Io,
            LottoError::UnexpectedType { .. }
            | LottoError::MismatchedId { .. }
            | LottoError::UnknownMessageType(_)
            | LottoError::InvalidLength(_)
            | LottoError::FrameTooLarge(_) => ErrorKind::Protocol,
            LottoError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            LottoError::RecordParse(_) => ErrorKind::RecordParse,
            LottoError::RetryBudgetExceeded { .. } => ErrorKind::RetryBudgetExceeded,
            LottoError::Cancelled => ErrorKind::Cancelled,
            LottoError::Config(_) => ErrorKind::Config,
        }
    }
}
