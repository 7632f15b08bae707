//! lotto core: runtime-free protocol primitives, records, and the shared error type.
//!
//! This crate defines the wire-level contract spoken between an agency client
//! and the central aggregator: the length-prefixed envelope, content-derived
//! message identifiers, the bet record and the brace-delimited payload grammar.
//! It carries no transport or runtime dependencies; the async client lives in
//! `lotto-client`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed frames and payloads surface as `LottoError` values.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod bet;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorKind, LottoError, Result};
pub use bet::Bet;
