//! lotto agency client library entry.
//!
//! This crate wires configuration, the TCP transport, the submission/notify/poll
//! exchanges and the CSV bet source into the agency client loop. It is consumed
//! by the binary (`main.rs`) and by integration tests.

pub mod client;
pub mod config;
pub mod pacing;
pub mod protocol;
pub mod source;
pub mod transport;

pub use client::{Client, ClientSettings, Exit, RunReport};
