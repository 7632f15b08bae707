//! Top-level facade crate for the lotto agency client.
//!
//! Re-exports the protocol core and the client library so users can depend on a single crate.

pub mod core {
    pub use lotto_core::*;
}

pub mod client {
    pub use lotto_client::*;
}
