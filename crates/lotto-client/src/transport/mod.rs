//! Transport layer (TCP).
//!
//! A [`Session`] owns one connection for one exchange; a [`Connector`] opens
//! fresh sessions. Protocol code only sees these two types, so tests can swap
//! TCP for in-memory streams.

pub mod connector;
pub mod session;

pub use connector::{Connector, TcpConnector};
pub use session::{Conn, Session};
