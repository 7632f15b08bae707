//! Client-side exchanges.
//!
//! Every exchange opens a fresh session, sends one request, receives one
//! response, checks its type and identifier against the request, and closes
//! the session on every exit path.

pub mod batch;
pub mod exchange;
pub mod finished;
pub mod winners;

pub use batch::{submit_batch, submit_bet, BatchOutcome};
pub use exchange::exchange;
pub use finished::notify_finished;
pub use winners::{poll_winners, PollPolicy};
