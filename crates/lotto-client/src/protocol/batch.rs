//! BATCH (and legacy BET) submission: send, await ACK, interpret.

use lotto_core::error::{LottoError, Result};
use lotto_core::protocol::payload::batch_payload;
use lotto_core::protocol::{Envelope, MessageType, Reply};
use lotto_core::Bet;

use crate::protocol::exchange;
use crate::transport::Connector;

/// What the server said about a submitted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// `{result:success}`
    Accepted,
    /// `{result:failure}`. Not an error; the caller decides what to do.
    Rejected,
}

/// Submit a non-empty batch as one BATCH envelope.
pub async fn submit_batch(
    connector: &dyn Connector,
    agency: &str,
    bets: &[Bet],
) -> Result<BatchOutcome> {
    let request = Envelope::request(MessageType::Batch, batch_payload(agency, bets));
    tracing::info!(
        action = "batch_sent",
        result = "in_progress",
        id = %request.id,
        count = bets.len()
    );
    submit(connector, &request).await
}

/// Submit a single bet as a legacy BET envelope.
pub async fn submit_bet(connector: &dyn Connector, agency: &str, bet: &Bet) -> Result<BatchOutcome> {
    let request = Envelope::request(MessageType::Bet, bet.serialize(agency));
    tracing::info!(
        action = "bet_sent",
        result = "in_progress",
        id = %request.id,
        dni = %bet.document,
        numero = %bet.number
    );
    submit(connector, &request).await
}

async fn submit(connector: &dyn Connector, request: &Envelope) -> Result<BatchOutcome> {
    let reply = exchange(connector, request, MessageType::Ack).await?;
    tracing::info!(action = "receive_ack", result = "success", id = %request.id, reply = ?reply);
    ack_outcome(reply)
}

fn ack_outcome(reply: Reply) -> Result<BatchOutcome> {
    match reply {
        Reply::Success => Ok(BatchOutcome::Accepted),
        Reply::Failure => Ok(BatchOutcome::Rejected),
        Reply::Malformed(text) => Err(LottoError::MalformedPayload(text)),
        other => Err(LottoError::MalformedPayload(format!("not an ack result: {other:?}"))),
    }
}
