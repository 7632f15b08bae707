//! Bounded polling for the draw result.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lotto_core::error::{LottoError, Result};
use lotto_core::protocol::payload::agency_payload;
use lotto_core::protocol::{Envelope, MessageType, Reply};

use crate::pacing::Pacer;
use crate::protocol::exchange;
use crate::transport::Connector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between two consecutive attempts.
    pub delay: Duration,
}

/// Ask for the winners until the draw is done or `policy.max_attempts` is spent.
///
/// Only `{result:in_progress}` is retried. Transport, protocol and format
/// errors end polling immediately. Cancellation is checked before each attempt.
pub async fn poll_winners(
    connector: &dyn Connector,
    pacer: &dyn Pacer,
    cancel: &CancellationToken,
    agency: &str,
    policy: PollPolicy,
) -> Result<Vec<String>> {
    let request = Envelope::request(MessageType::AskForWinners, agency_payload(agency));

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            pacer.pause(policy.delay).await;
        }
        if cancel.is_cancelled() {
            return Err(LottoError::Cancelled);
        }

        match exchange(connector, &request, MessageType::WinnersResponse).await? {
            Reply::Winners(winners) => {
                tracing::info!(
                    action = "ask_winners",
                    result = "success",
                    attempt,
                    winners = winners.len()
                );
                return Ok(winners);
            }
            Reply::Pending => {
                tracing::info!(
                    action = "ask_winners",
                    result = "in_progress",
                    attempt,
                    max_attempts = policy.max_attempts
                );
            }
            other => {
                tracing::error!(action = "ask_winners", result = "fail", reason = "unexpected_format", reply = ?other);
                return Err(LottoError::MalformedPayload(format!("not a winners reply: {other:?}")));
            }
        }
    }

    tracing::error!(action = "ask_winners", result = "fail", reason = "max_retries_exceeded");
    Err(LottoError::RetryBudgetExceeded {
        attempts: policy.max_attempts,
    })
}
