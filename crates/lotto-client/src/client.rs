//! Agency client loop.
//!
//! Batch mode walks `Submitting -> Notifying -> Polling -> Done`:
//! - Submitting: check cancellation, drain up to `batch_size` bets, submit them,
//!   pause, repeat. An empty drain moves on to Notifying.
//! - Notifying: one FINISHED exchange.
//! - Polling: one bounded ASK_FOR_WINNERS run.
//!
//! A rejected batch or any transport/protocol error ends the run; nothing is
//! resubmitted. Cancellation is only observed between exchanges.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use lotto_core::error::{ErrorKind, LottoError};

use crate::config::{ClientConfig, SubmitMode};
use crate::pacing::Pacer;
use crate::protocol::{notify_finished, poll_winners, submit_batch, submit_bet, BatchOutcome, PollPolicy};
use crate::source::BetSource;
use crate::transport::Connector;

/// Run parameters, resolved from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub agency: String,
    pub mode: SubmitMode,
    pub batch_size: usize,
    /// Pause after each accepted batch (or bet, in single mode).
    pub batch_delay: Duration,
    /// Iteration cap for single mode.
    pub loop_amount: u32,
    pub poll: PollPolicy,
}

impl From<&ClientConfig> for ClientSettings {
    fn from(cfg: &ClientConfig) -> Self {
        Self {
            agency: cfg.agency.clone(),
            mode: cfg.batch.mode,
            batch_size: cfg.batch.max_amount,
            batch_delay: cfg.cadence.period(),
            loop_amount: cfg.cadence.amount,
            poll: PollPolicy {
                max_attempts: cfg.poll.max_attempts,
                delay: cfg.poll.period(),
            },
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    /// All bets went out. `winners` is `None` when no draw result was obtained.
    Done { winners: Option<usize> },
    /// Cancellation observed between exchanges.
    Cancelled,
    /// The server answered `{result:failure}`.
    Rejected,
    /// A terminal error stopped the run.
    Aborted(ErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Accepted batches (bets, in single mode).
    pub batches: usize,
    /// Bets contained in accepted submissions.
    pub bets: usize,
    pub exit: Exit,
}

impl RunReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.exit, Exit::Rejected | Exit::Aborted(_))
    }
}

enum Phase {
    Submitting,
    Notifying,
    Polling,
    Done(Exit),
}

pub struct Client {
    settings: ClientSettings,
    connector: Arc<dyn Connector>,
    pacer: Arc<dyn Pacer>,
    cancel: CancellationToken,
}

impl Client {
    pub fn new(
        settings: ClientSettings,
        connector: Arc<dyn Connector>,
        pacer: Arc<dyn Pacer>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            settings,
            connector,
            pacer,
            cancel,
        }
    }

    /// Drive the whole run. Never returns an error: the outcome is in the report.
    pub async fn run(&self, source: &mut dyn BetSource) -> RunReport {
        let span = tracing::info_span!("agency", id = %self.settings.agency);
        let report = match self.settings.mode {
            SubmitMode::Batch => self.run_batches(source).instrument(span.clone()).await,
            SubmitMode::Single => self.run_single(source).instrument(span.clone()).await,
        };
        span.in_scope(|| {
            tracing::info!(
                action = "exit",
                batches = report.batches,
                bets = report.bets,
                exit = ?report.exit
            );
        });
        report
    }

    async fn run_batches(&self, source: &mut dyn BetSource) -> RunReport {
        let mut report = RunReport {
            batches: 0,
            bets: 0,
            exit: Exit::Done { winners: None },
        };
        let mut phase = Phase::Submitting;

        loop {
            phase = match phase {
                Phase::Submitting => self.submit_next(source, &mut report).await,
                Phase::Notifying => match notify_finished(self.connector.as_ref(), &self.settings.agency).await {
                    Ok(()) => Phase::Polling,
                    Err(e) => Phase::Done(Exit::Aborted(e.kind())),
                },
                Phase::Polling => Phase::Done(self.poll().await),
                Phase::Done(exit) => {
                    report.exit = exit;
                    return report;
                }
            };
        }
    }

    async fn submit_next(&self, source: &mut dyn BetSource, report: &mut RunReport) -> Phase {
        if self.cancel.is_cancelled() {
            tracing::info!(action = "exit", result = "success", reason = "signal");
            return Phase::Done(Exit::Cancelled);
        }

        let bets = match source.next_batch(self.settings.batch_size).await {
            Ok(bets) => bets,
            Err(e) => {
                tracing::error!(action = "read_batch", result = "fail", error = %e);
                return Phase::Done(Exit::Aborted(e.kind()));
            }
        };
        if bets.is_empty() {
            return Phase::Notifying;
        }

        match submit_batch(self.connector.as_ref(), &self.settings.agency, &bets).await {
            Ok(BatchOutcome::Accepted) => {
                tracing::info!(action = "batch_sent", result = "success", count = bets.len());
                report.batches += 1;
                report.bets += bets.len();
                self.pacer.pause(self.settings.batch_delay).await;
                Phase::Submitting
            }
            Ok(BatchOutcome::Rejected) => {
                tracing::error!(action = "batch_sent", result = "fail", count = bets.len());
                Phase::Done(Exit::Rejected)
            }
            Err(e) => {
                tracing::error!(action = "send_batch", result = "fail", error = %e);
                Phase::Done(Exit::Aborted(e.kind()))
            }
        }
    }

    async fn poll(&self) -> Exit {
        let outcome = poll_winners(
            self.connector.as_ref(),
            self.pacer.as_ref(),
            &self.cancel,
            &self.settings.agency,
            self.settings.poll,
        )
        .await;

        match outcome {
            Ok(winners) => Exit::Done {
                winners: Some(winners.len()),
            },
            Err(LottoError::Cancelled) => Exit::Cancelled,
            Err(e @ LottoError::RetryBudgetExceeded { .. }) => {
                tracing::warn!(action = "ask_winners", result = "fail", error = %e);
                Exit::Done { winners: None }
            }
            Err(e) => {
                tracing::error!(action = "ask_winners", result = "fail", error = %e);
                Exit::Aborted(e.kind())
            }
        }
    }

    /// Legacy mode: one BET per record, at most `loop_amount` of them.
    /// No FINISHED or winners exchange follows.
    async fn run_single(&self, source: &mut dyn BetSource) -> RunReport {
        let mut report = RunReport {
            batches: 0,
            bets: 0,
            exit: Exit::Done { winners: None },
        };

        for iteration in 1..=self.settings.loop_amount {
            if iteration > 1 {
                self.pacer.pause(self.settings.batch_delay).await;
            }
            if self.cancel.is_cancelled() {
                tracing::info!(action = "exit", result = "success", reason = "signal");
                report.exit = Exit::Cancelled;
                return report;
            }

            let bet = match source.next_batch(1).await {
                Ok(mut bets) => match bets.pop() {
                    Some(bet) => bet,
                    None => break,
                },
                Err(e) => {
                    tracing::error!(action = "read_batch", result = "fail", error = %e);
                    report.exit = Exit::Aborted(e.kind());
                    return report;
                }
            };

            match submit_bet(self.connector.as_ref(), &self.settings.agency, &bet).await {
                Ok(BatchOutcome::Accepted) => {
                    tracing::info!(action = "bet_sent", result = "success", dni = %bet.document, numero = %bet.number);
                    report.batches += 1;
                    report.bets += 1;
                }
                Ok(BatchOutcome::Rejected) => {
                    tracing::error!(action = "bet_sent", result = "fail", dni = %bet.document, numero = %bet.number);
                    report.exit = Exit::Rejected;
                    return report;
                }
                Err(e) => {
                    tracing::error!(action = "send_bet", result = "fail", error = %e);
                    report.exit = Exit::Aborted(e.kind());
                    return report;
                }
            }
        }

        report
    }
}
