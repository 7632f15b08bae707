//! Client loop state machine end to end against a scripted server.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use lotto_client::config::SubmitMode;
use lotto_client::protocol::PollPolicy;
use lotto_client::source::CsvSource;
use lotto_client::{Client, ClientSettings, Exit};
use lotto_core::protocol::MessageType;
use lotto_core::ErrorKind;

use common::{ack, csv, row, winners, RecordingPacer, Respond, ScriptedConnector, ACK_FAIL, ACK_OK, PENDING};

const BATCH_DELAY: Duration = Duration::from_millis(100);
const POLL_DELAY: Duration = Duration::from_millis(300);

fn settings(batch_size: usize) -> ClientSettings {
    ClientSettings {
        agency: "1".into(),
        mode: SubmitMode::Batch,
        batch_size,
        batch_delay: BATCH_DELAY,
        loop_amount: 5,
        poll: PollPolicy {
            max_attempts: 3,
            delay: POLL_DELAY,
        },
    }
}

fn source(data: String) -> CsvSource<Cursor<Vec<u8>>> {
    CsvSource::new(Cursor::new(data.into_bytes()))
}

fn client(
    settings: ClientSettings,
    server: &Arc<ScriptedConnector>,
    pacer: &Arc<RecordingPacer>,
    cancel: CancellationToken,
) -> Client {
    Client::new(settings, server.clone(), pacer.clone(), cancel)
}

#[tokio::test]
async fn full_run_submits_notifies_and_polls() {
    let server = ScriptedConnector::new([
        ack(ACK_OK),
        ack(ACK_OK),
        ack(ACK_OK),
        ack(ACK_OK),
        winners(PENDING),
        winners("{ganadores:30000001|30000004}"),
    ]);
    let pacer = RecordingPacer::new();
    let mut src = source(csv(1..=5));

    let report = client(settings(2), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Done { winners: Some(2) });
    assert_eq!(report.batches, 3);
    assert_eq!(report.bets, 5);

    let types: Vec<MessageType> = server.requests().iter().map(|r| r.msg_type).collect();
    assert_eq!(
        types,
        vec![
            MessageType::Batch,
            MessageType::Batch,
            MessageType::Batch,
            MessageType::Finished,
            MessageType::AskForWinners,
            MessageType::AskForWinners,
        ]
    );

    let sizes: Vec<usize> = server
        .requests_of(MessageType::Batch)
        .iter()
        .map(|r| r.payload_str().unwrap().split('|').count())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    assert_eq!(pacer.pauses(), vec![BATCH_DELAY, BATCH_DELAY, BATCH_DELAY, POLL_DELAY]);
}

#[tokio::test]
async fn short_rows_never_reach_the_wire() {
    let server = ScriptedConnector::new([ack(ACK_OK), ack(ACK_OK), winners("{ganadores:}")]);
    let pacer = RecordingPacer::new();
    let data = format!("{}only,three,fields\n\n{}", row(1), row(2));
    let mut src = source(data);

    let report = client(settings(10), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Done { winners: Some(0) });
    assert_eq!(report.bets, 2);
    let batch = &server.requests_of(MessageType::Batch)[0];
    let payload = batch.payload_str().unwrap();
    assert_eq!(payload.split('|').count(), 2);
    assert!(!payload.contains("only"));
}

#[tokio::test]
async fn empty_source_skips_straight_to_notify() {
    let server = ScriptedConnector::new([ack(ACK_OK), winners("{ganadores:}")]);
    let pacer = RecordingPacer::new();
    let mut src = source("a,b\nc,d,e\n".to_string());

    let report = client(settings(10), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Done { winners: Some(0) });
    assert_eq!(report.batches, 0);
    assert!(server.requests_of(MessageType::Batch).is_empty());
    assert_eq!(server.requests()[0].msg_type, MessageType::Finished);
}

#[tokio::test]
async fn rejected_batch_stops_everything() {
    let server = ScriptedConnector::new([ack(ACK_OK), ack(ACK_FAIL), ack(ACK_OK), ack(ACK_OK)]);
    let pacer = RecordingPacer::new();
    let mut src = source(csv(1..=6));

    let report = client(settings(2), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Rejected);
    assert!(report.is_failure());
    assert_eq!(report.batches, 1);
    assert_eq!(server.requests().len(), 2);
    assert_eq!(server.remaining_steps(), 2);
}

#[tokio::test]
async fn protocol_violation_aborts_without_retry() {
    let server = ScriptedConnector::new([Respond::WrongId(MessageType::Ack, ACK_OK), ack(ACK_OK)]);
    let pacer = RecordingPacer::new();
    let mut src = source(csv(1..=3));

    let report = client(settings(2), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Aborted(ErrorKind::Protocol));
    assert_eq!(server.connects(), 1);
    assert!(pacer.pauses().is_empty());
}

#[tokio::test]
async fn connection_failure_aborts() {
    let server = ScriptedConnector::new([Respond::Refuse]);
    let pacer = RecordingPacer::new();
    let mut src = source(csv(1..=3));

    let report = client(settings(5), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Aborted(ErrorKind::Connection));
}

#[tokio::test]
async fn notify_failure_aborts_before_polling() {
    let server = ScriptedConnector::new([ack(ACK_OK), Respond::Hangup, winners("{ganadores:}")]);
    let pacer = RecordingPacer::new();
    let mut src = source(csv(1..=1));

    let report = client(settings(5), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Aborted(ErrorKind::Io));
    assert!(server.requests_of(MessageType::AskForWinners).is_empty());
}

#[tokio::test]
async fn exhausted_polling_is_not_a_failure() {
    let server = ScriptedConnector::new([ack(ACK_OK), winners(PENDING), winners(PENDING), winners(PENDING)]);
    let pacer = RecordingPacer::new();
    let mut src = source(String::new());

    let report = client(settings(5), &server, &pacer, CancellationToken::new())
        .run(&mut src)
        .await;

    assert_eq!(report.exit, Exit::Done { winners: None });
    assert!(!report.is_failure());
    assert_eq!(server.requests_of(MessageType::AskForWinners).len(), 3);
}

#[tokio::test]
async fn cancelled_before_start_sends_nothing() {
    let server = ScriptedConnector::new([ack(ACK_OK)]);
    let pacer = RecordingPacer::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut src = source(csv(1..=3));

    let report = client(settings(2), &server, &pacer, cancel).run(&mut src).await;

    assert_eq!(report.exit, Exit::Cancelled);
    assert_eq!(server.connects(), 0);
}

#[tokio::test]
async fn cancellation_is_observed_between_batches() {
    let cancel = CancellationToken::new();
    let server = ScriptedConnector::new([ack(ACK_OK), ack(ACK_OK), ack(ACK_OK)]);
    // cancel while pausing after the first batch
    let pacer = RecordingPacer::cancelling_at(1, cancel.clone());
    let mut src = source(csv(1..=6));

    let report = client(settings(2), &server, &pacer, cancel).run(&mut src).await;

    assert_eq!(report.exit, Exit::Cancelled);
    assert_eq!(report.batches, 1);
    assert_eq!(server.requests().len(), 1);
    assert!(!report.is_failure());
}

#[tokio::test]
async fn single_mode_sends_one_bet_per_message() {
    let server = ScriptedConnector::new([ack(ACK_OK), ack(ACK_OK), ack(ACK_OK)]);
    let pacer = RecordingPacer::new();
    let mut src = source(csv(1..=10));
    let mut s = settings(50);
    s.mode = SubmitMode::Single;
    s.loop_amount = 3;

    let report = client(s, &server, &pacer, CancellationToken::new()).run(&mut src).await;

    assert_eq!(report.exit, Exit::Done { winners: None });
    assert_eq!(report.bets, 3);
    let sent = server.requests();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|r| r.msg_type == MessageType::Bet));
    assert!(sent.iter().all(|r| !r.payload_str().unwrap().contains('|')));
    assert_eq!(pacer.pauses(), vec![BATCH_DELAY, BATCH_DELAY]);
}

#[tokio::test]
async fn single_mode_stops_when_source_runs_dry() {
    let server = ScriptedConnector::new([ack(ACK_OK), ack(ACK_OK)]);
    let pacer = RecordingPacer::new();
    let mut src = source(csv(1..=1));
    let mut s = settings(50);
    s.mode = SubmitMode::Single;
    s.loop_amount = 5;

    let report = client(s, &server, &pacer, CancellationToken::new()).run(&mut src).await;

    assert_eq!(report.exit, Exit::Done { winners: None });
    assert_eq!(report.bets, 1);
    assert_eq!(server.requests().len(), 1);
}
