//! Shared fakes: a scripted in-memory server and a recording pacer.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use lotto_client::pacing::Pacer;
use lotto_client::transport::{Connector, Session};
use lotto_core::error::{LottoError, Result};
use lotto_core::protocol::{Envelope, MessageId, MessageType};

pub const ACK_OK: &str = "{result:success}";
pub const ACK_FAIL: &str = "{result:failure}";
pub const PENDING: &str = "{result:in_progress}";

/// What the fake server does with the next connection.
#[derive(Debug, Clone)]
pub enum Respond {
    /// Reply with this type and payload, echoing the request id.
    With(MessageType, &'static str),
    /// Reply with this type and payload under an unrelated id.
    WrongId(MessageType, &'static str),
    /// Read the request, then close without replying.
    Hangup,
    /// Refuse the connection.
    Refuse,
}

pub fn ack(payload: &'static str) -> Respond {
    Respond::With(MessageType::Ack, payload)
}

pub fn winners(payload: &'static str) -> Respond {
    Respond::With(MessageType::WinnersResponse, payload)
}

/// Serves one scripted step per connection over `tokio::io::duplex` pipes.
/// A small pipe capacity forces partial reads and writes on both sides.
pub struct ScriptedConnector {
    script: Mutex<VecDeque<Respond>>,
    requests: Arc<Mutex<Vec<Envelope>>>,
    connects: Mutex<usize>,
    pipe_capacity: usize,
}

impl ScriptedConnector {
    pub fn new(script: impl IntoIterator<Item = Respond>) -> Arc<Self> {
        Self::with_capacity(script, 7)
    }

    pub fn with_capacity(script: impl IntoIterator<Item = Respond>, pipe_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Arc::new(Mutex::new(Vec::new())),
            connects: Mutex::new(0),
            pipe_capacity,
        })
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<Envelope> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_of(&self, msg_type: MessageType) -> Vec<Envelope> {
        self.requests().into_iter().filter(|r| r.msg_type == msg_type).collect()
    }

    pub fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    pub fn remaining_steps(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self) -> Result<Session> {
        *self.connects.lock().unwrap() += 1;
        let step = self.script.lock().unwrap().pop_front();
        let step = match step {
            Some(Respond::Refuse) | None => {
                return Err(LottoError::Connection {
                    addr: "scripted".into(),
                    source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused by script"),
                })
            }
            Some(step) => step,
        };

        let (client, server) = tokio::io::duplex(self.pipe_capacity);
        let requests = Arc::clone(&self.requests);

        tokio::spawn(async move {
            let mut server = Session::new(server, "fake-server");
            let Ok(request) = server.receive_envelope().await else {
                return;
            };
            requests.lock().unwrap().push(request.clone());

            let reply = match step {
                Respond::With(t, p) => Envelope::new(t, request.id, p),
                Respond::WrongId(t, p) => Envelope::new(t, MessageId::derive(b"someone else"), p),
                Respond::Hangup | Respond::Refuse => return,
            };
            let _ = server.send_envelope(&reply).await;
        });

        Ok(Session::new(client, "scripted"))
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
    cancel_on_pause: Option<(usize, CancellationToken)>,
}

impl RecordingPacer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Cancel `token` when the `n`th pause (1-based) is requested.
    pub fn cancelling_at(n: usize, token: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            pauses: Mutex::new(Vec::new()),
            cancel_on_pause: Some((n, token)),
        })
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, delay: Duration) {
        let count = {
            let mut pauses = self.pauses.lock().unwrap();
            pauses.push(delay);
            pauses.len()
        };
        if let Some((n, token)) = &self.cancel_on_pause {
            if count == *n {
                token.cancel();
            }
        }
    }
}

/// A CSV row for bet `n`.
pub fn row(n: u32) -> String {
    format!("Nombre{n},Apellido{n},{},1990-01-{:02},{}\n", 30_000_000 + n, n % 28 + 1, 1000 + n)
}

pub fn csv(rows: impl IntoIterator<Item = u32>) -> String {
    rows.into_iter().map(row).collect()
}
