//! One connection, exact-length reads and writes, envelope framing on top.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use lotto_core::error::{LottoError, Result};
use lotto_core::protocol::frame::decode_payload;
use lotto_core::protocol::{Envelope, Header, MessageId, HEADER_LEN, ID_LEN};

/// Any byte stream a session can run over.
pub trait Conn: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Conn for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

pub struct Session {
    stream: Box<dyn Conn>,
    peer: String,
}

impl Session {
    pub fn new(stream: impl Conn + 'static, peer: impl Into<String>) -> Self {
        Self {
            stream: Box::new(stream),
            peer: peer.into(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Write every byte of `bytes`, retrying partial writes.
    pub async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await.map_err(LottoError::Send)?;
        self.stream.flush().await.map_err(LottoError::Send)
    }

    /// Read exactly `n` bytes, retrying partial reads. End of stream before
    /// `n` bytes is an error, never a short buffer.
    pub async fn receive_exact(&mut self, n: usize) -> Result<BytesMut> {
        let mut buf = BytesMut::zeroed(n);
        self.stream
            .read_exact(&mut buf)
            .await
            .map_err(|source| LottoError::ShortRead { wanted: n, source })?;
        Ok(buf)
    }

    pub async fn send_envelope(&mut self, env: &Envelope) -> Result<()> {
        let wire = env.encode()?;
        self.send(&wire).await
    }

    /// Header, then identifier, then exactly the declared payload.
    pub async fn receive_envelope(&mut self) -> Result<Envelope> {
        let mut head = self.receive_exact(HEADER_LEN).await?;
        let header = Header::decode(&mut head)?;

        let mut id = self.receive_exact(ID_LEN).await?;
        let id = MessageId::decode(&mut id)?;

        let mut body = self.receive_exact(header.payload_len()).await?;
        let payload = decode_payload(&mut body, &header)?;

        Ok(Envelope {
            msg_type: header.msg_type,
            id,
            payload,
        })
    }

    /// Shut the write half down and release the connection.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(peer = %self.peer, error = %e, "session shutdown failed");
        }
    }
}
