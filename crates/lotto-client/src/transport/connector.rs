use async_trait::async_trait;
use tokio::net::TcpStream;

use lotto_core::error::{LottoError, Result};

use crate::transport::Session;

/// Opens a fresh session per exchange. No pooling, no reconnect.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Session>;
}

#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Session> {
        let stream = TcpStream::connect(&self.addr).await.map_err(|source| {
            tracing::error!(action = "connect", result = "fail", addr = %self.addr, error = %source);
            LottoError::Connection {
                addr: self.addr.clone(),
                source,
            }
        })?;

        // one write per request
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(addr = %self.addr, error = %e, "set_nodelay failed");
        }

        Ok(Session::new(stream, self.addr.clone()))
    }
}
