use lotto_core::error::{LottoError, Result};
use lotto_core::protocol::{Envelope, MessageType, Reply};

use crate::transport::{Connector, Session};

/// Send `request` on a fresh connection and return the parsed, correlated reply.
///
/// The response must carry `expect` as its type and the request's identifier;
/// anything else is a protocol violation and is not retried here.
pub async fn exchange(
    connector: &dyn Connector,
    request: &Envelope,
    expect: MessageType,
) -> Result<Reply> {
    let mut session = connector.connect().await?;
    let outcome = round_trip(&mut session, request, expect).await;
    session.close().await;
    outcome
}

async fn round_trip(session: &mut Session, request: &Envelope, expect: MessageType) -> Result<Reply> {
    session.send_envelope(request).await?;
    let response = session.receive_envelope().await?;

    if response.msg_type != expect {
        tracing::error!(
            peer = %session.peer(),
            expected = ?expect,
            got = ?response.msg_type,
            "unexpected response type"
        );
        return Err(LottoError::UnexpectedType {
            expected: expect,
            got: response.msg_type,
        });
    }

    if response.id != request.id {
        tracing::error!(
            peer = %session.peer(),
            expected = %request.id,
            got = %response.id,
            "mismatched response id"
        );
        return Err(LottoError::MismatchedId {
            expected: request.id,
            got: response.id,
        });
    }

    Ok(Reply::parse(&response.payload))
}
