use lotto_core::error::Result;
use lotto_core::protocol::payload::agency_payload;
use lotto_core::protocol::{Envelope, MessageType};

use crate::protocol::exchange;
use crate::transport::Connector;

/// Tell the server this agency has no more bets. A correlated ACK is success;
/// its payload is not interpreted.
pub async fn notify_finished(connector: &dyn Connector, agency: &str) -> Result<()> {
    let request = Envelope::request(MessageType::Finished, agency_payload(agency));
    match exchange(connector, &request, MessageType::Ack).await {
        Ok(_) => {
            tracing::info!(action = "notify_finished", result = "success", id = %request.id);
            Ok(())
        }
        Err(e) => {
            tracing::error!(action = "notify_finished", result = "fail", id = %request.id, error = %e);
            Err(e)
        }
    }
}
