//! Cloud relay transport.
//!
//! The controller and the device never talk directly: the command is
//! pushed into the relay mailbox, the device picks it up on its next
//! poll and pushes its answer back, and the controller pulls that
//! answer. One push, one settle delay, one pull per call; the relay
//! only ever sees opaque envelopes.

use std::time::Duration;

use wakewire_proto::relay::{DIRECTION_TO_DEVICE, MSG_TYPE_COMMAND, PullRequest, PullResponse, PushRequest};
use wakewire_proto::{Command, PacketCodec, Response};

use super::TransportError;

/// Wait between push and pull for the device's poll/answer cycle.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

pub struct CloudTransport {
    http: reqwest::Client,
    base_url: String,
    device_token: String,
    device_id: String,
    codec: PacketCodec,
    settle_delay: Duration,
}

impl CloudTransport {
    pub fn new(
        base_url: &str,
        device_token: &str,
        device_id: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            device_token: device_token.to_owned(),
            device_id: device_id.to_owned(),
            codec: PacketCodec::new(device_token),
            settle_delay: DEFAULT_SETTLE_DELAY,
        })
    }

    /// Override the push-to-pull settle delay.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub(super) async fn send(&self, command: &Command) -> Result<Response, TransportError> {
        let envelope = self.codec.encode(command)?;

        let push = PushRequest {
            device_token: self.device_token.clone(),
            msg_type: MSG_TYPE_COMMAND.into(),
            encrypted_payload: envelope,
            is_response: false,
        };
        let resp = self
            .http
            .post(format!("{}/api/push", self.base_url))
            .json(&push)
            .send()
            .await
            .map_err(map_http)?;
        if !resp.status().is_success() {
            return Err(TransportError::PushFailed {
                status: resp.status().as_u16(),
            });
        }

        tokio::time::sleep(self.settle_delay).await;

        let pull = PullRequest {
            device_token: self.device_token.clone(),
            device_id: self.device_id.clone(),
        };
        let resp = self
            .http
            .post(format!("{}/api/pull", self.base_url))
            .json(&pull)
            .send()
            .await
            .map_err(map_http)?;
        if !resp.status().is_success() {
            return Err(TransportError::PullFailed {
                status: resp.status().as_u16(),
            });
        }
        let pulled: PullResponse = resp.json().await.map_err(map_http)?;

        for msg in pulled.messages {
            if msg.direction == DIRECTION_TO_DEVICE && !msg.data.is_empty() {
                return Ok(self.codec.decode_response(&msg.data)?);
            }
        }

        Ok(Response::timeout("No response from device"))
    }
}

fn map_http(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Http(e)
    }
}
