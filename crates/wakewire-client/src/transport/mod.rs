//! Device transports.
//!
//! Two ways to reach a device, one capability: send a command, get a
//! response. Direct mode talks TCP to the device on the LAN; cloud mode
//! goes through the relay mailbox. Whatever goes wrong underneath, the
//! caller always receives a structured `{"status":"error"}` response,
//! never an `Err` to unwrap at the top of the CLI.

mod cloud;
mod direct;

pub use cloud::CloudTransport;
pub use direct::DirectTransport;

use tracing::warn;
use wakewire_proto::{Command, PacketError, Response};

/// Transport-level failures, before they are folded into a [`Response`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Operation timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Device closed the connection without responding")]
    NoResponse,

    #[error("Push rejected by relay: HTTP {status}")]
    PushFailed { status: u16 },

    #[error("Pull rejected by relay: HTTP {status}")]
    PullFailed { status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Packet(#[from] PacketError),
}

impl TransportError {
    /// Short machine-readable code carried in the `error` field.
    fn code(&self) -> String {
        match self {
            Self::Timeout => "TIMEOUT".into(),
            Self::ConnectionRefused => "CONNECTION_REFUSED".into(),
            Self::NoResponse => "NO_RESPONSE".into(),
            Self::PushFailed { .. } => "PUSH_FAILED".into(),
            Self::PullFailed { .. } => "PULL_FAILED".into(),
            Self::Io(e) => e.to_string(),
            Self::Http(e) => e.to_string(),
            Self::Packet(e) => e.to_string(),
        }
    }
}

/// A configured way to reach one device.
pub enum Transport {
    Direct(DirectTransport),
    Cloud(CloudTransport),
}

impl Transport {
    /// Send one command and wait for the device's answer.
    ///
    /// Failures come back as error responses so command handling has a
    /// single shape regardless of transport.
    pub async fn send_command(&self, command: &Command) -> Response {
        let result = match self {
            Self::Direct(t) => t.send(command).await,
            Self::Cloud(t) => t.send(command).await,
        };
        result.unwrap_or_else(|e| {
            warn!(command = %command.command, error = %e, "Command transport failed");
            Response::error(e.code())
        })
    }
}
