//! Direct TCP transport.
//!
//! One connection per command, newline-framed hex envelopes both ways.
//! A single deadline covers connect, send and receive, so a slow device
//! cannot stretch the call past the configured timeout.

use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use wakewire_proto::{Command, PacketCodec, Response};

use super::TransportError;

pub struct DirectTransport {
    addr: String,
    codec: PacketCodec,
    timeout: Duration,
}

impl DirectTransport {
    pub fn new(ip: &str, port: u16, token: &str, timeout: Duration) -> Self {
        Self {
            addr: format!("{ip}:{port}"),
            codec: PacketCodec::new(token),
            timeout,
        }
    }

    pub(super) async fn send(&self, command: &Command) -> Result<Response, TransportError> {
        let deadline = Instant::now() + self.timeout;

        let mut stream = match timeout_at(deadline, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                return Err(TransportError::ConnectionRefused);
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(TransportError::Timeout),
        };

        let mut envelope = self.codec.encode(command)?;
        envelope.push('\n');
        match timeout_at(deadline, stream.write_all(envelope.as_bytes())).await {
            Ok(result) => result?,
            Err(_) => return Err(TransportError::Timeout),
        }

        // Accumulate until a newline, EOF or the deadline. A deadline hit
        // with bytes in hand still gets decoded; devices do not always
        // terminate the last line.
        let mut received = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            match timeout_at(deadline, stream.read(&mut chunk)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    received.extend_from_slice(&chunk[..n]);
                    if received.contains(&b'\n') {
                        break;
                    }
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => break,
            }
        }

        if received.is_empty() {
            return Err(TransportError::NoResponse);
        }

        let text = String::from_utf8_lossy(&received);
        Ok(self.codec.decode_response(text.trim())?)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::transport::Transport;
    use serde_json::json;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use wakewire_proto::ResponseStatus;

    const TOKEN: &str = "direct-test-token";

    /// One-shot device stub: reads a framed envelope, decodes it, and
    /// answers with `reply` (or silently closes when `reply` is `None`).
    async fn spawn_device(reply: Option<serde_json::Value>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    return;
                }
                received.extend_from_slice(&chunk[..n]);
                if received.contains(&b'\n') {
                    break;
                }
            }

            let codec = PacketCodec::new(TOKEN);
            let text = String::from_utf8_lossy(&received);
            codec.decode(text.trim()).unwrap();

            if let Some(reply) = reply {
                let mut envelope = codec.encode(&reply).unwrap();
                envelope.push('\n');
                stream.write_all(envelope.as_bytes()).await.unwrap();
            }
        });

        addr
    }

    fn transport(addr: SocketAddr, timeout: Duration) -> DirectTransport {
        DirectTransport::new(&addr.ip().to_string(), addr.port(), TOKEN, timeout)
    }

    #[tokio::test]
    async fn successful_command_roundtrip() {
        let addr = spawn_device(Some(json!({"status": "success", "uptime": 42}))).await;
        let t = transport(addr, Duration::from_secs(5));

        let resp = t.send(&Command::ping("esp1")).await.unwrap();
        assert_eq!(resp.status(), ResponseStatus::Success);
        assert_eq!(resp.get("uptime"), Some(&json!(42)));
    }

    #[tokio::test]
    async fn silent_close_is_no_response() {
        let addr = spawn_device(None).await;
        let t = transport(addr, Duration::from_secs(5));

        let err = t.send(&Command::ping("esp1")).await.unwrap_err();
        assert!(matches!(err, TransportError::NoResponse));
    }

    #[tokio::test]
    async fn mute_device_hits_the_deadline_with_nothing_read() {
        // Accepts but never reads or writes.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let t = transport(addr, Duration::from_millis(200));
        let err = t.send(&Command::ping("esp1")).await.unwrap_err();
        assert!(matches!(err, TransportError::NoResponse));
    }

    #[tokio::test]
    async fn refused_connection_is_reported_as_such() {
        // Bind to grab a free port, then drop the listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let t = transport(addr, Duration::from_secs(5));
        let err = t.send(&Command::ping("esp1")).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionRefused));
    }

    #[tokio::test]
    async fn transport_boundary_folds_errors_into_responses() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let t = Transport::Direct(transport(addr, Duration::from_secs(5)));
        let resp = t.send_command(&Command::ping("esp1")).await;
        assert_eq!(resp.status(), ResponseStatus::Error);
        assert_eq!(resp.get("error"), Some(&json!("CONNECTION_REFUSED")));
    }
}
