//! Packet codec error types.

use wakewire_crypto::CryptoError;

use crate::packet::MAX_PLAINTEXT_LEN;

/// Errors from encoding or decoding an encrypted envelope.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("Payload too large: {len} > {MAX_PLAINTEXT_LEN} bytes")]
    PayloadTooLarge { len: usize },

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Invalid data length: {declared}")]
    InvalidLength { declared: u16 },

    #[error("Invalid packet size: got {actual}, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Decrypt failed: {0}")]
    DecryptFailed(#[from] CryptoError),

    #[error("Invalid JSON in decrypted payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
