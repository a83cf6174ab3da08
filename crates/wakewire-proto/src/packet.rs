//! Encrypted packet codec.
//!
//! Wire envelope, transmitted as a lowercase hex string:
//!
//! ```text
//! [length: u16 BE][ciphertext: length bytes][nonce material: 16 bytes]
//! ```
//!
//! The first 12 of the 16 trailing nonce bytes feed the ChaCha20 cipher;
//! all 16 travel verbatim so the receiver can regenerate the keystream.
//! Plaintext is capped at 500 bytes to fit the firmware's fixed buffers.

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Serialize;
use serde_json::Value;
use wakewire_crypto::{NONCE_LEN, derive_key, xor_stream};

use crate::command::Response;
use crate::error::PacketError;

/// Maximum serialized plaintext length in bytes.
pub const MAX_PLAINTEXT_LEN: usize = 500;

/// Random bytes appended to every envelope (first [`NONCE_LEN`] feed the cipher).
pub const NONCE_MATERIAL_LEN: usize = 16;

/// Smallest structurally valid envelope: length prefix + 0 ciphertext
/// bytes + nonce material. A zero data length is itself rejected, so
/// real packets are always strictly larger.
pub const MIN_PACKET_LEN: usize = 2 + NONCE_MATERIAL_LEN;

/// Stateless codec bound to one device token.
///
/// Derives the symmetric key once and reuses it for every envelope in
/// either direction.
pub struct PacketCodec {
    key: [u8; 32],
}

impl PacketCodec {
    pub fn new(token: &str) -> Self {
        Self {
            key: derive_key(token),
        }
    }

    /// Serialize `payload` to JSON, encrypt it and wrap it in an envelope.
    ///
    /// Fails with [`PacketError::PayloadTooLarge`] before any encryption
    /// when the serialized form exceeds [`MAX_PLAINTEXT_LEN`] bytes.
    pub fn encode<T: Serialize>(&self, payload: &T) -> Result<String, PacketError> {
        let plaintext = serde_json::to_vec(payload)?;
        if plaintext.len() > MAX_PLAINTEXT_LEN {
            return Err(PacketError::PayloadTooLarge {
                len: plaintext.len(),
            });
        }

        let mut nonce_material = [0u8; NONCE_MATERIAL_LEN];
        OsRng.fill_bytes(&mut nonce_material);

        let ciphertext = xor_stream(&self.key, &nonce_material[..NONCE_LEN], &plaintext)?;

        #[allow(clippy::cast_possible_truncation)]
        let len = plaintext.len() as u16;
        let mut packet = Vec::with_capacity(2 + ciphertext.len() + NONCE_MATERIAL_LEN);
        packet.extend_from_slice(&len.to_be_bytes());
        packet.extend_from_slice(&ciphertext);
        packet.extend_from_slice(&nonce_material);

        Ok(hex::encode(packet))
    }

    /// Unwrap and decrypt an envelope back into a JSON value.
    ///
    /// Validation ladder: hex decode, minimum size, declared length in
    /// `1..=500`, exact total size. Decrypted bytes go through lossy
    /// UTF-8 recovery before JSON parsing, so garbage bytes surface as
    /// [`PacketError::InvalidJson`] rather than a panic.
    pub fn decode(&self, hex_packet: &str) -> Result<Value, PacketError> {
        let packet = hex::decode(hex_packet.trim())
            .map_err(|e| PacketError::MalformedPacket(format!("invalid hex: {e}")))?;

        if packet.len() < MIN_PACKET_LEN {
            return Err(PacketError::MalformedPacket(format!(
                "packet size {} < {MIN_PACKET_LEN}",
                packet.len()
            )));
        }

        let declared = u16::from_be_bytes([packet[0], packet[1]]);
        if declared == 0 || declared as usize > MAX_PLAINTEXT_LEN {
            return Err(PacketError::InvalidLength { declared });
        }

        let expected = 2 + declared as usize + NONCE_MATERIAL_LEN;
        if packet.len() != expected {
            return Err(PacketError::LengthMismatch {
                expected,
                actual: packet.len(),
            });
        }

        let ciphertext = &packet[2..2 + declared as usize];
        let nonce = &packet[2 + declared as usize..2 + declared as usize + NONCE_LEN];

        let plaintext = xor_stream(&self.key, nonce, ciphertext)?;
        let text = String::from_utf8_lossy(&plaintext);

        Ok(serde_json::from_str(&text)?)
    }

    /// [`Self::decode`] narrowed to a response object.
    pub fn decode_response(&self, hex_packet: &str) -> Result<Response, PacketError> {
        match self.decode(hex_packet)? {
            Value::Object(fields) => Ok(Response::from_map(fields)),
            other => Err(PacketError::MalformedPacket(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}
