//! `WakeWire` Symmetric Crypto Library
//!
//! Dependency-free primitives shared by every transport:
//!
//! - **Key derivation**: SHA-256 over the device token's UTF-8 bytes
//!   yields the 32-byte symmetric key. The token itself never travels.
//! - **Payload confidentiality**: ChaCha20 keystream (RFC 8439 block
//!   function, counter starting at 0) XORed over the plaintext. XOR is
//!   its own inverse, so [`xor_stream`] serves both directions.
//!
//! The firmware targets microcontrollers, so both sides of the protocol
//! pin the exact same bit-level construction rather than an AEAD suite.

pub mod chacha20;
pub mod error;
pub mod sha256;

pub use chacha20::{NONCE_LEN, chacha20_block, xor_stream};
pub use error::CryptoError;
pub use sha256::sha256;

/// Symmetric key length in bytes.
pub const KEY_LEN: usize = 32;

/// Derive the 32-byte symmetric key from a shared device token.
pub fn derive_key(token: &str) -> [u8; KEY_LEN] {
    sha256(token.as_bytes())
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_is_sha256_of_token_bytes() {
        let key = derive_key("t0p-secret");
        assert_eq!(key, sha256(b"t0p-secret"));
        assert_ne!(key, derive_key("t0p-secret2"));
    }

    #[test]
    fn encrypt_then_decrypt_restores_plaintext() {
        let key = derive_key("roundtrip-token");
        let nonce = [7u8; NONCE_LEN];
        let plaintext = b"{\"command\":\"ping\"}";

        let ciphertext = xor_stream(&key, &nonce, plaintext).unwrap();
        assert_ne!(ciphertext.as_slice(), plaintext.as_slice());

        let recovered = xor_stream(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(recovered.as_slice(), plaintext.as_slice());
    }
}
