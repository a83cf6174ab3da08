//! Credential minting.

use rand::RngCore;
use rand::rngs::OsRng;

/// Mint a fresh random credential (32 lowercase hex chars).
///
/// Used for both per-user API tokens and per-device tokens; the device
/// token doubles as the key-derivation input on the protocol side, so it
/// must come from the OS CSPRNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
