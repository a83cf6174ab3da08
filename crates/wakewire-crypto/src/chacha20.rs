//! ChaCha20 keystream (RFC 8439).
//!
//! State layout: 4 constant words, 8 key words, 1 counter word, 3 nonce
//! words, all little-endian. 10 double rounds (columns then diagonals),
//! then the working state is added word-wise back onto the initial state.
//!
//! The protocol uses the raw keystream XOR only; there is no Poly1305
//! tag. Tampering is detected downstream when the decrypted bytes fail
//! to parse as the expected JSON structure.

use crate::{CryptoError, KEY_LEN};

/// Cipher nonce length in bytes (the envelope carries 16 random bytes,
/// of which the first 12 feed the cipher).
pub const NONCE_LEN: usize = 12;

/// "expand 32-byte k"
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

#[inline]
const fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(16);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(12);
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(8);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(7);
}

/// Produce one 64-byte keystream block for `(key, nonce, counter)`.
///
/// Deterministic and side-effect free; both peers regenerate the same
/// keystream from the shared key and the nonce carried in the envelope.
pub fn chacha20_block(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], counter: u32) -> [u8; 64] {
    let mut state = [0u32; 16];
    state[..4].copy_from_slice(&CONSTANTS);
    for (i, word) in key.chunks_exact(4).enumerate() {
        state[4 + i] = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
    }
    state[12] = counter;
    for (i, word) in nonce.chunks_exact(4).enumerate() {
        state[13 + i] = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
    }

    let mut working = state;
    for _ in 0..10 {
        // Columns
        quarter_round(&mut working, 0, 4, 8, 12);
        quarter_round(&mut working, 1, 5, 9, 13);
        quarter_round(&mut working, 2, 6, 10, 14);
        quarter_round(&mut working, 3, 7, 11, 15);
        // Diagonals
        quarter_round(&mut working, 0, 5, 10, 15);
        quarter_round(&mut working, 1, 6, 11, 12);
        quarter_round(&mut working, 2, 7, 8, 13);
        quarter_round(&mut working, 3, 4, 9, 14);
    }

    let mut block = [0u8; 64];
    for (i, (w, s)) in working.iter().zip(state.iter()).enumerate() {
        block[i * 4..i * 4 + 4].copy_from_slice(&w.wrapping_add(*s).to_le_bytes());
    }
    block
}

/// XOR `data` against the keystream for `(key, nonce)`, counter starting
/// at 0. Encryption and decryption are the same operation.
///
/// Fails only on malformed key/nonce slice lengths.
pub fn xor_stream(key: &[u8], nonce: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let key: &[u8; KEY_LEN] = key
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: key.len(),
        })?;
    let nonce: &[u8; NONCE_LEN] = nonce
        .try_into()
        .map_err(|_| CryptoError::InvalidNonceLength {
            expected: NONCE_LEN,
            actual: nonce.len(),
        })?;

    let mut out = Vec::with_capacity(data.len());
    for (counter, chunk) in data.chunks(64).enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let block = chacha20_block(key, nonce, counter as u32);
        out.extend(chunk.iter().zip(block.iter()).map(|(d, k)| d ^ k));
    }
    Ok(out)
}
