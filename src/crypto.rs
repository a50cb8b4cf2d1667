//! Kasa protocol obfuscation logic.
//! Implements the autokey XOR transform applied to every datagram payload.
//!
//! This is an obfuscation scheme, not a security boundary: there is no key
//! material beyond the well-known seed byte, and the transform is trivially
//! reversible by anyone on the wire.

/// Seed byte for the autokey keystream.
const KEY_SEED: u8 = 0xAB;

/// Encrypt a plaintext command body.
///
/// Each output byte is `key ^ input`, after which the key advances to the
/// byte just *produced*. Output length equals input length; no framing is
/// added here.
pub fn encrypt(plaintext: &[u8]) -> Vec<u8> {
    let mut key = KEY_SEED;
    let mut out = Vec::with_capacity(plaintext.len());
    for &c in plaintext {
        let b = key ^ c;
        key = b;
        out.push(b);
    }
    out
}

/// Decrypt a ciphertext reply body.
///
/// Each output byte is `key ^ input`, after which the key advances to the
/// byte just *consumed*. This asymmetry with [`encrypt`] is what makes the
/// transform self-inverse; the two loops must not be unified.
pub fn decrypt(ciphertext: &[u8]) -> Vec<u8> {
    let mut key = KEY_SEED;
    let mut out = Vec::with_capacity(ciphertext.len());
    for &c in ciphertext {
        out.push(key ^ c);
        key = c;
    }
    out
}
