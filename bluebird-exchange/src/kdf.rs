//! HKDF-SHA256 from shared secret to AES-256 key

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::agreement::SharedSecret;

/// Domain separation label. Both roles must use it byte for byte; a mismatch
/// produces different keys and surfaces only as an authentication failure.
pub const INFO_LABEL: &[u8] = b"handshake data";

pub const KEY_LEN: usize = 32;

/// AES-256 key derived from one shared secret, owned by a single
/// encrypt or decrypt call
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Extract-and-expand with no salt and the fixed [`INFO_LABEL`].
pub fn derive(shared_secret: &SharedSecret) -> SymmetricKey {
    derive_from_bytes(shared_secret.as_bytes())
}

fn derive_from_bytes(ikm: &[u8]) -> SymmetricKey {
    let hkdf = Hkdf::<Sha256>::new(None, ikm);
    let mut key = [0u8; KEY_LEN];
    // 32 bytes is far below the 255 * 32 byte HKDF-SHA256 output limit
    hkdf.expand(INFO_LABEL, &mut key)
        .expect("HKDF-SHA256 can always expand to 32 bytes");
    SymmetricKey(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = derive_from_bytes(&[7u8; 32]);
        let b = derive_from_bytes(&[7u8; 32]);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn output_differs_from_input() {
        let ikm = [7u8; 32];
        let key = derive_from_bytes(&ikm);
        assert_ne!(key.as_bytes(), &ikm);
        assert_ne!(derive_from_bytes(&[8u8; 32]).as_bytes(), key.as_bytes());
    }

    #[test]
    fn absent_salt_is_hash_len_zeros() {
        // RFC 5869 2.2: a missing salt is HashLen zero bytes
        let key = derive_from_bytes(&[0x0b; 22]);
        let hk = Hkdf::<Sha256>::new(Some(&[0u8; 32]), &[0x0b; 22]);
        let mut expected = [0u8; KEY_LEN];
        hk.expand(b"handshake data", &mut expected).unwrap();
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn debug_redacts() {
        assert!(format!("{:?}", derive_from_bytes(&[1u8; 32])).contains("[REDACTED]"));
    }
}
