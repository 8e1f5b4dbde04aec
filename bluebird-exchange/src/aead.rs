//! AES-256-GCM with a caller-supplied nonce and no associated data

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use bluebird_proto::NONCE_LEN;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};
use crate::kdf::SymmetricKey;

/// Fresh random nonce. Every encryption takes a new one.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Returns ciphertext with the 16-byte tag appended
pub fn encrypt(key: &SymmetricKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| Error::Cipher)
}

/// Verify the trailing tag and return the plaintext.
///
/// Every failure is the same [`Error::Authentication`]; no plaintext is
/// released unless the tag checks out.
pub fn decrypt(
    key: &SymmetricKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext_with_tag: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext_with_tag)
        .map_err(|_| Error::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agreement::KeyPair;
    use crate::kdf;
    use bluebird_proto::{CurveProfile, TAG_LEN};

    fn key() -> SymmetricKey {
        let a = KeyPair::generate(CurveProfile::X25519).unwrap();
        let b = KeyPair::generate(CurveProfile::X25519).unwrap();
        kdf::derive(&a.diffie_hellman(b.public_key()).unwrap())
    }

    #[test]
    fn tag_is_appended() {
        let key = key();
        let nonce = generate_nonce();
        let ct = encrypt(&key, &nonce, b"secret").unwrap();
        assert_eq!(ct.len(), 6 + TAG_LEN);
        assert_eq!(decrypt(&key, &nonce, &ct).unwrap(), b"secret");
    }

    #[test]
    fn empty_plaintext_still_authenticated() {
        let key = key();
        let nonce = generate_nonce();
        let ct = encrypt(&key, &nonce, b"").unwrap();
        assert_eq!(ct.len(), TAG_LEN);
        assert!(decrypt(&key, &nonce, &ct).unwrap().is_empty());
    }

    #[test]
    fn wrong_key_nonce_or_tag_look_the_same() {
        let key = key();
        let nonce = generate_nonce();
        let ct = encrypt(&key, &nonce, b"MyWiFiPass12345!").unwrap();

        let wrong_key = decrypt(&self::key(), &nonce, &ct).unwrap_err();
        let wrong_nonce = decrypt(&key, &generate_nonce(), &ct).unwrap_err();
        let mut tampered = ct.clone();
        *tampered.last_mut().unwrap() ^= 0x01;
        let wrong_tag = decrypt(&key, &nonce, &tampered).unwrap_err();

        for err in [wrong_key, wrong_nonce, wrong_tag] {
            assert!(matches!(err, Error::Authentication));
            assert_eq!(err.to_string(), "authentication failed");
        }
    }

    #[test]
    fn truncated_below_tag() {
        let key = key();
        assert!(matches!(
            decrypt(&key, &generate_nonce(), &[0u8; 15]),
            Err(Error::Authentication)
        ));
    }

    #[test]
    fn nonces_differ() {
        assert_ne!(generate_nonce(), generate_nonce());
    }
}
