//! Ephemeral key pairs and the Diffie-Hellman step
//!
//! Private scalars never leave this module: they are not serialized, not
//! logged, and zeroed when the owning [`KeyPair`] is dropped.

use bluebird_proto::CurveProfile;
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

const X25519_LEN: usize = 32;
const X448_LEN: usize = 56;

enum PrivateKey {
    X25519(x25519_dalek::StaticSecret),
    // Stored raw; `x448::Secret` is rebuilt (and clamped) for each exchange.
    X448(Zeroizing<[u8; X448_LEN]>),
}

/// Raw Diffie-Hellman output.
///
/// Only ever passed to key derivation; never used as a cipher key directly.
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A private scalar and its exportable public key
pub struct KeyPair {
    profile: CurveProfile,
    private: PrivateKey,
    public: Vec<u8>,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS random source
    pub fn generate(profile: CurveProfile) -> Result<Self> {
        let (private, public) = match profile {
            CurveProfile::X25519 => {
                let secret = x25519_dalek::StaticSecret::random_from_rng(OsRng);
                let public = x25519_dalek::PublicKey::from(&secret);
                (PrivateKey::X25519(secret), public.as_bytes().to_vec())
            }
            CurveProfile::X448 => {
                let mut bytes = Zeroizing::new([0u8; X448_LEN]);
                OsRng.fill_bytes(&mut bytes[..]);
                let public = x448::PublicKey::from(&x448_secret(&bytes));
                (PrivateKey::X448(bytes), public.as_bytes().to_vec())
            }
        };

        debug_assert_eq!(public.len(), profile.public_key_len());
        Ok(Self {
            profile,
            private,
            public,
        })
    }

    pub fn profile(&self) -> CurveProfile {
        self.profile
    }

    /// Raw public key, safe to publish
    pub fn public_key(&self) -> &[u8] {
        &self.public
    }

    /// Compute the shared secret against `peer_public`.
    ///
    /// The key length is checked before any curve arithmetic. Points that
    /// would force a non-contributory (all-zero) secret are rejected.
    pub fn diffie_hellman(&self, peer_public: &[u8]) -> Result<SharedSecret> {
        let expected = self.profile.public_key_len();
        if peer_public.len() != expected {
            return Err(Error::InvalidKey(format!(
                "{} public key must be {expected} bytes, got {}",
                self.profile,
                peer_public.len()
            )));
        }

        let shared = match &self.private {
            PrivateKey::X25519(secret) => {
                // Curve25519 ignores bit 255; accepting it set would let two
                // encodings of one point through.
                if peer_public[X25519_LEN - 1] & 0x80 != 0 {
                    return Err(Error::InvalidKey(format!(
                        "non-canonical {} public key",
                        self.profile
                    )));
                }
                let mut peer = [0u8; X25519_LEN];
                peer.copy_from_slice(peer_public);
                let shared = secret.diffie_hellman(&x25519_dalek::PublicKey::from(peer));
                if !shared.was_contributory() {
                    return Err(low_order(self.profile));
                }
                shared.as_bytes().to_vec()
            }
            PrivateKey::X448(bytes) => {
                let peer = x448::PublicKey::from_bytes(peer_public)
                    .ok_or_else(|| low_order(self.profile))?;
                let shared = x448_secret(bytes)
                    .as_diffie_hellman(&peer)
                    .ok_or_else(|| low_order(self.profile))?;
                shared.as_bytes().to_vec()
            }
        };

        debug_assert_eq!(shared.len(), self.profile.shared_secret_len());
        Ok(SharedSecret(Zeroizing::new(shared)))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("profile", &self.profile)
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

fn x448_secret(bytes: &[u8; X448_LEN]) -> x448::Secret {
    // from_bytes only rejects slices that are not 56 bytes long
    x448::Secret::from_bytes(bytes).expect("56 bytes is always a curve448 scalar")
}

fn low_order(profile: CurveProfile) -> Error {
    Error::InvalidKey(format!("not a usable {profile} point"))
}

enum KeyState {
    Uninitialized,
    Keyed(KeyPair),
}

/// Key agreement bound to one curve profile.
///
/// Starts without a key pair; [`KeyAgreement::derive_shared_secret`] fails
/// with [`Error::State`] until [`KeyAgreement::generate_key_pair`] has run.
pub struct KeyAgreement {
    profile: CurveProfile,
    state: KeyState,
}

impl KeyAgreement {
    pub fn new(profile: CurveProfile) -> Self {
        Self {
            profile,
            state: KeyState::Uninitialized,
        }
    }

    pub fn profile(&self) -> CurveProfile {
        self.profile
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self.state, KeyState::Keyed(_))
    }

    /// Generate a key pair, dropping (and zeroing) any previous one.
    /// Returns the new public key.
    pub fn generate_key_pair(&mut self) -> Result<&[u8]> {
        self.state = KeyState::Keyed(KeyPair::generate(self.profile)?);
        self.public_key()
    }

    pub fn key_pair(&self) -> Result<&KeyPair> {
        match &self.state {
            KeyState::Keyed(pair) => Ok(pair),
            KeyState::Uninitialized => Err(Error::State(
                "no key pair generated, call generate_key_pair first",
            )),
        }
    }

    pub fn public_key(&self) -> Result<&[u8]> {
        Ok(self.key_pair()?.public_key())
    }

    pub fn derive_shared_secret(&self, peer_public: &[u8]) -> Result<SharedSecret> {
        self.key_pair()?.diffie_hellman(peer_public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_lengths() {
        for profile in CurveProfile::ALL {
            let pair = KeyPair::generate(profile).unwrap();
            assert_eq!(pair.public_key().len(), profile.public_key_len());
        }
    }

    #[test]
    fn both_sides_agree() {
        for profile in CurveProfile::ALL {
            let alice = KeyPair::generate(profile).unwrap();
            let bob = KeyPair::generate(profile).unwrap();

            let ab = alice.diffie_hellman(bob.public_key()).unwrap();
            let ba = bob.diffie_hellman(alice.public_key()).unwrap();
            assert_eq!(ab.as_bytes(), ba.as_bytes());
            assert_eq!(ab.as_bytes().len(), profile.shared_secret_len());
        }
    }

    #[test]
    fn different_peers_different_secrets() {
        let alice = KeyPair::generate(CurveProfile::X25519).unwrap();
        let bob = KeyPair::generate(CurveProfile::X25519).unwrap();
        let carol = KeyPair::generate(CurveProfile::X25519).unwrap();

        let ab = alice.diffie_hellman(bob.public_key()).unwrap();
        let ac = alice.diffie_hellman(carol.public_key()).unwrap();
        assert_ne!(ab.as_bytes(), ac.as_bytes());
    }

    #[test]
    fn wrong_length_rejected() {
        let pair = KeyPair::generate(CurveProfile::X448).unwrap();
        let other = KeyPair::generate(CurveProfile::X25519).unwrap();

        let err = pair.diffie_hellman(other.public_key()).unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
        assert!(matches!(pair.diffie_hellman(&[]), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn low_order_points_rejected() {
        for profile in CurveProfile::ALL {
            let pair = KeyPair::generate(profile).unwrap();
            let zero = vec![0u8; profile.public_key_len()];
            assert!(matches!(
                pair.diffie_hellman(&zero),
                Err(Error::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn x25519_high_bit_rejected() {
        let alice = KeyPair::generate(CurveProfile::X25519).unwrap();
        let bob = KeyPair::generate(CurveProfile::X25519).unwrap();
        let mut key = bob.public_key().to_vec();
        assert_eq!(key[31] & 0x80, 0);
        key[31] |= 0x80;
        assert!(matches!(alice.diffie_hellman(&key), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn derive_before_generate_is_a_state_error() {
        let engine = KeyAgreement::new(CurveProfile::X25519);
        assert!(!engine.is_keyed());
        assert!(matches!(engine.public_key(), Err(Error::State(_))));
        assert!(matches!(
            engine.derive_shared_secret(&[9u8; 32]),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn regenerate_replaces_key_pair() {
        let mut engine = KeyAgreement::new(CurveProfile::X25519);
        let first = engine.generate_key_pair().unwrap().to_vec();
        let second = engine.generate_key_pair().unwrap().to_vec();
        assert!(engine.is_keyed());
        assert_ne!(first, second);
        assert_eq!(engine.public_key().unwrap(), second.as_slice());
    }

    #[test]
    fn stored_x448_scalar_matches_public_key() {
        let pair = KeyPair::generate(CurveProfile::X448).unwrap();
        let PrivateKey::X448(bytes) = &pair.private else {
            panic!("expected a curve448 scalar");
        };
        let public = x448::PublicKey::from(&x448_secret(bytes));
        assert_eq!(&public.as_bytes()[..], pair.public_key());
    }

    #[test]
    fn x25519_secret_matches_public_key() {
        let pair = KeyPair::generate(CurveProfile::X25519).unwrap();
        let PrivateKey::X25519(secret) = &pair.private else {
            panic!("expected a curve25519 secret");
        };
        let public = x25519_dalek::PublicKey::from(secret);
        assert_eq!(&public.as_bytes()[..], pair.public_key());
    }

    #[test]
    fn debug_redacts_private_key() {
        let pair = KeyPair::generate(CurveProfile::X25519).unwrap();
        let shown = format!("{pair:?}");
        assert!(shown.contains("[REDACTED]"));
    }
}
