//! Initiator and responder sides of the credential exchange
//!
//! One handler type serves both roles. The initiator generates a new
//! ephemeral key pair inside every [`ExchangeHandler::create_encrypted_payload`]
//! call; the responder generates its key pair once per commissioning attempt
//! and publishes the public half.

use bluebird_proto::{CurveProfile, WirePayload};
use log::{debug, warn};

use crate::agreement::{KeyAgreement, KeyPair};
use crate::error::{Error, Result};
use crate::{aead, kdf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Client: encrypts credentials for a published responder key
    Initiator,
    /// Server: holds a key pair and decrypts inbound payloads
    Responder,
}

/// The surface a transport needs from the protocol core: raw bytes in, raw
/// bytes out.
pub trait CredentialExchange {
    /// Encrypt `plaintext` for `peer_public_key` and frame it for sending
    fn produce_payload(&self, plaintext: &[u8], peer_public_key: &[u8]) -> Result<Vec<u8>>;

    /// Decode, authenticate and decrypt a received payload
    fn consume_payload(&self, payload: &[u8]) -> Result<Vec<u8>>;

    /// Public key to publish to initiators
    fn own_public_key(&self) -> Result<&[u8]>;
}

/// Orchestrates key agreement, key derivation, AEAD and framing for one role.
///
/// Shared secrets and symmetric keys live only inside a single call. A handler
/// is meant for one session: give every concurrent commissioning session its
/// own instance.
pub struct ExchangeHandler {
    role: Role,
    keys: KeyAgreement,
}

impl ExchangeHandler {
    pub fn new(profile: CurveProfile, role: Role) -> Self {
        Self {
            role,
            keys: KeyAgreement::new(profile),
        }
    }

    pub fn initiator(profile: CurveProfile) -> Self {
        Self::new(profile, Role::Initiator)
    }

    pub fn responder(profile: CurveProfile) -> Self {
        Self::new(profile, Role::Responder)
    }

    /// Build a handler from a curve selector such as `"curve448"`
    pub fn from_selector(selector: &str, role: Role) -> Result<Self> {
        let profile: CurveProfile = selector.parse()?;
        Ok(Self::new(profile, role))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn profile(&self) -> CurveProfile {
        self.keys.profile()
    }

    pub fn is_keyed(&self) -> bool {
        self.keys.is_keyed()
    }

    /// Generate this handler's own key pair and return its public key.
    ///
    /// Calling it again replaces the pair; the responder does so between
    /// commissioning attempts so no key outlives one transaction.
    pub fn generate_key_pair(&mut self) -> Result<&[u8]> {
        let profile = self.profile();
        let public = self.keys.generate_key_pair()?;
        debug!("generated {profile} key pair");
        Ok(public)
    }

    pub fn public_key(&self) -> Result<&[u8]> {
        self.keys.public_key()
    }

    /// Full initiator side of the protocol in one call: fresh ephemeral key
    /// pair, ECDH against `peer_public_key`, HKDF, AES-GCM under a fresh nonce,
    /// framing.
    pub fn create_encrypted_payload(
        &self,
        plaintext: &[u8],
        peer_public_key: &[u8],
    ) -> Result<Vec<u8>> {
        if self.role != Role::Initiator {
            return Err(Error::State("only an initiator produces payloads"));
        }

        let profile = self.profile();
        let ephemeral = KeyPair::generate(profile)?;
        let key = kdf::derive(&ephemeral.diffie_hellman(peer_public_key)?);

        let nonce = aead::generate_nonce();
        let ciphertext = aead::encrypt(&key, &nonce, plaintext)?;

        let payload = WirePayload::new(ephemeral.public_key().to_vec(), nonce, ciphertext);
        debug!(
            "produced {profile} payload: {} bytes for {} bytes of plaintext",
            payload.len(),
            plaintext.len()
        );
        Ok(payload.to_bytes())
    }

    /// Responder side: split the payload, recompute the shared secret from the
    /// embedded initiator key, derive the same key, authenticate and decrypt.
    pub fn decrypt_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if self.role != Role::Responder {
            return Err(Error::State("only a responder decrypts payloads"));
        }

        let pair = self.keys.key_pair()?;
        let profile = pair.profile();

        let result = WirePayload::from_bytes(profile, payload)
            .map_err(Error::from)
            .and_then(|wire| {
                let key = kdf::derive(&pair.diffie_hellman(&wire.public_key)?);
                aead::decrypt(&key, &wire.nonce, &wire.ciphertext)
            });

        match &result {
            Ok(plaintext) => debug!(
                "decrypted {profile} payload: {} bytes of plaintext",
                plaintext.len()
            ),
            Err(e) => warn!("rejected {profile} payload of {} bytes: {e}", payload.len()),
        }
        result
    }
}

impl CredentialExchange for ExchangeHandler {
    fn produce_payload(&self, plaintext: &[u8], peer_public_key: &[u8]) -> Result<Vec<u8>> {
        self.create_encrypted_payload(plaintext, peer_public_key)
    }

    fn consume_payload(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_payload(payload)
    }

    fn own_public_key(&self) -> Result<&[u8]> {
        self.public_key()
    }
}

impl std::fmt::Debug for ExchangeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeHandler")
            .field("role", &self.role)
            .field("profile", &self.profile())
            .field("keyed", &self.is_keyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn keyed_responder(profile: CurveProfile) -> ExchangeHandler {
        let mut responder = ExchangeHandler::responder(profile);
        responder.generate_key_pair().unwrap();
        responder
    }

    #[test]
    fn round_trip() {
        for profile in CurveProfile::ALL {
            let responder = keyed_responder(profile);
            let initiator = ExchangeHandler::initiator(profile);

            let payload = initiator
                .create_encrypted_payload(b"hunter2", responder.public_key().unwrap())
                .unwrap();
            assert_eq!(responder.decrypt_payload(&payload).unwrap(), b"hunter2");
        }
    }

    #[test]
    fn unknown_selector() {
        let err = ExchangeHandler::from_selector("secp256k1", Role::Initiator).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let handler = ExchangeHandler::from_selector("x448", Role::Responder).unwrap();
        assert_eq!(handler.profile(), CurveProfile::X448);
        assert_eq!(handler.role(), Role::Responder);
    }

    #[test]
    fn responder_must_generate_first() {
        let responder = ExchangeHandler::responder(CurveProfile::X25519);
        assert!(matches!(responder.public_key(), Err(Error::State(_))));
        assert!(matches!(
            responder.decrypt_payload(&[0u8; 100]),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn roles_are_enforced() {
        let responder = keyed_responder(CurveProfile::X25519);
        let initiator = ExchangeHandler::initiator(CurveProfile::X25519);

        assert!(matches!(
            responder.create_encrypted_payload(b"x", responder.public_key().unwrap()),
            Err(Error::State(_))
        ));
        assert!(matches!(
            initiator.decrypt_payload(&[0u8; 100]),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn initiator_does_not_keep_keys() {
        let responder = keyed_responder(CurveProfile::X25519);
        let initiator = ExchangeHandler::initiator(CurveProfile::X25519);
        initiator
            .create_encrypted_payload(b"x", responder.public_key().unwrap())
            .unwrap();
        assert!(!initiator.is_keyed());
    }

    #[test]
    fn trait_entry_points() {
        let responder = keyed_responder(CurveProfile::X448);
        let initiator = ExchangeHandler::initiator(CurveProfile::X448);

        let exchange: &dyn CredentialExchange = &initiator;
        let payload = exchange
            .produce_payload(b"abc", responder.own_public_key().unwrap())
            .unwrap();
        assert_eq!(responder.consume_payload(&payload).unwrap(), b"abc");
    }

    #[test]
    fn debug_does_not_leak() {
        let shown = format!("{:?}", keyed_responder(CurveProfile::X25519));
        assert!(shown.contains("keyed: true"));
    }
}
