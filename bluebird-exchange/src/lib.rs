//! Bluebird Exchange - secure credential exchange for device commissioning
//!
//! An initiator encrypts a WiFi credential for a responder over a short-range,
//! possibly eavesdropped link:
//!
//! 1. The responder generates a key pair and publishes its public key.
//! 2. The initiator generates an ephemeral key pair, runs X25519 or X448
//!    against the responder key, derives an AES-256 key with HKDF-SHA256 and
//!    encrypts the credential with AES-GCM under a random nonce.
//! 3. The payload `public_key || nonce || ciphertext+tag` goes over the link.
//! 4. The responder recomputes the shared secret from the embedded key and
//!    decrypts.
//!
//! # Example
//!
//! ```
//! use bluebird_exchange::{CurveProfile, ExchangeHandler};
//!
//! let mut responder = ExchangeHandler::responder(CurveProfile::X25519);
//! let responder_key = responder.generate_key_pair()?.to_vec();
//!
//! let initiator = ExchangeHandler::initiator(CurveProfile::X25519);
//! let payload = initiator.create_encrypted_payload(b"MyWiFiPass12345!", &responder_key)?;
//! assert_eq!(payload.len(), 60 + 16);
//!
//! assert_eq!(responder.decrypt_payload(&payload)?, b"MyWiFiPass12345!");
//! # Ok::<(), bluebird_exchange::Error>(())
//! ```

pub mod aead;
pub mod agreement;
mod error;
mod exchange;
pub mod kdf;

pub use agreement::{KeyAgreement, KeyPair, SharedSecret};
pub use error::{Error, ErrorKind, Result};
pub use exchange::{CredentialExchange, ExchangeHandler, Role};
pub use kdf::SymmetricKey;

pub use bluebird_proto::{CurveProfile, NONCE_LEN, ProtoError, TAG_LEN, WirePayload};
