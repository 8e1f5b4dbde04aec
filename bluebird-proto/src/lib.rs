//! Bluebird wire protocol - curve profiles and payload framing
//!
//! The credential payload is a raw concatenation with no version byte and no
//! length prefix:
//!
//! ```text
//! public_key (profile length) || nonce (12) || ciphertext || tag (16)
//! ```

pub mod ble;
mod curve;

pub use curve::CurveProfile;

/// AES-GCM nonce length
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length, trailing the ciphertext
pub const TAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtoError {
    #[error("unsupported curve selector {0:?}, expected curve25519 or curve448")]
    UnsupportedCurve(String),
    #[error("payload too short: {len} bytes, need at least {min}")]
    Truncated { len: usize, min: usize },
    #[error("payload of {len} bytes exceeds channel MTU of {mtu}")]
    ExceedsMtu { len: usize, mtu: usize },
}

/// Decoded credential payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirePayload {
    /// Sender's ephemeral public key, raw bytes
    pub public_key: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext with the 16-byte tag at the end
    pub ciphertext: Vec<u8>,
}

impl WirePayload {
    pub fn new(public_key: Vec<u8>, nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            public_key,
            nonce,
            ciphertext,
        }
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.public_key.len() + NONCE_LEN + self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        buf.extend_from_slice(&self.public_key);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Split a received payload at the offsets implied by `profile`.
    ///
    /// Anything shorter than the profile overhead cannot even hold an empty
    /// plaintext's tag and is rejected before any cryptography runs.
    pub fn from_bytes(profile: CurveProfile, data: &[u8]) -> Result<Self, ProtoError> {
        let min = profile.overhead();
        if data.len() < min {
            return Err(ProtoError::Truncated {
                len: data.len(),
                min,
            });
        }

        let key_end = profile.public_key_len();
        let nonce_end = key_end + NONCE_LEN;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[key_end..nonce_end]);

        Ok(Self {
            public_key: data[..key_end].to_vec(),
            nonce,
            ciphertext: data[nonce_end..].to_vec(),
        })
    }
}

/// Reject a payload that would not fit into a single transport write.
///
/// The protocol never chunks; an oversize payload means the plaintext is too
/// long for the negotiated MTU.
pub fn check_mtu(len: usize, mtu: usize) -> Result<(), ProtoError> {
    if len > mtu {
        return Err(ProtoError::ExceedsMtu { len, mtu });
    }
    Ok(())
}
