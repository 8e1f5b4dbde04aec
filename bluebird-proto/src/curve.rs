//! Curve profiles - the only negotiated parameter of the exchange

use std::fmt;
use std::str::FromStr;

use crate::{NONCE_LEN, ProtoError, TAG_LEN};

/// Elliptic curve used for the Diffie-Hellman step.
///
/// Both sides must agree on the profile out of band: the payload carries no
/// version byte, so the public key length is implied by the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveProfile {
    /// Curve25519: 32-byte keys, 60 bytes of framing overhead
    X25519,
    /// Curve448: 56-byte keys, 84 bytes of framing overhead
    X448,
}

impl CurveProfile {
    pub const ALL: [CurveProfile; 2] = [CurveProfile::X25519, CurveProfile::X448];

    /// Raw public key length in bytes
    pub const fn public_key_len(self) -> usize {
        match self {
            CurveProfile::X25519 => 32,
            CurveProfile::X448 => 56,
        }
    }

    /// Raw Diffie-Hellman output length in bytes
    pub const fn shared_secret_len(self) -> usize {
        match self {
            CurveProfile::X25519 => 32,
            CurveProfile::X448 => 56,
        }
    }

    /// Bytes added on top of the plaintext: public key, nonce and tag
    pub const fn overhead(self) -> usize {
        self.public_key_len() + NONCE_LEN + TAG_LEN
    }

    /// Total wire length for a plaintext of `plaintext_len` bytes
    pub const fn payload_len(self, plaintext_len: usize) -> usize {
        self.overhead() + plaintext_len
    }

    /// Largest plaintext that still fits into a single write of `mtu` bytes
    pub const fn max_plaintext_len(self, mtu: usize) -> usize {
        mtu.saturating_sub(self.overhead())
    }

    /// Canonical selector string, accepted back by `FromStr`
    pub const fn as_str(self) -> &'static str {
        match self {
            CurveProfile::X25519 => "curve25519",
            CurveProfile::X448 => "curve448",
        }
    }
}

impl fmt::Display for CurveProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveProfile {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curve25519" | "x25519" => Ok(CurveProfile::X25519),
            "curve448" | "x448" => Ok(CurveProfile::X448),
            _ => Err(ProtoError::UnsupportedCurve(s.to_string())),
        }
    }
}
