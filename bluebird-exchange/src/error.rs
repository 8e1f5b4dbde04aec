use bluebird_proto::ProtoError;

/// Failures of the credential exchange. None of them are retried here; the
/// initiator re-runs the whole exchange with a fresh key pair instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unsupported curve selector, fatal at construction
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Operation invoked before its required key pair exists, or by the wrong role
    #[error("invalid state: {0}")]
    State(&'static str),
    /// Peer public key of the wrong length or not a usable curve point
    #[error("invalid public key: {0}")]
    InvalidKey(String),
    /// Payload shorter than the minimum framing, or too long for the channel
    #[error("encoding error: {0}")]
    Encoding(ProtoError),
    /// Tag verification failed. Carries no detail.
    #[error("authentication failed")]
    Authentication,
    /// AEAD refused to encrypt (plaintext beyond the GCM size limit)
    #[error("encryption failed")]
    Cipher,
}

/// Fieldless discriminant of [`Error`], for transports that report a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    State,
    InvalidKey,
    Encoding,
    Authentication,
    Cipher,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::State(_) => ErrorKind::State,
            Error::InvalidKey(_) => ErrorKind::InvalidKey,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Authentication => ErrorKind::Authentication,
            Error::Cipher => ErrorKind::Cipher,
        }
    }
}

impl From<ProtoError> for Error {
    fn from(e: ProtoError) -> Self {
        match e {
            ProtoError::UnsupportedCurve(selector) => Error::Configuration(format!(
                "unsupported curve selector {selector:?}, expected curve25519 or curve448"
            )),
            e => Error::Encoding(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
