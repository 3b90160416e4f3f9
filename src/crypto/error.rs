//! Unified cryptographic error type.
//!
//! Each component has its own error enum; [`CryptoError`] aggregates them
//! and keeps the original error reachable through `#[source]`.
//!
//! # Classification
//!
//! Callers usually only need to know which of three things went wrong,
//! exposed through [`CryptoError::kind`]:
//!
//! | Kind                    | Meaning                                         |
//! |-------------------------|-------------------------------------------------|
//! | `Configuration`         | Bad construction parameters (key size, digits)  |
//! | `MalformedInput`        | Too short, misaligned, bad alphabet or padding  |
//! | `AuthenticationFailure` | MAC or AEAD tag did not verify                  |
//! | `Unavailable`           | System RNG could not produce bytes              |
//!
//! None of these are retried here. Messages never contain key bytes,
//! plaintext or tags.

use thiserror::Error;

use super::kdf::KdfError;
use super::keyring::{KeyError, KeyringError};
use super::mac::MacError;
use super::random::RandomError;
use crate::encoding::EncodingError;

/// Coarse failure classification shared by every component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid construction parameters; surfaced at construction time.
    Configuration,
    /// Input bytes or text that cannot be parsed.
    MalformedInput,
    /// Tag verification failed; nothing was decrypted.
    AuthenticationFailure,
    /// The secure random source failed.
    Unavailable,
}

/// Errors from cipher operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// Input is shorter than the scheme's minimum framing
    #[error("Ciphertext too short: {actual} bytes (need at least {min})")]
    DataTooShort {
        /// Minimum framed length
        min: usize,
        /// Received length
        actual: usize,
    },

    /// Block ciphertext not a multiple of the block size
    #[error("Ciphertext length {len} is not a multiple of {block} bytes")]
    Misaligned {
        /// Received ciphertext length
        len: usize,
        /// Block size
        block: usize,
    },

    /// PKCS#7 padding did not validate
    #[error("Invalid block padding")]
    BadPadding,

    /// Nonce has the wrong length for this scheme
    #[error("Nonce must be {expected} bytes, got {actual}")]
    InvalidNonce {
        /// Configured nonce length
        expected: usize,
        /// Provided nonce length
        actual: usize,
    },

    /// Encryption failed inside the primitive
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Tag mismatch (ciphertext or tag corrupted, or wrong key)
    #[error("Authentication failed")]
    AuthenticationFailed,
}

/// Unified error type for all cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Text or integer decoding error.
    #[error("Encoding: {0}")]
    Encoding(#[source] EncodingError),

    /// Key material error (wrong size, wrong algorithm, empty).
    #[error("Key: {0}")]
    Key(#[source] KeyError),

    /// Key registry error.
    #[error("Keyring: {0}")]
    Keyring(#[source] KeyringError),

    /// Cipher framing or authentication error.
    #[error("Cipher: {0}")]
    Cipher(#[source] CipherError),

    /// MAC verification error.
    #[error("MAC: {0}")]
    Mac(#[source] MacError),

    /// Key derivation parameter error.
    #[error("KDF: {0}")]
    Kdf(#[source] KdfError),

    /// RNG failure while drawing a nonce or key.
    #[error("Random: {0}")]
    Random(#[source] RandomError),
}

impl CryptoError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::Encoding(_) => ErrorKind::MalformedInput,
            CryptoError::Key(KeyError::Encoding(_)) => ErrorKind::MalformedInput,
            CryptoError::Key(_) | CryptoError::Keyring(_) | CryptoError::Kdf(_) => {
                ErrorKind::Configuration
            }
            CryptoError::Cipher(CipherError::AuthenticationFailed) => {
                ErrorKind::AuthenticationFailure
            }
            CryptoError::Cipher(CipherError::InvalidNonce { .. }) => ErrorKind::Configuration,
            CryptoError::Cipher(_) => ErrorKind::MalformedInput,
            CryptoError::Mac(MacError::VerificationFailed) => ErrorKind::AuthenticationFailure,
            CryptoError::Mac(MacError::DataTooShort) => ErrorKind::MalformedInput,
            CryptoError::Random(_) => ErrorKind::Unavailable,
        }
    }

    /// True when a tag failed to verify.
    pub fn is_authentication_failure(&self) -> bool {
        self.kind() == ErrorKind::AuthenticationFailure
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<EncodingError> for CryptoError {
    fn from(err: EncodingError) -> Self {
        CryptoError::Encoding(err)
    }
}

impl From<KeyError> for CryptoError {
    fn from(err: KeyError) -> Self {
        CryptoError::Key(err)
    }
}

impl From<KeyringError> for CryptoError {
    fn from(err: KeyringError) -> Self {
        CryptoError::Keyring(err)
    }
}

impl From<CipherError> for CryptoError {
    fn from(err: CipherError) -> Self {
        CryptoError::Cipher(err)
    }
}

impl From<MacError> for CryptoError {
    fn from(err: MacError) -> Self {
        CryptoError::Mac(err)
    }
}

impl From<KdfError> for CryptoError {
    fn from(err: KdfError) -> Self {
        CryptoError::Kdf(err)
    }
}

impl From<RandomError> for CryptoError {
    fn from(err: RandomError) -> Self {
        CryptoError::Random(err)
    }
}
