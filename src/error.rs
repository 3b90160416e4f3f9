//! Whisper error types.
//!
//! Library components return their own error enums. [`WhisperError`] is the
//! crate-level union used by configuration, key files and the shell. The
//! `Crypto` and `Obfuscation` variants keep the full chain via `#[source]`
//! so `anyhow` in the binary can print complete context.

use std::path::PathBuf;

use thiserror::Error;

use crate::crypto::{CryptoError, ErrorKind};
use crate::obfuscate::ObfuscationError;
use crate::otp::OtpError;

/// Whisper errors.
#[derive(Error, Debug)]
pub enum WhisperError {
    /// Cryptographic operation failed.
    #[error("Crypto error: {0}")]
    Crypto(#[source] CryptoError),

    /// Identifier codec failure.
    #[error("{0}")]
    Obfuscation(#[source] ObfuscationError),

    /// OTP parameters rejected.
    #[error("OTP error: {0}")]
    Otp(#[source] OtpError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Key file could not be used.
    #[error("Key file {path}: {reason}")]
    KeyFile {
        /// File that failed
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Shell command misuse.
    #[error("{0}")]
    Shell(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WhisperError {
    /// Map onto the shared failure taxonomy. Errors outside the core
    /// (files, shell usage) count as configuration problems.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WhisperError::Crypto(e) => e.kind(),
            WhisperError::Obfuscation(e) => e.kind(),
            WhisperError::Otp(e) => e.kind(),
            WhisperError::Json(_) => ErrorKind::MalformedInput,
            WhisperError::Config(_)
            | WhisperError::KeyFile { .. }
            | WhisperError::Shell(_)
            | WhisperError::Io(_) => ErrorKind::Configuration,
        }
    }
}

/// Result type alias for Whisper operations
pub type Result<T> = std::result::Result<T, WhisperError>;

impl From<CryptoError> for WhisperError {
    fn from(err: CryptoError) -> Self {
        WhisperError::Crypto(err)
    }
}

impl From<ObfuscationError> for WhisperError {
    fn from(err: ObfuscationError) -> Self {
        WhisperError::Obfuscation(err)
    }
}

impl From<OtpError> for WhisperError {
    fn from(err: OtpError) -> Self {
        WhisperError::Otp(err)
    }
}

impl From<toml::de::Error> for WhisperError {
    fn from(err: toml::de::Error) -> Self {
        WhisperError::Config(err.to_string())
    }
}
