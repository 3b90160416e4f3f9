//! Key material and the named key registry.
//!
//! [`KeyMaterial`] is an algorithm-tagged secret. Schemes check its length
//! when they are constructed; a key of the wrong size is rejected, never
//! padded or truncated.
//!
//! [`Keyring`] maps names to keys and tracks which key is active. It is owned
//! by the caller (the shell keeps one in its context) and is only mutated by
//! loading keys and selecting one.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::CryptoError;
use super::random;
use crate::encoding::{self, EncodingError};

/// Errors from key material validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key length does not match what the scheme requires
    #[error("{algorithm} key must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Scheme or algorithm name
        algorithm: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Provided length in bytes
        actual: usize,
    },

    /// Requested key size is not supported by the algorithm
    #[error("Unsupported {algorithm} key size: {bits} bits")]
    UnsupportedSize {
        /// Algorithm name
        algorithm: &'static str,
        /// Requested size in bits
        bits: usize,
    },

    /// Key is tagged for a different algorithm family
    #[error("Key is tagged {actual}, scheme requires {expected}")]
    WrongAlgorithm {
        /// Required algorithm
        expected: KeyAlgorithm,
        /// Key's algorithm tag
        actual: KeyAlgorithm,
    },

    /// Empty key
    #[error("Key material is empty")]
    Empty,

    /// Key text could not be decoded
    #[error("Invalid key encoding: {0}")]
    Encoding(#[source] EncodingError),
}

/// Errors from keyring operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyringError {
    /// Key not found
    #[error("Key <{0}> not exist")]
    KeyNotFound(String),

    /// No key has been selected
    #[error("No active key, select key first")]
    NoActiveKey,
}

/// Algorithm family a key is valid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// AES block cipher (ECB and GCM schemes)
    Aes,
    /// ChaCha20 stream cipher (ChaCha20-Poly1305)
    ChaCha20,
    /// HMAC keys (OTP, key derivation)
    Hmac,
}

impl KeyAlgorithm {
    /// Algorithm name as shown in key listings
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Aes => "AES",
            KeyAlgorithm::ChaCha20 => "ChaCha20",
            KeyAlgorithm::Hmac => "HMAC",
        }
    }

    fn check_bits(self, bits: usize) -> Result<(), KeyError> {
        let supported = match self {
            KeyAlgorithm::Aes => matches!(bits, 128 | 192 | 256),
            KeyAlgorithm::ChaCha20 => bits == 256,
            KeyAlgorithm::Hmac => bits > 0 && bits % 8 == 0,
        };
        if supported {
            Ok(())
        } else {
            Err(KeyError::UnsupportedSize {
                algorithm: self.name(),
                bits,
            })
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aes" => Ok(KeyAlgorithm::Aes),
            "chacha20" | "chacha" => Ok(KeyAlgorithm::ChaCha20),
            "hmac" => Ok(KeyAlgorithm::Hmac),
            other => Err(format!("Unknown key algorithm: {other}. Use: aes, chacha20, hmac")),
        }
    }
}

/// Key identifier (name in the key file)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(String);

impl KeyId {
    /// Create a new key ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KeyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for KeyId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Key material (secret bytes plus algorithm tag), zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    algorithm: KeyAlgorithm,
}

impl KeyMaterial {
    /// Wrap raw key bytes
    pub fn new(algorithm: KeyAlgorithm, bytes: Vec<u8>) -> Self {
        Self { bytes, algorithm }
    }

    /// Decode a standard base64 key
    pub fn from_base64(algorithm: KeyAlgorithm, text: &str) -> Result<Self, KeyError> {
        let bytes = encoding::base64_decode(text).map_err(KeyError::Encoding)?;
        Ok(Self::new(algorithm, bytes))
    }

    /// Generate a fresh random key of `bits` length
    pub fn generate(algorithm: KeyAlgorithm, bits: usize) -> Result<Self, CryptoError> {
        algorithm.check_bits(bits)?;
        let bytes = random::secure_random_bytes(bits / 8)?;
        tracing::debug!(algorithm = %algorithm, bits, "generated key");
        Ok(Self::new(algorithm, bytes))
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Algorithm family this key is tagged for
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Get the key length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Key size in bits
    pub fn bits(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Check if the key is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 form, as stored in key files
    pub fn to_base64(&self) -> String {
        encoding::base64_encode(&self.bytes)
    }

    /// Base62 form
    pub fn to_base62(&self) -> String {
        encoding::base62_encode(&self.bytes)
    }

    /// First 8 hex characters of the key's SHA-256, safe to display
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        encoding::hex_encode(&digest[..4])
    }

    /// Require a given algorithm tag and exact length
    pub(crate) fn require(
        &self,
        algorithm: KeyAlgorithm,
        scheme: &'static str,
        len: usize,
    ) -> Result<(), KeyError> {
        if self.algorithm != algorithm {
            return Err(KeyError::WrongAlgorithm {
                expected: algorithm,
                actual: self.algorithm,
            });
        }
        if self.bytes.len() != len {
            return Err(KeyError::InvalidLength {
                algorithm: scheme,
                expected: len,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Don't leak key material in debug output
        write!(
            f,
            "KeyMaterial({}, [REDACTED, {} bytes])",
            self.algorithm,
            self.bytes.len()
        )
    }
}

/// Generate a random key and return it base64 encoded
pub fn generate_key_base64(algorithm: KeyAlgorithm, bits: usize) -> Result<String, CryptoError> {
    Ok(KeyMaterial::generate(algorithm, bits)?.to_base64())
}

/// Generate a random key and return it base62 encoded
pub fn generate_key_base62(algorithm: KeyAlgorithm, bits: usize) -> Result<String, CryptoError> {
    Ok(KeyMaterial::generate(algorithm, bits)?.to_base62())
}

/// Named keys with an active-key pointer
#[derive(Debug, Default)]
pub struct Keyring {
    /// Keys indexed by ID
    keys: BTreeMap<KeyId, KeyMaterial>,
    /// Currently selected key
    active: Option<KeyId>,
}

impl Keyring {
    /// Create a new empty keyring
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a key. Selection is unchanged.
    pub fn insert(&mut self, id: KeyId, material: KeyMaterial) {
        self.keys.insert(id, material);
    }

    /// Get a key by ID
    pub fn get(&self, id: &KeyId) -> Option<&KeyMaterial> {
        self.keys.get(id)
    }

    /// Check if a key exists
    pub fn contains(&self, id: &KeyId) -> bool {
        self.keys.contains_key(id)
    }

    /// The selected key's ID
    pub fn active_id(&self) -> Option<&KeyId> {
        self.active.as_ref()
    }

    /// The selected key
    pub fn active(&self) -> Result<(&KeyId, &KeyMaterial), KeyringError> {
        let id = self.active.as_ref().ok_or(KeyringError::NoActiveKey)?;
        let key = self
            .keys
            .get(id)
            .ok_or_else(|| KeyringError::KeyNotFound(id.to_string()))?;
        Ok((id, key))
    }

    /// Select the active key
    pub fn select(&mut self, id: KeyId) -> Result<(), KeyringError> {
        if !self.keys.contains_key(&id) {
            return Err(KeyringError::KeyNotFound(id.to_string()));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Remove a key, clearing the selection if it was active
    pub fn remove(&mut self, id: &KeyId) -> Option<KeyMaterial> {
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.keys.remove(id)
    }

    /// Keys in name order
    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &KeyMaterial)> {
        self.keys.iter()
    }

    /// Check if the keyring is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}
