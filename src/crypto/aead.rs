//! AEAD schemes: AES-128-GCM and ChaCha20-Poly1305.
//!
//! Output format: `nonce || ciphertext || tag`. A fresh nonce is drawn from
//! the secure random source for every encryption; associated data is empty.

use aes_gcm::aead::consts::{U12, U3};
use aes_gcm::aead::{Aead, KeyInit, Nonce};
use aes_gcm::aes::Aes128;
use aes_gcm::AesGcm;
use chacha20poly1305::ChaCha20Poly1305;

use super::error::{CipherError, CryptoError};
use super::keyring::{KeyAlgorithm, KeyError, KeyMaterial};
use super::random;
use super::{
    AES128_KEY_SIZE, CHACHA_KEY_SIZE, CHACHA_TAG_SIZE, GCM_TAG_SIZE, LEGACY_NONCE_SIZE, NONCE_SIZE,
};

/// AES-128-GCM, 96-bit nonce, 96-bit tag
type Aes128Gcm = AesGcm<Aes128, U12, U12>;

/// AES-128-GCM, 24-bit nonce, 96-bit tag
type Aes128GcmLegacy = AesGcm<Aes128, U3, U12>;

/// AEAD primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadAlgorithm {
    /// AES-128 in Galois/Counter mode
    Aes128Gcm,
    /// ChaCha20 with Poly1305
    ChaCha20Poly1305,
}

/// Nonce length for AES-GCM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonceLength {
    /// 12 bytes
    #[default]
    Standard,
    /// 3 bytes, for data written by older deployments. Collisions become
    /// likely after a few thousand messages under one key.
    Legacy,
}

impl NonceLength {
    /// Length in bytes
    pub fn len(&self) -> usize {
        match self {
            NonceLength::Standard => NONCE_SIZE,
            NonceLength::Legacy => LEGACY_NONCE_SIZE,
        }
    }
}

/// AEAD cipher bound to one key
#[derive(Debug, Clone)]
pub struct AeadCipher {
    algorithm: AeadAlgorithm,
    nonce_length: NonceLength,
    /// Key material (16 bytes for AES, 32 for ChaCha20)
    key: KeyMaterial,
}

impl AeadCipher {
    /// Create a new AEAD cipher with a standard 12-byte nonce
    pub fn new(algorithm: AeadAlgorithm, key: KeyMaterial) -> Result<Self, CryptoError> {
        match algorithm {
            AeadAlgorithm::Aes128Gcm => {
                key.require(KeyAlgorithm::Aes, "AES-128-GCM", AES128_KEY_SIZE)?;
            }
            AeadAlgorithm::ChaCha20Poly1305 => {
                key.require(KeyAlgorithm::ChaCha20, "ChaCha20-Poly1305", CHACHA_KEY_SIZE)?;
            }
        }
        Ok(Self {
            algorithm,
            nonce_length: NonceLength::Standard,
            key,
        })
    }

    /// Switch nonce length. Only AES-GCM supports the legacy length.
    pub fn with_nonce_length(mut self, nonce_length: NonceLength) -> Result<Self, CryptoError> {
        if self.algorithm == AeadAlgorithm::ChaCha20Poly1305
            && nonce_length != NonceLength::Standard
        {
            return Err(CipherError::InvalidNonce {
                expected: NONCE_SIZE,
                actual: nonce_length.len(),
            }
            .into());
        }
        self.nonce_length = nonce_length;
        Ok(self)
    }

    /// AEAD primitive in use
    pub fn algorithm(&self) -> AeadAlgorithm {
        self.algorithm
    }

    /// Nonce length in bytes
    pub fn nonce_len(&self) -> usize {
        self.nonce_length.len()
    }

    /// Tag length in bytes
    pub fn tag_len(&self) -> usize {
        match self.algorithm {
            AeadAlgorithm::Aes128Gcm => GCM_TAG_SIZE,
            AeadAlgorithm::ChaCha20Poly1305 => CHACHA_TAG_SIZE,
        }
    }

    /// Encrypt with a fresh random nonce
    ///
    /// Returns: nonce || ciphertext || tag
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = random::secure_random_bytes(self.nonce_len())?;
        self.encrypt_with_nonce(plaintext, &nonce)
    }

    /// Encrypt with a caller-chosen nonce. The nonce must never repeat under
    /// the same key.
    pub fn encrypt_with_nonce(
        &self,
        plaintext: &[u8],
        nonce: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if nonce.len() != self.nonce_len() {
            return Err(CipherError::InvalidNonce {
                expected: self.nonce_len(),
                actual: nonce.len(),
            }
            .into());
        }

        let key = self.key.as_bytes();
        let sealed = match (self.algorithm, self.nonce_length) {
            (AeadAlgorithm::Aes128Gcm, NonceLength::Standard) => {
                seal::<Aes128Gcm>(key, nonce, plaintext)?
            }
            (AeadAlgorithm::Aes128Gcm, NonceLength::Legacy) => {
                seal::<Aes128GcmLegacy>(key, nonce, plaintext)?
            }
            (AeadAlgorithm::ChaCha20Poly1305, _) => {
                seal::<ChaCha20Poly1305>(key, nonce, plaintext)?
            }
        };

        // Output format: nonce || ciphertext (includes auth tag)
        let mut result = Vec::with_capacity(nonce.len() + sealed.len());
        result.extend_from_slice(nonce);
        result.extend_from_slice(&sealed);
        Ok(result)
    }

    /// Decrypt `nonce || ciphertext || tag`
    pub fn decrypt(&self, ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let min = self.nonce_len() + self.tag_len();
        if ciphertext_with_nonce.len() < min {
            return Err(CipherError::DataTooShort {
                min,
                actual: ciphertext_with_nonce.len(),
            }
            .into());
        }

        let (nonce, sealed) = ciphertext_with_nonce.split_at(self.nonce_len());
        let key = self.key.as_bytes();
        let plaintext = match (self.algorithm, self.nonce_length) {
            (AeadAlgorithm::Aes128Gcm, NonceLength::Standard) => {
                open::<Aes128Gcm>(key, nonce, sealed)
            }
            (AeadAlgorithm::Aes128Gcm, NonceLength::Legacy) => {
                open::<Aes128GcmLegacy>(key, nonce, sealed)
            }
            (AeadAlgorithm::ChaCha20Poly1305, _) => open::<ChaCha20Poly1305>(key, nonce, sealed),
        };

        if plaintext.is_err() {
            tracing::debug!(algorithm = ?self.algorithm, "AEAD tag verification failed");
        }
        plaintext
    }
}

fn seal<C: Aead + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = C::new_from_slice(key).map_err(|_| KeyError::InvalidLength {
        algorithm: "AEAD",
        expected: C::key_size(),
        actual: key.len(),
    })?;
    cipher
        .encrypt(Nonce::<C>::from_slice(nonce), plaintext)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()).into())
}

fn open<C: Aead + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    sealed: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = C::new_from_slice(key).map_err(|_| KeyError::InvalidLength {
        algorithm: "AEAD",
        expected: C::key_size(),
        actual: key.len(),
    })?;
    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), sealed)
        .map_err(|_| CipherError::AuthenticationFailed.into())
}
