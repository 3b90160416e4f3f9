//! Cipher suite: one `encrypt`/`decrypt` contract over every scheme.

use std::fmt;
use std::str::FromStr;

use super::aead::{AeadAlgorithm, AeadCipher, NonceLength};
use super::block::{AuthenticatedBlockCipher, BlockCipher, MacKeying};
use super::error::CryptoError;
use super::keyring::{KeyAlgorithm, KeyMaterial};
use super::{AES_BLOCK_SIZE, HMAC_SHA1_TAG_SIZE};

/// Common encrypt/decrypt contract
pub trait SymmetricCipher {
    /// Encrypt plaintext into the scheme's framed ciphertext
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypt framed ciphertext
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Scheme description
    fn info(&self) -> SchemeInfo;
}

/// Static description of a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeInfo {
    /// Primitive name ("AES", "ChaCha20")
    pub algorithm: &'static str,
    /// Mode string ("AES/GCM/NoPadding")
    pub mode: &'static str,
    /// Key size in bits
    pub key_bits: usize,
    /// MAC name for encrypt-then-MAC schemes
    pub mac_algorithm: Option<&'static str>,
    /// Nonce length in bytes, 0 for deterministic schemes
    pub nonce_len: usize,
    /// Tag length in bytes, 0 without integrity
    pub tag_len: usize,
}

/// Closed set of symmetric schemes
#[derive(Debug, Clone)]
pub enum CipherSuite {
    /// AES-128-GCM or ChaCha20-Poly1305
    Aead(AeadCipher),
    /// AES-128-ECB, PKCS#7, no integrity
    PlainBlock(BlockCipher),
    /// AES-128-ECB encrypt-then-MAC with HMAC-SHA1
    AuthenticatedBlock(AuthenticatedBlockCipher),
}

impl CipherSuite {
    /// AES-128-GCM with 12-byte nonces
    pub fn aes128_gcm(key: KeyMaterial) -> Result<Self, CryptoError> {
        Ok(Self::Aead(AeadCipher::new(AeadAlgorithm::Aes128Gcm, key)?))
    }

    /// AES-128-GCM with 3-byte nonces, for existing data
    pub fn aes128_gcm_legacy(key: KeyMaterial) -> Result<Self, CryptoError> {
        Ok(Self::Aead(
            AeadCipher::new(AeadAlgorithm::Aes128Gcm, key)?.with_nonce_length(NonceLength::Legacy)?,
        ))
    }

    /// ChaCha20-Poly1305
    pub fn chacha20_poly1305(key: KeyMaterial) -> Result<Self, CryptoError> {
        Ok(Self::Aead(AeadCipher::new(AeadAlgorithm::ChaCha20Poly1305, key)?))
    }

    /// AES-128-ECB without integrity
    pub fn plain_block(key: KeyMaterial) -> Result<Self, CryptoError> {
        Ok(Self::PlainBlock(BlockCipher::new(key)?))
    }

    /// AES-128-ECB + HMAC-SHA1 with a derived MAC key
    pub fn authenticated_block(key: KeyMaterial) -> Result<Self, CryptoError> {
        Self::authenticated_block_with(key, MacKeying::Derived)
    }

    /// AES-128-ECB + HMAC-SHA1 with explicit MAC keying
    pub fn authenticated_block_with(
        key: KeyMaterial,
        keying: MacKeying,
    ) -> Result<Self, CryptoError> {
        Ok(Self::AuthenticatedBlock(AuthenticatedBlockCipher::new(
            key, keying,
        )?))
    }

    /// Build a suite of `kind` from raw key bytes
    pub fn from_bytes(kind: SchemeKind, key: &[u8]) -> Result<Self, CryptoError> {
        kind.build(KeyMaterial::new(kind.key_algorithm(), key.to_vec()))
    }

    /// Build a suite of `kind` from a base64 key
    pub fn from_base64(kind: SchemeKind, text: &str) -> Result<Self, CryptoError> {
        kind.build(KeyMaterial::from_base64(kind.key_algorithm(), text)?)
    }

    /// Which variant this is
    pub fn kind(&self) -> SchemeKind {
        match self {
            Self::Aead(c) => match (c.algorithm(), c.nonce_len()) {
                (AeadAlgorithm::ChaCha20Poly1305, _) => SchemeKind::ChaCha20Poly1305,
                (AeadAlgorithm::Aes128Gcm, n) if n == NonceLength::Legacy.len() => {
                    SchemeKind::Aes128GcmLegacy
                }
                (AeadAlgorithm::Aes128Gcm, _) => SchemeKind::Aes128Gcm,
            },
            Self::PlainBlock(_) => SchemeKind::Aes128Ecb,
            Self::AuthenticatedBlock(_) => SchemeKind::Aes128EcbHmacSha1,
        }
    }

    /// Encrypt
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self {
            Self::Aead(c) => c.encrypt(plaintext),
            Self::PlainBlock(c) => c.encrypt(plaintext),
            Self::AuthenticatedBlock(c) => c.encrypt(plaintext),
        }
    }

    /// Decrypt
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let result = match self {
            Self::Aead(c) => c.decrypt(ciphertext),
            Self::PlainBlock(c) => c.decrypt(ciphertext),
            Self::AuthenticatedBlock(c) => c.decrypt(ciphertext),
        };
        if let Err(e) = &result {
            tracing::debug!(
                scheme = %self.kind(),
                len = ciphertext.len(),
                kind = ?e.kind(),
                "decrypt failed"
            );
        }
        result
    }

    /// Scheme description
    pub fn info(&self) -> SchemeInfo {
        match self {
            Self::Aead(c) => match c.algorithm() {
                AeadAlgorithm::Aes128Gcm => SchemeInfo {
                    algorithm: "AES",
                    mode: "AES/GCM/NoPadding",
                    key_bits: 128,
                    mac_algorithm: None,
                    nonce_len: c.nonce_len(),
                    tag_len: c.tag_len(),
                },
                AeadAlgorithm::ChaCha20Poly1305 => SchemeInfo {
                    algorithm: "ChaCha20",
                    mode: "ChaCha20-Poly1305",
                    key_bits: 256,
                    mac_algorithm: None,
                    nonce_len: c.nonce_len(),
                    tag_len: c.tag_len(),
                },
            },
            Self::PlainBlock(_) => SchemeInfo {
                algorithm: "AES",
                mode: "AES/ECB/PKCS5Padding",
                key_bits: 128,
                mac_algorithm: None,
                nonce_len: 0,
                tag_len: 0,
            },
            Self::AuthenticatedBlock(_) => SchemeInfo {
                algorithm: "AES",
                mode: "AES/ECB/PKCS5Padding",
                key_bits: 128,
                mac_algorithm: Some("HmacSHA1"),
                nonce_len: 0,
                tag_len: HMAC_SHA1_TAG_SIZE,
            },
        }
    }

    /// Smallest ciphertext `decrypt` can accept
    pub fn min_ciphertext_len(&self) -> usize {
        match self {
            Self::Aead(c) => c.nonce_len() + c.tag_len(),
            Self::PlainBlock(_) => AES_BLOCK_SIZE,
            Self::AuthenticatedBlock(c) => c.min_len(),
        }
    }
}

impl SymmetricCipher for CipherSuite {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        CipherSuite::encrypt(self, plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        CipherSuite::decrypt(self, ciphertext)
    }

    fn info(&self) -> SchemeInfo {
        CipherSuite::info(self)
    }
}

/// Scheme selector, as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    /// `aes-gcm`
    Aes128Gcm,
    /// `aes-gcm-legacy`
    Aes128GcmLegacy,
    /// `chacha20-poly1305`
    ChaCha20Poly1305,
    /// `aes-ecb`
    Aes128Ecb,
    /// `aes-ecb-hmac`
    Aes128EcbHmacSha1,
}

impl SchemeKind {
    /// All schemes
    pub const ALL: [SchemeKind; 5] = [
        SchemeKind::Aes128Gcm,
        SchemeKind::Aes128GcmLegacy,
        SchemeKind::ChaCha20Poly1305,
        SchemeKind::Aes128Ecb,
        SchemeKind::Aes128EcbHmacSha1,
    ];

    /// Name as accepted by `FromStr`
    pub fn name(&self) -> &'static str {
        match self {
            SchemeKind::Aes128Gcm => "aes-gcm",
            SchemeKind::Aes128GcmLegacy => "aes-gcm-legacy",
            SchemeKind::ChaCha20Poly1305 => "chacha20-poly1305",
            SchemeKind::Aes128Ecb => "aes-ecb",
            SchemeKind::Aes128EcbHmacSha1 => "aes-ecb-hmac",
        }
    }

    /// Key family the scheme requires
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self {
            SchemeKind::ChaCha20Poly1305 => KeyAlgorithm::ChaCha20,
            _ => KeyAlgorithm::Aes,
        }
    }

    /// Key size the scheme requires, in bits
    pub fn key_bits(&self) -> usize {
        match self {
            SchemeKind::ChaCha20Poly1305 => 256,
            _ => 128,
        }
    }

    /// Construct the scheme. `aes-ecb-hmac` uses a derived MAC key.
    pub fn build(&self, key: KeyMaterial) -> Result<CipherSuite, CryptoError> {
        match self {
            SchemeKind::Aes128Gcm => CipherSuite::aes128_gcm(key),
            SchemeKind::Aes128GcmLegacy => CipherSuite::aes128_gcm_legacy(key),
            SchemeKind::ChaCha20Poly1305 => CipherSuite::chacha20_poly1305(key),
            SchemeKind::Aes128Ecb => CipherSuite::plain_block(key),
            SchemeKind::Aes128EcbHmacSha1 => CipherSuite::authenticated_block(key),
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        SchemeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| {
                let known: Vec<&str> = SchemeKind::ALL.iter().map(SchemeKind::name).collect();
                format!("Unknown scheme: {s}. Use: {}", known.join(", "))
            })
    }
}
