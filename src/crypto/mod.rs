//! Symmetric cryptography for Whisper.
//!
//! This module provides the primitives every other part of the crate is
//! built on:
//!
//! - **Cipher Suite**: a closed set of schemes sharing one
//!   `encrypt`/`decrypt` contract ([`CipherSuite`])
//! - **Keyed MAC**: HMAC-SHA1 / HMAC-SHA256 / HMAC-SHA512 ([`KeyedMac`])
//! - **Key derivation**: single-block HMAC-SHA256 expand ([`Kdf`])
//! - **Key material**: algorithm-tagged, zeroized secrets and a named
//!   [`Keyring`] with an active-key pointer
//!
//! # Schemes
//!
//! | Scheme                  | Key     | Framing                                   |
//! |-------------------------|---------|-------------------------------------------|
//! | AES-128-GCM             | 128 bit | `nonce:12 \|\| ciphertext \|\| tag:12`     |
//! | AES-128-GCM (legacy)    | 128 bit | `nonce:3 \|\| ciphertext \|\| tag:12`      |
//! | ChaCha20-Poly1305       | 256 bit | `nonce:12 \|\| ciphertext \|\| tag:16`     |
//! | AES-128-ECB             | 128 bit | `ciphertext` (PKCS#7, no integrity)        |
//! | AES-128-ECB + HMAC-SHA1 | 128 bit | `ciphertext:16k \|\| tag:20`               |
//!
//! # Example
//!
//! ```
//! use whisper::crypto::{CipherSuite, KeyAlgorithm, KeyMaterial};
//!
//! let key = KeyMaterial::generate(KeyAlgorithm::Aes, 128).unwrap();
//! let suite = CipherSuite::aes128_gcm(key).unwrap();
//!
//! let sealed = suite.encrypt(b"attack at dawn").unwrap();
//! assert_eq!(suite.decrypt(&sealed).unwrap(), b"attack at dawn");
//! ```
//!
//! # Concurrency
//!
//! Every scheme holds only its immutable key. Cipher and MAC contexts are
//! created inside each call and dropped before it returns, so a suite can be
//! shared across threads without locking.

mod aead;
mod block;
mod error;
pub mod kdf;
mod keyring;
mod mac;
pub mod random;
mod suite;

pub use aead::{AeadAlgorithm, AeadCipher, NonceLength};
pub use block::{AuthenticatedBlockCipher, BlockCipher, MacKeying};
pub use error::{CipherError, CryptoError, ErrorKind};
pub use kdf::{Kdf, KdfError};
pub use keyring::{
    generate_key_base62, generate_key_base64, KeyAlgorithm, KeyError, KeyId, KeyMaterial,
    Keyring, KeyringError,
};
pub use mac::{KeyedMac, MacAlgorithm, MacError};
pub use random::RandomError;
pub use suite::{CipherSuite, SchemeInfo, SchemeKind, SymmetricCipher};

pub(crate) use mac::constant_time_eq;

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes
pub const AES128_KEY_SIZE: usize = 16;

/// Standard AEAD nonce size (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Legacy AES-GCM nonce size (24 bits)
pub const LEGACY_NONCE_SIZE: usize = 3;

/// AES-GCM authentication tag size (96 bits)
pub const GCM_TAG_SIZE: usize = 12;

/// ChaCha20-Poly1305 key size (256 bits)
pub const CHACHA_KEY_SIZE: usize = 32;

/// ChaCha20-Poly1305 authentication tag size (128 bits)
pub const CHACHA_TAG_SIZE: usize = 16;

/// HMAC-SHA1 tag size (160 bits)
pub const HMAC_SHA1_TAG_SIZE: usize = 20;
