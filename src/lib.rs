//! # Whisper - Symmetric Crypto Toolkit
//!
//! Authenticated symmetric encryption, reversible identifier obfuscation,
//! one-time passwords and key derivation, all validated against published
//! test vectors.
//!
//! ## Features
//!
//! - **Cipher suite**: AES-128-GCM, ChaCha20-Poly1305, AES-128-ECB and
//!   AES-128-ECB + HMAC-SHA1 behind one `encrypt`/`decrypt` contract
//! - **Identifier obfuscation**: `i64` to a tamper-evident base62 string
//! - **HOTP / TOTP**: RFC 4226 / RFC 6238 with an injectable clock
//! - **Key derivation**: single-block HMAC-SHA256
//! - **Encoding**: base64, base62 and fixed-width big-endian integers
//!
//! ### Architecture
//!
//! ```text
//!        shell / CLI                    config (TOML + env)
//!             |                                 |
//!     +-------+---------+-------------+---------+
//!     |                 |             |
//! obfuscate           otp           crypto::suite
//!     |                 |        /    |        \
//!     +--------+--------+     aead  block    (mac, kdf)
//!              |                 \    |       /
//!           encoding        keyring, random
//! ```
//!
//! ### Wire Formats
//!
//! | Scheme                  | Layout                                    |
//! |-------------------------|-------------------------------------------|
//! | AES-128-GCM             | `nonce:12 \|\| ciphertext \|\| tag:12`     |
//! | AES-128-GCM (legacy)    | `nonce:3 \|\| ciphertext \|\| tag:12`      |
//! | ChaCha20-Poly1305       | `nonce:12 \|\| ciphertext \|\| tag:16`     |
//! | AES-128-ECB             | PKCS#7 padded blocks                      |
//! | AES-128-ECB + HMAC-SHA1 | `blocks:16k \|\| tag:20`                   |
//! | Obfuscated id           | base62(`block:16 \|\| tag:20`)             |
//!
//! ## Quick Start
//!
//! ### Encryption
//!
//! ```rust
//! use whisper::crypto::{CipherSuite, KeyAlgorithm, KeyMaterial};
//!
//! let key = KeyMaterial::generate(KeyAlgorithm::ChaCha20, 256).unwrap();
//! let suite = CipherSuite::chacha20_poly1305(key).unwrap();
//!
//! let sealed = suite.encrypt(b"hello").unwrap();
//! assert_eq!(suite.decrypt(&sealed).unwrap(), b"hello");
//! ```
//!
//! ### Identifier Obfuscation
//!
//! ```rust
//! use whisper::crypto::{KeyAlgorithm, KeyMaterial};
//! use whisper::obfuscate::{IdCodec, Obfuscator};
//!
//! let key = KeyMaterial::from_base64(KeyAlgorithm::Aes, "AAECAwQFBgcICQoLDA0ODw==").unwrap();
//! let codec = Obfuscator::from_key(key).unwrap();
//!
//! let text = codec.obfuscate(42).unwrap();
//! assert_eq!(codec.restore(&text).unwrap(), 42);
//! ```
//!
//! ## Modules
//!
//! - [`crypto`]: Cipher suite, MAC, KDF, keys and randomness
//! - [`otp`]: HOTP and TOTP
//! - [`obfuscate`]: Identifier codec
//! - [`encoding`]: Text and integer codecs
//! - [`shell`]: Command shell and key files
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod obfuscate;
pub mod otp;
pub mod shell;

// Re-exports for convenience
pub use config::Config;
pub use crypto::{CipherSuite, CryptoError, ErrorKind, KeyMaterial, SchemeKind};
pub use error::{Result, WhisperError};
pub use obfuscate::{IdCodec, Obfuscator};
pub use otp::{Hotp, Totp};
pub use shell::ShellContext;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
