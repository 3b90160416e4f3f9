//! Single-step HMAC key derivation.
//!
//! `derive(input, bits) = HMAC-SHA256(derivation_key, input)[..bits / 8]`
//!
//! This is one HMAC block: no extract step and no counter-mode expansion, so
//! at most 256 bits can be produced. Larger requests fail instead of
//! returning fewer bytes than asked for.

use thiserror::Error;

use super::error::CryptoError;
use super::keyring::{KeyAlgorithm, KeyMaterial};
use super::mac::{KeyedMac, MacAlgorithm};

/// MAC used for derivation
pub const KDF_MAC: MacAlgorithm = MacAlgorithm::HmacSha256;

/// Default derived key size in bits
pub const DEFAULT_OUTPUT_BITS: usize = 256;

/// Largest output one HMAC-SHA256 block can provide, in bits
pub const MAX_OUTPUT_BITS: usize = 256;

/// Errors from key derivation parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KdfError {
    /// Output size is zero or not a whole number of bytes
    #[error("Output size must be a positive multiple of 8 bits, got {0}")]
    InvalidOutputSize(usize),

    /// Output size exceeds one MAC block
    #[error("Requested {requested_bits} bits, at most {max_bits} available")]
    OutputTooLong {
        /// Requested size
        requested_bits: usize,
        /// MAC output size
        max_bits: usize,
    },
}

/// HMAC-SHA256 key derivation bound to a derivation key
#[derive(Debug, Clone)]
pub struct Kdf {
    mac: KeyedMac,
}

impl Kdf {
    /// Create a derivation function keyed by `key`
    pub fn new(key: KeyMaterial) -> Result<Self, CryptoError> {
        Ok(Self {
            mac: KeyedMac::new(KDF_MAC, key)?,
        })
    }

    /// Create from raw key bytes
    pub fn from_bytes(key: &[u8]) -> Result<Self, CryptoError> {
        Self::new(KeyMaterial::new(KeyAlgorithm::Hmac, key.to_vec()))
    }

    /// Derive `output_bits / 8` bytes from `input`
    pub fn derive(&self, input: &[u8], output_bits: usize) -> Result<Vec<u8>, KdfError> {
        check_output_bits(output_bits)?;
        let mut okm = self.mac.compute_tag(input);
        okm.truncate(output_bits / 8);
        Ok(okm)
    }

    /// Derive the default 256 bits
    pub fn derive_default(&self, input: &[u8]) -> Vec<u8> {
        self.mac.compute_tag(input)
    }

    /// Derive a tagged key of `bits` length
    pub fn derive_key(
        &self,
        input: &[u8],
        algorithm: KeyAlgorithm,
        bits: usize,
    ) -> Result<KeyMaterial, KdfError> {
        Ok(KeyMaterial::new(algorithm, self.derive(input, bits)?))
    }
}

/// One-shot derivation: `HMAC-SHA256(key, input)` truncated to `output_bits`
pub fn derive(key: &[u8], input: &[u8], output_bits: usize) -> Result<Vec<u8>, CryptoError> {
    Ok(Kdf::from_bytes(key)?.derive(input, output_bits)?)
}

fn check_output_bits(output_bits: usize) -> Result<(), KdfError> {
    if output_bits == 0 || output_bits % 8 != 0 {
        return Err(KdfError::InvalidOutputSize(output_bits));
    }
    if output_bits > MAX_OUTPUT_BITS {
        return Err(KdfError::OutputTooLong {
            requested_bits: output_bits,
            max_bits: MAX_OUTPUT_BITS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::ErrorKind;
    use hex_literal::hex;

    const JEFE_TAG: [u8; 32] =
        hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");

    #[test]
    fn test_derive_full_block_matches_hmac() {
        let kdf = Kdf::from_bytes(b"Jefe").unwrap();
        let okm = kdf.derive(b"what do ya want for nothing?", 256).unwrap();
        assert_eq!(okm, JEFE_TAG);
        assert_eq!(kdf.derive_default(b"what do ya want for nothing?"), JEFE_TAG);
    }

    #[test]
    fn test_derive_truncates_prefix() {
        let okm = derive(b"Jefe", b"what do ya want for nothing?", 128).unwrap();
        assert_eq!(okm, JEFE_TAG[..16]);

        let okm = derive(b"Jefe", b"what do ya want for nothing?", 8).unwrap();
        assert_eq!(okm, JEFE_TAG[..1]);
    }

    #[test]
    fn test_derive_rejects_oversized_request() {
        let kdf = Kdf::from_bytes(&[0x42; 32]).unwrap();
        assert_eq!(
            kdf.derive(b"input", 264),
            Err(KdfError::OutputTooLong {
                requested_bits: 264,
                max_bits: 256
            })
        );

        let err = derive(&[0x42; 32], b"input", 512).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_derive_rejects_partial_bytes() {
        let kdf = Kdf::from_bytes(&[0x42; 32]).unwrap();
        assert_eq!(kdf.derive(b"input", 0), Err(KdfError::InvalidOutputSize(0)));
        assert_eq!(kdf.derive(b"input", 12), Err(KdfError::InvalidOutputSize(12)));
    }

    #[test]
    fn test_derive_domain_separation() {
        let kdf = Kdf::from_bytes(&[0x0b; 32]).unwrap();
        let a = kdf.derive(b"whisper/v1/a", 128).unwrap();
        let b = kdf.derive(b"whisper/v1/b", 128).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, kdf.derive(b"whisper/v1/a", 128).unwrap());
    }

    #[test]
    fn test_derive_key_tagged() {
        let kdf = Kdf::from_bytes(&[7; 16]).unwrap();
        let key = kdf.derive_key(b"aes", KeyAlgorithm::Aes, 128).unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Aes);
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn test_empty_derivation_key_rejected() {
        assert!(Kdf::from_bytes(&[]).is_err());
    }
}
