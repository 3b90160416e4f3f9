//! HMAC message authentication.
//!
//! Shared by the encrypt-then-MAC block scheme, key derivation and the OTP
//! engine. A fresh MAC context is created for every call.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use thiserror::Error;

use super::keyring::{KeyError, KeyMaterial};

/// Errors from MAC operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacError {
    /// Tag verification failed
    #[error("MAC verification failed")]
    VerificationFailed,

    /// Data too short
    #[error("Data too short for MAC tag")]
    DataTooShort,
}

/// HMAC hash function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacAlgorithm {
    /// HMAC-SHA1 (RFC 4226 HOTP, encrypt-then-MAC block scheme)
    #[serde(rename = "sha1", alias = "HmacSHA1")]
    HmacSha1,
    /// HMAC-SHA256 (key derivation, default OTP)
    #[serde(rename = "sha256", alias = "HmacSHA256")]
    HmacSha256,
    /// HMAC-SHA512
    #[serde(rename = "sha512", alias = "HmacSHA512")]
    HmacSha512,
}

impl MacAlgorithm {
    /// Algorithm name
    pub fn name(&self) -> &'static str {
        match self {
            MacAlgorithm::HmacSha1 => "HmacSHA1",
            MacAlgorithm::HmacSha256 => "HmacSHA256",
            MacAlgorithm::HmacSha512 => "HmacSHA512",
        }
    }

    /// Tag length in bytes
    pub fn output_len(&self) -> usize {
        match self {
            MacAlgorithm::HmacSha1 => 20,
            MacAlgorithm::HmacSha256 => 32,
            MacAlgorithm::HmacSha512 => 64,
        }
    }

    /// Compute a tag in one shot
    pub fn compute(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        match self {
            MacAlgorithm::HmacSha1 => digest::<Hmac<Sha1>>(key, data),
            MacAlgorithm::HmacSha256 => digest::<Hmac<Sha256>>(key, data),
            MacAlgorithm::HmacSha512 => digest::<Hmac<Sha512>>(key, data),
        }
    }

    /// Verify a tag in constant time
    pub fn verify(&self, key: &[u8], data: &[u8], tag: &[u8]) -> Result<(), MacError> {
        let ok = match self {
            MacAlgorithm::HmacSha1 => verify::<Hmac<Sha1>>(key, data, tag),
            MacAlgorithm::HmacSha256 => verify::<Hmac<Sha256>>(key, data, tag),
            MacAlgorithm::HmacSha512 => verify::<Hmac<Sha512>>(key, data, tag),
        };
        if ok {
            Ok(())
        } else {
            Err(MacError::VerificationFailed)
        }
    }
}

impl fmt::Display for MacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MacAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha1" | "hmacsha1" | "hmac-sha1" => Ok(MacAlgorithm::HmacSha1),
            "sha256" | "hmacsha256" | "hmac-sha256" => Ok(MacAlgorithm::HmacSha256),
            "sha512" | "hmacsha512" | "hmac-sha512" => Ok(MacAlgorithm::HmacSha512),
            other => Err(format!("Unknown MAC algorithm: {other}. Use: sha1, sha256, sha512")),
        }
    }
}

fn digest<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC accepts any key size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn verify<M: Mac + hmac::digest::KeyInit>(key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC accepts any key size");
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}

/// HMAC authenticator bound to one key
#[derive(Debug, Clone)]
pub struct KeyedMac {
    algorithm: MacAlgorithm,
    /// Key material
    key: KeyMaterial,
}

impl KeyedMac {
    /// Create a new authenticator. Any non-empty key is accepted.
    pub fn new(algorithm: MacAlgorithm, key: KeyMaterial) -> Result<Self, KeyError> {
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self { algorithm, key })
    }

    /// Hash function in use
    pub fn algorithm(&self) -> MacAlgorithm {
        self.algorithm
    }

    /// Tag length in bytes
    pub fn tag_len(&self) -> usize {
        self.algorithm.output_len()
    }

    /// Compute the tag for data
    pub fn compute_tag(&self, data: &[u8]) -> Vec<u8> {
        self.algorithm.compute(self.key.as_bytes(), data)
    }

    /// Verify a detached tag
    pub fn verify_tag(&self, data: &[u8], tag: &[u8]) -> Result<(), MacError> {
        self.algorithm.verify(self.key.as_bytes(), data, tag)
    }

    /// Sign data by appending the tag
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let tag = self.compute_tag(data);
        let mut result = Vec::with_capacity(data.len() + tag.len());
        result.extend_from_slice(data);
        result.extend_from_slice(&tag);
        result
    }

    /// Verify and return data without tag
    pub fn verify<'a>(&self, signed_data: &'a [u8]) -> Result<&'a [u8], MacError> {
        if signed_data.len() < self.tag_len() {
            return Err(MacError::DataTooShort);
        }

        let (data, tag) = signed_data.split_at(signed_data.len() - self.tag_len());
        self.verify_tag(data, tag)?;
        Ok(data)
    }
}

/// Constant-time comparison to prevent timing attacks
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyAlgorithm;
    use hex_literal::hex;

    fn test_key() -> KeyMaterial {
        KeyMaterial::new(KeyAlgorithm::Hmac, vec![0u8; 32])
    }

    /// RFC 4231 test case 2
    #[test]
    fn test_hmac_sha256_rfc4231() {
        let tag = MacAlgorithm::HmacSha256.compute(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            tag,
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
    }

    /// RFC 2202 test case 2
    #[test]
    fn test_hmac_sha1_rfc2202() {
        let tag = MacAlgorithm::HmacSha1.compute(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(tag, hex!("effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"));
    }

    #[test]
    fn test_output_lengths() {
        for algorithm in [
            MacAlgorithm::HmacSha1,
            MacAlgorithm::HmacSha256,
            MacAlgorithm::HmacSha512,
        ] {
            assert_eq!(algorithm.compute(b"k", b"d").len(), algorithm.output_len());
        }
    }

    #[test]
    fn test_hmac_sign_verify() {
        let auth = KeyedMac::new(MacAlgorithm::HmacSha256, test_key()).unwrap();
        let data = b"Hello, World!";

        let signed = auth.sign(data);
        assert_eq!(signed.len(), data.len() + 32);

        let verified = auth.verify(&signed).unwrap();
        assert_eq!(verified, data);
    }

    #[test]
    fn test_hmac_tamper_detection() {
        let auth = KeyedMac::new(MacAlgorithm::HmacSha1, test_key()).unwrap();
        let mut signed = auth.sign(b"Hello, World!");

        signed[0] ^= 0xFF;

        assert_eq!(auth.verify(&signed), Err(MacError::VerificationFailed));
    }

    #[test]
    fn test_hmac_wrong_key() {
        let key1 = KeyMaterial::new(KeyAlgorithm::Hmac, vec![1u8; 32]);
        let key2 = KeyMaterial::new(KeyAlgorithm::Hmac, vec![2u8; 32]);
        let auth1 = KeyedMac::new(MacAlgorithm::HmacSha256, key1).unwrap();
        let auth2 = KeyedMac::new(MacAlgorithm::HmacSha256, key2).unwrap();

        let signed = auth1.sign(b"Hello, World!");
        assert!(auth2.verify(&signed).is_err());
    }

    #[test]
    fn test_hmac_data_too_short() {
        let auth = KeyedMac::new(MacAlgorithm::HmacSha1, test_key()).unwrap();
        assert_eq!(auth.verify(&[0u8; 19]), Err(MacError::DataTooShort));
    }

    #[test]
    fn test_hmac_truncated_tag_rejected() {
        let auth = KeyedMac::new(MacAlgorithm::HmacSha256, test_key()).unwrap();
        let tag = auth.compute_tag(b"data");
        assert!(auth.verify_tag(b"data", &tag[..16]).is_err());
    }

    #[test]
    fn test_hmac_empty_key_rejected() {
        let empty = KeyMaterial::new(KeyAlgorithm::Hmac, vec![]);
        let result = KeyedMac::new(MacAlgorithm::HmacSha256, empty);
        assert_eq!(result.unwrap_err(), KeyError::Empty);
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("SHA1".parse::<MacAlgorithm>().unwrap(), MacAlgorithm::HmacSha1);
        assert_eq!("HmacSHA256".parse::<MacAlgorithm>().unwrap(), MacAlgorithm::HmacSha256);
        assert!("md5".parse::<MacAlgorithm>().is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
    }
}
