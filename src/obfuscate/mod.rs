//! Reversible obfuscation of 64-bit identifiers.
//!
//! An identifier is written as 8 big-endian bytes, sealed with the
//! AES-128-ECB + HMAC-SHA1 scheme and rendered in base62:
//!
//! ```text
//! i64 -> [u8; 8] -> ECB block (16) || HMAC-SHA1 (20) -> base62 (~49 chars)
//! ```
//!
//! The output is deterministic, so equal identifiers give equal strings
//! under one key. Any altered string fails the MAC check and is reported as
//! [`ObfuscationError::BadSignature`].

use thiserror::Error;

use crate::crypto::{
    AuthenticatedBlockCipher, CipherSuite, CryptoError, ErrorKind, KeyMaterial, MacKeying,
    SchemeKind, AES_BLOCK_SIZE, HMAC_SHA1_TAG_SIZE,
};
use crate::encoding;

/// Size of a sealed identifier before text encoding
pub const SEALED_ID_LEN: usize = AES_BLOCK_SIZE + HMAC_SHA1_TAG_SIZE;

/// Errors from the identifier codec
#[derive(Debug, Error)]
pub enum ObfuscationError {
    /// Text is not a well-formed obfuscated identifier
    #[error("Bad string format")]
    BadFormat,

    /// Text is well-formed but its MAC does not verify
    #[error("Bad signature")]
    BadSignature,

    /// Suite is not AES-128-ECB + HMAC-SHA1
    #[error("{0} cannot obfuscate identifiers")]
    UnsupportedScheme(SchemeKind),

    /// The codec could not be built or could not encrypt
    #[error("Obfuscator configuration: {0}")]
    Configuration(#[source] CryptoError),
}

impl ObfuscationError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ObfuscationError::BadFormat => ErrorKind::MalformedInput,
            ObfuscationError::BadSignature => ErrorKind::AuthenticationFailure,
            ObfuscationError::UnsupportedScheme(_) => ErrorKind::Configuration,
            ObfuscationError::Configuration(e) => e.kind(),
        }
    }
}

/// Two-way mapping between identifiers and opaque strings
pub trait IdCodec {
    /// Encode an identifier
    fn obfuscate(&self, id: i64) -> Result<String, ObfuscationError>;

    /// Decode a string produced by [`IdCodec::obfuscate`] under the same key
    fn restore(&self, text: &str) -> Result<i64, ObfuscationError>;
}

/// Identifier codec over AES-128-ECB + HMAC-SHA1
#[derive(Debug, Clone)]
pub struct Obfuscator {
    cipher: AuthenticatedBlockCipher,
}

impl Obfuscator {
    /// Wrap an authenticated block suite. Other suites are rejected.
    pub fn new(suite: CipherSuite) -> Result<Self, ObfuscationError> {
        match suite {
            CipherSuite::AuthenticatedBlock(cipher) => Ok(Self { cipher }),
            other => {
                tracing::warn!(scheme = %other.kind(), "obfuscator requires aes-ecb-hmac");
                Err(ObfuscationError::UnsupportedScheme(other.kind()))
            }
        }
    }

    /// Build from an AES-128 key with the AES key reused as the MAC key,
    /// which reads identifiers issued by earlier deployments
    pub fn from_key(key: KeyMaterial) -> Result<Self, ObfuscationError> {
        Self::with_keying(key, MacKeying::Shared)
    }

    /// Build from an AES-128 key with explicit MAC keying
    pub fn with_keying(key: KeyMaterial, keying: MacKeying) -> Result<Self, ObfuscationError> {
        let cipher =
            AuthenticatedBlockCipher::new(key, keying).map_err(ObfuscationError::Configuration)?;
        Ok(Self { cipher })
    }

    /// MAC keying in use
    pub fn keying(&self) -> MacKeying {
        self.cipher.keying()
    }
}

impl IdCodec for Obfuscator {
    fn obfuscate(&self, id: i64) -> Result<String, ObfuscationError> {
        let sealed = self
            .cipher
            .encrypt(&encoding::i64_to_bytes(id))
            .map_err(ObfuscationError::Configuration)?;
        Ok(encoding::base62_encode(&sealed))
    }

    fn restore(&self, text: &str) -> Result<i64, ObfuscationError> {
        let sealed = encoding::base62_decode(text).map_err(|_| ObfuscationError::BadFormat)?;
        if sealed.len() != SEALED_ID_LEN {
            return Err(ObfuscationError::BadFormat);
        }

        let plain = self.cipher.decrypt(&sealed).map_err(|e| {
            if e.is_authentication_failure() {
                ObfuscationError::BadSignature
            } else {
                ObfuscationError::BadFormat
            }
        })?;

        encoding::bytes_to_i64(&plain).map_err(|_| ObfuscationError::BadFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyAlgorithm;
    use proptest::prelude::*;

    fn test_key() -> KeyMaterial {
        KeyMaterial::from_base64(KeyAlgorithm::Aes, "AAECAwQFBgcICQoLDA0ODw==").unwrap()
    }

    fn obfuscator() -> Obfuscator {
        Obfuscator::from_key(test_key()).unwrap()
    }

    #[test]
    fn test_roundtrip_edge_values() {
        let codec = obfuscator();
        for id in [0, 1, -1, 42, i64::MAX, i64::MIN, 1_234_567_890_123] {
            let text = codec.obfuscate(id).unwrap();
            assert!(text.bytes().all(|b| b.is_ascii_alphanumeric()));
            assert_eq!(codec.restore(&text).unwrap(), id);
        }
    }

    #[test]
    fn test_deterministic() {
        let codec = obfuscator();
        assert_eq!(codec.obfuscate(7).unwrap(), codec.obfuscate(7).unwrap());
        assert_ne!(codec.obfuscate(7).unwrap(), codec.obfuscate(8).unwrap());
    }

    #[test]
    fn test_different_keys_disagree() {
        let a = obfuscator();
        let b = Obfuscator::from_key(KeyMaterial::new(KeyAlgorithm::Aes, vec![9; 16])).unwrap();

        let text = a.obfuscate(1000).unwrap();
        assert_ne!(text, b.obfuscate(1000).unwrap());
        assert!(matches!(b.restore(&text), Err(ObfuscationError::BadSignature)));
    }

    #[test]
    fn test_restore_invalid_alphabet() {
        let err = obfuscator().restore("not-valid-base62!").unwrap_err();
        assert!(matches!(err, ObfuscationError::BadFormat));
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_restore_wrong_length() {
        let codec = obfuscator();
        assert!(matches!(codec.restore(""), Err(ObfuscationError::BadFormat)));
        assert!(matches!(codec.restore("abc"), Err(ObfuscationError::BadFormat)));

        let long = encoding::base62_encode(&[1u8; 52]);
        assert!(matches!(codec.restore(&long), Err(ObfuscationError::BadFormat)));
    }

    #[test]
    fn test_restore_flipped_byte_is_bad_signature() {
        let codec = obfuscator();
        let mut sealed = encoding::base62_decode(&codec.obfuscate(5).unwrap()).unwrap();
        sealed[3] ^= 0x01;

        let err = codec.restore(&encoding::base62_encode(&sealed)).unwrap_err();
        assert!(matches!(err, ObfuscationError::BadSignature));
        assert_eq!(err.to_string(), "Bad signature");
    }

    #[test]
    fn test_wrong_plaintext_width_is_bad_format() {
        // Correctly sealed, but 4 bytes instead of 8
        let cipher = AuthenticatedBlockCipher::new(test_key(), MacKeying::Shared).unwrap();
        let sealed = cipher.encrypt(&[0, 0, 0, 1]).unwrap();

        let err = obfuscator().restore(&encoding::base62_encode(&sealed)).unwrap_err();
        assert!(matches!(err, ObfuscationError::BadFormat));
    }

    #[test]
    fn test_new_rejects_other_suites() {
        let gcm = SchemeKind::Aes128Gcm.build(test_key()).unwrap();
        let err = Obfuscator::new(gcm).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let etm = SchemeKind::Aes128EcbHmacSha1.build(test_key()).unwrap();
        assert_eq!(Obfuscator::new(etm).unwrap().keying(), MacKeying::Derived);
    }

    #[test]
    fn test_bad_key_is_configuration() {
        let key = KeyMaterial::new(KeyAlgorithm::Aes, vec![0; 32]);
        let err = Obfuscator::from_key(key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(id in any::<i64>()) {
            let codec = obfuscator();
            let text = codec.obfuscate(id).unwrap();
            prop_assert_eq!(codec.restore(&text).unwrap(), id);
        }
    }
}
