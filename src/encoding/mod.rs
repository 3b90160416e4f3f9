//! Binary ⇄ text and integer ⇄ byte codecs.
//!
//! Everything else in the crate sits on top of these helpers:
//!
//! | Codec      | Alphabet                  | Padding | Used for                     |
//! |------------|---------------------------|---------|------------------------------|
//! | Base64     | `A-Za-z0-9+/`             | `=`     | Key material in key files    |
//! | Base62     | `0-9A-Za-z`               | none    | Obfuscated identifiers       |
//! | Hex        | `0-9a-f`                  | none    | Key fingerprints             |
//!
//! Integer conversions are fixed-width and big-endian. Decoding a byte slice
//! of the wrong width is an error, never a silent truncation.

mod base62;
mod ints;

pub use base62::{base62_decode, base62_encode, estimated_base62_len, BASE62_ALPHABET};
pub use ints::{
    bytes_to_i64, bytes_to_u32, bytes_to_u64, i64_to_bytes, u32_to_bytes, u64_to_bytes,
};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// Errors from decoding text or byte sequences.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// A character outside the codec's alphabet was found.
    #[error("Invalid {encoding} character {character:?} at position {position}")]
    InvalidCharacter {
        /// Codec name
        encoding: &'static str,
        /// Offending character
        character: char,
        /// Character index in the input
        position: usize,
    },

    /// Base64 input was malformed (bad symbol, length or padding).
    #[error("Invalid base64: {0}")]
    Base64(String),

    /// A fixed-width integer was decoded from a slice of the wrong length.
    #[error("Expected {expected} bytes, got {actual}")]
    WrongWidth {
        /// Width of the target integer in bytes
        expected: usize,
        /// Length of the provided slice
        actual: usize,
    },
}

impl From<base64::DecodeError> for EncodingError {
    fn from(err: base64::DecodeError) -> Self {
        EncodingError::Base64(err.to_string())
    }
}

/// Encode bytes as standard, padded base64.
pub fn base64_encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode standard, padded base64.
pub fn base64_decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(BASE64.decode(text.trim())?)
}

/// Lower-case hex encoding.
pub fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_roundtrip() {
        let data = b"\x00\x01whisper\xff";
        let text = base64_encode(data);
        assert_eq!(base64_decode(&text).unwrap(), data);
    }

    #[test]
    fn test_base64_known_value() {
        assert_eq!(base64_encode(b"foobar"), "Zm9vYmFy");
        assert_eq!(base64_encode(b"fo"), "Zm8=");
    }

    #[test]
    fn test_base64_rejects_bad_alphabet() {
        let err = base64_decode("Zm9v*mFy").unwrap_err();
        assert!(matches!(err, EncodingError::Base64(_)));
    }

    #[test]
    fn test_base64_ignores_surrounding_whitespace() {
        assert_eq!(base64_decode("  Zm9vYmFy\n").unwrap(), b"foobar");
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
        assert_eq!(hex_encode(&[]), "");
    }
}
