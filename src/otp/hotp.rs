//! Counter-based one-time passwords.

use std::fmt;

use super::OtpError;
use crate::crypto::{KeyAlgorithm, KeyMaterial, MacAlgorithm};
use crate::encoding;

/// Number of decimal digits in a code, 4..=8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digits(u32);

impl Digits {
    /// Shortest supported code
    pub const MIN: u32 = 4;
    /// Longest supported code
    pub const MAX: u32 = 8;

    /// Validate a digit count
    pub fn new(digits: u32) -> Result<Self, OtpError> {
        if !(Self::MIN..=Self::MAX).contains(&digits) {
            return Err(OtpError::InvalidDigits {
                min: Self::MIN,
                max: Self::MAX,
                actual: digits,
            });
        }
        Ok(Self(digits))
    }

    /// Digit count
    pub fn get(self) -> u32 {
        self.0
    }

    /// `10^digits`
    pub fn modulus(self) -> u32 {
        10u32.pow(self.0)
    }
}

impl fmt::Display for Digits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HOTP generator bound to one shared secret
#[derive(Debug, Clone)]
pub struct Hotp {
    key: KeyMaterial,
    digits: Digits,
    algorithm: MacAlgorithm,
}

impl Hotp {
    /// Create a generator. `digits` must be in 4..=8.
    pub fn new(key: &[u8], digits: u32, algorithm: MacAlgorithm) -> Result<Self, OtpError> {
        if key.is_empty() {
            return Err(OtpError::EmptyKey);
        }
        Ok(Self {
            key: KeyMaterial::new(KeyAlgorithm::Hmac, key.to_vec()),
            digits: Digits::new(digits)?,
            algorithm,
        })
    }

    /// Code length
    pub fn digits(&self) -> Digits {
        self.digits
    }

    /// MAC family
    pub fn algorithm(&self) -> MacAlgorithm {
        self.algorithm
    }

    /// Numeric code for `counter`
    pub fn value(&self, counter: u64) -> u32 {
        let mac = self
            .algorithm
            .compute(self.key.as_bytes(), &encoding::u64_to_bytes(counter));
        dynamic_truncate(&mac) % self.digits.modulus()
    }

    /// Zero-padded code for `counter`
    pub fn generate(&self, counter: u64) -> String {
        self.format(self.value(counter))
    }

    pub(crate) fn format(&self, value: u32) -> String {
        format!("{:0width$}", value, width = self.digits.get() as usize)
    }
}

/// RFC 4226 section 5.3
fn dynamic_truncate(mac: &[u8]) -> u32 {
    let offset = (mac[mac.len() - 1] & 0x0f) as usize;
    let word = [mac[offset], mac[offset + 1], mac[offset + 2], mac[offset + 3]];
    u32::from_be_bytes(word) & 0x7fff_ffff
}
