//! One-time passwords: HOTP (RFC 4226) and TOTP (RFC 6238).
//!
//! ```
//! use whisper::otp::{Hotp, Totp};
//! use whisper::crypto::MacAlgorithm;
//!
//! let hotp = Hotp::new(b"12345678901234567890", 6, MacAlgorithm::HmacSha1).unwrap();
//! assert_eq!(hotp.generate(0), "755224");
//!
//! let totp = Totp::new(hotp, 30).unwrap();
//! let code = totp.now();
//! assert!(totp.validate(&code));
//! ```

mod clock;
mod hotp;
mod totp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use hotp::{Digits, Hotp};
pub use totp::Totp;

pub(crate) use totp::{check_look_back, check_step};

use thiserror::Error;

use crate::crypto::ErrorKind;

/// Default code length
pub const DEFAULT_DIGITS: u32 = 6;

/// Default TOTP time step in seconds
pub const DEFAULT_STEP_SECS: u64 = 30;

/// Default number of past steps accepted by [`Totp::validate`]
pub const DEFAULT_LOOK_BACK: u32 = 1;

/// Longest TOTP time step in seconds (one year)
pub const MAX_STEP_SECS: u64 = 366 * 86_400;

/// Most past steps [`Totp::validate`] may accept
pub const MAX_LOOK_BACK: u32 = 10;

/// Errors from OTP parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    /// Digit count outside 4..=8
    #[error("OTP digits must be between {min} and {max}, got {actual}")]
    InvalidDigits {
        /// Smallest supported length
        min: u32,
        /// Largest supported length
        max: u32,
        /// Requested length
        actual: u32,
    },

    /// Time step of zero or longer than [`MAX_STEP_SECS`]
    #[error("TOTP step must be between 1 and {max} seconds, got {actual}")]
    InvalidStep {
        /// Longest supported step
        max: u64,
        /// Requested step
        actual: u64,
    },

    /// Validation window wider than [`MAX_LOOK_BACK`]
    #[error("TOTP look-back must be at most {max} steps, got {actual}")]
    InvalidLookBack {
        /// Widest supported window
        max: u32,
        /// Requested window
        actual: u32,
    },

    /// Empty shared secret
    #[error("OTP key is empty")]
    EmptyKey,
}

impl OtpError {
    /// Every OTP error is a construction problem
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}
