//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files (`~/.config/whisper/config.toml` by default)
//! - Environment variables (`WHISPER_*`)
//! - CLI arguments (applied by the binary on top of both)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{MacAlgorithm, MacKeying, NonceLength};
use crate::error::{Result, WhisperError};
use crate::otp::{
    check_look_back, check_step, Digits, Hotp, Totp, DEFAULT_DIGITS, DEFAULT_LOOK_BACK,
    DEFAULT_STEP_SECS,
};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Key file and selection
    #[serde(default)]
    pub keys: KeysConfig,

    /// Cipher options
    #[serde(default)]
    pub cipher: CipherConfig,

    /// One-time password parameters
    #[serde(default)]
    pub otp: OtpConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| WhisperError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| WhisperError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        // Key settings
        if let Some(file) = lookup("WHISPER_KEYS_FILE") {
            config.keys.file = Some(PathBuf::from(file));
        }
        if let Some(active) = lookup("WHISPER_ACTIVE_KEY") {
            config.keys.active = Some(active);
        }

        // OTP settings
        if let Some(val) = lookup("WHISPER_OTP_DIGITS") {
            if let Ok(val) = val.parse() {
                config.otp.digits = val;
            }
        }
        if let Some(val) = lookup("WHISPER_OTP_STEP") {
            if let Ok(val) = val.parse() {
                config.otp.step_secs = val;
            }
        }
        if let Some(val) = lookup("WHISPER_OTP_ALGORITHM") {
            match val.parse() {
                Ok(algorithm) => config.otp.algorithm = algorithm,
                Err(e) => tracing::warn!("Ignoring WHISPER_OTP_ALGORITHM: {e}"),
            }
        }

        config
    }

    /// Merge with another config (other takes precedence)
    pub fn merge(self, other: Self) -> Self {
        let otp_default = OtpConfig::default();
        let cipher_default = CipherConfig::default();
        Self {
            keys: KeysConfig {
                file: other.keys.file.or(self.keys.file),
                active: other.keys.active.or(self.keys.active),
            },
            cipher: CipherConfig {
                legacy_nonce: if other.cipher.legacy_nonce != cipher_default.legacy_nonce {
                    other.cipher.legacy_nonce
                } else {
                    self.cipher.legacy_nonce
                },
                shared_mac_key: if other.cipher.shared_mac_key != cipher_default.shared_mac_key {
                    other.cipher.shared_mac_key
                } else {
                    self.cipher.shared_mac_key
                },
            },
            otp: OtpConfig {
                digits: if other.otp.digits != otp_default.digits {
                    other.otp.digits
                } else {
                    self.otp.digits
                },
                step_secs: if other.otp.step_secs != otp_default.step_secs {
                    other.otp.step_secs
                } else {
                    self.otp.step_secs
                },
                algorithm: if other.otp.algorithm != otp_default.algorithm {
                    other.otp.algorithm
                } else {
                    self.otp.algorithm
                },
                look_back: if other.otp.look_back != otp_default.look_back {
                    other.otp.look_back
                } else {
                    self.otp.look_back
                },
            },
        }
    }

    /// `<config dir>/whisper/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("whisper").join("config.toml"))
    }

    /// Load from `explicit` (which must exist) or the default path (if it
    /// exists), then apply environment overrides and validate
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let base = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading config");
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };
        let config = base.merge(Self::from_env());
        config.validate()?;
        Ok(config)
    }

    /// Reject values the core would refuse later
    pub fn validate(&self) -> Result<()> {
        Digits::new(self.otp.digits)
            .map_err(|e| WhisperError::Config(format!("otp.digits: {e}")))?;
        check_step(self.otp.step_secs)
            .map_err(|e| WhisperError::Config(format!("otp.step_secs: {e}")))?;
        check_look_back(self.otp.look_back)
            .map_err(|e| WhisperError::Config(format!("otp.look_back: {e}")))?;
        Ok(())
    }
}

/// Key file configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysConfig {
    /// JSON key file loaded at startup
    pub file: Option<PathBuf>,

    /// Key selected after loading
    pub active: Option<String>,
}

/// Cipher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Use 3-byte AES-GCM nonces (for existing data only)
    pub legacy_nonce: bool,

    /// Reuse the AES key as the HMAC key when obfuscating
    pub shared_mac_key: bool,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            legacy_nonce: false,
            shared_mac_key: true,
        }
    }
}

impl CipherConfig {
    /// Nonce length for AES-GCM
    pub fn nonce_length(&self) -> NonceLength {
        if self.legacy_nonce {
            NonceLength::Legacy
        } else {
            NonceLength::Standard
        }
    }

    /// MAC keying for the identifier codec
    pub fn mac_keying(&self) -> MacKeying {
        if self.shared_mac_key {
            MacKeying::Shared
        } else {
            MacKeying::Derived
        }
    }
}

/// OTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Code length
    pub digits: u32,

    /// TOTP step in seconds
    pub step_secs: u64,

    /// HMAC hash function
    pub algorithm: MacAlgorithm,

    /// Past steps accepted when validating
    pub look_back: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            digits: DEFAULT_DIGITS,
            step_secs: DEFAULT_STEP_SECS,
            algorithm: MacAlgorithm::HmacSha256,
            look_back: DEFAULT_LOOK_BACK,
        }
    }
}

impl OtpConfig {
    /// HOTP generator for `key`
    pub fn hotp(&self, key: &[u8]) -> Result<Hotp> {
        Ok(Hotp::new(key, self.digits, self.algorithm)?)
    }

    /// TOTP generator for `key` on the system clock
    pub fn totp(&self, key: &[u8]) -> Result<Totp> {
        Ok(Totp::new(self.hotp(key)?, self.step_secs)?.with_look_back(self.look_back)?)
    }
}
