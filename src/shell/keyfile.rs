//! JSON key files.
//!
//! ```json
//! {
//!   "keys":   { "prod": "AAECAwQFBgcICQoLDA0ODw==" },
//!   "legacy": { "prod": 1234567 }
//! }
//! ```
//!
//! `keys` holds base64 AES keys. `legacy` holds integer seeds for the old
//! obfuscation scheme; they are parsed and counted but not used.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::{KeyAlgorithm, KeyId, KeyMaterial};
use crate::error::{Result, WhisperError};

/// Parsed key file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    /// Key name to base64 AES key
    #[serde(default)]
    pub keys: BTreeMap<String, String>,

    /// Key name to legacy integer seed
    #[serde(default)]
    pub legacy: BTreeMap<String, i64>,
}

impl KeyFile {
    /// Read and parse a key file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| WhisperError::KeyFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text).map_err(|e| WhisperError::KeyFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse key file JSON
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode every key. Fails on the first key that is not valid base64.
    pub fn decode_keys(&self) -> Result<Vec<(KeyId, KeyMaterial)>> {
        self.keys
            .iter()
            .map(|(name, text)| {
                let key = KeyMaterial::from_base64(KeyAlgorithm::Aes, text).map_err(|e| {
                    WhisperError::Shell(format!("Key <{name}> is not valid base64: {e}"))
                })?;
                Ok((KeyId::new(name.clone()), key))
            })
            .collect()
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
