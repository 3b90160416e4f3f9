//! AES-128-ECB schemes: plain and encrypt-then-MAC.
//!
//! Both are deterministic: the same plaintext always yields the same
//! ciphertext under one key. That is what the identifier codec relies on,
//! and also why repeated plaintexts are visible as repeated ciphertexts.
//!
//! ```text
//! PlainBlock:          ECB(PKCS#7(plaintext))
//! AuthenticatedBlock:  ECB(PKCS#7(plaintext)) || HMAC-SHA1(mac_key, ciphertext)
//! ```

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use super::error::{CipherError, CryptoError};
use super::kdf::Kdf;
use super::keyring::{KeyAlgorithm, KeyError, KeyMaterial};
use super::mac::{KeyedMac, MacAlgorithm, MacError};
use super::{AES128_KEY_SIZE, AES_BLOCK_SIZE, HMAC_SHA1_TAG_SIZE};

/// Derivation label for the independent MAC key
const MAC_KEY_LABEL: &[u8] = b"whisper/v1/ecb-mac";

/// How the encrypt-then-MAC scheme keys its HMAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MacKeying {
    /// HMAC key derived from the AES key with the KDF
    #[default]
    Derived,
    /// AES key reused as the HMAC key; matches identifiers issued by
    /// earlier releases
    Shared,
}

/// AES-128-ECB with PKCS#7 padding. No integrity protection.
#[derive(Debug, Clone)]
pub struct BlockCipher {
    key: KeyMaterial,
}

impl BlockCipher {
    /// Create a cipher from a 16-byte AES key
    pub fn new(key: KeyMaterial) -> Result<Self, CryptoError> {
        key.require(KeyAlgorithm::Aes, "AES-128", AES128_KEY_SIZE)?;
        Ok(Self { key })
    }

    /// Pad and encrypt. Output length is the next multiple of 16 above the
    /// plaintext length.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.cipher()?;
        let mut buf = pkcs7_pad(plaintext);
        for block in buf.chunks_exact_mut(AES_BLOCK_SIZE) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
        Ok(buf)
    }

    /// Decrypt and strip padding
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.is_empty() {
            return Err(CipherError::DataTooShort {
                min: AES_BLOCK_SIZE,
                actual: 0,
            }
            .into());
        }
        if ciphertext.len() % AES_BLOCK_SIZE != 0 {
            return Err(CipherError::Misaligned {
                len: ciphertext.len(),
                block: AES_BLOCK_SIZE,
            }
            .into());
        }

        let cipher = self.cipher()?;
        let mut buf = ciphertext.to_vec();
        for block in buf.chunks_exact_mut(AES_BLOCK_SIZE) {
            cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }
        pkcs7_unpad(&mut buf)?;
        Ok(buf)
    }

    fn cipher(&self) -> Result<Aes128, KeyError> {
        Aes128::new_from_slice(self.key.as_bytes()).map_err(|_| KeyError::InvalidLength {
            algorithm: "AES-128",
            expected: AES128_KEY_SIZE,
            actual: self.key.len(),
        })
    }
}

/// AES-128-ECB encrypt-then-MAC with HMAC-SHA1
#[derive(Debug, Clone)]
pub struct AuthenticatedBlockCipher {
    block: BlockCipher,
    mac: KeyedMac,
    keying: MacKeying,
}

impl AuthenticatedBlockCipher {
    /// Create from a 16-byte AES key
    pub fn new(key: KeyMaterial, keying: MacKeying) -> Result<Self, CryptoError> {
        let block = BlockCipher::new(key.clone())?;
        let shared = KeyMaterial::new(KeyAlgorithm::Hmac, key.as_bytes().to_vec());
        let mac_key = match keying {
            MacKeying::Shared => shared,
            MacKeying::Derived => {
                Kdf::new(shared)?.derive_key(MAC_KEY_LABEL, KeyAlgorithm::Hmac, 256)?
            }
        };
        Ok(Self {
            block,
            mac: KeyedMac::new(MacAlgorithm::HmacSha1, mac_key)?,
            keying,
        })
    }

    /// MAC keying in use
    pub fn keying(&self) -> MacKeying {
        self.keying
    }

    /// Smallest valid message: one block plus the tag
    pub fn min_len(&self) -> usize {
        AES_BLOCK_SIZE + HMAC_SHA1_TAG_SIZE
    }

    /// Length of the framed output for a plaintext of `len` bytes
    pub fn output_len(len: usize) -> usize {
        (len / AES_BLOCK_SIZE + 1) * AES_BLOCK_SIZE + HMAC_SHA1_TAG_SIZE
    }

    /// Returns: ciphertext || tag
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = self.block.encrypt(plaintext)?;
        Ok(self.mac.sign(&ciphertext))
    }

    /// Verify the tag, then decrypt. Nothing is decrypted if the tag fails.
    pub fn decrypt(&self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if input.len() < self.min_len() {
            return Err(CipherError::DataTooShort {
                min: self.min_len(),
                actual: input.len(),
            }
            .into());
        }
        let split = input.len() - HMAC_SHA1_TAG_SIZE;
        if split % AES_BLOCK_SIZE != 0 {
            return Err(CipherError::Misaligned {
                len: split,
                block: AES_BLOCK_SIZE,
            }
            .into());
        }

        let (ciphertext, tag) = input.split_at(split);
        self.mac.verify_tag(ciphertext, tag).map_err(|e| match e {
            MacError::VerificationFailed => CipherError::AuthenticationFailed,
            MacError::DataTooShort => CipherError::DataTooShort {
                min: self.min_len(),
                actual: input.len(),
            },
        })?;

        self.block.decrypt(ciphertext)
    }
}

fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad = AES_BLOCK_SIZE - data.len() % AES_BLOCK_SIZE;
    let mut buf = Vec::with_capacity(data.len() + pad);
    buf.extend_from_slice(data);
    buf.resize(data.len() + pad, pad as u8);
    buf
}

fn pkcs7_unpad(buf: &mut Vec<u8>) -> Result<(), CipherError> {
    let pad = *buf.last().ok_or(CipherError::BadPadding)? as usize;
    if pad == 0 || pad > AES_BLOCK_SIZE || pad > buf.len() {
        return Err(CipherError::BadPadding);
    }
    if !buf[buf.len() - pad..].iter().all(|&b| b as usize == pad) {
        return Err(CipherError::BadPadding);
    }
    buf.truncate(buf.len() - pad);
    Ok(())
}
