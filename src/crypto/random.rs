//! Secure random bytes for nonces and key generation.
//!
//! Backed by `rand::thread_rng()`: a per-thread CSPRNG seeded from the OS and
//! periodically reseeded, so concurrent callers never share generator state.

use rand::RngCore;
use thiserror::Error;

/// Errors from the random source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RandomError {
    /// System RNG failure
    #[error("System RNG failure: {0}")]
    RngFailure(String),
}

/// Fill a buffer with secure random bytes.
pub fn fill_secure(buf: &mut [u8]) -> Result<(), RandomError> {
    rand::thread_rng()
        .try_fill_bytes(buf)
        .map_err(|e| RandomError::RngFailure(e.to_string()))
}

/// Draw `n` secure random bytes.
pub fn secure_random_bytes(n: usize) -> Result<Vec<u8>, RandomError> {
    let mut bytes = vec![0u8; n];
    fill_secure(&mut bytes)?;
    Ok(bytes)
}
