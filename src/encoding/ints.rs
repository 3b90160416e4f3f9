//! Fixed-width big-endian integer codecs.

use super::EncodingError;

/// 8-byte big-endian encoding of an unsigned 64-bit integer.
pub fn u64_to_bytes(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// 8-byte big-endian (two's complement) encoding of a signed 64-bit integer.
pub fn i64_to_bytes(value: i64) -> [u8; 8] {
    value.to_be_bytes()
}

/// 4-byte big-endian encoding of an unsigned 32-bit integer.
pub fn u32_to_bytes(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decode exactly 8 big-endian bytes.
pub fn bytes_to_u64(bytes: &[u8]) -> Result<u64, EncodingError> {
    fixed::<8>(bytes).map(u64::from_be_bytes)
}

/// Decode exactly 8 big-endian bytes as a signed integer.
pub fn bytes_to_i64(bytes: &[u8]) -> Result<i64, EncodingError> {
    fixed::<8>(bytes).map(i64::from_be_bytes)
}

/// Decode exactly 4 big-endian bytes.
pub fn bytes_to_u32(bytes: &[u8]) -> Result<u32, EncodingError> {
    fixed::<4>(bytes).map(u32::from_be_bytes)
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], EncodingError> {
    bytes.try_into().map_err(|_| EncodingError::WrongWidth {
        expected: N,
        actual: bytes.len(),
    })
}
