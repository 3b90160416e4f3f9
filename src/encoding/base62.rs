//! Base62 encoding over the GMP-ordered alphabet `0-9A-Za-z`.
//!
//! The input is treated as one big-endian number and converted between
//! radix 256 and radix 62 by repeated long division. Leading zero bytes of
//! the input (except the last byte) survive as leading `'0'` digits, so the
//! codec is a bijection between byte strings and canonical base62 strings.

use super::EncodingError;

/// Base62 alphabet, digits first then upper then lower case.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const BYTE_BASE: u32 = 256;
const TARGET_BASE: u32 = 62;

/// Encode bytes as base62.
pub fn base62_encode(bytes: &[u8]) -> String {
    convert(bytes, BYTE_BASE, TARGET_BASE)
        .into_iter()
        .map(|digit| BASE62_ALPHABET[digit as usize] as char)
        .collect()
}

/// Decode base62 text. Any character outside the alphabet is rejected.
pub fn base62_decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    let digits = text
        .chars()
        .enumerate()
        .map(|(position, character)| {
            digit_value(character).ok_or(EncodingError::InvalidCharacter {
                encoding: "base62",
                character,
                position,
            })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(convert(&digits, TARGET_BASE, BYTE_BASE))
}

/// Upper bound used to size buffers: `ceil(len * log(256) / log(62))`.
pub fn estimated_base62_len(byte_len: usize) -> usize {
    estimate_output_len(byte_len, BYTE_BASE, TARGET_BASE)
}

fn digit_value(c: char) -> Option<u8> {
    match c {
        '0'..='9' => Some(c as u8 - b'0'),
        'A'..='Z' => Some(c as u8 - b'A' + 10),
        'a'..='z' => Some(c as u8 - b'a' + 36),
        _ => None,
    }
}

fn estimate_output_len(len: usize, source_base: u32, target_base: u32) -> usize {
    let ratio = f64::from(source_base).ln() / f64::from(target_base).ln();
    (ratio * len as f64).ceil() as usize
}

/// Radix conversion of a big-endian digit string, most significant first.
fn convert(message: &[u8], source_base: u32, target_base: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(estimate_output_len(message.len(), source_base, target_base));
    let mut source = message.to_vec();

    while !source.is_empty() {
        let mut quotient = Vec::with_capacity(source.len());
        let mut remainder = 0u32;
        for &digit in &source {
            let accumulator = u32::from(digit) + remainder * source_base;
            let next = accumulator / target_base;
            remainder = accumulator % target_base;
            if !quotient.is_empty() || next > 0 {
                quotient.push(next as u8);
            }
        }
        out.push(remainder as u8);
        source = quotient;
    }

    // leading zero digits, all but the final one which the loop already emitted
    let leading_zeros = message
        .iter()
        .take(message.len().saturating_sub(1))
        .take_while(|&&d| d == 0)
        .count();
    out.extend(std::iter::repeat(0u8).take(leading_zeros));

    out.reverse();
    out
}
