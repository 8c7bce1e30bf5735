//! Zig-zag and base-128 variable-length integer encoding.
//!
//! Seven payload bits per byte, least significant group first, high bit set
//! on every byte except the last.

use crate::error::DecodeError;

/// Longest encoding of a 32-bit value.
pub const MAX_VARINT32_LEN: usize = 5;
/// Longest encoding of a 64-bit value.
pub const MAX_VARINT64_LEN: usize = 10;

#[inline]
pub fn zigzag_encode_32(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

#[inline]
pub fn zigzag_decode_32(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

#[inline]
pub fn zigzag_encode_64(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
pub fn zigzag_decode_64(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Append `value` as a varint.
#[inline]
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Number of bytes `encode_varint` would emit for `value`.
#[inline]
pub fn encoded_len(value: u64) -> usize {
    // bits needed, rounded up to 7-bit groups; zero still takes one byte
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Decode a 64-bit varint from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_varint64(bytes: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if i == MAX_VARINT64_LEN - 1 && b > 0x01 {
            // tenth byte may only carry bit 63
            return Err(DecodeError::IntegerOverflow);
        }
        value |= u64::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeError::Truncated {
        needed: bytes.len() + 1,
        remaining: bytes.len(),
    })
}

/// Decode a 32-bit varint from the front of `bytes`.
pub fn decode_varint32(bytes: &[u8]) -> Result<(u32, usize), DecodeError> {
    let mut value: u32 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if i == MAX_VARINT32_LEN - 1 && b > 0x0f {
            // fifth byte may only carry bits 28..32
            return Err(DecodeError::IntegerOverflow);
        }
        value |= u32::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeError::Truncated {
        needed: bytes.len() + 1,
        remaining: bytes.len(),
    })
}
