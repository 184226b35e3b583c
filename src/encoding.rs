//! Conversions between integers, fixed-width byte strings, base64 and
//! message blocks.

use alloc::string::String;
use alloc::vec::Vec;
use base64ct::{Base64, Encoding};
use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::errors::{Error, Result};

/// Number of bytes needed to hold `bits` bits.
#[inline]
pub const fn byte_length(bits: usize) -> usize {
    (bits + 7) / 8
}

/// Interprets `bytes` as a big-endian unsigned integer.
#[inline]
pub fn bytes_to_uint(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Returns a new vector of the given length, with 0s left padded.
#[inline]
fn left_pad(input: &[u8], padded_len: usize) -> Result<Vec<u8>> {
    if input.len() > padded_len {
        return Err(Error::InvalidPadLen);
    }

    let mut out = vec![0u8; padded_len];
    out[padded_len - input.len()..].copy_from_slice(input);
    Ok(out)
}

/// Converts input to the new vector of the given length, using BE and with 0s left padded.
#[inline]
pub fn uint_to_be_pad(input: &BigUint, padded_len: usize) -> Result<Vec<u8>> {
    // zero serializes as [0], which must not count against the width
    if input == &BigUint::default() {
        return Ok(vec![0u8; padded_len]);
    }
    left_pad(&input.to_bytes_be(), padded_len)
}

/// Converts input to the new vector of the given length, using BE and with 0s left padded.
/// Both the intermediate and the returned buffer are wiped on drop.
#[inline]
pub(crate) fn uint_to_zeroizing_be_pad(
    input: BigUint,
    padded_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    let m = Zeroizing::new(input);
    if *m == BigUint::default() {
        return Ok(Zeroizing::new(vec![0u8; padded_len]));
    }
    let bytes = Zeroizing::new(m.to_bytes_be());
    left_pad(&bytes, padded_len).map(Zeroizing::new)
}

/// Standard, padded base64.
pub fn encode_base64(data: &[u8]) -> String {
    Base64::encode_string(data)
}

/// Decodes standard, padded base64; fails with [`Error::InvalidBase64`].
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    Ok(Base64::decode_vec(data.trim())?)
}

/// Splits `data` into consecutive blocks of at most `block_size` bytes.
///
/// Empty input yields no blocks.
pub fn split_blocks(data: &[u8], block_size: usize) -> Result<Vec<&[u8]>> {
    if block_size == 0 {
        return Err(Error::InvalidPadLen);
    }
    Ok(data.chunks(block_size).collect())
}

/// Concatenates blocks back into one buffer.
pub fn join_blocks<B: AsRef<[u8]>>(blocks: &[B]) -> Vec<u8> {
    let mut out = Vec::with_capacity(blocks.iter().map(|b| b.as_ref().len()).sum());
    for block in blocks {
        out.extend_from_slice(block.as_ref());
    }
    out
}
