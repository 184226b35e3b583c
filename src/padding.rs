//! PKCS#1-style block padding with two block types.
//!
//! ```text
//! EM = 0x00 || BT || PS || 0x00 || M
//! ```
//!
//! `BT = 0x02` pads with random non-zero octets for encryption, `BT = 0x01`
//! pads with `0xFF` octets for signatures. `PS` is at least eight octets long,
//! which caps the message at `k - 11` bytes for a `k`-byte block.

use alloc::vec::Vec;
use core::fmt;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::encoding::byte_length;
use crate::errors::{Error, Result};

/// Octets of overhead in every padded block: two header bytes, eight
/// padding bytes and the separator.
pub const PADDING_OVERHEAD: usize = 11;

/// Shortest allowed padding string.
pub const MIN_PADDING_LEN: usize = 8;

/// Block type tag, the second octet of a padded block.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// Signature padding, `PS` is a run of `0xFF`.
    Signature = 0x01,
    /// Encryption padding, `PS` is random and non-zero.
    Encryption = 0x02,
}

impl BlockType {
    /// Tag octet for this block type.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for BlockType {
    type Error = PaddingDefect;

    fn try_from(tag: u8) -> core::result::Result<Self, PaddingDefect> {
        match tag {
            0x01 => Ok(BlockType::Signature),
            0x02 => Ok(BlockType::Encryption),
            other => Err(PaddingDefect::UnknownBlockType(other)),
        }
    }
}

/// A single reason a padded block is malformed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PaddingDefect {
    /// Block is shorter than the 11-octet minimum.
    TooShort,
    /// First octet is not `0x00`.
    InvalidLeadingByte(u8),
    /// Second octet is neither `0x01` nor `0x02`.
    UnknownBlockType(u8),
    /// Second octet is a valid tag, but not the one that was expected.
    WrongBlockType {
        /// Tag the caller asked for.
        expected: u8,
        /// Tag found in the block.
        found: u8,
    },
    /// No `0x00` separator after the header.
    MissingSeparator,
    /// Padding string is shorter than eight octets.
    PaddingTooShort,
    /// Encryption padding contains a zero octet.
    ZeroInEncryptionPadding,
    /// Signature padding contains an octet other than `0xFF`.
    InvalidSignaturePadding,
    /// Nothing follows the separator.
    EmptyMessage,
}

impl fmt::Display for PaddingDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaddingDefect::TooShort => write!(f, "block too short"),
            PaddingDefect::InvalidLeadingByte(b) => write!(f, "first byte must be 0x00, got 0x{b:02x}"),
            PaddingDefect::UnknownBlockType(b) => write!(f, "unknown block type 0x{b:02x}"),
            PaddingDefect::WrongBlockType { expected, found } => {
                write!(f, "wrong block type 0x{found:02x}, expected 0x{expected:02x}")
            }
            PaddingDefect::MissingSeparator => write!(f, "separator not found"),
            PaddingDefect::PaddingTooShort => write!(f, "padding string too short"),
            PaddingDefect::ZeroInEncryptionPadding => write!(f, "zero byte in encryption padding"),
            PaddingDefect::InvalidSignaturePadding => {
                write!(f, "non-0xFF byte in signature padding")
            }
            PaddingDefect::EmptyMessage => write!(f, "empty message"),
        }
    }
}

/// Structured result of [`analyze`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PaddingReport {
    /// `true` iff no defect was found.
    pub valid: bool,
    /// Total block length.
    pub length: usize,
    /// Raw second octet, if the block was long enough to have one.
    pub block_type: Option<u8>,
    /// Length of the padding string.
    pub padding_length: usize,
    /// Length of the payload after the separator.
    pub message_length: usize,
    /// Every defect detected, in scan order.
    pub defects: Vec<PaddingDefect>,
}

/// Fills the provided slice with random values, which are guaranteed
/// to not be zero.
#[inline]
fn non_zero_random_bytes<R: CryptoRngCore + ?Sized>(rng: &mut R, data: &mut [u8]) {
    rng.fill_bytes(data);

    for el in data {
        while *el == 0u8 {
            rng.fill_bytes(core::slice::from_mut(el));
        }
    }
}

/// Pads `msg` into a block of exactly `k` octets.
///
/// Encryption padding draws its random octets from `rng`; signature padding
/// ignores it.
pub fn pad<R>(rng: &mut R, msg: &[u8], k: usize, block_type: BlockType) -> Result<Vec<u8>>
where
    R: CryptoRngCore + ?Sized,
{
    if k < PADDING_OVERHEAD {
        return Err(Error::InvalidPadLen);
    }
    if msg.len() > k - PADDING_OVERHEAD {
        return Err(Error::MessageTooLarge);
    }

    // EM = 0x00 || BT || PS || 0x00 || M
    let ps_end = k - msg.len() - 1;
    let mut em = vec![0u8; k];
    em[1] = block_type.tag();
    match block_type {
        BlockType::Encryption => non_zero_random_bytes(rng, &mut em[2..ps_end]),
        BlockType::Signature => em[2..ps_end].fill(0xff),
    }
    em[ps_end] = 0;
    em[ps_end + 1..].copy_from_slice(msg);

    debug_assert_eq!(em.len(), k);
    Ok(em)
}

/// Index of the first zero octet at or after offset 2.
#[inline]
fn find_separator(em: &[u8]) -> Option<usize> {
    em.iter().skip(2).position(|&b| b == 0).map(|i| i + 2)
}

#[inline]
fn check_padding_string(ps: &[u8], block_type: BlockType) -> core::result::Result<(), PaddingDefect> {
    match block_type {
        BlockType::Encryption if ps.contains(&0) => Err(PaddingDefect::ZeroInEncryptionPadding),
        BlockType::Signature if ps.iter().any(|&b| b != 0xff) => {
            Err(PaddingDefect::InvalidSignaturePadding)
        }
        _ => Ok(()),
    }
}

/// Strips the padding from `em`, checking it against `block_type`.
///
/// Note that whether this function returns an error or not discloses
/// information about the plaintext; callers decrypting attacker-supplied
/// ciphertexts must not expose the distinction.
pub fn unpad(em: &[u8], block_type: BlockType) -> Result<Vec<u8>> {
    if em.len() < PADDING_OVERHEAD {
        return Err(PaddingDefect::TooShort.into());
    }
    if em[0] != 0 {
        return Err(PaddingDefect::InvalidLeadingByte(em[0]).into());
    }
    if em[1] != block_type.tag() {
        return Err(PaddingDefect::WrongBlockType {
            expected: block_type.tag(),
            found: em[1],
        }
        .into());
    }

    let index = find_separator(em).ok_or(PaddingDefect::MissingSeparator)?;

    // The PS padding must be at least 8 bytes long, and it starts two
    // bytes into em.
    if index - 2 < MIN_PADDING_LEN {
        return Err(PaddingDefect::PaddingTooShort.into());
    }
    check_padding_string(&em[2..index], block_type)?;

    let msg = &em[index + 1..];
    if msg.is_empty() {
        return Err(PaddingDefect::EmptyMessage.into());
    }

    Ok(msg.to_vec())
}

/// Like [`unpad`], but for a decrypted block that should be wiped after use.
pub(crate) fn unpad_zeroizing(em: Zeroizing<Vec<u8>>, block_type: BlockType) -> Result<Vec<u8>> {
    unpad(&em, block_type)
}

/// Largest message, in bytes, that can be padded for a modulus of
/// `key_size` bits.
pub fn max_message_size(key_size: usize) -> usize {
    byte_length(key_size).saturating_sub(PADDING_OVERHEAD)
}

/// Reports whether a `message_len`-byte message can be padded for a modulus
/// of `key_size` bits.
pub fn fits(message_len: usize, key_size: usize) -> bool {
    byte_length(key_size) >= PADDING_OVERHEAD && message_len <= max_message_size(key_size)
}

/// Inspects `em` without failing, collecting every defect it finds.
pub fn analyze(em: &[u8]) -> PaddingReport {
    let mut report = PaddingReport {
        length: em.len(),
        ..Default::default()
    };

    if em.len() < PADDING_OVERHEAD {
        report.defects.push(PaddingDefect::TooShort);
        return report;
    }

    if em[0] != 0 {
        report.defects.push(PaddingDefect::InvalidLeadingByte(em[0]));
    }

    report.block_type = Some(em[1]);
    let block_type = match BlockType::try_from(em[1]) {
        Ok(bt) => Some(bt),
        Err(defect) => {
            report.defects.push(defect);
            None
        }
    };

    let index = match find_separator(em) {
        Some(index) => index,
        None => {
            report.defects.push(PaddingDefect::MissingSeparator);
            return report;
        }
    };

    report.padding_length = index - 2;
    report.message_length = em.len() - index - 1;

    if report.padding_length < MIN_PADDING_LEN {
        report.defects.push(PaddingDefect::PaddingTooShort);
    }
    if let Some(block_type) = block_type {
        if let Err(defect) = check_padding_string(&em[2..index], block_type) {
            report.defects.push(defect);
        }
    }
    if report.message_length == 0 {
        report.defects.push(PaddingDefect::EmptyMessage);
    }

    report.valid = report.defects.is_empty();
    report
}
