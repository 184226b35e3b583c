//! Error types.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use crate::padding::PaddingDefect;

/// Alias for [`core::result::Result`] with the `cryptoforge` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Requested key size is below the 512-bit floor.
    KeySizeTooSmall,

    /// Requested prime size cannot produce a prime of that many bits.
    PrimeSizeTooSmall,

    /// The engine has no key pair loaded.
    NoKeyLoaded,

    /// The loaded key pair has no private exponent.
    NoPrivateKey,

    /// Message does not fit the modulus.
    MessageTooLarge,

    /// Ciphertext integer is not below the modulus.
    CiphertextOutOfRange,

    /// Ciphertext does not have the byte width of the modulus.
    InvalidCiphertextLength {
        /// Modulus width in bytes.
        expected: usize,
        /// Width that was supplied.
        actual: usize,
    },

    /// The value has no inverse for the given modulus.
    NoModularInverse,

    /// Modulus is zero, or even/non-positive where an odd positive one is required.
    InvalidModulus,

    /// Invalid padding length.
    InvalidPadLen,

    /// Padded block failed validation.
    InvalidPadding(PaddingDefect),

    /// Transport data is not valid base64.
    InvalidBase64,

    /// Decrypted bytes are not valid UTF-8.
    InvalidEncoding,

    /// Hash algorithm name is not one of the supported digests.
    UnsupportedHashAlgorithm(String),

    /// Exported key string could not be imported.
    KeyImportFormat(String),

    /// A private exponent was already merged into this key pair.
    PrivateKeyAlreadyLoaded,

    /// Public components of two keys do not agree.
    KeyMismatch,

    /// Engine configuration is malformed or holds unusable values.
    InvalidConfig(String),

    /// Benchmarks need at least one iteration.
    InvalidIterations,

    /// Text decryption failed.
    DecryptionFailed(Box<Error>),
}

impl Error {
    /// Wraps `self` as the cause of a text decryption failure.
    pub(crate) fn into_decryption_failure(self) -> Self {
        match self {
            Error::DecryptionFailed(_) => self,
            other => Error::DecryptionFailed(Box::new(other)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::KeySizeTooSmall => write!(f, "key size must be at least 512 bits"),
            Error::PrimeSizeTooSmall => write!(f, "prime size too small"),
            Error::NoKeyLoaded => write!(f, "no key pair loaded"),
            Error::NoPrivateKey => write!(f, "no private key available"),
            Error::MessageTooLarge => write!(f, "message too large for key size"),
            Error::CiphertextOutOfRange => write!(f, "ciphertext not below modulus"),
            Error::InvalidCiphertextLength { expected, actual } => write!(
                f,
                "invalid ciphertext length: expected {expected} bytes, got {actual}"
            ),
            Error::NoModularInverse => write!(f, "modular inverse does not exist"),
            Error::InvalidModulus => write!(f, "invalid modulus"),
            Error::InvalidPadLen => write!(f, "invalid padding length"),
            Error::InvalidPadding(defect) => write!(f, "invalid padding: {defect}"),
            Error::InvalidBase64 => write!(f, "invalid base64 data"),
            Error::InvalidEncoding => write!(f, "decrypted data is not valid UTF-8"),
            Error::UnsupportedHashAlgorithm(name) => {
                write!(f, "unsupported hash algorithm: {name}")
            }
            Error::KeyImportFormat(reason) => write!(f, "failed to import key: {reason}"),
            Error::PrivateKeyAlreadyLoaded => write!(f, "private key already loaded"),
            Error::KeyMismatch => write!(f, "key components do not match"),
            Error::InvalidConfig(reason) => write!(f, "invalid engine config: {reason}"),
            Error::InvalidIterations => write!(f, "iterations must be at least 1"),
            Error::DecryptionFailed(cause) => write!(f, "decryption failed: {cause}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DecryptionFailed(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl From<base64ct::Error> for Error {
    fn from(_: base64ct::Error) -> Self {
        Error::InvalidBase64
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(_: core::str::Utf8Error) -> Self {
        Error::InvalidEncoding
    }
}

impl From<alloc::string::FromUtf8Error> for Error {
    fn from(_: alloc::string::FromUtf8Error) -> Self {
        Error::InvalidEncoding
    }
}

impl From<PaddingDefect> for Error {
    fn from(defect: PaddingDefect) -> Self {
        Error::InvalidPadding(defect)
    }
}
