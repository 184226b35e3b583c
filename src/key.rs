use core::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use zeroize::Zeroize;

use crate::errors::{Error, Result};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// An RSA key: the public pair `(e, n)` and, optionally, the private
/// exponent `d`.
///
/// A public-only key may receive its private exponent once, through
/// [`KeyPair::merge_private`] or [`KeyPair::merge`]. Nothing else mutates a
/// key after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// Public exponent
    e: BigUint,
    /// Modulus
    n: BigUint,
    /// Private exponent
    d: Option<BigUint>,
}

impl KeyPair {
    /// Builds a public-only key.
    pub fn new_public(e: BigUint, n: BigUint) -> Result<KeyPair> {
        Self::from_components(e, n, None)
    }

    /// Builds a key from stored components.
    ///
    /// Only structural checks are made: `n >= 2` and `e, d > 0`. Nothing
    /// verifies that `d` inverts `e`, since the totient is not known here.
    pub fn from_components(e: BigUint, n: BigUint, d: Option<BigUint>) -> Result<KeyPair> {
        if n < BigUint::from(2u8) {
            return Err(Error::InvalidModulus);
        }
        if e.is_zero() || d.as_ref().map_or(false, Zero::is_zero) {
            return Err(Error::KeyImportFormat("exponent must be positive".into()));
        }

        Ok(KeyPair { e, n, d })
    }

    /// Returns a copy without the private exponent.
    pub fn public_key(&self) -> KeyPair {
        KeyPair {
            e: self.e.clone(),
            n: self.n.clone(),
            d: None,
        }
    }

    /// Attaches a private exponent to a public-only key.
    pub fn merge_private(&mut self, d: BigUint) -> Result<()> {
        if self.d.is_some() {
            return Err(Error::PrivateKeyAlreadyLoaded);
        }
        if d.is_zero() {
            return Err(Error::KeyImportFormat("exponent must be positive".into()));
        }

        self.d = Some(d);
        Ok(())
    }

    /// Takes the private exponent of `other`, which must share this key's
    /// modulus and public exponent.
    pub fn merge(&mut self, other: &KeyPair) -> Result<()> {
        if self.n != other.n || self.e != other.e {
            return Err(Error::KeyMismatch);
        }

        match other.d {
            Some(ref d) => self.merge_private(d.clone()),
            None => Err(Error::NoPrivateKey),
        }
    }
}

impl PublicKeyParts for KeyPair {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }
}

impl PrivateKeyParts for KeyPair {
    fn d(&self) -> Option<&BigUint> {
        self.d.as_ref()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        if let Some(ref mut d) = self.d {
            d.zeroize();
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("e", &self.e)
            .field("n", &self.n)
            .field("d", &self.d.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Display for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_private_key() {
            write!(f, "RSA Key Pair ({} bits)", self.key_size())
        } else {
            write!(f, "RSA Public Key ({} bits)", self.key_size())
        }
    }
}
