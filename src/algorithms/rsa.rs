//! Generic RSA implementation

use num_bigint::BigUint;

use crate::errors::{Error, Result};
use crate::math::fast_modular_exponentiation;
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// ⚠️ Raw RSA encryption of m with the public key. No padding is performed.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_encrypt<K: PublicKeyParts>(key: &K, m: &BigUint) -> Result<BigUint> {
    if m >= key.n() {
        return Err(Error::MessageTooLarge);
    }

    fast_modular_exponentiation(m, key.e(), key.n())
}

/// ⚠️ Performs raw RSA decryption with no padding or error checking.
///
/// Returns a plaintext `BigUint`.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_decrypt<K: PrivateKeyParts>(priv_key: &K, c: &BigUint) -> Result<BigUint> {
    let d = priv_key.d().ok_or(Error::NoPrivateKey)?;

    if c >= priv_key.n() {
        return Err(Error::CiphertextOutOfRange);
    }

    fast_modular_exponentiation(c, d, priv_key.n())
}

/// Computes `φ(n) = (p - 1)(q - 1)`.
pub(crate) fn compute_totient(p: &BigUint, q: &BigUint) -> BigUint {
    (p - 1u32) * (q - 1u32)
}
