//! Traits related to the key components

use num_bigint::BigUint;

use crate::encoding::byte_length;

/// Components of an RSA public key.
pub trait PublicKeyParts {
    /// Returns the modulus of the key.
    fn n(&self) -> &BigUint;

    /// Returns the public exponent of the key.
    fn e(&self) -> &BigUint;

    /// Returns the bit length of the modulus.
    fn key_size(&self) -> usize {
        self.n().bits()
    }

    /// Returns the modulus size in bytes. Raw signatures and ciphertexts for
    /// or by this public key will have the same size.
    fn size(&self) -> usize {
        byte_length(self.key_size())
    }
}

/// Components of an RSA private key.
pub trait PrivateKeyParts: PublicKeyParts {
    /// Returns the private exponent, if one is loaded.
    fn d(&self) -> Option<&BigUint>;

    /// Reports whether a private exponent is loaded.
    fn has_private_key(&self) -> bool {
        self.d().is_some()
    }
}
