//! Generate the components of a two-prime RSA key

use num_bigint::BigUint;
use rand_core::RngCore;
use zeroize::Zeroize;

use crate::algorithms::rsa::compute_totient;
use crate::errors::{Error, Result};
use crate::math::modular_inverse;
use crate::prime::{find_public_exponent, generate_prime_pair_with_rounds};

/// Smallest modulus size accepted for key generation.
pub const MIN_KEY_SIZE: usize = 512;

pub(crate) struct RsaKeyComponents {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub primes: [BigUint; 2],
}

impl Drop for RsaKeyComponents {
    fn drop(&mut self) {
        self.d.zeroize();
        for prime in self.primes.iter_mut() {
            prime.zeroize();
        }
    }
}

/// Generates a two-prime RSA key of roughly `bit_size` bits.
///
/// Each prime has `bit_size / 2` bits with only the top bit forced, so the
/// modulus may come out one bit short of `bit_size`.
pub(crate) fn generate_key_components<R: RngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    rounds: usize,
    exponents: &[u64],
) -> Result<RsaKeyComponents> {
    if bit_size < MIN_KEY_SIZE {
        return Err(Error::KeySizeTooSmall);
    }

    let prime_size = bit_size / 2;
    tracing::debug!(bit_size, prime_size, rounds, "generating prime pair");
    let (p, q) = generate_prime_pair_with_rounds(rng, prime_size, rounds)?;

    let n = &p * &q;
    let mut phi = compute_totient(&p, &q);
    let e = find_public_exponent(&phi, exponents)?;
    let d = modular_inverse(&e, &phi);
    phi.zeroize();
    let d = d?;

    tracing::debug!(key_size = n.bits(), e = %e, "generated key components");

    Ok(RsaKeyComponents {
        n,
        e,
        d,
        primes: [p, q],
    })
}
