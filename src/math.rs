//! Number theory primitives used by prime and key generation.

#![allow(clippy::many_single_char_names)]

use num_bigint::Sign::Plus;
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::errors::{Error, Result};

/// Greatest common divisor by iterative Euclid. `gcd(0, 0) = 0`.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Extended Euclidean algorithm.
///
/// Returns `(g, x, y)` with `a*x + b*y = g` where `g = gcd(a, b)`.
/// For `b = 0` this is `(a, 1, 0)`.
pub fn extended_euclidean(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    // Invariants: old_r = a*old_s + b*old_t, r = a*s + b*t
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = old_r.div_floor(&r);

        let next_r = &old_r - &q * &r;
        old_r = core::mem::replace(&mut r, next_r);

        let next_s = &old_s - &q * &s;
        old_s = core::mem::replace(&mut s, next_s);

        let next_t = &old_t - &q * &t;
        old_t = core::mem::replace(&mut t, next_t);
    }

    (old_r, old_s, old_t)
}

/// Computes `x` in `[0, m)` with `a*x ≡ 1 (mod m)`.
///
/// Fails with [`Error::NoModularInverse`] when `gcd(a, m) ≠ 1`.
pub fn modular_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    if m.is_zero() {
        return Err(Error::NoModularInverse);
    }
    if m.is_one() {
        return Ok(BigUint::zero());
    }

    let a = BigInt::from_biguint(Plus, a.clone());
    let m = BigInt::from_biguint(Plus, m.clone());
    let (g, x, _) = extended_euclidean(&a, &m);

    if !g.is_one() {
        return Err(Error::NoModularInverse);
    }

    x.mod_floor(&m).to_biguint().ok_or(Error::NoModularInverse)
}

/// Generic trait to implement modular inverse
pub trait ModInverse<R: Sized>: Sized {
    /// Function to calculate the [modular multiplicative
    /// inverse](https://en.wikipedia.org/wiki/Modular_multiplicative_inverse) of an integer *a* modulo *m*.
    ///
    /// Returns the modular inverse of `self`.
    /// If none exists it returns `None`.
    fn mod_inverse(self, m: R) -> Option<Self>;
}

impl<'a> ModInverse<&'a BigUint> for BigUint {
    fn mod_inverse(self, m: &'a BigUint) -> Option<BigUint> {
        modular_inverse(&self, m).ok()
    }
}

impl ModInverse<BigUint> for BigUint {
    fn mod_inverse(self, m: BigUint) -> Option<BigUint> {
        modular_inverse(&self, &m).ok()
    }
}

impl<'a> ModInverse<&'a BigInt> for BigInt {
    fn mod_inverse(self, m: &'a BigInt) -> Option<BigInt> {
        if !m.is_positive() {
            return None;
        }
        let (g, x, _) = extended_euclidean(&self.mod_floor(m), m);
        if !g.is_one() {
            return None;
        }
        Some(x.mod_floor(m))
    }
}

/// Computes `base^exp mod modulus` by right-to-left square-and-multiply.
///
/// `modulus = 1` yields 0; a zero modulus is rejected.
pub fn fast_modular_exponentiation(
    base: &BigUint,
    exp: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint> {
    if modulus.is_zero() {
        return Err(Error::InvalidModulus);
    }
    if modulus.is_one() {
        return Ok(BigUint::zero());
    }

    let mut result = BigUint::one();
    let mut base = base % modulus;
    let mut exp = exp.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        exp >>= 1usize;
        base = (&base * &base) % modulus;
    }

    Ok(result)
}

/// Least common multiple, `|a*b| / gcd(a, b)`; `lcm(0, 0) = 0`.
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    let g = gcd(a, b);
    if g.is_zero() {
        return BigUint::zero();
    }
    (a * b) / g
}

/// Jacobi returns the Jacobi symbol (a/n), either +1, -1, or 0.
///
/// The n argument must be an odd positive integer, otherwise
/// [`Error::InvalidModulus`] is returned.
pub fn jacobi(a: &BigInt, n: &BigInt) -> Result<i8> {
    if !n.is_positive() || n.is_even() {
        return Err(Error::InvalidModulus);
    }

    let mut a = a.mod_floor(n);
    let mut n = n.clone();
    let mut j = 1i8;
    let three = BigInt::from(3u8);
    let five = BigInt::from(5u8);

    while !a.is_zero() {
        while a.is_even() {
            a >>= 1usize;
            let n_mod_8 = n.mod_floor(&BigInt::from(8u8));
            if n_mod_8 == three || n_mod_8 == five {
                j = -j;
            }
        }

        // swap numerator and denominator
        core::mem::swap(&mut a, &mut n);
        let four = BigInt::from(4u8);
        if a.mod_floor(&four) == three && n.mod_floor(&four) == three {
            j = -j;
        }

        a = a.mod_floor(&n);
    }

    if n.is_one() {
        Ok(j)
    } else {
        Ok(0)
    }
}

/// Reports whether `n` is the square of an integer.
pub fn is_perfect_square(n: &BigUint) -> bool {
    let root = n.sqrt();
    &root * &root == *n
}

/// Signed variant of [`is_perfect_square`]; negative values are never squares.
pub fn is_perfect_square_signed(n: &BigInt) -> bool {
    match n.to_biguint() {
        Some(n) => is_perfect_square(&n),
        None => false,
    }
}
