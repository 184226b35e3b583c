//! Probabilistic primality testing, prime search and small factoring helpers.
//!
//! Every function that needs randomness takes it from the caller. Pass an
//! OS-backed generator (e.g. [`rand_core::OsRng`]) for production keys and a
//! seeded generator only when reproducibility matters more than secrecy.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand_core::RngCore;

use crate::errors::{Error, Result};
use crate::math::gcd;

/// Primes below 320, used for the trial-division prefilter and for
/// factoring in [`is_strong_prime`] and [`is_carmichael_number`].
pub const SMALL_PRIMES: [u16; 66] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317,
];

/// Miller-Rabin rounds used while generating primes for keys.
pub const GENERATION_ROUNDS: usize = 20;

/// Miller-Rabin rounds used by the ad-hoc predicates in this module.
pub const DEFAULT_ROUNDS: usize = 10;

/// Public exponents tried, in order, by [`find_public_exponent`].
pub const DEFAULT_PUBLIC_EXPONENTS: [u64; 4] = [65537, 17, 257, 3];

/// Default iteration cap for [`pollard_rho_factorization`].
pub const POLLARD_RHO_MAX_ITERATIONS: usize = 100_000;

/// The smallest Carmichael number, `3 * 11 * 17`.
pub const SMALLEST_CARMICHAEL: u64 = 561;

/// Returns the first entry of [`SMALL_PRIMES`] dividing `n`.
fn small_prime_divisor(n: &BigUint) -> Option<u16> {
    SMALL_PRIMES
        .iter()
        .copied()
        .find(|&p| (n % u32::from(p)).is_zero())
}

/// Reports whether `n` is a member of [`SMALL_PRIMES`].
fn is_small_prime(n: &BigUint) -> bool {
    match n.to_u16() {
        Some(v) => SMALL_PRIMES.binary_search(&v).is_ok(),
        None => false,
    }
}

/// Reports whether `n` passes `rounds` rounds of the Miller-Rabin test with
/// bases drawn uniformly from `[2, n - 2]`.
///
/// Members of [`SMALL_PRIMES`] are accepted and their multiples rejected
/// before any witness is drawn. A composite survives all rounds with
/// probability at most `4^-rounds`.
///
/// Not suitable for judging numbers an adversary may have crafted to fool
/// the test.
pub fn is_probable_prime<R: RngCore + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    if n < &BigUint::from(2u8) {
        return false;
    }

    if is_small_prime(n) {
        return true;
    }

    if small_prime_divisor(n).is_some() || n.is_even() {
        return false;
    }

    // n - 1 = d * 2^r with d odd
    let nm1 = n - 1u32;
    let r = nm1.trailing_zeros().unwrap_or(0);
    let d = &nm1 >> r;

    let two = BigUint::from(2u8);
    for _ in 0..rounds {
        let base = rng.gen_biguint_range(&two, &nm1);
        if is_witness(&base, n, &nm1, &d, r) {
            return false;
        }
    }

    true
}

/// Reports whether `base` proves `n` composite.
/// See Handbook of Applied Cryptography, p. 139, Algorithm 4.24.
fn is_witness(base: &BigUint, n: &BigUint, nm1: &BigUint, d: &BigUint, r: usize) -> bool {
    let mut x = base.modpow(d, n);
    if x.is_one() || &x == nm1 {
        return false;
    }

    for _ in 1..r {
        x = (&x * &x) % n;
        if &x == nm1 {
            return false;
        }
    }

    true
}

/// Draws a random odd integer of exactly `bit_size` bits.
pub fn random_odd_candidate<R: RngCore + ?Sized>(rng: &mut R, bit_size: usize) -> Result<BigUint> {
    if bit_size < 2 {
        return Err(Error::PrimeSizeTooSmall);
    }

    let mut b = bit_size % 8;
    if b == 0 {
        b = 8;
    }

    let bytes_len = (bit_size + 7) / 8;
    let mut bytes = vec![0u8; bytes_len];
    rng.fill_bytes(&mut bytes);

    // Clear bits in the first byte to make sure the candidate has a size <= bits.
    bytes[0] &= ((1u32 << b) - 1) as u8;
    // Set the most significant bit so the size is exactly bits.
    bytes[0] |= 1u8 << (b - 1);
    // Make the value odd since an even number this large certainly isn't prime.
    bytes[bytes_len - 1] |= 1u8;

    Ok(BigUint::from_bytes_be(&bytes))
}

/// Generates a probable prime of exactly `bit_size` bits, testing each
/// candidate with [`GENERATION_ROUNDS`] rounds.
pub fn generate_prime<R: RngCore + ?Sized>(rng: &mut R, bit_size: usize) -> Result<BigUint> {
    generate_prime_with_rounds(rng, bit_size, GENERATION_ROUNDS)
}

/// Like [`generate_prime`] with an explicit round count.
///
/// Retries are unbounded; the expected number of candidates grows linearly
/// with `bit_size`.
pub fn generate_prime_with_rounds<R: RngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    rounds: usize,
) -> Result<BigUint> {
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        let candidate = random_odd_candidate(rng, bit_size)?;
        if is_probable_prime(&candidate, rounds, rng) {
            tracing::trace!(bit_size, attempts, "found probable prime");
            return Ok(candidate);
        }
    }
}

/// Generates a safe prime `p = 2q + 1` of `bit_size` bits where `q` is a
/// prime of `bit_size - 1` bits.
pub fn generate_safe_prime<R: RngCore + ?Sized>(rng: &mut R, bit_size: usize) -> Result<BigUint> {
    if bit_size < 3 {
        return Err(Error::PrimeSizeTooSmall);
    }

    let mut attempts = 0usize;
    loop {
        attempts += 1;
        let q = generate_prime(rng, bit_size - 1)?;
        let p = (q << 1usize) + 1u32;
        if is_probable_prime(&p, GENERATION_ROUNDS, rng) {
            tracing::trace!(bit_size, attempts, "found safe prime");
            return Ok(p);
        }
    }
}

/// Reports whether `p` is prime and `p - 1` has a prime factor larger than
/// `p^0.3`.
///
/// `p - 1` is only trial-divided by [`SMALL_PRIMES`]; whatever cofactor is
/// left is taken as the largest factor. The threshold is a heuristic, not an
/// established strong-prime criterion.
pub fn is_strong_prime<R: RngCore + ?Sized>(p: &BigUint, rng: &mut R) -> bool {
    if !is_probable_prime(p, DEFAULT_ROUNDS, rng) {
        return false;
    }

    let mut rest = p - 1u32;
    let mut largest = BigUint::one();

    for &prime in SMALL_PRIMES.iter() {
        let prime = BigUint::from(prime);
        while !rest.is_zero() && (&rest % &prime).is_zero() {
            rest /= &prime;
            largest = prime.clone();
        }
    }

    if rest > BigUint::one() {
        largest = rest;
    }

    // largest > p^0.3  <=>  largest^10 > p^3
    num_traits::pow(largest, 10) > num_traits::pow(p.clone(), 3)
}

/// Generates two distinct primes of `bit_size` bits each.
pub fn generate_prime_pair<R: RngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
) -> Result<(BigUint, BigUint)> {
    generate_prime_pair_with_rounds(rng, bit_size, GENERATION_ROUNDS)
}

/// Like [`generate_prime_pair`] with an explicit round count.
pub fn generate_prime_pair_with_rounds<R: RngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    rounds: usize,
) -> Result<(BigUint, BigUint)> {
    let p = generate_prime_with_rounds(rng, bit_size, rounds)?;

    loop {
        let q = generate_prime_with_rounds(rng, bit_size, rounds)?;
        if q != p {
            return Ok((p, q));
        }
        tracing::debug!(bit_size, "second prime equals the first, resampling");
    }
}

/// Picks the first of `candidates` coprime to `phi`, falling back to the
/// smallest odd `e >= 3` that is.
pub fn find_public_exponent(phi: &BigUint, candidates: &[u64]) -> Result<BigUint> {
    if phi.is_zero() {
        return Err(Error::InvalidModulus);
    }

    for &e in candidates {
        let e = BigUint::from(e);
        if gcd(&e, phi).is_one() {
            return Ok(e);
        }
    }

    let mut e = BigUint::from(3u8);
    while !gcd(&e, phi).is_one() {
        e += 2u32;
    }
    Ok(e)
}

/// Searches for a non-trivial factor of `n` with Pollard's rho, iterating
/// `x -> x^2 + 1 mod n` from 2.
///
/// Returns `n` itself when nothing is found within `max_iterations` steps,
/// which is the expected outcome for primes.
pub fn pollard_rho_factorization(n: &BigUint, max_iterations: usize) -> BigUint {
    if n < &BigUint::from(2u8) {
        return n.clone();
    }
    if n.is_even() {
        return BigUint::from(2u8);
    }

    let f = |x: &BigUint| (x * x + 1u32) % n;

    let mut x = BigUint::from(2u8);
    let mut y = BigUint::from(2u8);

    for _ in 0..max_iterations {
        x = f(&x);
        y = f(&f(&y));

        let diff = if x > y { &x - &y } else { &y - &x };
        let d = gcd(&diff, n);
        if d > BigUint::one() && &d < n {
            return d;
        }
    }

    n.clone()
}

/// Reports whether `n` is a Carmichael number whose prime factors, except
/// possibly the largest, are all in [`SMALL_PRIMES`].
pub fn is_carmichael_number<R: RngCore + ?Sized>(n: &BigUint, rng: &mut R) -> bool {
    if n < &BigUint::from(SMALLEST_CARMICHAEL) || is_probable_prime(n, DEFAULT_ROUNDS, rng) {
        return false;
    }

    let mut factors = Vec::new();
    let mut rest = n.clone();

    for &prime in SMALL_PRIMES.iter() {
        let prime = BigUint::from(prime);
        if (&rest % &prime).is_zero() {
            rest /= &prime;
            // must be square-free
            if (&rest % &prime).is_zero() {
                return false;
            }
            factors.push(prime);
        }
    }

    if rest > BigUint::one() {
        factors.push(rest);
    }

    // Korselt: at least three factors, each p - 1 dividing n - 1
    if factors.len() < 3 {
        return false;
    }

    let nm1 = n - 1u32;
    factors.iter().all(|p| (&nm1 % (p - 1u32)).is_zero())
}

/// Returns the smallest probable prime strictly greater than `n`.
pub fn next_prime<R: RngCore + ?Sized>(n: &BigUint, rng: &mut R) -> BigUint {
    if n < &BigUint::from(2u8) {
        return BigUint::from(2u8);
    }

    let mut candidate = if n.is_even() { n + 1u32 } else { n + 2u32 };
    while !is_probable_prime(&candidate, DEFAULT_ROUNDS, rng) {
        candidate += 2u32;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
    use rand_xorshift::XorShiftRng;

    const PRIMES: &[&str] = &[
        "2",
        "3",
        "5",
        "7",
        "11",

        "13756265695458089029",
        "13496181268022124907",
        "10953742525620032441",
        "17908251027575790097",

        // https://golang.org/issue/638
        "18699199384836356663",

        "98920366548084643601728869055592650835572950932266967461790948584315647051443",
        "94560208308847015747498523884063394671606671904944666360068158221458669711639",

        // http://primes.utm.edu/lists/small/small3.html
        "449417999055441493994709297093108513015373787049558499205492347871729927573118262811508386655998299074566974373711472560655026288668094291699357843464363003144674940345912431129144354948751003607115263071543163",
        "230975859993204150666423538988557839555560243929065415434980904258310530753006723857139742334640122533598517597674807096648905501653461687601339782814316124971547968912893214002992086353183070342498989426570593",
        // ECC primes: http://tools.ietf.org/html/draft-ladd-safecurves-02
        "3618502788666131106986593281521497120414687020801267626233049500247285301239",                                                                                  // Curve1174: 2^251-9
        "57896044618658097711785492504343953926634992332820282019728792003956564819949",                                                                                 // Curve25519: 2^255-19
        "6864797660130609714981900799081393217269435300143305409394463459185543183397656052122559640661454554977296311391480858037121987999716643812574028291115057151", // E-521: 2^521-1
    ];

    const COMPOSITES: &[&str] = &[
        "0",
        "1",
        "4",
        "9",
        // Carmichael numbers
        "561",
        "1105",
        "1729",
        "41041",

        "21284175091214687912771199898307297748211672914763848041968395774954376176754",
        "6084766654921918907427900243509372380954290099172559290432744450051395395951",
        "84594350493221918389213352992032324280367711247940675652888030554255915464401",
        "82793403787388584738507275144194252681",

        // Arnault, "Rabin-Miller Primality Test: Composite Numbers Which Pass It",
        // Mathematics of Computation, 64(209) (January 1995), pp. 335-361.
        "1195068768795265792518361315725116351898245581", // strong pseudoprime to prime bases 2 through 29

        // Strong pseudoprimes to base 2. https://oeis.org/A001262
        "2047",
        "3277",
        "4033",
        "4681",
        "8321",
        "15841",
        "29341",
        "42799",
        "49141",
        "52633",
        "65281",
        "74665",
        "80581",
        "85489",
        "88357",
        "90751",
    ];

    fn parse(s: &str) -> BigUint {
        BigUint::parse_bytes(s.as_bytes(), 10).unwrap()
    }

    fn big(v: u64) -> BigUint {
        BigUint::from_u64(v).unwrap()
    }

    fn trial_division(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        let mut i = 2;
        while i * i <= n {
            if n % i == 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    #[test]
    fn test_small_primes_table() {
        let expected: Vec<u16> = (2..320u16).filter(|&n| trial_division(n as u64)).collect();
        assert_eq!(SMALL_PRIMES.to_vec(), expected);
    }

    #[test]
    fn test_primes() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for prime in PRIMES.iter() {
            let p = parse(prime);
            for i in [1usize, 20].iter() {
                assert!(is_probable_prime(&p, *i, &mut rng), "{} is a prime ({})", prime, i);
            }
        }

        for p in (2..=97u64).filter(|&n| trial_division(n)) {
            assert!(is_probable_prime(&big(p), 20, &mut rng), "{}", p);
        }
    }

    #[test]
    fn test_composites() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for comp in COMPOSITES.iter() {
            let n = parse(comp);
            assert!(!is_probable_prime(&n, 20, &mut rng), "{} is a composite", comp);
        }
    }

    #[test]
    fn test_agrees_with_trial_division() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for n in 0..20_000u64 {
            assert_eq!(
                is_probable_prime(&big(n), 20, &mut rng),
                trial_division(n),
                "is_probable_prime({})",
                n
            );
        }
    }

    #[test]
    fn test_random_odd_candidate() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for bits in 2..80 {
            for _ in 0..8 {
                let c = random_odd_candidate(&mut rng, bits).unwrap();
                assert_eq!(c.bits(), bits);
                assert!(c.is_odd());
            }
        }
        assert_eq!(random_odd_candidate(&mut rng, 1), Err(Error::PrimeSizeTooSmall));
        assert_eq!(random_odd_candidate(&mut rng, 0), Err(Error::PrimeSizeTooSmall));
    }

    #[test]
    fn test_prime_small() {
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        for n in 2..10 {
            let p = generate_prime(&mut rng, n).unwrap();

            assert_eq!(p.bits(), n);
            assert!(is_probable_prime(&p, 32, &mut rng));
        }
    }

    #[test]
    fn test_gen_prime_512() {
        let mut rng = ChaCha8Rng::from_seed([0u8; 32]);
        let p = generate_prime(&mut rng, 512).unwrap();
        assert_eq!(p.bits(), 512);
        assert!(is_probable_prime(&p, 32, &mut rng));
    }

    #[test]
    fn test_gen_prime_seeded_is_reproducible() {
        let a = generate_prime(&mut XorShiftRng::seed_from_u64(7), 128).unwrap();
        let b = generate_prime(&mut XorShiftRng::seed_from_u64(7), 128).unwrap();
        let c = generate_prime(&mut XorShiftRng::seed_from_u64(8), 128).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_safe_prime() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for bits in [3usize, 16, 48].iter() {
            let p = generate_safe_prime(&mut rng, *bits).unwrap();
            assert_eq!(p.bits(), *bits);
            assert!(is_probable_prime(&p, 20, &mut rng));
            let q: BigUint = (&p - 1u32) >> 1usize;
            assert!(is_probable_prime(&q, 20, &mut rng));
        }
        assert_eq!(generate_safe_prime(&mut rng, 2), Err(Error::PrimeSizeTooSmall));
    }

    #[test]
    fn test_strong_prime() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        // 1019 = 2 * 509 + 1
        assert!(is_strong_prime(&big(1019), &mut rng));
        // 65537 - 1 = 2^16, 97 - 1 = 2^5 * 3
        assert!(!is_strong_prime(&big(65537), &mut rng));
        assert!(!is_strong_prime(&big(97), &mut rng));
        // not prime at all
        assert!(!is_strong_prime(&big(561), &mut rng));
        assert!(!is_strong_prime(&big(1), &mut rng));

        let p = generate_safe_prime(&mut rng, 64).unwrap();
        assert!(is_strong_prime(&p, &mut rng));
    }

    #[test]
    fn test_prime_pair() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let (p, q) = generate_prime_pair(&mut rng, 64).unwrap();
        assert_ne!(p, q);
        assert_eq!(p.bits(), 64);
        assert_eq!(q.bits(), 64);

        // 5 and 7 are the only 3-bit primes
        let (p, q) = generate_prime_pair(&mut rng, 3).unwrap();
        assert_ne!(p, q);
        assert!(p == big(5) || p == big(7));
        assert!(q == big(5) || q == big(7));
    }

    #[test]
    fn test_find_public_exponent() {
        // phi coprime to 65537
        let phi = parse("3233") - 1u32;
        assert_eq!(find_public_exponent(&phi, &DEFAULT_PUBLIC_EXPONENTS).unwrap(), big(65537));

        // 65537 | phi, 17 does not
        let phi = big(65537 * 4);
        assert_eq!(find_public_exponent(&phi, &DEFAULT_PUBLIC_EXPONENTS).unwrap(), big(17));

        // every preferred exponent divides phi: fall back to the odd search
        let phi = big(65537 * 17 * 257 * 3 * 2);
        assert_eq!(find_public_exponent(&phi, &DEFAULT_PUBLIC_EXPONENTS).unwrap(), big(5));

        assert_eq!(find_public_exponent(&big(30), &[]).unwrap(), big(7));
        assert_eq!(find_public_exponent(&big(0), &[]), Err(Error::InvalidModulus));
    }

    #[test]
    fn test_pollard_rho() {
        for (n, p, q) in [(8051u64, 83u64, 97u64), (10403, 101, 103), (455459, 613, 743)].iter() {
            let f = pollard_rho_factorization(&big(*n), POLLARD_RHO_MAX_ITERATIONS);
            assert!(f == big(*p) || f == big(*q), "factor of {} was {}", n, f);
        }

        assert_eq!(pollard_rho_factorization(&big(1000), 10), big(2));
        assert_eq!(pollard_rho_factorization(&big(101), 1000), big(101));
        assert_eq!(pollard_rho_factorization(&big(1), 1000), big(1));

        let f = pollard_rho_factorization(&big(561), POLLARD_RHO_MAX_ITERATIONS);
        assert!(f > big(1) && f < big(561));
        assert!((big(561) % &f).is_zero());
    }

    #[test]
    fn test_carmichael() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        for n in [561u64, 1105, 1729, 2465, 2821, 6601, 8911, 10585, 15841, 29341, 41041].iter() {
            assert!(is_carmichael_number(&big(*n), &mut rng), "{}", n);
        }
        for n in [0u64, 1, 560, 562, 563, 1104, 1107, 3 * 5 * 7, 9 * 11 * 17].iter() {
            assert!(!is_carmichael_number(&big(*n), &mut rng), "{}", n);
        }

        // exhaustive: the Carmichael numbers below 10000
        let found: Vec<u64> = (0..10_000u64)
            .filter(|&n| is_carmichael_number(&big(n), &mut rng))
            .collect();
        assert_eq!(found, vec![561, 1105, 1729, 2465, 2821, 6601, 8911]);
    }

    #[test]
    fn test_next_prime() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let cases = [(0u64, 2u64), (1, 2), (2, 3), (3, 5), (14, 17), (89, 97), (97, 101), (7919, 7927)];
        for (n, want) in cases.iter() {
            assert_eq!(next_prime(&big(*n), &mut rng), big(*want), "next_prime({})", n);
        }
    }
}
