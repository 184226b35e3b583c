//! The stateful RSA engine: one key pair per session.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;
use std::time::Instant;

use digest::Digest;
use num_bigint::BigUint;
use rand_core::{CryptoRngCore, OsRng, RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::algorithms::generate::generate_key_components;
use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
use crate::config::EngineConfig;
use crate::dummy_rng::DummyRng;
use crate::encoding::{
    bytes_to_uint, decode_base64, encode_base64, join_blocks, split_blocks, uint_to_be_pad,
    uint_to_zeroizing_be_pad,
};
use crate::errors::{Error, Result};
use crate::export::{export_key_pair, import_private_key, import_public_key, KeyBundle};
use crate::hash::HashAlgorithm;
use crate::key::KeyPair;
use crate::padding::{fits, max_message_size, pad, unpad, unpad_zeroizing, BlockType};
use crate::prime::pollard_rho_factorization;
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// Where key generation draws its randomness from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomSource {
    /// The operating system's CSPRNG.
    Secure,
    /// A xorshift generator seeded with the given value.
    ///
    /// Reproducible and **not** cryptographically secure; meant for tests
    /// and demonstrations.
    Seeded(u64),
}

/// Summary of the loaded key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Modulus size in bits.
    pub key_size: usize,
    /// Public exponent.
    pub public_exponent: BigUint,
    /// Whether the private exponent is loaded.
    pub has_private_key: bool,
    /// First 16 hex digits of SHA-256 over `"{e}:{n}"`.
    pub fingerprint: String,
    /// Session identifier of the engine.
    pub session_id: String,
}

/// Timings collected by [`RsaEngine::benchmark_performance`].
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    /// Modulus size in bits.
    pub key_size: usize,
    /// Operations timed per direction.
    pub iterations: u32,
    /// Mean time of one text encryption.
    pub avg_encrypt_time: Duration,
    /// Mean time of one text decryption, if a private key is loaded.
    pub avg_decrypt_time: Option<Duration>,
    /// Encryptions per second, 0 when too fast to measure.
    pub encrypt_ops_per_sec: f64,
    /// Decryptions per second, 0 without a private key.
    pub decrypt_ops_per_sec: f64,
}

/// Holds at most one [`KeyPair`] and performs every RSA operation with it.
///
/// The engine has no interior locking. Operations that change the key take
/// `&mut self`; share an engine across threads behind a `Mutex` or similar.
#[derive(Debug)]
pub struct RsaEngine {
    key_pair: Option<KeyPair>,
    session_id: String,
    config: EngineConfig,
}

impl Default for RsaEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn ops_per_sec(avg: Duration) -> f64 {
    let secs = avg.as_secs_f64();
    if secs > 0.0 {
        1.0 / secs
    } else {
        0.0
    }
}

/// Pads and encrypts one block, returning the base64 ciphertext.
fn encrypt_block<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    key: &KeyPair,
    msg: &[u8],
) -> Result<String> {
    let k = key.size();
    let em = Zeroizing::new(pad(rng, msg, k, BlockType::Encryption)?);
    let c = rsa_encrypt(key, &bytes_to_uint(&em))?;
    Ok(encode_base64(&uint_to_be_pad(&c, k)?))
}

/// Decodes a modulus-width blob, failing on any other width.
fn decode_block(key: &KeyPair, data: &str) -> Result<BigUint> {
    let k = key.size();
    let bytes = decode_base64(data)?;
    if bytes.len() != k {
        return Err(Error::InvalidCiphertextLength {
            expected: k,
            actual: bytes.len(),
        });
    }
    Ok(bytes_to_uint(&bytes))
}

/// Decrypts one base64 block and strips its encryption padding.
fn decrypt_block(key: &KeyPair, data: &str) -> Result<Vec<u8>> {
    let c = decode_block(key, data)?;
    let m = rsa_decrypt(key, &c)?;
    let em = uint_to_zeroizing_be_pad(m, key.size())?;
    unpad_zeroizing(em, BlockType::Encryption)
}

impl RsaEngine {
    /// Creates an engine with the default configuration and no key.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with `config` and no key.
    ///
    /// `config` is checked with [`EngineConfig::validate`] before each key
    /// generation.
    pub fn with_config(config: EngineConfig) -> Self {
        let session_id = new_session_id();
        tracing::debug!(%session_id, "created engine");
        RsaEngine {
            key_pair: None,
            session_id,
            config,
        }
    }

    /// Opaque identifier of this engine, 32 lowercase hex digits.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The loaded key, if any.
    pub fn key_pair(&self) -> Option<&KeyPair> {
        self.key_pair.as_ref()
    }

    fn loaded_key(&self) -> Result<&KeyPair> {
        self.key_pair.as_ref().ok_or(Error::NoKeyLoaded)
    }

    fn private_key(&self) -> Result<&KeyPair> {
        self.key_pair
            .as_ref()
            .filter(|key| key.has_private_key())
            .ok_or(Error::NoPrivateKey)
    }

    /// Generates and loads a new key pair of `bit_size` bits (at least 512).
    pub fn generate_key_pair(&mut self, bit_size: usize, source: RandomSource) -> Result<&KeyPair> {
        match source {
            RandomSource::Secure => self.generate_key_pair_with_rng(&mut OsRng, bit_size),
            RandomSource::Seeded(seed) => {
                tracing::warn!(seed, "generating key from a seeded, non-secure generator");
                let mut rng = XorShiftRng::seed_from_u64(seed);
                self.generate_key_pair_with_rng(&mut rng, bit_size)
            }
        }
    }

    /// Like [`RsaEngine::generate_key_pair`] with a caller-supplied generator.
    pub fn generate_key_pair_with_rng<R: RngCore + ?Sized>(
        &mut self,
        rng: &mut R,
        bit_size: usize,
    ) -> Result<&KeyPair> {
        self.config.validate()?;
        let components = generate_key_components(
            rng,
            bit_size,
            self.config.miller_rabin_rounds,
            &self.config.preferred_exponents,
        )?;

        let key = KeyPair::from_components(
            components.e.clone(),
            components.n.clone(),
            Some(components.d.clone()),
        )?;
        tracing::debug!(
            session_id = %self.session_id,
            key_size = key.key_size(),
            "loaded generated key"
        );

        let key: &KeyPair = self.key_pair.insert(key);
        Ok(key)
    }

    /// Replaces the loaded key.
    pub fn load_key_pair(&mut self, key: KeyPair) {
        tracing::debug!(
            session_id = %self.session_id,
            key_size = key.key_size(),
            private = key.has_private_key(),
            "loaded key"
        );
        self.key_pair = Some(key);
    }

    /// Replaces the loaded key with an exported public key.
    pub fn load_public_key(&mut self, data: &str) -> Result<()> {
        let key = import_public_key(data)?;
        self.load_key_pair(key);
        Ok(())
    }

    /// Loads an exported private key.
    ///
    /// With no key loaded the private key becomes the loaded key. A loaded
    /// public-only key receives the private exponent, provided both describe
    /// the same key; a key that already has one is left untouched.
    pub fn load_private_key(&mut self, data: &str) -> Result<()> {
        let imported = import_private_key(data)?;

        if let Some(key) = self.key_pair.as_mut() {
            key.merge(&imported)?;
            tracing::debug!(session_id = %self.session_id, "merged private key");
            return Ok(());
        }

        self.load_key_pair(imported);
        Ok(())
    }

    /// Exports the loaded key.
    pub fn export_key_pair(&self) -> Result<KeyBundle> {
        export_key_pair(self.loaded_key()?)
    }

    /// Computes `m^e mod n`.
    pub fn encrypt_number(&self, m: &BigUint) -> Result<BigUint> {
        rsa_encrypt(self.loaded_key()?, m)
    }

    /// Computes `c^d mod n`.
    pub fn decrypt_number(&self, c: &BigUint) -> Result<BigUint> {
        rsa_decrypt(self.private_key()?, c)
    }

    /// Pads and encrypts `text`, returning base64 of the modulus-width
    /// ciphertext.
    pub fn encrypt_text<R: CryptoRngCore + ?Sized>(&self, rng: &mut R, text: &str) -> Result<String> {
        let key = self.loaded_key()?;
        if !fits(text.len(), key.key_size()) {
            return Err(Error::MessageTooLarge);
        }
        encrypt_block(rng, key, text.as_bytes())
    }

    /// Reverses [`RsaEngine::encrypt_text`].
    ///
    /// Apart from a missing private key, every failure is reported as
    /// [`Error::DecryptionFailed`] wrapping the cause.
    pub fn decrypt_text(&self, data: &str) -> Result<String> {
        let key = self.private_key()?;

        decrypt_block(key, data)
            .and_then(|bytes| Ok(String::from_utf8(bytes)?))
            .map_err(|err| {
                tracing::warn!(%err, "text decryption failed");
                err.into_decryption_failure()
            })
    }

    /// Encrypts `text` of any length as independent blocks of at most
    /// [`max_message_size`] bytes. Blocks may split a UTF-8 sequence.
    pub fn encrypt_long_text<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        text: &str,
    ) -> Result<Vec<String>> {
        let key = self.loaded_key()?;
        let block_size = max_message_size(key.key_size());

        split_blocks(text.as_bytes(), block_size)?
            .into_iter()
            .map(|block| encrypt_block(rng, key, block))
            .collect()
    }

    /// Reverses [`RsaEngine::encrypt_long_text`]. The blocks are joined
    /// before UTF-8 decoding.
    pub fn decrypt_long_text<S: AsRef<str>>(&self, blocks: &[S]) -> Result<String> {
        let key = self.private_key()?;

        let plain = blocks
            .iter()
            .map(|block| decrypt_block(key, block.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map_err(|err| {
                tracing::warn!(%err, "block decryption failed");
                err
            })?;

        Ok(String::from_utf8(join_blocks(&plain))?)
    }

    /// Signs the `hash` digest of `text` with the private exponent.
    pub fn sign_message(&self, text: &str, hash: HashAlgorithm) -> Result<String> {
        let key = self.private_key()?;
        let k = key.size();

        let digest = hash.digest(text.as_bytes());
        let em = pad(&mut DummyRng, &digest, k, BlockType::Signature)?;
        let s = rsa_decrypt(key, &bytes_to_uint(&em))?;

        Ok(encode_base64(&uint_to_be_pad(&s, k)?))
    }

    /// Signs with the configured default hash.
    pub fn sign_default(&self, text: &str) -> Result<String> {
        self.sign_message(text, self.config.default_hash)
    }

    fn check_signature(&self, text: &str, signature: &str, hash: HashAlgorithm) -> Result<bool> {
        let key = self.loaded_key()?;

        let s = decode_block(key, signature)?;
        let m = rsa_encrypt(key, &s)?;
        let em = uint_to_be_pad(&m, key.size())?;
        let recovered = unpad(&em, BlockType::Signature)?;

        let expected = hash.digest(text.as_bytes());
        Ok(recovered.as_slice().ct_eq(expected.as_slice()).into())
    }

    /// Reports whether `signature` is a valid signature of `text`. Never
    /// fails: malformed input and a missing key both yield `false`.
    pub fn verify_signature(&self, text: &str, signature: &str, hash: HashAlgorithm) -> bool {
        match self.check_signature(text, signature, hash) {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(%hash, "signature digest mismatch");
                false
            }
            Err(err) => {
                tracing::warn!(%hash, %err, "signature rejected");
                false
            }
        }
    }

    /// Verifies with the configured default hash.
    pub fn verify_default(&self, text: &str, signature: &str) -> bool {
        self.verify_signature(text, signature, self.config.default_hash)
    }

    /// Like [`RsaEngine::verify_signature`], naming the hash; unknown names
    /// yield `false`.
    pub fn verify_signature_named(&self, text: &str, signature: &str, hash: &str) -> bool {
        match hash.parse() {
            Ok(hash) => self.verify_signature(text, signature, hash),
            Err(err) => {
                tracing::warn!(%err, "signature rejected");
                false
            }
        }
    }

    /// Describes the loaded key.
    pub fn key_info(&self) -> Result<KeyInfo> {
        let key = self.loaded_key()?;
        let digest = Sha256::digest(format!("{}:{}", key.e(), key.n()).as_bytes());
        let mut fingerprint = hex::encode(digest);
        fingerprint.truncate(16);

        Ok(KeyInfo {
            key_size: key.key_size(),
            public_exponent: key.e().clone(),
            has_private_key: key.has_private_key(),
            fingerprint,
            session_id: self.session_id.clone(),
        })
    }

    /// Times `iterations` text encryptions, and as many decryptions when a
    /// private key is loaded, of the configured benchmark message.
    pub fn benchmark_performance<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        iterations: u32,
    ) -> Result<BenchmarkReport> {
        let key = self.loaded_key()?;
        if iterations == 0 {
            return Err(Error::InvalidIterations);
        }

        let message = self.config.benchmark_message.as_str();

        let start = Instant::now();
        let mut encrypted = String::new();
        for _ in 0..iterations {
            encrypted = self.encrypt_text(rng, message)?;
        }
        let avg_encrypt_time = start.elapsed() / iterations;

        let avg_decrypt_time = if key.has_private_key() {
            let start = Instant::now();
            for _ in 0..iterations {
                self.decrypt_text(&encrypted)?;
            }
            Some(start.elapsed() / iterations)
        } else {
            None
        };

        tracing::debug!(
            key_size = key.key_size(),
            iterations,
            ?avg_encrypt_time,
            ?avg_decrypt_time,
            "benchmark finished"
        );

        Ok(BenchmarkReport {
            key_size: key.key_size(),
            iterations,
            avg_encrypt_time,
            avg_decrypt_time,
            encrypt_ops_per_sec: ops_per_sec(avg_encrypt_time),
            decrypt_ops_per_sec: avg_decrypt_time.map_or(0.0, ops_per_sec),
        })
    }

    /// Looks for a factor of `n` with Pollard's rho, capped at the configured
    /// iteration count. Returns `n` when none is found.
    pub fn find_factor(&self, n: &BigUint) -> BigUint {
        pollard_rho_factorization(n, self.config.pollard_rho_max_iterations)
    }
}
