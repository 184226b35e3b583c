#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs)]

//! From-scratch RSA: prime generation, PKCS#1 v1.5-style padding, text
//! encryption and hash-then-sign signatures, built on
//! [`num-bigint-dig`](https://docs.rs/num-bigint-dig).
//!
//! The crate is organised in layers:
//!
//! - [`math`]: number theory (gcd, inverses, modular exponentiation, Jacobi symbol)
//! - [`prime`]: Miller-Rabin testing, prime and safe-prime search, Pollard's rho
//! - [`padding`]: block type 1 and 2 padding with defect analysis
//! - [`RsaEngine`]: key generation and every operation on a loaded [`KeyPair`]
//!
//! # Usage
//!
//! ## Text encryption
//!
//! ```
//! use cryptoforge::{RandomSource, RsaEngine};
//! use cryptoforge::rand_core::OsRng;
//!
//! let mut engine = RsaEngine::new();
//! engine.generate_key_pair(512, RandomSource::Seeded(42)).expect("failed to generate a key");
//!
//! // Encrypt
//! let ciphertext = engine.encrypt_text(&mut OsRng, "hello world").expect("failed to encrypt");
//! assert_ne!(ciphertext, "hello world");
//!
//! // Decrypt
//! let plaintext = engine.decrypt_text(&ciphertext).expect("failed to decrypt");
//! assert_eq!(plaintext, "hello world");
//! ```
//!
//! [`RandomSource::Seeded`] keys are reproducible and **not** secure. Use
//! [`RandomSource::Secure`] for anything but tests.
//!
//! ## Signatures
//!
//! ```
//! use cryptoforge::{HashAlgorithm, RandomSource, RsaEngine};
//!
//! let mut engine = RsaEngine::new();
//! engine.generate_key_pair(512, RandomSource::Seeded(7)).expect("failed to generate a key");
//!
//! // Sign
//! let signature = engine.sign_message("hello world", HashAlgorithm::Sha256).expect("failed to sign");
//!
//! // Verify
//! assert!(engine.verify_signature("hello world", &signature, HashAlgorithm::Sha256));
//! assert!(!engine.verify_signature("hello w0rld", &signature, HashAlgorithm::Sha256));
//! ```
//!
//! ## Key export
//!
//! ```
//! use cryptoforge::{RandomSource, RsaEngine};
//! use cryptoforge::rand_core::OsRng;
//!
//! let mut engine = RsaEngine::new();
//! engine.generate_key_pair(512, RandomSource::Seeded(1)).expect("failed to generate a key");
//! let bundle = engine.export_key_pair().expect("failed to export");
//!
//! // Encrypt with the public half only
//! let mut public = RsaEngine::new();
//! public.load_public_key(&bundle.public_key).expect("failed to import");
//! let ciphertext = public.encrypt_text(&mut OsRng, "for your eyes only").expect("failed to encrypt");
//!
//! assert_eq!(engine.decrypt_text(&ciphertext).expect("failed to decrypt"), "for your eyes only");
//! ```
//!
//! # Security
//!
//! This crate is for learning. Decryption is not constant time and the
//! padding checks report which check failed.

extern crate alloc;

pub use num_bigint::BigUint;
pub use rand_core;

mod algorithms;
pub mod config;
pub mod encoding;
pub mod engine;
pub mod errors;
pub mod export;
pub mod hash;
pub mod math;
pub mod padding;
pub mod prime;
pub mod traits;

mod dummy_rng;
mod key;

pub use crate::{
    algorithms::generate::MIN_KEY_SIZE,
    config::EngineConfig,
    engine::{BenchmarkReport, KeyInfo, RandomSource, RsaEngine},
    errors::{Error, Result},
    export::KeyBundle,
    hash::HashAlgorithm,
    key::KeyPair,
    padding::{BlockType, PaddingDefect, PaddingReport},
    traits::{PrivateKeyParts, PublicKeyParts},
};

#[cfg(feature = "hazmat")]
pub mod hazmat;
