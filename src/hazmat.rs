//! ⚠️ Low-level "hazmat" RSA functions.
//!
//! # ☢️️ WARNING: HAZARDOUS API ☢️
//!
//! This module holds functions that apply RSA's core encryption and decryption
//! primitives to raw integers without adding or removing padding. Without
//! padding, RSA is deterministic and malleable, so there are very few valid
//! uses for this API outside of teaching and testing.

pub use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
