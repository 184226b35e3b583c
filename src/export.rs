//! Key export and import.
//!
//! A key is stored as a compact JSON record wrapped in standard base64:
//!
//! ```text
//! {"type":"RSA_PUBLIC_KEY","e":65537,"n":...,"key_size":2048}
//! {"type":"RSA_PRIVATE_KEY","e":65537,"n":...,"d":...,"key_size":2048}
//! ```
//!
//! Integers are written as exact JSON numbers, never as floats or strings.

use alloc::format;
use alloc::string::{String, ToString};
use core::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::encoding::{decode_base64, encode_base64};
use crate::errors::{Error, Result};
use crate::key::KeyPair;
use crate::traits::{PrivateKeyParts, PublicKeyParts};

const PUBLIC_KEY_TYPE: &str = "RSA_PUBLIC_KEY";
const PRIVATE_KEY_TYPE: &str = "RSA_PRIVATE_KEY";

#[derive(Serialize, Deserialize)]
struct KeyRecord {
    #[serde(rename = "type")]
    kind: String,
    e: Number,
    n: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    d: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_size: Option<usize>,
}

/// Both halves of an exported key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBundle {
    /// Exported public key.
    pub public_key: String,
    /// Exported private key, absent for public-only keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

fn to_number(value: &BigUint) -> Result<Number> {
    Number::from_str(&value.to_str_radix(10))
        .map_err(|e| Error::KeyImportFormat(format!("unrepresentable integer: {e}")))
}

fn from_number(field: &str, value: &Number) -> Result<BigUint> {
    BigUint::parse_bytes(value.to_string().as_bytes(), 10)
        .ok_or_else(|| Error::KeyImportFormat(format!("{field} is not a non-negative integer")))
}

fn encode_record(record: &KeyRecord) -> Result<String> {
    let json = serde_json::to_vec(record)
        .map_err(|e| Error::KeyImportFormat(format!("failed to serialize key: {e}")))?;
    Ok(encode_base64(&json))
}

fn decode_record(data: &str, expected_kind: &str) -> Result<KeyRecord> {
    let json = decode_base64(data)
        .map_err(|_| Error::KeyImportFormat("key is not valid base64".into()))?;
    let record: KeyRecord = serde_json::from_slice(&json)
        .map_err(|e| Error::KeyImportFormat(format!("malformed key record: {e}")))?;

    if record.kind != expected_kind {
        return Err(Error::KeyImportFormat(format!(
            "expected {expected_kind}, found {}",
            record.kind
        )));
    }

    Ok(record)
}

/// Exports the public half of `key`.
pub fn export_public_key(key: &KeyPair) -> Result<String> {
    encode_record(&KeyRecord {
        kind: PUBLIC_KEY_TYPE.into(),
        e: to_number(key.e())?,
        n: to_number(key.n())?,
        d: None,
        key_size: Some(key.key_size()),
    })
}

/// Exports the full key; fails with [`Error::NoPrivateKey`] for public-only keys.
pub fn export_private_key(key: &KeyPair) -> Result<String> {
    let d = key.d().ok_or(Error::NoPrivateKey)?;

    encode_record(&KeyRecord {
        kind: PRIVATE_KEY_TYPE.into(),
        e: to_number(key.e())?,
        n: to_number(key.n())?,
        d: Some(to_number(d)?),
        key_size: Some(key.key_size()),
    })
}

/// Exports both halves; the private half only when `key` has one.
pub fn export_key_pair(key: &KeyPair) -> Result<KeyBundle> {
    let private_key = if key.has_private_key() {
        Some(export_private_key(key)?)
    } else {
        None
    };

    Ok(KeyBundle {
        public_key: export_public_key(key)?,
        private_key,
    })
}

/// Reads the modulus, checking it against `key_size` when the record has one.
fn record_modulus(record: &KeyRecord) -> Result<BigUint> {
    let n = from_number("n", &record.n)?;
    match record.key_size {
        Some(key_size) if key_size != n.bits() => Err(Error::KeyImportFormat(format!(
            "key_size {key_size} does not match a {}-bit modulus",
            n.bits()
        ))),
        _ => Ok(n),
    }
}

/// Imports a key written by [`export_public_key`]. `key_size` is optional.
pub fn import_public_key(data: &str) -> Result<KeyPair> {
    let record = decode_record(data, PUBLIC_KEY_TYPE)?;
    KeyPair::new_public(from_number("e", &record.e)?, record_modulus(&record)?)
}

/// Imports a key written by [`export_private_key`].
pub fn import_private_key(data: &str) -> Result<KeyPair> {
    let record = decode_record(data, PRIVATE_KEY_TYPE)?;
    let d = record
        .d
        .as_ref()
        .ok_or_else(|| Error::KeyImportFormat("missing private exponent".into()))?;

    KeyPair::from_components(
        from_number("e", &record.e)?,
        record_modulus(&record)?,
        Some(from_number("d", d)?),
    )
}

/// Imports the public half of `bundle`, then merges in the private half if
/// present. The halves must describe the same key.
pub fn import_key_bundle(bundle: &KeyBundle) -> Result<KeyPair> {
    let mut key = import_public_key(&bundle.public_key)?;
    if let Some(ref private_key) = bundle.private_key {
        key.merge(&import_private_key(private_key)?)?;
    }
    Ok(key)
}
