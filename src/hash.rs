//! Digest algorithms usable for signing.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use digest::Digest;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Sha256, Sha384, Sha512};

use crate::errors::Error;

/// Hash functions supported for signatures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Hashes `msg`.
    pub fn digest(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(msg).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(msg).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(msg).to_vec(),
        }
    }

    /// Returns the length in bytes of a digest.
    pub fn size(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => <Sha256 as Digest>::output_size(),
            HashAlgorithm::Sha384 => <Sha384 as Digest>::output_size(),
            HashAlgorithm::Sha512 => <Sha512 as Digest>::output_size(),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let bits = normalized
            .strip_prefix("sha")
            .map(|rest| rest.strip_prefix('-').unwrap_or(rest));

        match bits {
            Some("256") => Ok(HashAlgorithm::Sha256),
            Some("384") => Ok(HashAlgorithm::Sha384),
            Some("512") => Ok(HashAlgorithm::Sha512),
            _ => Err(Error::UnsupportedHashAlgorithm(s.to_string())),
        }
    }
}

impl Serialize for HashAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for HashAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_digest() {
        assert_eq!(
            HashAlgorithm::Sha256.digest(b"abc"),
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        for alg in [HashAlgorithm::Sha256, HashAlgorithm::Sha384, HashAlgorithm::Sha512] {
            assert_eq!(alg.digest(b"").len(), alg.size());
        }
        assert_eq!(HashAlgorithm::Sha384.size(), 48);
        assert_eq!(HashAlgorithm::Sha512.size(), 64);
    }

    #[test]
    fn test_parse() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("SHA-384".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha384);
        assert_eq!(" Sha512 ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert_eq!(
            "md5".parse::<HashAlgorithm>(),
            Err(Error::UnsupportedHashAlgorithm("md5".into()))
        );
        for name in ["s-h-a-2-5-6", "sha--256", "sha-2-56", "-sha256", "sha256-", "256"] {
            assert_eq!(
                name.parse::<HashAlgorithm>(),
                Err(Error::UnsupportedHashAlgorithm(name.into())),
                "{name}"
            );
        }
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha256);
        assert_eq!(HashAlgorithm::Sha384.to_string(), "sha384");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&HashAlgorithm::Sha512).unwrap();
        assert_eq!(json, "\"sha512\"");
        let alg: HashAlgorithm = serde_json::from_str("\"SHA-256\"").unwrap();
        assert_eq!(alg, HashAlgorithm::Sha256);
        assert!(serde_json::from_str::<HashAlgorithm>("\"whirlpool\"").is_err());
    }
}
