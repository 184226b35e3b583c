//! Engine configuration.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::prime::{DEFAULT_PUBLIC_EXPONENTS, GENERATION_ROUNDS, POLLARD_RHO_MAX_ITERATIONS};

/// Message encrypted and decrypted by [`RsaEngine::benchmark_performance`](crate::RsaEngine::benchmark_performance).
pub const DEFAULT_BENCHMARK_MESSAGE: &str = "Performance benchmark test message";

/// Tunables for an [`RsaEngine`](crate::RsaEngine).
///
/// Missing fields take their default when deserialized, so a partial JSON
/// document such as `{"miller_rabin_rounds": 40}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Miller-Rabin rounds per candidate during key generation.
    pub miller_rabin_rounds: usize,
    /// Public exponents tried in order before the odd linear search.
    pub preferred_exponents: Vec<u64>,
    /// Hash used by [`RsaEngine::sign_default`](crate::RsaEngine::sign_default).
    pub default_hash: HashAlgorithm,
    /// Iteration cap for Pollard's rho.
    pub pollard_rho_max_iterations: usize,
    /// Plaintext used by the benchmark.
    pub benchmark_message: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            miller_rabin_rounds: GENERATION_ROUNDS,
            preferred_exponents: DEFAULT_PUBLIC_EXPONENTS.to_vec(),
            default_hash: HashAlgorithm::default(),
            pollard_rho_max_iterations: POLLARD_RHO_MAX_ITERATIONS,
            benchmark_message: DEFAULT_BENCHMARK_MESSAGE.into(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document; unknown hash names, malformed
    /// input and unusable values fail with [`Error::InvalidConfig`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Checks the values key generation depends on.
    ///
    /// At least one Miller-Rabin round is required, and every preferred
    /// public exponent must be odd and at least 3.
    pub fn validate(&self) -> Result<()> {
        if self.miller_rabin_rounds == 0 {
            return Err(Error::InvalidConfig(
                "miller_rabin_rounds must be at least 1".into(),
            ));
        }

        if let Some(e) = self
            .preferred_exponents
            .iter()
            .find(|&&e| e < 3 || e % 2 == 0)
        {
            return Err(Error::InvalidConfig(format!(
                "public exponent {e} must be odd and at least 3"
            )));
        }

        Ok(())
    }
}
