//! Engine configuration
//!
//! JSON shape matches the wallet frontend's settings object (camelCase).
//! Every field has an explicit default so older settings blobs keep
//! loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::Chain;
use crate::coin_selection::SortingStrategy;
use crate::fee::FeeRate;
use crate::keys::DerivationType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fee rate must be positive")]
    ZeroFeeRate,
}

fn default_chain() -> Chain {
    Chain::Bitcoin
}

fn default_fee_per_byte() -> u64 {
    FeeRate::DEFAULT.sat_per_byte()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_chain")]
    pub chain: Chain,
    #[serde(default = "default_fee_per_byte")]
    pub fee_per_byte: u64,
    #[serde(default)]
    pub sorting_strategy: SortingStrategy,
    #[serde(default)]
    pub account_index: u32,
    /// Falls back to the chain's default derivation when absent.
    #[serde(default)]
    pub derivation_type: Option<DerivationType>,
    /// Overrides the fee-rate based dust threshold.
    #[serde(default)]
    pub dust_threshold: Option<u64>,
    #[serde(default)]
    pub required_confirmations: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            fee_per_byte: default_fee_per_byte(),
            sorting_strategy: SortingStrategy::default(),
            account_index: 0,
            derivation_type: None,
            dust_threshold: None,
            required_confirmations: None,
        }
    }
}

impl EngineConfig {
    pub fn for_chain(chain: Chain) -> Self {
        Self {
            chain,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        if config.fee_per_byte == 0 {
            return Err(ConfigError::ZeroFeeRate);
        }
        Ok(config)
    }

    pub fn fee_rate(&self) -> FeeRate {
        FeeRate::from_sat_per_byte(self.fee_per_byte)
    }

    pub fn derivation_type(&self) -> DerivationType {
        self.derivation_type
            .unwrap_or(self.chain.params().default_derivation)
    }

    pub fn dust_threshold(&self) -> u64 {
        self.dust_threshold
            .unwrap_or_else(|| self.chain.dust_threshold(self.fee_per_byte))
    }

    pub fn required_confirmations(&self) -> u32 {
        self.required_confirmations
            .unwrap_or(self.chain.params().required_confirmations)
    }
}
