//! Fee calculation
//!
//! Closed-form size estimate for P2PKH transactions. Signatures are
//! assumed at their maximum DER length, so the estimate never
//! undershoots the signed size.

use serde::{Deserialize, Serialize};

/// outpoint(36) + scriptSig length(1) + scriptSig(<=107) + sequence(4)
pub const P2PKH_INPUT_SIZE: u64 = 148;
/// value(8) + script length(1) + script(25)
pub const P2PKH_OUTPUT_SIZE: u64 = 34;
/// version(4) + input count(<=3) + output count(1) + locktime(4), rounded up
pub const TX_OVERHEAD: u64 = 10;

/// Fee rate in minor units per byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(u64);

impl FeeRate {
    pub const DEFAULT: FeeRate = FeeRate(1);

    pub const fn from_sat_per_byte(sat_per_byte: u64) -> Self {
        Self(sat_per_byte)
    }

    pub const fn sat_per_byte(self) -> u64 {
        self.0
    }

    /// Absolute fee for a transaction of `size` bytes.
    pub fn fee_for_size(self, size: u64) -> u64 {
        size.saturating_mul(self.0)
    }
}

/// Estimated serialized size of a P2PKH transaction.
pub fn estimate_tx_size(num_inputs: usize, num_outputs: usize) -> u64 {
    TX_OVERHEAD + (num_inputs as u64) * P2PKH_INPUT_SIZE + (num_outputs as u64) * P2PKH_OUTPUT_SIZE
}

pub fn calculate_tx_fee(num_inputs: usize, num_outputs: usize, fee_rate: FeeRate) -> u64 {
    fee_rate.fee_for_size(estimate_tx_size(num_inputs, num_outputs))
}

/// Cost of spending one more P2PKH input at `fee_rate`.
pub fn input_cost(fee_rate: FeeRate) -> u64 {
    fee_rate.fee_for_size(P2PKH_INPUT_SIZE)
}
