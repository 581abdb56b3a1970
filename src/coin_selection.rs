//! Coin Selection
//!
//! Picks unspent outputs to cover a target amount plus the fee their
//! inclusion costs. Fees come from the closed-form size estimate in
//! [`crate::fee`], re-evaluated each time an input is added, so no
//! fixed-point iteration is needed.
//!
//! Change below the dust threshold is never created; it is folded into
//! the fee instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fee::{calculate_tx_fee, FeeRate};
use crate::utxo::UnspentOutput;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no coins to select")]
    NoCoinsToSelect,

    #[error("target amount must be positive")]
    ZeroTarget,

    #[error("insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: u64, required: u64 },
}

/// Order in which candidate outputs are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortingStrategy {
    /// Confirmed outputs first, largest first within each group.
    #[default]
    ConfirmedFirstDescending,
    /// Smallest first; consolidates small outputs.
    Ascending,
    /// Largest first; fewest inputs.
    Descending,
}

impl SortingStrategy {
    fn sort(self, coins: &mut [UnspentOutput]) {
        match self {
            SortingStrategy::ConfirmedFirstDescending => coins.sort_by(|a, b| {
                b.is_confirmed()
                    .cmp(&a.is_confirmed())
                    .then(b.value.cmp(&a.value))
            }),
            SortingStrategy::Ascending => coins.sort_by(|a, b| a.value.cmp(&b.value)),
            SortingStrategy::Descending => coins.sort_by(|a, b| b.value.cmp(&a.value)),
        }
    }
}

/// Result of a selection. `fee` includes any change folded into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub chosen: Vec<UnspentOutput>,
    pub amount: u64,
    pub fee: u64,
    pub change: u64,
}

impl Selection {
    fn empty() -> Self {
        Self {
            chosen: Vec::new(),
            amount: 0,
            fee: 0,
            change: 0,
        }
    }

    pub fn total_input(&self) -> u64 {
        self.chosen.iter().map(|c| c.value).sum()
    }

    pub fn has_change(&self) -> bool {
        self.change > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinSelector {
    fee_rate: FeeRate,
    dust_threshold: Option<u64>,
    strategy: SortingStrategy,
    /// Inputs and outputs the transaction will carry beyond the selection
    /// (dust mixing), priced into every fee estimate.
    extra_inputs: usize,
    extra_outputs: usize,
}

impl CoinSelector {
    pub fn new(fee_rate: FeeRate, dust_threshold: Option<u64>) -> Self {
        Self {
            fee_rate,
            dust_threshold,
            strategy: SortingStrategy::default(),
            extra_inputs: 0,
            extra_outputs: 0,
        }
    }

    pub fn with_strategy(mut self, strategy: SortingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Charge for inputs and outputs added after selection.
    pub fn with_extra(mut self, inputs: usize, outputs: usize) -> Self {
        self.extra_inputs = inputs;
        self.extra_outputs = outputs;
        self
    }

    fn fee(&self, chosen: usize, outputs: usize) -> u64 {
        calculate_tx_fee(
            chosen + self.extra_inputs,
            outputs + self.extra_outputs,
            self.fee_rate,
        )
    }

    /// Outputs worth spending, in draw order.
    fn effective_coins(&self, available: &[UnspentOutput]) -> Vec<UnspentOutput> {
        let mut coins: Vec<UnspentOutput> = available
            .iter()
            .filter(|c| match self.dust_threshold {
                Some(threshold) => c.value >= threshold,
                None => true,
            })
            .cloned()
            .collect();
        if coins.len() < available.len() {
            log::debug!(
                "skipped {} outputs below the dust threshold",
                available.len() - coins.len()
            );
        }
        self.strategy.sort(&mut coins);
        coins
    }

    fn creates_change(&self, change: u64) -> bool {
        change > 0 && self.dust_threshold.map_or(true, |threshold| change >= threshold)
    }

    /// Select outputs covering `target` plus fee, with one payment output
    /// and an optional change output.
    pub fn select(&self, available: &[UnspentOutput], target: u64) -> Result<Selection, SelectionError> {
        if available.is_empty() {
            return Err(SelectionError::NoCoinsToSelect);
        }
        if target == 0 {
            return Err(SelectionError::ZeroTarget);
        }

        let coins = self.effective_coins(available);
        let mut chosen = Vec::new();
        let mut total: u64 = 0;

        for coin in coins.iter() {
            total = total.saturating_add(coin.value);
            chosen.push(coin.clone());

            let fee_with_change = self.fee(chosen.len(), 2);
            if let Some(change) = total.checked_sub(target.saturating_add(fee_with_change)) {
                if self.creates_change(change) {
                    log::debug!(
                        "selected {} inputs for {}: fee {}, change {}",
                        chosen.len(),
                        target,
                        fee_with_change,
                        change
                    );
                    return Ok(Selection {
                        chosen,
                        amount: target,
                        fee: fee_with_change,
                        change,
                    });
                }
            }

            let fee_without_change = self.fee(chosen.len(), 1);
            if total >= target.saturating_add(fee_without_change) {
                // Leftover is dust: pay it to the miner.
                let fee = total - target;
                log::debug!(
                    "selected {} inputs for {}: fee {}, no change",
                    chosen.len(),
                    target,
                    fee
                );
                return Ok(Selection {
                    chosen,
                    amount: target,
                    fee,
                    change: 0,
                });
            }
        }

        let required = target.saturating_add(self.fee(coins.len().max(1), 1));
        Err(SelectionError::InsufficientFunds {
            available: total,
            required,
        })
    }

    /// Spend every effective output to a single destination. An empty
    /// input set (after dust filtering) yields an empty selection.
    pub fn select_all(&self, available: &[UnspentOutput]) -> Result<Selection, SelectionError> {
        let coins = self.effective_coins(available);
        if coins.is_empty() {
            return Ok(Selection::empty());
        }

        let total = coins.iter().fold(0u64, |acc, c| acc.saturating_add(c.value));
        let fee = self.fee(coins.len(), 1);
        if total <= fee {
            return Err(SelectionError::InsufficientFunds {
                available: total,
                required: fee.saturating_add(1),
            });
        }

        log::debug!("sweeping {} inputs: amount {}, fee {}", coins.len(), total - fee, fee);
        Ok(Selection {
            chosen: coins,
            amount: total - fee,
            fee,
            change: 0,
        })
    }
}

/// Select with the default confirmed-first, largest-first strategy.
pub fn select(
    available: &[UnspentOutput],
    target: u64,
    fee_rate: FeeRate,
    dust_threshold: Option<u64>,
) -> Result<Selection, SelectionError> {
    CoinSelector::new(fee_rate, dust_threshold).select(available, target)
}
