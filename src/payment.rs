//! Payments
//!
//! End-to-end spend: select coins, build, resolve keys and sign. Results
//! are serde types in the shape the wallet frontend consumes
//! ({ rawTx, txid, fee, change, ... }).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{Address, AddressError};
use crate::builder::{TransactionBuilder, UnsignedTransaction};
use crate::chain::Chain;
use crate::coin_selection::{CoinSelector, Selection, SelectionError};
use crate::config::EngineConfig;
use crate::keys::{keys_for_outputs, AccountKeys, DerivationError};
use crate::signer::{sign, SignedTransaction, SigningError};
use crate::utxo::{DustMixing, UnspentOutput};

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("address {address} is not a {expected} address")]
    ChainMismatch { address: String, expected: Chain },

    #[error("dust mixing is not available on {0}")]
    DustMixingUnsupported(Chain),

    #[error("nothing to spend")]
    NothingToSpend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentOutpoint {
    pub txid: String,
    pub vout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltTransactionResult {
    /// Hex-encoded raw signed transaction
    pub raw_tx: String,
    pub txid: String,
    pub fee: u64,
    pub amount: u64,
    /// 0 if no change output
    pub change: u64,
    pub change_address: Option<String>,
    pub spent_outpoints: Vec<SpentOutpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltSweepResult {
    pub raw_tx: String,
    pub txid: String,
    pub fee: u64,
    pub output_value: u64,
    pub address: String,
    pub spent_outpoints: Vec<SpentOutpoint>,
}

fn ensure_chain(config: &EngineConfig, address: &Address) -> Result<(), PaymentError> {
    if address.chain() != config.chain {
        return Err(PaymentError::ChainMismatch {
            address: address.to_string(),
            expected: config.chain,
        });
    }
    Ok(())
}

fn spent_outpoints(selection: &Selection) -> Vec<SpentOutpoint> {
    selection
        .chosen
        .iter()
        .map(|u| SpentOutpoint {
            txid: u.transaction_hash_display(),
            vout: u.output_index(),
        })
        .collect()
}

fn selector(config: &EngineConfig) -> CoinSelector {
    CoinSelector::new(config.fee_rate(), Some(config.dust_threshold()))
        .with_strategy(config.sorting_strategy)
}

fn sign_selection(
    config: &EngineConfig,
    accounts: &[AccountKeys],
    selection: &Selection,
    unsigned: &UnsignedTransaction,
) -> Result<SignedTransaction, PaymentError> {
    let keys = keys_for_outputs(accounts, &selection.chosen)?;
    Ok(sign(unsigned, &keys, config.chain.params().sighash_variant)?)
}

/// Pay `amount` to `destination`, returning change to `change_address`.
pub fn build_payment(
    config: &EngineConfig,
    accounts: &[AccountKeys],
    utxos: &[UnspentOutput],
    destination: &Address,
    amount: u64,
    change_address: &Address,
    dust_mixing: Option<DustMixing>,
) -> Result<BuiltTransactionResult, PaymentError> {
    ensure_chain(config, destination)?;
    ensure_chain(config, change_address)?;

    let mut builder = TransactionBuilder::new();
    let mut selector = selector(config);
    if let Some(dust) = dust_mixing {
        if config.chain != Chain::BitcoinCash {
            return Err(PaymentError::DustMixingUnsupported(config.chain));
        }
        builder = builder.with_dust_mixing(dust);
        // The service's input and its same-value output still cost bytes
        selector = selector.with_extra(1, 1);
    }

    let selection = selector.select(utxos, amount)?;
    let unsigned = builder.build(&selection, destination, amount, change_address)?;
    let signed = sign_selection(config, accounts, &selection, &unsigned)?;

    log::info!(
        "built {} payment {}: amount {}, fee {}, change {}",
        config.chain,
        signed.txid(),
        amount,
        selection.fee,
        selection.change
    );

    Ok(BuiltTransactionResult {
        raw_tx: signed.raw_hex(),
        txid: signed.txid(),
        fee: selection.fee,
        amount,
        change: selection.change,
        change_address: selection.has_change().then(|| change_address.to_string()),
        spent_outpoints: spent_outpoints(&selection),
    })
}

/// Spend every effective output to `destination` with no change.
pub fn build_sweep(
    config: &EngineConfig,
    accounts: &[AccountKeys],
    utxos: &[UnspentOutput],
    destination: &Address,
) -> Result<BuiltSweepResult, PaymentError> {
    ensure_chain(config, destination)?;

    let selection = selector(config).select_all(utxos)?;
    if selection.chosen.is_empty() {
        return Err(PaymentError::NothingToSpend);
    }

    let unsigned = TransactionBuilder::new().build_sweep(&selection, destination)?;
    let signed = sign_selection(config, accounts, &selection, &unsigned)?;

    log::info!(
        "built {} sweep {}: {} inputs, output {}, fee {}",
        config.chain,
        signed.txid(),
        selection.chosen.len(),
        selection.amount,
        selection.fee
    );

    Ok(BuiltSweepResult {
        raw_tx: signed.raw_hex(),
        txid: signed.txid(),
        fee: selection.fee,
        output_value: selection.amount,
        address: destination.to_string(),
        spent_outpoints: spent_outpoints(&selection),
    })
}
