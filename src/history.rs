//! Historical Transaction Reconciler
//!
//! Maps ledger-service history records onto wallet transactions: direction
//! from the sign of the net value, counterparties from the first input and
//! output, and confirmation state from the chain head height.
//!
//! Confirmation state lives in [`ConfirmationStatus`], separate from the
//! decoded transaction, and is recomputed into a new value whenever a
//! fresher chain height arrives.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::Chain;
use crate::config::EngineConfig;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid ledger response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transaction {0} has no input with a source address")]
    MissingSourceOutput(String),

    #[error("transaction {0} has no output with a destination address")]
    MissingDestinationOutput(String),
}

// ---------------------------------------------------------------------------
// Ledger records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawPrevOut {
    pub addr: Option<String>,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawLedgerInput {
    pub prev_out: Option<RawPrevOut>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawLedgerOutput {
    pub addr: Option<String>,
    pub value: u64,
}

/// One history entry as reported by the ledger service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawLedgerTransaction {
    pub hash: String,
    /// Unix seconds.
    pub time: i64,
    /// Absent while unconfirmed.
    pub block_height: Option<u64>,
    /// Net effect on the wallet; negative when the wallet paid out.
    pub result: i64,
    pub fee: u64,
    pub inputs: Vec<RawLedgerInput>,
    pub out: Vec<RawLedgerOutput>,
}

#[derive(Debug, Deserialize)]
struct RawLatestBlock {
    height: u64,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    latest_block: RawLatestBlock,
}

#[derive(Debug, Deserialize)]
struct RawMultiAddress {
    txs: Vec<RawLedgerTransaction>,
    info: RawInfo,
}

/// A page of history plus the chain head it was served at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPage {
    pub transactions: Vec<RawLedgerTransaction>,
    pub latest_block_height: u64,
}

/// Decode a multi-address history response.
pub fn decode_ledger_page(json: &str) -> Result<LedgerPage, ReconcileError> {
    let raw: RawMultiAddress = serde_json::from_str(json)?;
    Ok(LedgerPage {
        transactions: raw.txs,
        latest_block_height: raw.info.latest_block.height,
    })
}

// ---------------------------------------------------------------------------
// Wallet transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Credit,
    Debit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEndpoint {
    pub address: Option<String>,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalTransaction {
    pub hash: String,
    pub direction: Direction,
    /// Always positive.
    pub amount: u64,
    pub fee: u64,
    pub block_height: Option<u64>,
    pub created_at: i64,
    pub from_address: String,
    pub to_address: String,
    pub inputs: Vec<TransactionEndpoint>,
    pub outputs: Vec<TransactionEndpoint>,
}

impl HistoricalTransaction {
    pub fn is_pending(&self) -> bool {
        self.block_height.is_none()
    }
}

impl TryFrom<RawLedgerTransaction> for HistoricalTransaction {
    type Error = ReconcileError;

    fn try_from(raw: RawLedgerTransaction) -> Result<Self, Self::Error> {
        let from_address = raw
            .inputs
            .first()
            .and_then(|input| input.prev_out.as_ref())
            .and_then(|prev| prev.addr.clone())
            .ok_or_else(|| ReconcileError::MissingSourceOutput(raw.hash.clone()))?;
        let to_address = raw
            .out
            .first()
            .and_then(|output| output.addr.clone())
            .ok_or_else(|| ReconcileError::MissingDestinationOutput(raw.hash.clone()))?;

        let direction = if raw.result < 0 {
            Direction::Debit
        } else {
            Direction::Credit
        };

        Ok(Self {
            direction,
            amount: raw.result.unsigned_abs(),
            fee: raw.fee,
            block_height: raw.block_height,
            created_at: raw.time,
            from_address,
            to_address,
            inputs: raw
                .inputs
                .into_iter()
                .filter_map(|input| input.prev_out)
                .map(|prev| TransactionEndpoint {
                    address: prev.addr,
                    value: prev.value,
                })
                .collect(),
            outputs: raw
                .out
                .into_iter()
                .map(|out| TransactionEndpoint {
                    address: out.addr,
                    value: out.value,
                })
                .collect(),
            hash: raw.hash,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationStatus {
    pub confirmations: u64,
    pub is_confirmed: bool,
    /// Chain height the status was computed at.
    pub observed_height: u64,
}

/// A decoded transaction with its confirmation state at some height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledTransaction {
    pub transaction: HistoricalTransaction,
    pub status: ConfirmationStatus,
}

impl ReconciledTransaction {
    pub fn confirmations(&self) -> u64 {
        self.status.confirmations
    }

    pub fn is_confirmed(&self) -> bool {
        self.status.is_confirmed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciler {
    required_confirmations: u64,
}

impl Reconciler {
    pub fn new(required_confirmations: u32) -> Self {
        Self {
            required_confirmations: u64::from(required_confirmations),
        }
    }

    pub fn for_chain(chain: Chain) -> Self {
        Self::new(chain.params().required_confirmations)
    }

    /// Honors a configured `requiredConfirmations` over the chain default.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.required_confirmations())
    }

    /// `H - B + 1` for a transaction mined at `B`, zero while unconfirmed.
    pub fn confirmation_status(&self, block_height: Option<u64>, current_height: u64) -> ConfirmationStatus {
        let confirmations = match block_height {
            None => 0,
            Some(mined_at) => {
                if current_height < mined_at {
                    log::warn!(
                        "chain height {} is behind block {}; treating as unconfirmed",
                        current_height,
                        mined_at
                    );
                }
                current_height.saturating_add(1).saturating_sub(mined_at)
            }
        };
        ConfirmationStatus {
            confirmations,
            is_confirmed: confirmations >= self.required_confirmations,
            observed_height: current_height,
        }
    }

    pub fn reconcile(
        &self,
        raw: RawLedgerTransaction,
        current_height: u64,
    ) -> Result<ReconciledTransaction, ReconcileError> {
        let transaction = HistoricalTransaction::try_from(raw)?;
        let status = self.confirmation_status(transaction.block_height, current_height);
        Ok(ReconciledTransaction { transaction, status })
    }

    /// Recompute confirmation state at a new chain height.
    pub fn refresh(&self, reconciled: &ReconciledTransaction, current_height: u64) -> ReconciledTransaction {
        ReconciledTransaction {
            transaction: reconciled.transaction.clone(),
            status: self.confirmation_status(reconciled.transaction.block_height, current_height),
        }
    }

    /// Reconcile a whole page at its own chain height.
    pub fn reconcile_page(&self, page: LedgerPage) -> Result<Vec<ReconciledTransaction>, ReconcileError> {
        let height = page.latest_block_height;
        page.transactions
            .into_iter()
            .map(|raw| self.reconcile(raw, height))
            .collect()
    }
}

/// Reconcile one record with the chain's required confirmations.
pub fn reconcile(
    chain: Chain,
    raw: RawLedgerTransaction,
    current_height: u64,
) -> Result<ReconciledTransaction, ReconcileError> {
    Reconciler::for_chain(chain).reconcile(raw, current_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(result: i64, block_height: Option<u64>) -> RawLedgerTransaction {
        RawLedgerTransaction {
            hash: "c0ffee".into(),
            time: 1_600_000_000,
            block_height,
            result,
            fee: 226,
            inputs: vec![RawLedgerInput {
                prev_out: Some(RawPrevOut {
                    addr: Some("1E5az6gZuZjPAXRzBhGNs8mVipe74UccSu".into()),
                    value: 50000,
                }),
            }],
            out: vec![
                RawLedgerOutput {
                    addr: Some("1FaAcSWTRGXNpbnPLnirMxPviXPyWafVv1".into()),
                    value: 20000,
                },
                RawLedgerOutput {
                    addr: Some("17cyyHPVHVFgsFY95iwomiLxcdbJ4cuvCB".into()),
                    value: 29774,
                },
            ],
        }
    }

    #[test]
    fn negative_result_is_debit() {
        let tx = reconcile(Chain::Bitcoin, raw(-20226, Some(100)), 100).unwrap();
        assert_eq!(tx.transaction.direction, Direction::Debit);
        assert_eq!(tx.transaction.amount, 20226);
        assert_eq!(tx.transaction.from_address, "1E5az6gZuZjPAXRzBhGNs8mVipe74UccSu");
        assert_eq!(tx.transaction.to_address, "1FaAcSWTRGXNpbnPLnirMxPviXPyWafVv1");
        assert_eq!(tx.transaction.outputs.len(), 2);
    }

    #[test]
    fn non_negative_result_is_credit() {
        let tx = reconcile(Chain::Bitcoin, raw(0, None), 100).unwrap();
        assert_eq!(tx.transaction.direction, Direction::Credit);
        let tx = reconcile(Chain::Bitcoin, raw(5000, None), 100).unwrap();
        assert_eq!(tx.transaction.direction, Direction::Credit);
        assert_eq!(tx.transaction.amount, 5000);
    }

    #[test]
    fn confirmations_count_the_mining_block() {
        let reconciler = Reconciler::for_chain(Chain::Bitcoin);
        let tx = reconciler.reconcile(raw(1, Some(500)), 500).unwrap();
        assert_eq!(tx.confirmations(), 1);
        assert!(!tx.is_confirmed());

        let tx = reconciler.refresh(&tx, 502);
        assert_eq!(tx.confirmations(), 3);
        assert!(tx.is_confirmed());
    }

    #[test]
    fn bitcoin_cash_needs_six() {
        let reconciler = Reconciler::from_config(&EngineConfig::for_chain(Chain::BitcoinCash));
        let status = reconciler.confirmation_status(Some(10), 14);
        assert_eq!(status.confirmations, 5);
        assert!(!status.is_confirmed);
        assert!(reconciler.confirmation_status(Some(10), 15).is_confirmed);
    }

    #[test]
    fn configured_threshold_overrides_chain() {
        let config = EngineConfig::from_json(r#"{"chain":"bitcoinCash","requiredConfirmations":1}"#).unwrap();
        let tx = Reconciler::from_config(&config).reconcile(raw(1, Some(500)), 500).unwrap();
        assert_eq!(tx.confirmations(), 1);
        assert!(tx.is_confirmed());

        let defaults = Reconciler::from_config(&EngineConfig::for_chain(Chain::BitcoinCash));
        assert!(!defaults.confirmation_status(Some(500), 500).is_confirmed);
        assert!(defaults.confirmation_status(Some(500), 505).is_confirmed);
    }

    #[test]
    fn unconfirmed_has_zero() {
        let tx = reconcile(Chain::Bitcoin, raw(1, None), 800_000).unwrap();
        assert_eq!(tx.confirmations(), 0);
        assert!(tx.transaction.is_pending());
    }

    #[test]
    fn stale_height_clamps_to_zero() {
        let status = Reconciler::new(1).confirmation_status(Some(1000), 990);
        assert_eq!(status.confirmations, 0);
        assert!(!status.is_confirmed);
    }

    #[test]
    fn refresh_is_idempotent() {
        let reconciler = Reconciler::for_chain(Chain::Bitcoin);
        let tx = reconciler.reconcile(raw(1, Some(7)), 8).unwrap();
        let a = reconciler.refresh(&tx, 20);
        let b = reconciler.refresh(&a, 20);
        assert_eq!(a, b);
        assert_eq!(tx.transaction, a.transaction);
    }

    #[test]
    fn missing_endpoints_fail() {
        let mut no_inputs = raw(1, None);
        no_inputs.inputs.clear();
        assert!(matches!(
            reconcile(Chain::Bitcoin, no_inputs, 1),
            Err(ReconcileError::MissingSourceOutput(_))
        ));

        let mut no_outputs = raw(1, None);
        no_outputs.out.clear();
        assert!(matches!(
            reconcile(Chain::Bitcoin, no_outputs, 1),
            Err(ReconcileError::MissingDestinationOutput(_))
        ));

        let mut coinbase = raw(1, None);
        coinbase.inputs = vec![RawLedgerInput { prev_out: None }];
        assert!(matches!(
            reconcile(Chain::Bitcoin, coinbase, 1),
            Err(ReconcileError::MissingSourceOutput(_))
        ));
    }

    #[test]
    fn decodes_multi_address_page() {
        let json = r#"{
            "txs": [
                {
                    "hash": "aa",
                    "time": 1600000000,
                    "block_height": 640000,
                    "result": -1226,
                    "fee": 226,
                    "inputs": [{"prev_out": {"addr": "1E5az6gZuZjPAXRzBhGNs8mVipe74UccSu", "value": 10000}}],
                    "out": [{"addr": "1FaAcSWTRGXNpbnPLnirMxPviXPyWafVv1", "value": 1000}]
                },
                {
                    "hash": "bb",
                    "time": 1600000100,
                    "result": 3000,
                    "fee": 200,
                    "inputs": [{"prev_out": {"addr": "1FaAcSWTRGXNpbnPLnirMxPviXPyWafVv1", "value": 5000}}],
                    "out": [{"addr": "1E5az6gZuZjPAXRzBhGNs8mVipe74UccSu", "value": 3000}]
                }
            ],
            "info": {"latest_block": {"height": 640005}}
        }"#;
        let page = decode_ledger_page(json).unwrap();
        assert_eq!(page.latest_block_height, 640005);

        let txs = Reconciler::for_chain(Chain::Bitcoin).reconcile_page(page).unwrap();
        assert_eq!(txs[0].confirmations(), 6);
        assert!(txs[0].is_confirmed());
        assert_eq!(txs[0].transaction.direction, Direction::Debit);
        assert_eq!(txs[1].confirmations(), 0);
        assert_eq!(txs[1].transaction.direction, Direction::Credit);
    }

    #[test]
    fn missing_required_field_fails_decode() {
        let json = r#"{"txs":[{"hash":"aa","time":1,"fee":0,"inputs":[],"out":[]}],"info":{"latest_block":{"height":1}}}"#;
        assert!(matches!(decode_ledger_page(json), Err(ReconcileError::Json(_))));
    }
}
