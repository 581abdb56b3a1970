//! UTXO transaction engine for Bitcoin-family chains.
//!
//! Key derivation, coin selection, P2PKH transaction building and signing
//! (legacy and fork-id sighash), and reconciliation of ledger history.
//! Everything here is a pure function of its inputs; fetching outputs and
//! broadcasting transactions belong to the caller.

pub mod address;
pub mod builder;
pub mod chain;
pub mod coin_selection;
pub mod config;
pub mod encoding;
pub mod fee;
pub mod hashing;
pub mod history;
pub mod keys;
pub mod payment;
pub mod script;
pub mod sighash;
pub mod signer;
pub mod transaction;
pub mod utxo;

pub use address::{Address, AddressError, AddressFormat};
pub use builder::{InputOrigin, TransactionBuilder, UnsignedInput, UnsignedTransaction};
pub use chain::{Chain, ChainParams};
pub use coin_selection::{CoinSelector, Selection, SelectionError, SortingStrategy};
pub use config::{ConfigError, EngineConfig};
pub use fee::FeeRate;
pub use hashing::HashScheme;
pub use history::{
    reconcile, ConfirmationStatus, Direction, HistoricalTransaction, RawLedgerTransaction,
    ReconcileError, ReconciledTransaction, Reconciler,
};
pub use keys::{derive, AccountKeys, DerivationError, DerivationPath, DerivationType, KeyPair};
pub use payment::{build_payment, build_sweep, PaymentError};
pub use script::Script;
pub use sighash::SighashVariant;
pub use signer::{sign, SignedTransaction, SigningError};
pub use transaction::Transaction;
pub use utxo::{DustMixing, OutPoint, UnspentOutput, UtxoError};
