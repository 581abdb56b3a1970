//! Spendable outputs
//!
//! `UnspentOutput` is what the ledger service reports for the wallet's
//! addresses. Hashes are kept in internal (wire) byte order; the reversed
//! form is only produced for display.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::{hex_decode, EncodingError};
use crate::script::Script;

#[derive(Debug, Error)]
pub enum UtxoError {
    #[error("invalid unspent outputs response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("output {0} has zero value")]
    ZeroValue(OutPoint),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("transaction hash {internal} does not match its display form {display}")]
    HashMismatch { internal: String, display: String },

    #[error("invalid locking script: {0}")]
    InvalidScript(#[from] EncodingError),
}

/// Reference to an output of a previous transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutPoint {
    /// Transaction hash in internal byte order.
    pub hash: [u8; 32],
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: [u8; 32], index: u32) -> Self {
        Self { hash, index }
    }

    /// From a hash in internal byte order, hex encoded.
    pub fn from_internal_hex(hash: &str, index: u32) -> Result<Self, UtxoError> {
        Ok(Self::new(parse_hash(hash)?, index))
    }

    /// From a hash in display (reversed) byte order, hex encoded.
    pub fn from_display_hex(hash: &str, index: u32) -> Result<Self, UtxoError> {
        let mut bytes = parse_hash(hash)?;
        bytes.reverse();
        Ok(Self::new(bytes, index))
    }

    pub fn internal_hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn display_hash(&self) -> String {
        let mut reversed = self.hash;
        reversed.reverse();
        hex::encode(reversed)
    }
}

fn parse_hash(hash: &str) -> Result<[u8; 32], UtxoError> {
    let bytes = hex_decode(hash).map_err(|_| UtxoError::InvalidHash(hash.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| UtxoError::InvalidHash(hash.to_string()))
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.display_hash(), self.index)
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({})", self)
    }
}

/// Owning account (`m`, the xpub) and the address path below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XPubRef {
    pub m: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnspentOutput {
    pub outpoint: OutPoint,
    pub value: u64,
    pub script: Script,
    pub confirmations: u32,
    pub xpub: Option<XPubRef>,
}

impl UnspentOutput {
    pub fn new(outpoint: OutPoint, value: u64, script: Script, confirmations: u32) -> Result<Self, UtxoError> {
        if value == 0 {
            return Err(UtxoError::ZeroValue(outpoint));
        }
        Ok(Self {
            outpoint,
            value,
            script,
            confirmations,
            xpub: None,
        })
    }

    pub fn with_xpub(mut self, xpub: XPubRef) -> Self {
        self.xpub = Some(xpub);
        self
    }

    pub fn transaction_hash(&self) -> String {
        self.outpoint.internal_hash_hex()
    }

    pub fn transaction_hash_display(&self) -> String {
        self.outpoint.display_hash()
    }

    pub fn output_index(&self) -> u32 {
        self.outpoint.index
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmations > 0
    }
}

// ---------------------------------------------------------------------------
// Ledger service responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UnspentOutputsResponse {
    unspent_outputs: Vec<RawUnspentOutput>,
}

#[derive(Debug, Deserialize)]
struct RawUnspentOutput {
    tx_hash: String,
    tx_hash_big_endian: Option<String>,
    tx_output_n: u32,
    script: String,
    value: u64,
    confirmations: u32,
    xpub: Option<XPubRef>,
}

impl TryFrom<RawUnspentOutput> for UnspentOutput {
    type Error = UtxoError;

    fn try_from(raw: RawUnspentOutput) -> Result<Self, Self::Error> {
        let outpoint = OutPoint::from_internal_hex(&raw.tx_hash, raw.tx_output_n)?;
        if let Some(display) = raw.tx_hash_big_endian {
            if !display.eq_ignore_ascii_case(&outpoint.display_hash()) {
                return Err(UtxoError::HashMismatch {
                    internal: raw.tx_hash,
                    display,
                });
            }
        }
        let script = Script::from_hex(&raw.script)?;
        let output = UnspentOutput::new(outpoint, raw.value, script, raw.confirmations)?;
        Ok(match raw.xpub {
            Some(xpub) => output.with_xpub(xpub),
            None => output,
        })
    }
}

/// Decode an `{"unspent_outputs": [...]}` payload.
pub fn decode_unspent_outputs(json: &str) -> Result<Vec<UnspentOutput>, UtxoError> {
    let response: UnspentOutputsResponse = serde_json::from_str(json)?;
    response
        .unspent_outputs
        .into_iter()
        .map(UnspentOutput::try_from)
        .collect()
}

/// Service-supplied dust for Bitcoin Cash spends: one input owned by the
/// service and the script its same-value output must pay to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DustMixing {
    pub outpoint: OutPoint,
    pub value: u64,
    pub output_script: Script,
    /// Handed back to the service on broadcast.
    pub lock_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDustMixing {
    tx_hash: String,
    tx_output_n: u32,
    value: u64,
    output_script: String,
    lock_secret: Option<String>,
}

pub fn decode_dust_mixing(json: &str) -> Result<DustMixing, UtxoError> {
    let raw: RawDustMixing = serde_json::from_str(json)?;
    let outpoint = OutPoint::from_internal_hex(&raw.tx_hash, raw.tx_output_n)?;
    if raw.value == 0 {
        return Err(UtxoError::ZeroValue(outpoint));
    }
    Ok(DustMixing {
        outpoint,
        value: raw.value,
        output_script: Script::from_hex(&raw.output_script)?,
        lock_secret: raw.lock_secret,
    })
}
