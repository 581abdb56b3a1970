//! Addresses
//!
//! Parsing and display for the three address encodings the wallet deals
//! with: Base58Check P2PKH (both chains), CashAddr (Bitcoin Cash) and
//! bech32 P2WPKH (Bitcoin receive addresses). Only pubkey-hash addresses
//! can be paid to by this engine.

use std::fmt;

use thiserror::Error;

use crate::chain::Chain;
use crate::encoding::{
    base58check_decode, base58check_encode, cashaddr_decode, cashaddr_encode, segwit_decode,
    segwit_encode, EncodingError,
};
use crate::hashing::hash160;
use crate::keys::DerivationType;
use crate::script::Script;

/// CashAddr version byte for a 160-bit pubkey hash.
const CASHADDR_P2PKH_VERSION: u8 = 0x00;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("invalid address length: {0}")]
    InvalidLength(usize),

    #[error("invalid address prefix: expected 0x{expected:02x}, got 0x{found:02x}")]
    InvalidVersion { expected: u8, found: u8 },

    #[error("address prefix '{0}' does not belong to this chain")]
    WrongNetwork(String),

    #[error("{chain} does not support {format:?} addresses")]
    UnsupportedFormat { chain: Chain, format: AddressFormat },

    #[error("only pay-to-public-key-hash outputs are supported: {0}")]
    UnsupportedScript(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFormat {
    Legacy,
    CashAddr,
    Bech32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    chain: Chain,
    format: AddressFormat,
    hash: [u8; 20],
}

impl Address {
    pub fn new(chain: Chain, format: AddressFormat, hash: [u8; 20]) -> Result<Self, AddressError> {
        let params = chain.params();
        let supported = match format {
            AddressFormat::Legacy => true,
            AddressFormat::CashAddr => params.cashaddr_prefix.is_some(),
            AddressFormat::Bech32 => params.bech32_hrp.is_some(),
        };
        if !supported {
            return Err(AddressError::UnsupportedFormat { chain, format });
        }
        Ok(Self { chain, format, hash })
    }

    /// Address for a compressed public key.
    pub fn from_public_key(
        chain: Chain,
        format: AddressFormat,
        public_key: &[u8],
    ) -> Result<Self, AddressError> {
        Self::new(chain, format, hash160(public_key))
    }

    /// The format a chain shows for keys of a given derivation type.
    pub fn native_format(chain: Chain, derivation: DerivationType) -> AddressFormat {
        match (chain, derivation) {
            (Chain::Bitcoin, DerivationType::Bech32) => AddressFormat::Bech32,
            (Chain::Bitcoin, DerivationType::Legacy) => AddressFormat::Legacy,
            (Chain::BitcoinCash, _) => AddressFormat::CashAddr,
        }
    }

    pub fn parse(chain: Chain, address: &str) -> Result<Self, AddressError> {
        let address = address.trim();
        let params = chain.params();

        if let Some(hrp) = params.bech32_hrp {
            if address.to_ascii_lowercase().starts_with(&format!("{}1", hrp)) {
                let program = segwit_decode(hrp, address)?;
                let hash: [u8; 20] = program
                    .as_slice()
                    .try_into()
                    .map_err(|_| AddressError::InvalidLength(program.len()))?;
                return Self::new(chain, AddressFormat::Bech32, hash);
            }
        }

        if let Some(prefix) = params.cashaddr_prefix {
            let lower = address.to_ascii_lowercase();
            if lower.contains(':') || lower.starts_with('q') || lower.starts_with('p') {
                let (found_prefix, version, payload) = cashaddr_decode(address, prefix)?;
                if found_prefix != prefix {
                    return Err(AddressError::WrongNetwork(found_prefix));
                }
                if version != CASHADDR_P2PKH_VERSION {
                    return Err(AddressError::UnsupportedScript(format!(
                        "cashaddr version 0x{:02x}",
                        version
                    )));
                }
                let hash: [u8; 20] = payload
                    .as_slice()
                    .try_into()
                    .map_err(|_| AddressError::InvalidLength(payload.len()))?;
                return Self::new(chain, AddressFormat::CashAddr, hash);
            }
        }

        let decoded = base58check_decode(address)?;
        if decoded.len() != 21 {
            return Err(AddressError::InvalidLength(decoded.len()));
        }
        if decoded[0] != params.p2pkh_version {
            return Err(AddressError::InvalidVersion {
                expected: params.p2pkh_version,
                found: decoded[0],
            });
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&decoded[1..21]);
        Self::new(chain, AddressFormat::Legacy, hash)
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn format(&self) -> AddressFormat {
        self.format
    }

    pub fn pubkey_hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Same key hash shown in another encoding of the same chain.
    pub fn with_format(&self, format: AddressFormat) -> Result<Self, AddressError> {
        Self::new(self.chain, format, self.hash)
    }

    /// Locking script paying to this address.
    pub fn locking_script(&self) -> Result<Script, AddressError> {
        match self.format {
            AddressFormat::Legacy | AddressFormat::CashAddr => Ok(Script::p2pkh(&self.hash)),
            AddressFormat::Bech32 => Err(AddressError::UnsupportedScript(self.to_string())),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.chain.params();
        match self.format {
            AddressFormat::Legacy => {
                let mut payload = Vec::with_capacity(21);
                payload.push(params.p2pkh_version);
                payload.extend_from_slice(&self.hash);
                f.write_str(&base58check_encode(&payload))
            }
            AddressFormat::CashAddr => {
                let prefix = params.cashaddr_prefix.ok_or(fmt::Error)?;
                f.write_str(&cashaddr_encode(prefix, CASHADDR_P2PKH_VERSION, &self.hash))
            }
            AddressFormat::Bech32 => {
                let hrp = params.bech32_hrp.ok_or(fmt::Error)?;
                let encoded = segwit_encode(hrp, &self.hash).map_err(|_| fmt::Error)?;
                f.write_str(&encoded)
            }
        }
    }
}
