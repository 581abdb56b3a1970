//! HD Wallet Key Derivation (BIP-39/BIP-32/BIP-44)
//!
//! Turns a mnemonic into a seed and derives key pairs along
//! hierarchical-deterministic paths. Everything here is a pure function of
//! its inputs: the same mnemonic and path always give the same key pair.
//!
//! Account layout:
//!   legacy:  m/44'/0'/{account}'/{change}/{index}
//!   bech32:  m/84'/0'/{account}'/{change}/{index}
//! Bitcoin Cash keeps coin type 0 (keys predate the fork).
//!
//! Seeds are zeroized after use and private keys never reach `Debug` output.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bip32::{ChildNumber, Prefix, XPrv};
use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

use crate::address::{Address, AddressError, AddressFormat};
use crate::chain::Chain;
use crate::config::EngineConfig;
use crate::encoding::{base58check_decode, base58check_encode};
use crate::hashing::hash160;
use crate::utxo::{OutPoint, UnspentOutput};

const WIF_PREFIX: u8 = 0x80;
const WIF_COMPRESSED_FLAG: u8 = 0x01;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("derivation failed at {0}")]
    Derivation(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid WIF: {0}")]
    InvalidWif(String),

    #[error("output {0} carries no derivation path")]
    MissingKeyPath(OutPoint),

    #[error("output {outpoint} belongs to an unknown xpub {xpub}")]
    UnknownXpub { outpoint: OutPoint, xpub: String },

    #[error("key derived for output {0} does not match its locking script")]
    KeyMismatch(OutPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DerivationType {
    /// BIP-44 P2PKH accounts.
    Legacy,
    /// BIP-84 native segwit accounts.
    Bech32,
}

impl DerivationType {
    pub fn purpose(self) -> u32 {
        match self {
            DerivationType::Legacy => 44,
            DerivationType::Bech32 => 84,
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// A BIP-32 path such as `m/44'/0'/0'/1/0`.
///
/// An uppercase root (`M/0/5`) is accepted as well; the ledger service
/// reports output paths relative to the account xpub in that form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath {
    steps: Vec<ChildNumber>,
}

impl DerivationPath {
    pub fn account(derivation: DerivationType, coin_type: u32, account: u32) -> Result<Self, DerivationError> {
        Ok(Self {
            steps: vec![
                child(derivation.purpose(), true)?,
                child(coin_type, true)?,
                child(account, true)?,
            ],
        })
    }

    pub fn child(&self, index: u32, hardened: bool) -> Result<Self, DerivationError> {
        let mut steps = self.steps.clone();
        steps.push(child(index, hardened)?);
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[ChildNumber] {
        &self.steps
    }
}

fn child(index: u32, hardened: bool) -> Result<ChildNumber, DerivationError> {
    ChildNumber::new(index, hardened)
        .map_err(|e| DerivationError::InvalidPath(format!("index {}: {}", index, e)))
}

impl FromStr for DerivationPath {
    type Err = DerivationError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = path.trim().split('/').collect();
        if parts.is_empty() || !(parts[0] == "m" || parts[0] == "M") {
            return Err(DerivationError::InvalidPath(format!(
                "path must start with 'm': {}",
                path
            )));
        }

        let mut steps = Vec::with_capacity(parts.len() - 1);
        for part in &parts[1..] {
            let (index_str, hardened) = if let Some(s) = part.strip_suffix('\'') {
                (s, true)
            } else if let Some(s) = part.strip_suffix('h') {
                (s, true)
            } else {
                (*part, false)
            };
            let index: u32 = index_str
                .parse()
                .map_err(|_| DerivationError::InvalidPath(format!("invalid path index: {}", part)))?;
            steps.push(child(index, hardened)?);
        }
        Ok(Self { steps })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.steps {
            write!(f, "/{}", step.index())?;
            if step.is_hardened() {
                f.write_str("'")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Key pairs
// ---------------------------------------------------------------------------

/// A secp256k1 key pair with a compressed public key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    pub fn from_secret_key(secret: SecretKey) -> Self {
        let public = PublicKey::from_secret_key(SECP256K1, &secret);
        Self { secret, public }
    }

    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, DerivationError> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| DerivationError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_secret_key(secret))
    }

    /// Parse a hex scalar. Short inputs are left-padded with zeros, since
    /// keys are sometimes exported without their leading zero nibbles.
    pub fn from_secret_hex(hex_str: &str) -> Result<Self, DerivationError> {
        let trimmed = hex_str.trim().trim_start_matches("0x");
        if trimmed.len() > 64 {
            return Err(DerivationError::InvalidPrivateKey(format!(
                "expected at most 64 hex characters, got {}",
                trimmed.len()
            )));
        }
        let padded = Zeroizing::new(format!("{:0>64}", trimmed));
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(padded.as_str(), &mut bytes)
            .map_err(|e| DerivationError::InvalidPrivateKey(e.to_string()))?;
        let result = Self::from_secret_bytes(&bytes);
        bytes.zeroize();
        result
    }

    /// Decode a compressed mainnet WIF.
    pub fn from_wif(wif: &str) -> Result<Self, DerivationError> {
        let mut decoded = base58check_decode(wif)
            .map_err(|e| DerivationError::InvalidWif(e.to_string()))?;

        let result = if decoded.first() != Some(&WIF_PREFIX) {
            Err(DerivationError::InvalidWif("invalid WIF prefix".into()))
        } else if decoded.len() == 34 && decoded[33] == WIF_COMPRESSED_FLAG {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&decoded[1..33]);
            let key = Self::from_secret_bytes(&bytes);
            bytes.zeroize();
            key
        } else if decoded.len() == 33 {
            Err(DerivationError::InvalidWif(
                "uncompressed keys are not supported".into(),
            ))
        } else {
            Err(DerivationError::InvalidWif(format!(
                "invalid WIF length: {}",
                decoded.len()
            )))
        };
        decoded.zeroize();
        result
    }

    /// Format: Base58Check( 0x80 || privkey_bytes || 0x01 )
    pub fn to_wif(&self) -> Zeroizing<String> {
        let mut payload = Zeroizing::new(Vec::with_capacity(34));
        payload.push(WIF_PREFIX);
        payload.extend_from_slice(&self.secret.secret_bytes());
        payload.push(WIF_COMPRESSED_FLAG);
        Zeroizing::new(base58check_encode(&payload))
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// 33-byte compressed public key.
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public.serialize()
    }

    pub fn pubkey_hash(&self) -> [u8; 20] {
        hash160(&self.public_key_bytes())
    }

    pub fn address(&self, chain: Chain, format: AddressFormat) -> Result<Address, AddressError> {
        Address::from_public_key(chain, format, &self.public_key_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(self.public_key_bytes()))
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Mnemonic / seed
// ---------------------------------------------------------------------------

/// Parse and validate a mnemonic, returning the 64-byte BIP-39 seed.
///
/// BIP-39 seed: PBKDF2-HMAC-SHA512(password=mnemonic, salt="mnemonic"+passphrase, 2048 rounds)
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Result<Zeroizing<[u8; 64]>, DerivationError> {
    let mn: Mnemonic = mnemonic
        .trim()
        .parse()
        .map_err(|e: bip39::Error| DerivationError::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mn.to_seed(passphrase)))
}

/// Validate a BIP-39 mnemonic without deriving any keys.
pub fn validate_mnemonic(mnemonic: &str) -> bool {
    mnemonic.trim().parse::<Mnemonic>().is_ok()
}

/// Generate a new random BIP-39 mnemonic (12 words / 128-bit entropy).
pub fn generate_mnemonic() -> Result<Zeroizing<String>, DerivationError> {
    let mut entropy = [0u8; 16];
    OsRng.fill_bytes(&mut entropy);
    let mn = Mnemonic::from_entropy(&entropy)
        .map_err(|e| DerivationError::InvalidMnemonic(e.to_string()));
    entropy.zeroize();
    Ok(Zeroizing::new(mn?.to_string()))
}

/// Derive an extended private key from a seed along `path`.
fn derive_xprv_from_seed(seed: &[u8], path: &DerivationPath) -> Result<XPrv, DerivationError> {
    let master = XPrv::new(seed)
        .map_err(|e| DerivationError::Derivation(format!("master key: {}", e)))?;
    derive_xprv_from(master, path)
}

fn derive_xprv_from(start: XPrv, path: &DerivationPath) -> Result<XPrv, DerivationError> {
    let mut key = start;
    for step in path.steps() {
        key = key
            .derive_child(*step)
            .map_err(|e| DerivationError::Derivation(format!("child {}: {}", step.index(), e)))?;
    }
    Ok(key)
}

fn key_pair_from_xprv(xprv: &XPrv) -> Result<KeyPair, DerivationError> {
    let mut privkey_bytes: [u8; 32] = xprv.to_bytes();
    let result = KeyPair::from_secret_bytes(&privkey_bytes);
    privkey_bytes.zeroize();
    result
}

/// Derive the key pair at `path` from a mnemonic (empty passphrase).
pub fn derive(mnemonic: &str, path: &DerivationPath) -> Result<KeyPair, DerivationError> {
    let seed = mnemonic_to_seed(mnemonic, "")?;
    let xprv = derive_xprv_from_seed(seed.as_slice(), path)?;
    key_pair_from_xprv(&xprv)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Account node `m/purpose'/coin'/account'` with its receive and change
/// chains.
#[derive(Clone)]
pub struct AccountKeys {
    chain: Chain,
    derivation: DerivationType,
    account_index: u32,
    account: XPrv,
}

impl AccountKeys {
    pub fn from_mnemonic(
        mnemonic: &str,
        chain: Chain,
        derivation: DerivationType,
        account_index: u32,
    ) -> Result<Self, DerivationError> {
        let seed = mnemonic_to_seed(mnemonic, "")?;
        let path = DerivationPath::account(derivation, chain.params().coin_type, account_index)?;
        let account = derive_xprv_from_seed(seed.as_slice(), &path)?;
        log::debug!("derived {} account {} ({})", chain, account_index, path);
        Ok(Self {
            chain,
            derivation,
            account_index,
            account,
        })
    }

    /// Account from the config's chain, derivation and account index.
    pub fn from_config(mnemonic: &str, config: &EngineConfig) -> Result<Self, DerivationError> {
        Self::from_mnemonic(mnemonic, config.chain, config.derivation_type(), config.account_index)
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn derivation(&self) -> DerivationType {
        self.derivation
    }

    pub fn account_path(&self) -> Result<DerivationPath, DerivationError> {
        DerivationPath::account(self.derivation, self.chain.params().coin_type, self.account_index)
    }

    pub fn xpub(&self) -> String {
        self.account.public_key().to_string(Prefix::XPUB)
    }

    pub fn xpriv(&self) -> Zeroizing<String> {
        self.account.to_string(Prefix::XPRV)
    }

    /// Account-level key pair (`m/purpose'/coin'/account'`).
    pub fn account_key(&self) -> Result<KeyPair, DerivationError> {
        key_pair_from_xprv(&self.account)
    }

    /// Key at a path relative to the account node, e.g. `M/1/4`.
    pub fn key_at(&self, relative: &DerivationPath) -> Result<KeyPair, DerivationError> {
        if relative.steps().iter().any(|s| s.is_hardened()) {
            return Err(DerivationError::InvalidPath(format!(
                "relative path must not be hardened: {}",
                relative
            )));
        }
        let xprv = derive_xprv_from(self.account.clone(), relative)?;
        key_pair_from_xprv(&xprv)
    }

    pub fn key_pair(&self, change: bool, index: u32) -> Result<KeyPair, DerivationError> {
        let relative = DerivationPath::default()
            .child(u32::from(change), false)?
            .child(index, false)?;
        self.key_at(&relative)
    }

    pub fn receive_key(&self, index: u32) -> Result<KeyPair, DerivationError> {
        self.key_pair(false, index)
    }

    pub fn change_key(&self, index: u32) -> Result<KeyPair, DerivationError> {
        self.key_pair(true, index)
    }

    pub fn address_format(&self) -> AddressFormat {
        Address::native_format(self.chain, self.derivation)
    }

    pub fn receive_address(&self, index: u32) -> Result<Address, DerivationError> {
        let key = self.receive_key(index)?;
        key.address(self.chain, self.address_format())
            .map_err(|e| DerivationError::Derivation(e.to_string()))
    }

    pub fn change_address(&self, index: u32) -> Result<Address, DerivationError> {
        let key = self.change_key(index)?;
        key.address(self.chain, self.address_format())
            .map_err(|e| DerivationError::Derivation(e.to_string()))
    }
}

impl fmt::Debug for AccountKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountKeys")
            .field("chain", &self.chain)
            .field("derivation", &self.derivation)
            .field("account_index", &self.account_index)
            .field("xpub", &self.xpub())
            .finish_non_exhaustive()
    }
}

/// Resolve the signing key of every output from the xpub/path the ledger
/// service attached to it.
pub fn keys_for_outputs(
    accounts: &[AccountKeys],
    outputs: &[UnspentOutput],
) -> Result<HashMap<OutPoint, KeyPair>, DerivationError> {
    let xpubs: Vec<(String, &AccountKeys)> = accounts.iter().map(|a| (a.xpub(), a)).collect();
    let mut keys = HashMap::with_capacity(outputs.len());

    for output in outputs {
        let owner = output
            .xpub
            .as_ref()
            .ok_or(DerivationError::MissingKeyPath(output.outpoint))?;
        let account = xpubs
            .iter()
            .find(|(xpub, _)| *xpub == owner.m)
            .map(|(_, account)| *account)
            .ok_or_else(|| DerivationError::UnknownXpub {
                outpoint: output.outpoint,
                xpub: owner.m.clone(),
            })?;

        let path: DerivationPath = owner.path.parse()?;
        let key = account.key_at(&path)?;
        if output.script.p2pkh_hash() != Some(key.pubkey_hash()) {
            return Err(DerivationError::KeyMismatch(output.outpoint));
        }
        keys.insert(output.outpoint, key);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known-answer vectors for the "cactus" test mnemonic
    const CACTUS: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon cactus";
    const ABOUT: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn derive_is_deterministic() {
        let path: DerivationPath = "m/44'/0'/0'/0/0".parse().unwrap();
        let a = derive(ABOUT, &path).unwrap();
        let b = derive(ABOUT, &path).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn legacy_account_matches_known_wifs() {
        let account = AccountKeys::from_mnemonic(CACTUS, Chain::Bitcoin, DerivationType::Legacy, 0).unwrap();
        assert_eq!(
            account.xpub(),
            "xpub6Cqt2PEFm9dYerMNww1t75WhkyZGmVAcVTyt1Pt6LusF1BECwDWP35R3FotsdaMfekBc8uw6kDC8PYuZujkbsfMKrSwP7RhhcseL4SHQ4Di"
        );
        assert_eq!(
            account.receive_key(0).unwrap().to_wif().as_str(),
            "L1CnsYXUFwAM9q4Yi5u8aGqmbkA3ACtapNz66enUtD7ujavPntEG"
        );
        assert_eq!(
            account.receive_key(1).unwrap().to_wif().as_str(),
            "L4XCL4XEBmacQJvyLh29LbXWbGvLCKqCRX2sfBJN28hbFTwiVSwH"
        );
        assert_eq!(
            account.change_key(0).unwrap().to_wif().as_str(),
            "KwRGDmz6QB8y2QkNBV45nvyJRe9VE7RNnh6n7re56cmcTgHP98Ue"
        );
        assert_eq!(
            account.change_key(1).unwrap().to_wif().as_str(),
            "Kz4spLQY4vkXvTgzuV9Rhcj7x4TaWshyzZYaQtAGX9k4SDqkwB5C"
        );
        assert_eq!(
            account.account_key().unwrap().to_wif().as_str(),
            "L25tqq4DUQBZ1cAcLRBbd5VMpphmjANX6KoVkxuNy8K8akVj9HBy"
        );
    }

    #[test]
    fn bech32_account_matches_known_wifs() {
        let account = AccountKeys::from_mnemonic(CACTUS, Chain::Bitcoin, DerivationType::Bech32, 0).unwrap();
        assert_eq!(
            account.xpub(),
            "xpub6D4nuUzLPukRYKmb6ZYxo5khwLJXHarYQutgauqv8UkAVV8NHw23UZPDoXdJZDqv5hHiyh55jCER2KuYt2a7Egnoj7TF8u7scsJbJPeCneM"
        );
        assert_eq!(
            account.receive_key(0).unwrap().to_wif().as_str(),
            "L2crEKLjp8wJRRV3ELcWTZf9EuVEVg6cAMdiVmtkbdW4ePHH3T5a"
        );
        assert_eq!(
            account.change_key(1).unwrap().to_wif().as_str(),
            "L5cb6CCyDTCkLh4ghUxvYuiMrg4qEWdhR3AwYqBBpfwrFPtnxVX1"
        );
        assert_eq!(
            account.receive_address(0).unwrap().to_string(),
            "bc1qzq7wjutswcp4r606tm0uxz9f9u3xx7cumxjeec"
        );
    }

    #[test]
    fn config_selects_derivation_and_account() {
        let account = AccountKeys::from_config(CACTUS, &EngineConfig::for_chain(Chain::Bitcoin)).unwrap();
        assert_eq!(account.derivation(), DerivationType::Bech32);
        assert_eq!(
            account.receive_key(0).unwrap().to_wif().as_str(),
            "L2crEKLjp8wJRRV3ELcWTZf9EuVEVg6cAMdiVmtkbdW4ePHH3T5a"
        );

        let config = EngineConfig::from_json(r#"{"chain":"bitcoinCash","accountIndex":1}"#).unwrap();
        let account = AccountKeys::from_config(CACTUS, &config).unwrap();
        assert_eq!(account.account_path().unwrap().to_string(), "m/44'/0'/1'");
        assert_eq!(
            account.receive_key(0).unwrap().to_wif().as_str(),
            "L35DuWPX96LmyyxinCUn1UisEMshWeGexmyDFGxmKfNjvAYQMU2t"
        );
    }

    #[test]
    fn bitcoin_cash_uses_pre_fork_tree() {
        let account = AccountKeys::from_mnemonic(CACTUS, Chain::BitcoinCash, DerivationType::Legacy, 1).unwrap();
        assert_eq!(account.account_path().unwrap().to_string(), "m/44'/0'/1'");
        assert_eq!(
            account.receive_key(0).unwrap().to_wif().as_str(),
            "L35DuWPX96LmyyxinCUn1UisEMshWeGexmyDFGxmKfNjvAYQMU2t"
        );
        assert_eq!(
            account.change_key(0).unwrap().to_wif().as_str(),
            "KwjVqrrNctL1rEddHVP9rJzrDZJZEqqgLkXknTVBzEQTem4nMCy8"
        );
        assert_eq!(
            account.receive_address(0).unwrap().to_string(),
            "bitcoincash:qz3fewxaqmatztamwxkc047n0hgtphgfsyft0ajpgx"
        );
    }

    #[test]
    fn different_accounts_produce_different_keys() {
        let a0 = AccountKeys::from_mnemonic(ABOUT, Chain::Bitcoin, DerivationType::Legacy, 0).unwrap();
        let a1 = AccountKeys::from_mnemonic(ABOUT, Chain::Bitcoin, DerivationType::Legacy, 1).unwrap();
        assert_ne!(a0.xpub(), a1.xpub());
        assert_ne!(a0.receive_key(0).unwrap(), a1.receive_key(0).unwrap());
    }

    #[test]
    fn invalid_mnemonic_fails() {
        let path: DerivationPath = "m/44'/0'/0'/0/0".parse().unwrap();
        // Valid words, broken checksum
        let bad_checksum =
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(matches!(
            derive(bad_checksum, &path),
            Err(DerivationError::InvalidMnemonic(_))
        ));
        assert!(matches!(derive("", &path), Err(DerivationError::InvalidMnemonic(_))));
        assert!(!validate_mnemonic("not a valid mnemonic"));
        assert!(validate_mnemonic(ABOUT));
    }

    #[test]
    fn generate_mnemonic_produces_valid_12_words() {
        let mn = generate_mnemonic().unwrap();
        assert_eq!(mn.split_whitespace().count(), 12);
        assert!(validate_mnemonic(&mn));
    }

    #[test]
    fn path_parsing() {
        let path: DerivationPath = "m/84'/0'/2'/1/7".parse().unwrap();
        assert_eq!(path.to_string(), "m/84'/0'/2'/1/7");
        assert_eq!(path.steps().len(), 5);

        let relative: DerivationPath = "M/0/5".parse().unwrap();
        assert_eq!(relative.steps().len(), 2);
        assert!(!relative.steps()[0].is_hardened());

        assert!("44'/0'".parse::<DerivationPath>().is_err());
        assert!("m/abc".parse::<DerivationPath>().is_err());
        assert!("m/2147483648".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn wif_roundtrip() {
        let key = KeyPair::from_wif("L1CnsYXUFwAM9q4Yi5u8aGqmbkA3ACtapNz66enUtD7ujavPntEG").unwrap();
        assert_eq!(
            hex::encode(key.public_key_bytes()),
            "0275d93539d503d824ad0c69a4c23ae480700489de09378ba32c1776cf86d6bb93"
        );
        assert_eq!(
            key.to_wif().as_str(),
            "L1CnsYXUFwAM9q4Yi5u8aGqmbkA3ACtapNz66enUtD7ujavPntEG"
        );
        assert_eq!(
            key.address(Chain::Bitcoin, AddressFormat::Legacy).unwrap().to_string(),
            "1E5az6gZuZjPAXRzBhGNs8mVipe74UccSu"
        );
    }

    #[test]
    fn invalid_wifs_fail() {
        assert!(KeyPair::from_wif("").is_err());
        assert!(KeyPair::from_wif("not-a-valid-wif").is_err());
        // Testnet prefix (0xef)
        assert!(KeyPair::from_wif("cNYfRxoekNJFJx5H7jiEJFHk9XAZVxZDJHFTApRdzBBr1L8MwNRL").is_err());
    }

    #[test]
    fn short_hex_keys_are_left_padded() {
        let key = KeyPair::from_secret_hex("7fdafb9db5bc501f2096e7d13d331dc7a75d9594af3d251313ba8b6200f4e38").unwrap();
        assert_eq!(
            hex::encode(key.public_key_bytes()),
            "03355456308d3743f986ef8ca289414cc6997286f94406023a7cf0aa8e5a2a58eb"
        );
        assert!(KeyPair::from_secret_hex(&"00".repeat(32)).is_err());
        assert!(KeyPair::from_secret_hex("zz").is_err());
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let key = KeyPair::from_wif("L1CnsYXUFwAM9q4Yi5u8aGqmbkA3ACtapNz66enUtD7ujavPntEG").unwrap();
        let secret_hex = hex::encode(key.secret_key().secret_bytes());
        let shown = format!("{:?}", key);
        assert!(!shown.contains(&secret_hex));
        assert!(shown.contains("0275d935"));
    }
}
