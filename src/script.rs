//! Standard P2PKH scripts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{hex_decode, EncodingError};

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;
const OP_PUSHDATA1: u8 = 0x4c;

/// Length of a P2PKH locking script.
pub const P2PKH_SCRIPT_LEN: usize = 25;

/// Raw script bytes, hex-encoded when serialized.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Script(Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, EncodingError> {
        hex_decode(hex_str).map(Self)
    }

    /// OP_DUP OP_HASH160 <20-byte-hash> OP_EQUALVERIFY OP_CHECKSIG
    pub fn p2pkh(pubkey_hash: &[u8; 20]) -> Self {
        let mut script = Vec::with_capacity(P2PKH_SCRIPT_LEN);
        script.push(OP_DUP);
        script.push(OP_HASH160);
        script.push(0x14); // push 20 bytes
        script.extend_from_slice(pubkey_hash);
        script.push(OP_EQUALVERIFY);
        script.push(OP_CHECKSIG);
        Self(script)
    }

    /// scriptSig for a P2PKH spend: <sig> <pubkey>
    pub fn p2pkh_unlocking(signature: &[u8], public_key: &[u8]) -> Self {
        let mut script = Self(Vec::with_capacity(2 + signature.len() + public_key.len()));
        script.push_data(signature);
        script.push_data(public_key);
        script
    }

    /// Append a minimal data push.
    pub fn push_data(&mut self, data: &[u8]) {
        match data.len() {
            len @ 0..=0x4b => self.0.push(len as u8),
            len @ 0x4c..=0xff => {
                self.0.push(OP_PUSHDATA1);
                self.0.push(len as u8);
            }
            len => {
                // OP_PUSHDATA2; no P2PKH element comes close to this size
                self.0.push(0x4d);
                self.0.extend_from_slice(&(len as u16).to_le_bytes());
            }
        }
        self.0.extend_from_slice(data);
    }

    pub fn is_p2pkh(&self) -> bool {
        self.p2pkh_hash().is_some()
    }

    /// The public key hash locked by a P2PKH script.
    pub fn p2pkh_hash(&self) -> Option<[u8; 20]> {
        let s = &self.0;
        if s.len() == P2PKH_SCRIPT_LEN
            && s[0] == OP_DUP
            && s[1] == OP_HASH160
            && s[2] == 0x14
            && s[23] == OP_EQUALVERIFY
            && s[24] == OP_CHECKSIG
        {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(&s[3..23]);
            Some(hash)
        } else {
            None
        }
    }

    /// Split a P2PKH scriptSig back into `(signature, public key)`.
    pub fn p2pkh_unlocking_parts(&self) -> Option<(&[u8], &[u8])> {
        let s = &self.0;
        let sig_len = *s.first()? as usize;
        if sig_len == 0 || sig_len > 0x4b {
            return None;
        }
        let sig = s.get(1..1 + sig_len)?;
        let pk_len = *s.get(1 + sig_len)? as usize;
        let pk = s.get(2 + sig_len..2 + sig_len + pk_len)?;
        if 2 + sig_len + pk_len != s.len() {
            return None;
        }
        Some((sig, pk))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl From<Script> for String {
    fn from(script: Script) -> Self {
        script.to_hex()
    }
}

impl TryFrom<String> for Script {
    type Error = EncodingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Script::from_hex(&value)
    }
}
