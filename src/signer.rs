//! Transaction Signer
//!
//! Signs every wallet input of an unsigned transaction with the key that
//! controls its spent output. The chain's sighash variant is passed in by
//! the caller and never inferred. Nonces are RFC 6979 and signatures are
//! low-S normalized, so signing is deterministic.

use std::collections::HashMap;

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, SECP256K1};
use thiserror::Error;

use crate::builder::{InputOrigin, UnsignedTransaction};
use crate::hashing::{hash160, HashScheme};
use crate::keys::KeyPair;
use crate::script::Script;
use crate::sighash::{signature_hash, SighashVariant};
use crate::transaction::Transaction;
use crate::utxo::OutPoint;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("no key for input spending {0}")]
    MissingKeyForInput(OutPoint),

    #[error("signing failed: {0}")]
    SigningFailure(String),

    #[error("invalid signature on input {index}: {reason}")]
    InvalidSignature { index: usize, reason: String },
}

/// An unsigned transaction together with its scriptSigs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    unsigned: UnsignedTransaction,
    transaction: Transaction,
    raw: Vec<u8>,
}

impl SignedTransaction {
    pub fn unsigned(&self) -> &UnsignedTransaction {
        &self.unsigned
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn raw_hex(&self) -> String {
        hex::encode(&self.raw)
    }

    /// Double-SHA256 of the raw bytes, internal order.
    pub fn hash(&self) -> [u8; 32] {
        HashScheme::DoubleSha256.digest(&self.raw)
    }

    /// Displayed (byte-reversed) transaction id.
    pub fn txid(&self) -> String {
        HashScheme::DoubleSha256.display(&self.raw)
    }

    pub fn fee(&self) -> u64 {
        self.unsigned.fee()
    }

    pub fn size(&self) -> usize {
        self.raw.len()
    }
}

/// DER-encode a secp256k1 signature and append sighash byte.
fn der_encode_signature(sig: &Signature, sighash_byte: u8) -> Vec<u8> {
    let der = sig.serialize_der();
    let mut out = Vec::with_capacity(der.len() + 1);
    out.extend_from_slice(&der);
    out.push(sighash_byte);
    out
}

pub fn sign(
    unsigned: &UnsignedTransaction,
    keys_by_output: &HashMap<OutPoint, KeyPair>,
    variant: SighashVariant,
) -> Result<SignedTransaction, SigningError> {
    let mut script_sigs = Vec::with_capacity(unsigned.inputs.len());

    for (index, input) in unsigned.inputs.iter().enumerate() {
        if input.origin == InputOrigin::DustMixing {
            script_sigs.push(Script::empty());
            continue;
        }

        // The map is trusted; `keys::keys_for_outputs` checks ownership.
        let key = keys_by_output
            .get(&input.previous_output)
            .ok_or(SigningError::MissingKeyForInput(input.previous_output))?;
        if !input.prevout_script.is_p2pkh() {
            return Err(SigningError::SigningFailure(format!(
                "input {} does not spend a pay-to-public-key-hash output",
                index
            )));
        }

        let sighash = signature_hash(unsigned, index, variant);
        let msg = Message::from_digest(sighash);
        let sig = SECP256K1.sign_ecdsa(&msg, key.secret_key());
        let sig_der = der_encode_signature(&sig, variant.sighash_byte());
        script_sigs.push(Script::p2pkh_unlocking(&sig_der, &key.public_key_bytes()));
    }

    let transaction = unsigned.with_script_sigs(script_sigs);
    let raw = transaction.encode();
    let signed = SignedTransaction {
        unsigned: unsigned.clone(),
        transaction,
        raw,
    };
    log::info!(
        "signed transaction {} ({} inputs, {} bytes, fee {})",
        signed.txid(),
        unsigned.inputs.len(),
        signed.size(),
        signed.fee()
    );
    Ok(signed)
}

/// Check the signature on one wallet input against its sighash.
pub fn verify_input(signed: &SignedTransaction, index: usize, variant: SighashVariant) -> Result<(), SigningError> {
    let invalid = |reason: &str| SigningError::InvalidSignature {
        index,
        reason: reason.to_string(),
    };

    let input = signed
        .transaction
        .inputs
        .get(index)
        .ok_or_else(|| invalid("no such input"))?;
    let prevout = &signed.unsigned.inputs[index];

    let (sig_bytes, pubkey_bytes) = input
        .script_sig
        .p2pkh_unlocking_parts()
        .ok_or_else(|| invalid("not a P2PKH scriptSig"))?;
    let (sighash_byte, der) = sig_bytes
        .split_last()
        .ok_or_else(|| invalid("empty signature"))?;
    if *sighash_byte != variant.sighash_byte() {
        return Err(invalid("unexpected sighash type"));
    }

    if prevout.prevout_script.p2pkh_hash() != Some(hash160(pubkey_bytes)) {
        return Err(invalid("public key does not match the spent output"));
    }
    let public_key = PublicKey::from_slice(pubkey_bytes).map_err(|e| invalid(&e.to_string()))?;
    let sig = Signature::from_der(der).map_err(|e| invalid(&e.to_string()))?;

    let msg = Message::from_digest(signature_hash(&signed.unsigned, index, variant));
    SECP256K1
        .verify_ecdsa(&msg, &sig, &public_key)
        .map_err(|e| invalid(&e.to_string()))
}

/// Verify every wallet-owned input.
pub fn verify(signed: &SignedTransaction, variant: SighashVariant) -> Result<(), SigningError> {
    for (index, input) in signed.unsigned.inputs.iter().enumerate() {
        if input.origin == InputOrigin::Wallet {
            verify_input(signed, index, variant)?;
        }
    }
    Ok(())
}

/// Pair an externally produced transaction with the outputs it spends, so
/// its signatures can be checked.
pub fn attach_prevouts(
    unsigned: UnsignedTransaction,
    transaction: Transaction,
) -> Result<SignedTransaction, SigningError> {
    if unsigned.inputs.len() != transaction.inputs.len()
        || unsigned
            .inputs
            .iter()
            .zip(&transaction.inputs)
            .any(|(u, t)| u.previous_output != t.previous_output)
    {
        return Err(SigningError::SigningFailure(
            "transaction inputs do not match the spent outputs".into(),
        ));
    }
    let raw = transaction.encode();
    Ok(SignedTransaction {
        unsigned,
        transaction,
        raw,
    })
}
