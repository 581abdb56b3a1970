//! Signature hashes
//!
//! Legacy: the whole transaction with every other input's script blanked,
//! the spent output's script in the signed input, then the sighash type
//! as u32 LE.
//!
//! Fork-id (SIGHASH_ALL | FORKID = 0x41), BIP-143 layout:
//!   version || hashPrevouts || hashSequence || outpoint || scriptCode ||
//!   value || nSequence || hashOutputs || locktime || sighashType

use serde::{Deserialize, Serialize};

use crate::builder::UnsignedTransaction;
use crate::encoding::write_var_bytes;
use crate::hashing::double_sha256;
use crate::script::Script;

pub const SIGHASH_ALL: u32 = 0x01;
pub const SIGHASH_FORKID: u32 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SighashVariant {
    Legacy,
    ForkId,
}

impl SighashVariant {
    pub fn sighash_type(self) -> u32 {
        match self {
            SighashVariant::Legacy => SIGHASH_ALL,
            SighashVariant::ForkId => SIGHASH_ALL | SIGHASH_FORKID,
        }
    }

    /// Byte appended to the DER signature.
    pub fn sighash_byte(self) -> u8 {
        self.sighash_type() as u8
    }
}

/// Digest signed for input `index`.
pub fn signature_hash(tx: &UnsignedTransaction, index: usize, variant: SighashVariant) -> [u8; 32] {
    match variant {
        SighashVariant::Legacy => legacy_signature_hash(tx, index),
        SighashVariant::ForkId => fork_id_signature_hash(tx, index),
    }
}

pub fn legacy_signature_hash(tx: &UnsignedTransaction, index: usize) -> [u8; 32] {
    let script_sigs = tx
        .inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            if i == index {
                input.prevout_script.clone()
            } else {
                Script::empty()
            }
        })
        .collect();

    let mut preimage = tx.with_script_sigs(script_sigs).encode();
    preimage.extend_from_slice(&SighashVariant::Legacy.sighash_type().to_le_bytes());
    double_sha256(&preimage)
}

pub fn fork_id_signature_hash(tx: &UnsignedTransaction, index: usize) -> [u8; 32] {
    // hashPrevouts = dSHA256(all outpoints)
    let mut prevouts_buf = Vec::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        prevouts_buf.extend_from_slice(&input.previous_output.hash);
        prevouts_buf.extend_from_slice(&input.previous_output.index.to_le_bytes());
    }
    let hash_prevouts = double_sha256(&prevouts_buf);

    // hashSequence = dSHA256(all sequences)
    let mut seq_buf = Vec::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        seq_buf.extend_from_slice(&input.sequence.to_le_bytes());
    }
    let hash_sequence = double_sha256(&seq_buf);

    let hash_outputs = double_sha256(&tx.to_transaction().serialize_outputs());

    let input = &tx.inputs[index];
    let mut preimage = Vec::with_capacity(156 + input.prevout_script.len());
    preimage.extend_from_slice(&tx.version.to_le_bytes());
    preimage.extend_from_slice(&hash_prevouts);
    preimage.extend_from_slice(&hash_sequence);

    preimage.extend_from_slice(&input.previous_output.hash);
    preimage.extend_from_slice(&input.previous_output.index.to_le_bytes());
    write_var_bytes(&mut preimage, input.prevout_script.as_bytes());
    preimage.extend_from_slice(&input.value.to_le_bytes());
    preimage.extend_from_slice(&input.sequence.to_le_bytes());

    preimage.extend_from_slice(&hash_outputs);
    preimage.extend_from_slice(&tx.lock_time.to_le_bytes());
    preimage.extend_from_slice(&SighashVariant::ForkId.sighash_type().to_le_bytes());

    double_sha256(&preimage)
}
