//! Transaction wire format
//!
//! version(4 LE) | varint n_in | inputs | varint n_out | outputs | locktime(4 LE)
//!
//! input:  prev hash (32, internal order) | index (4 LE) | varint+scriptSig | sequence (4 LE)
//! output: value (8 LE) | varint+scriptPubKey

use crate::encoding::{varint_len, write_var_bytes, write_varint, ByteReader, EncodingError};
use crate::hashing::HashScheme;
use crate::script::Script;
use crate::utxo::OutPoint;

pub const TX_VERSION: u32 = 1;
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Smallest possible serialized input; bounds the preallocation on decode.
const MIN_INPUT_SIZE: u64 = 41;
const MIN_OUTPUT_SIZE: u64 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub value: u64,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(value: u64, script_pubkey: Script) -> Self {
        Self { value, script_pubkey }
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.value.to_le_bytes());
        write_var_bytes(buf, self.script_pubkey.as_bytes());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Exact length of `encode()`.
    pub fn serialized_size(&self) -> usize {
        let inputs: usize = self
            .inputs
            .iter()
            .map(|i| {
                let script = i.script_sig.as_bytes().len();
                32 + 4 + varint_len(script as u64) + script + 4
            })
            .sum();
        let outputs: usize = self
            .outputs
            .iter()
            .map(|o| {
                let script = o.script_pubkey.as_bytes().len();
                8 + varint_len(script as u64) + script
            })
            .sum();
        4 + varint_len(self.inputs.len() as u64)
            + inputs
            + varint_len(self.outputs.len() as u64)
            + outputs
            + 4
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());

        buf.extend_from_slice(&self.version.to_le_bytes());

        write_varint(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.extend_from_slice(&input.previous_output.hash);
            buf.extend_from_slice(&input.previous_output.index.to_le_bytes());
            write_var_bytes(&mut buf, input.script_sig.as_bytes());
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_varint(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            output.encode_into(&mut buf);
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    pub fn encode_hex(&self) -> String {
        hex::encode(self.encode())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_u32_le()?;

        let n_in = reader.read_varint()?;
        let mut inputs = Vec::with_capacity(capacity_for(n_in, MIN_INPUT_SIZE, &reader));
        for _ in 0..n_in {
            let hash = reader.read_array::<32>()?;
            let index = reader.read_u32_le()?;
            let script_sig = Script::new(reader.read_var_bytes()?.to_vec());
            let sequence = reader.read_u32_le()?;
            inputs.push(TxIn {
                previous_output: OutPoint::new(hash, index),
                script_sig,
                sequence,
            });
        }

        let n_out = reader.read_varint()?;
        let mut outputs = Vec::with_capacity(capacity_for(n_out, MIN_OUTPUT_SIZE, &reader));
        for _ in 0..n_out {
            let value = reader.read_u64_le()?;
            let script_pubkey = Script::new(reader.read_var_bytes()?.to_vec());
            outputs.push(TxOut { value, script_pubkey });
        }

        let lock_time = reader.read_u32_le()?;
        if !reader.is_empty() {
            return Err(EncodingError::TrailingData(reader.remaining()));
        }

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn decode_hex(hex_str: &str) -> Result<Self, EncodingError> {
        let bytes = crate::encoding::hex_decode(hex_str)?;
        Self::decode(&bytes)
    }

    /// Concatenated serialized outputs, as hashed by the fork-id sighash.
    pub fn serialize_outputs(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for output in &self.outputs {
            output.encode_into(&mut buf);
        }
        buf
    }

    /// Double-SHA256 of the serialized bytes, internal order.
    pub fn hash(&self) -> [u8; 32] {
        HashScheme::DoubleSha256.digest(&self.encode())
    }

    /// Transaction id as conventionally displayed (byte-reversed).
    pub fn txid(&self) -> String {
        HashScheme::DoubleSha256.display(&self.encode())
    }

    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

fn capacity_for(count: u64, min_size: u64, reader: &ByteReader<'_>) -> usize {
    let max_fit = reader.remaining() as u64 / min_size;
    count.min(max_fit) as usize
}
