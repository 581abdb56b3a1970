//! Transaction Builder
//!
//! Turns a coin selection into an unsigned transaction. Inputs keep the
//! selection's order; outputs are destination first, then change, then
//! the dust-mixing output when the service supplied one.

use crate::address::{Address, AddressError};
use crate::coin_selection::Selection;
use crate::script::Script;
use crate::transaction::{Transaction, TxIn, TxOut, SEQUENCE_FINAL, TX_VERSION};
use crate::utxo::{DustMixing, OutPoint};

/// Who owns the output an input spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrigin {
    Wallet,
    /// Provided by the dust-mixing service; left unsigned.
    DustMixing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedInput {
    pub previous_output: OutPoint,
    pub value: u64,
    /// Locking script of the spent output, used as the sighash script code.
    pub prevout_script: Script,
    pub sequence: u32,
    pub origin: InputOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub version: u32,
    pub inputs: Vec<UnsignedInput>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl UnsignedTransaction {
    pub fn total_input(&self) -> u64 {
        self.inputs.iter().map(|i| i.value).sum()
    }

    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }

    pub fn fee(&self) -> u64 {
        self.total_input().saturating_sub(self.total_output())
    }

    /// Wire transaction with the given scriptSig for each input.
    pub(crate) fn with_script_sigs(&self, script_sigs: Vec<Script>) -> Transaction {
        assert_eq!(script_sigs.len(), self.inputs.len());
        Transaction {
            version: self.version,
            inputs: self
                .inputs
                .iter()
                .zip(script_sigs)
                .map(|(input, script_sig)| TxIn {
                    previous_output: input.previous_output,
                    script_sig,
                    sequence: input.sequence,
                })
                .collect(),
            outputs: self.outputs.clone(),
            lock_time: self.lock_time,
        }
    }

    /// Wire transaction with every scriptSig empty.
    pub fn to_transaction(&self) -> Transaction {
        self.with_script_sigs(vec![Script::empty(); self.inputs.len()])
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    lock_time: u32,
    dust_mixing: Option<DustMixing>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lock_time(mut self, lock_time: u32) -> Self {
        self.lock_time = lock_time;
        self
    }

    pub fn with_dust_mixing(mut self, dust: DustMixing) -> Self {
        self.dust_mixing = Some(dust);
        self
    }

    /// Pay `amount` to `destination` and the selection's change (if any) to
    /// `change_address`.
    pub fn build(
        &self,
        selection: &Selection,
        destination: &Address,
        amount: u64,
        change_address: &Address,
    ) -> Result<UnsignedTransaction, AddressError> {
        let mut outputs = vec![TxOut::new(amount, destination.locking_script()?)];
        if selection.change > 0 {
            outputs.push(TxOut::new(selection.change, change_address.locking_script()?));
        }
        Ok(self.assemble(selection, outputs, amount))
    }

    /// Single-output spend of the whole selection (sweep).
    pub fn build_sweep(
        &self,
        selection: &Selection,
        destination: &Address,
    ) -> Result<UnsignedTransaction, AddressError> {
        let outputs = vec![TxOut::new(selection.amount, destination.locking_script()?)];
        Ok(self.assemble(selection, outputs, selection.amount))
    }

    fn assemble(&self, selection: &Selection, mut outputs: Vec<TxOut>, amount: u64) -> UnsignedTransaction {
        let mut inputs: Vec<UnsignedInput> = selection
            .chosen
            .iter()
            .map(|utxo| UnsignedInput {
                previous_output: utxo.outpoint,
                value: utxo.value,
                prevout_script: utxo.script.clone(),
                sequence: SEQUENCE_FINAL,
                origin: InputOrigin::Wallet,
            })
            .collect();

        let wallet_input = selection.total_input();
        let expected = amount.checked_add(selection.change);
        let paid = match outputs.iter().try_fold(0u64, |acc, o| acc.checked_add(o.value)) {
            Some(paid) if Some(paid) == expected => paid,
            _ => panic!("outputs must equal amount plus change"),
        };
        assert!(paid <= wallet_input, "outputs exceed inputs");

        if let Some(dust) = &self.dust_mixing {
            inputs.push(UnsignedInput {
                previous_output: dust.outpoint,
                value: dust.value,
                prevout_script: Script::empty(),
                sequence: SEQUENCE_FINAL,
                origin: InputOrigin::DustMixing,
            });
            outputs.push(TxOut::new(dust.value, dust.output_script.clone()));
        }

        let tx = UnsignedTransaction {
            version: TX_VERSION,
            inputs,
            outputs,
            lock_time: self.lock_time,
        };
        assert_eq!(tx.fee(), wallet_input - paid, "dust must pass through at equal value");
        tx
    }
}
