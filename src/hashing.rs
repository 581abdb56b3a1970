//! Hash primitives
//!
//! SHA-256, double SHA-256 and HASH160 for the Bitcoin family, plus
//! Keccak-256 for ledgers that identify transactions by a Keccak digest.

use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Hash160 = RIPEMD160(SHA256(data))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    Ripemd160::digest(sha).into()
}

/// Keccak-256 (pre-standard SHA-3 padding).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// How a ledger derives and displays the identifier of a serialized
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HashScheme {
    /// dSHA256 of the raw bytes, displayed byte-reversed (UTXO chains).
    DoubleSha256,
    /// Keccak-256 of the raw bytes, displayed `0x`-prefixed in natural order.
    Keccak256,
}

impl HashScheme {
    /// Digest in internal byte order.
    pub fn digest(self, raw_tx: &[u8]) -> [u8; 32] {
        match self {
            HashScheme::DoubleSha256 => double_sha256(raw_tx),
            HashScheme::Keccak256 => keccak256(raw_tx),
        }
    }

    /// Digest formatted the way block explorers show it.
    pub fn display(self, raw_tx: &[u8]) -> String {
        let digest = self.digest(raw_tx);
        match self {
            HashScheme::DoubleSha256 => {
                let mut reversed = digest;
                reversed.reverse();
                hex::encode(reversed)
            }
            HashScheme::Keccak256 => format!("0x{}", hex::encode(digest)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            hex::encode(sha256(b"hello")),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(
            hex::encode(double_sha256(b"hello")),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
        assert_eq!(
            hex::encode(hash160(b"hello")),
            "b6a9c8c230722b7c748331a8b450f05566dc7d0f"
        );
    }

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn keccak_transaction_hash() {
        let raw = hex::decode(
            "f86c258502540be40083035b609482e041e84074fc5f5947d4d27e3c44f824b7a1a187b1a2bc2ec500008078a04a7db627266fa9a4116e3f6b33f5d245db40983234eb356261f36808909d2848a0166fa098a2ce3bda87af6000ed0083e3bf7cc31c6686b670bd85cbc6da2d6e85",
        )
        .unwrap();
        assert_eq!(
            HashScheme::Keccak256.display(&raw),
            "0x58e5a0fc7fbc849eddc100d44e86276168a8c7baaa5604e44ba6f5eb8ba1b7eb"
        );
    }

    #[test]
    fn double_sha_display_is_reversed() {
        let digest = HashScheme::DoubleSha256.digest(b"hello");
        let shown = HashScheme::DoubleSha256.display(b"hello");
        let mut reversed = digest;
        reversed.reverse();
        assert_eq!(shown, hex::encode(reversed));
        assert_eq!(
            shown,
            "503d8319a48348cdc610a582f7bf754b5833df65038606eb48510790dfc99595"
        );
    }
}
