//! Byte-exact regression fixtures for Bitcoin Cash spends.

use std::collections::HashMap;

use utxo_engine::coin_selection::Selection;
use utxo_engine::signer::{attach_prevouts, verify};
use utxo_engine::{
    sign, Address, Chain, DustMixing, HashScheme, KeyPair, OutPoint, Script, SighashVariant,
    Transaction, TransactionBuilder, UnspentOutput,
};

const DESTINATION: &str = "bitcoincash:qz0a0q4kwdvdh4ryl237llla3ldga67s0yq8sduhzl";
const CHANGE: &str = "bitcoincash:qprjwksp2xzluuykx0642xnc9alpr8jd0vvquqclcp";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn address(s: &str) -> Address {
    Address::parse(Chain::BitcoinCash, s).unwrap()
}

#[test]
fn single_input_fork_id_spend() {
    init_logger();
    let key = KeyPair::from_secret_hex("7fdafb9db5bc501f2096e7d13d331dc7a75d9594af3d251313ba8b6200f4e38").unwrap();
    let utxo = UnspentOutput::new(
        OutPoint::from_display_hex(
            "4bd7c1b9e0c5d8f67a1e2c3b4d5f60718293a4b5c6d7e8f90a1b2c3d4e5f6071",
            1,
        )
        .unwrap(),
        5151,
        Script::from_hex("76a914aff1e0789e5fe316b729577665aa0a04d5b0f8c788ac").unwrap(),
        1,
    )
    .unwrap();

    let selection = Selection {
        chosen: vec![utxo.clone()],
        amount: 600,
        fee: 151,
        change: 4400,
    };
    let unsigned = TransactionBuilder::new()
        .build(&selection, &address(DESTINATION), 600, &address(CHANGE))
        .unwrap();

    let key_bytes = key.public_key_bytes();
    let mut keys = HashMap::new();
    keys.insert(utxo.outpoint, key);
    let signed = sign(&unsigned, &keys, SighashVariant::ForkId).unwrap();

    assert!(!signed.raw_bytes().is_empty());
    assert_eq!(
        signed.raw_hex(),
        "010000000171605f4e3d2c1b0af9e8d7c6b5a4938271605f4d3b2c1e7af6d8c5e0b9c1d74b010000006b483045022100c04e05d22cdd533b64d7c22f7f2d410f0bc593b81b7de089cdbb349119d3ea6a022004c8c84b0d67dd73945f7a59c165c2e42a4c62bf4791915c2d1006f1ca2a7202412103355456308d3743f986ef8ca289414cc6997286f94406023a7cf0aa8e5a2a58ebffffffff0258020000000000001976a9149fd782b67358dbd464faa3effffd8fda8eebd07988ac30110000000000001976a91447275a015185fe709633f5551a782f7e119e4d7b88ac00000000"
    );
    assert_eq!(
        signed.txid(),
        "078144cad967658c2132775aa0fad63e60361d24b9343c79d49c2715053fe81f"
    );
    assert_eq!(signed.fee(), 151);

    // The fixture key does not own the fixture script, so only the
    // signature itself can be checked.
    let (sig, pubkey) = signed.transaction().inputs[0]
        .script_sig
        .p2pkh_unlocking_parts()
        .unwrap();
    assert_eq!(sig.last(), Some(&0x41));
    assert_eq!(pubkey, &key_bytes[..]);
}

const DUST_MIXED_TX: &str = "010000000276bfad4cc0d1cbe454c1be0af7f8be2c8b1ca74f23d2a35306997e763b2f2273000000006b483045022100d63aa96a2c5e715be2b61162f0d7cb0b353c70989230552a4df9701e7be5b46902206d1383d8db5af0fafdb92d8545820c1be631e17628661c6809ce351819b24ed8412103e0f5113d34577a01cc569b911e57a04b012b086e0d5841f4656af90b3cde08e7ffffffff0e6033c9250b754335232d4918420baf2dd8866a47fb9af46e2b7dcd4584de2e4200000000ffffffff03404b4c00000000001976a9149fd782b67358dbd464faa3effffd8fda8eebd07988ac00080700000000001976a91447275a015185fe709633f5551a782f7e119e4d7b88ac22020000000000001976a9147328c1847e220a5b2a5c2897587ae129148e41d188ac00000000";

fn dust_mixed_unsigned() -> utxo_engine::UnsignedTransaction {
    let utxo = UnspentOutput::new(
        OutPoint::from_internal_hex(
            "76bfad4cc0d1cbe454c1be0af7f8be2c8b1ca74f23d2a35306997e763b2f2273",
            0,
        )
        .unwrap(),
        5461495,
        Script::from_hex("76a9141aedb27afebe4e4a2a943138ed436c35fe03f2ff88ac").unwrap(),
        1,
    )
    .unwrap();
    let dust = DustMixing {
        outpoint: OutPoint::from_internal_hex(
            "0e6033c9250b754335232d4918420baf2dd8866a47fb9af46e2b7dcd4584de2e",
            66,
        )
        .unwrap(),
        value: 546,
        output_script: Script::from_hex("76a9147328c1847e220a5b2a5c2897587ae129148e41d188ac").unwrap(),
        lock_secret: None,
    };
    let selection = Selection {
        chosen: vec![utxo],
        amount: 5000000,
        fee: 695,
        change: 460800,
    };
    TransactionBuilder::new()
        .with_dust_mixing(dust)
        .build(&selection, &address(DESTINATION), 5000000, &address(CHANGE))
        .unwrap()
}

#[test]
fn dust_mixed_spend_matches_builder_layout() {
    let unsigned = dust_mixed_unsigned();
    let decoded = Transaction::decode_hex(DUST_MIXED_TX).unwrap();

    assert_eq!(decoded.encode_hex(), DUST_MIXED_TX);
    assert_eq!(decoded.outputs, unsigned.outputs);
    assert_eq!(decoded.inputs.len(), 2);
    assert_eq!(decoded.inputs[1].previous_output.index, 66);
    // The service's dust input stays unsigned
    assert!(decoded.inputs[1].script_sig.is_empty());
    assert_eq!(unsigned.fee(), 695);
}

#[test]
fn dust_mixed_spend_signature_verifies() {
    let unsigned = dust_mixed_unsigned();
    let decoded = Transaction::decode_hex(DUST_MIXED_TX).unwrap();
    let signed = attach_prevouts(unsigned, decoded).unwrap();

    verify(&signed, SighashVariant::ForkId).unwrap();
    assert!(verify(&signed, SighashVariant::Legacy).is_err());
    assert_eq!(signed.raw_hex(), DUST_MIXED_TX);
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
