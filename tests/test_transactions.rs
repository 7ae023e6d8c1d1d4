use multichain_devkit::rlp::{Bytes, Encodable, Header, RLPError};
use multichain_devkit::transactions::{LegacyTransaction, UnsignedTransaction};
use multichain_devkit::utils::decode_hex;
use multichain_devkit::{AddressConvertible, PrivateKey, U256};

const PK_STRING: &str = "7582be841ca040aa940fff6c05773129e135623e41acce3e0b8ba520dc1ae26a";

macro_rules! make_pk {
    () => {
        PrivateKey::from_slice(&decode_hex(PK_STRING).unwrap()).unwrap()
    };
}

macro_rules! unsigned_tx {
    () => {
        LegacyTransaction {
            nonce: 0xbc614e,
            gas_price: U256::from(1_000_000_000u64),
            gas: 21000,
            to: Some(
                "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed"
                    .parse()
                    .unwrap(),
            ),
            value: U256::from(10000),
            data: b"\x00\x00\x00\x60\x60\x60".to_vec().into(),
            v: 321,
            r: U256::zero(),
            s: U256::zero(),
        }
    };
}

fn raw_list(fields: &[&dyn Encodable]) -> Vec<u8> {
    let mut payload = vec![];
    for field in fields {
        field.encode(&mut payload);
    }
    let mut out = vec![];
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(&mut out);
    out.extend(payload);
    out
}

#[test]
fn test_unsigned_properties() {
    let tx = unsigned_tx!();
    assert!(!tx.is_signed());
    assert_eq!(tx.chain_id(), 321);
    assert!(tx.public_key().is_err());
}

#[test]
fn test_sign_properties() {
    let pk = make_pk!();
    let tx = unsigned_tx!();
    let signing_hash = tx.signing_hash();
    let signed = tx.sign(&pk);
    assert!(signed.is_signed());
    assert_eq!(signed.chain_id(), 321);
    assert!(signed.v == 321 * 2 + 35 || signed.v == 321 * 2 + 36);
    assert_eq!(signed.signing_hash(), signing_hash);
    assert_ne!(signed.hash(), signing_hash);
    assert_eq!(signed.recover_sender().unwrap(), pk.address());
}

#[test]
fn test_resigning_replaces_signature() {
    let pk = make_pk!();
    let other = PrivateKey::from_slice(&[0x11; 32]).unwrap();
    let signed = unsigned_tx!().sign(&other).sign(&pk);
    assert_eq!(signed.chain_id(), 321);
    assert_eq!(signed.recover_sender().unwrap(), pk.address());
}

#[test]
fn test_decode_real() {
    // Signed with the EIP-155 example key on chain 1.
    let raw = decode_hex(
        "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
    )
    .unwrap();
    let tx = LegacyTransaction::decode_raw(&raw).expect("Must be decodable");
    assert_eq!(tx.nonce, 9);
    assert_eq!(tx.gas, 21000);
    assert_eq!(tx.chain_id(), 1);
    assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u64));
    assert_eq!(tx.to_broadcastable_bytes().to_vec(), raw);
    assert_eq!(
        tx.recover_sender().unwrap().to_hex(),
        "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
    );
}

#[test]
fn test_rlp_decode_address_too_long() {
    let to = Bytes::from(vec![0x51; 21]);
    let empty = Bytes::new();
    let raw = raw_list(&[&1u64, &empty, &21000u64, &to, &empty, &empty, &1u64, &empty, &empty]);
    assert_eq!(
        LegacyTransaction::decode_raw(&raw).unwrap_err(),
        RLPError::UnexpectedLength
    );
}

#[test]
fn test_rlp_decode_quantity_leading_zero() {
    let price = Bytes::from(vec![0x00, 0x01]);
    let empty = Bytes::new();
    let raw = raw_list(&[&1u64, &price, &21000u64, &empty, &empty, &empty, &1u64, &empty, &empty]);
    assert_eq!(
        LegacyTransaction::decode_raw(&raw).unwrap_err(),
        RLPError::LeadingZero
    );
}

#[test]
fn test_contract_creation_encodes_empty_recipient() {
    let tx = LegacyTransaction {
        to: None,
        ..unsigned_tx!()
    };
    let with_recipient = unsigned_tx!().to_broadcastable_bytes();
    let creation = tx.to_broadcastable_bytes();
    assert_eq!(with_recipient.len(), creation.len() + 20);
    assert_eq!(LegacyTransaction::decode_raw(&creation).unwrap(), tx);
}

#[test]
fn test_envelope_accepts_decimal_quantities() {
    let envelope: UnsignedTransaction = serde_json::from_str(
        r#"{
            "from": "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f",
            "to": "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed",
            "value": "10000",
            "data": "0x000000606060",
            "nonce": 12345678,
            "gas": "21000",
            "gasPrice": "0x3b9aca00",
            "chainId": 321
        }"#,
    )
    .unwrap();
    assert!(envelope.is_complete());
    let legacy = envelope.to_legacy().unwrap();
    assert_eq!(legacy, unsigned_tx!());
}

#[test]
fn test_envelope_defaults() {
    let envelope: UnsignedTransaction =
        serde_json::from_str(r#"{"to": "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed"}"#).unwrap();
    assert_eq!(envelope.value, U256::zero());
    assert!(envelope.data.is_empty());
    assert_eq!(envelope.chain_id, 0);
    assert!(envelope.to_legacy().is_none());
}
