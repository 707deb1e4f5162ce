//! Reconstruction of a legacy transaction from an RPC record.
//!
//! The rebuilt object carries the nine encoded fields in canonical order
//! plus two out-of-band attachments: the sender address the caller already
//! knows (never re-derived from the signature here) and, when the record
//! declared its own hash, that hash pinned verbatim as the transaction's
//! identity.

use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_rlp::{Decodable, Encodable};
use ethcanon_primitives::{to_buffer, to_u64, to_variable_buffer, ByteWidth, ConversionError};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::ObjectError;
use crate::rpc;

/// Canonical field order: `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]`.
const FIELD_COUNT: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    fields: Vec<Bytes>,
    sender: Option<Address>,
    /// Identity declared by the source record; takes precedence over
    /// recomputation once the integrity check has passed.
    pinned_hash: Option<B256>,
}

impl Transaction {
    /// Rebuilds a transaction from an RPC-shaped record.
    ///
    /// Absent optional fields default (never fail); the only fail-fast
    /// step is the integrity check: when the record declares a `hash`,
    /// the hash recomputed from the rebuilt fields must match it, or the
    /// whole reconstruction is rejected with [`ObjectError::Integrity`].
    pub fn from_rpc(record: &Value) -> Result<Self, ObjectError> {
        let obj = record
            .as_object()
            .ok_or(ObjectError::UnexpectedShape("a transaction object"))?;

        let nonce = variable_field(obj, &["nonce"])?;
        let gas_price = variable_field(obj, &["gasPrice"])?;
        // the canonical spelling wins; the legacy one is consulted only
        // when it is absent
        let gas_limit = variable_field(obj, &["gasLimit", "gas"])?;
        let to = match rpc::field(obj, &["to"]) {
            Some(value) => to_buffer(value, ByteWidth::Exact(20))?,
            // contract creation
            None => Bytes::new(),
        };
        let value = variable_field(obj, &["value"])?;
        let data = match rpc::field(obj, &["data", "input"]) {
            Some(value) => to_buffer(value, ByteWidth::Unbounded)?,
            None => Bytes::new(),
        };
        let v = normalized_v(obj)?;
        let r = variable_field(obj, &["r"])?;
        let s = variable_field(obj, &["s"])?;

        // `from` is not an encoded transaction field; it rides along as
        // the known sender address
        let sender = match rpc::field(obj, &["from"]) {
            Some(value) => Some(Address::from_slice(&to_buffer(
                value,
                ByteWidth::Exact(20),
            )?)),
            None => None,
        };

        let mut tx = Self {
            fields: vec![nonce, gas_price, gas_limit, to, value, data, v, r, s],
            sender,
            pinned_hash: None,
        };

        if let Some(declared) = declared_hash(obj)? {
            let computed = tx.hash();
            if computed != declared {
                error!(%declared, %computed, "transaction hash mismatch");
                return Err(ObjectError::Integrity {
                    declared: declared.to_string(),
                    computed: computed.to_string(),
                    encoded: tx.to_hex(),
                });
            }
            debug!(hash = %declared, "pinned declared transaction hash");
            tx.pinned_hash = Some(declared);
        }

        Ok(tx)
    }

    /// Decodes a transaction from its canonical nine-field encoding.
    pub fn from_encoded(buf: &[u8]) -> Result<Self, ObjectError> {
        let fields = Vec::<Bytes>::decode(&mut &buf[..])?;
        if fields.len() != FIELD_COUNT {
            return Err(ObjectError::UnexpectedShape("a nine-field transaction list"));
        }
        Ok(Self {
            fields,
            sender: None,
            pinned_hash: None,
        })
    }

    /// The transaction's identity hash: the pinned declared hash when one
    /// was supplied, otherwise keccak256 of the canonical encoding.
    pub fn hash(&self) -> B256 {
        self.pinned_hash
            .unwrap_or_else(|| keccak256(self.serialize()))
    }

    /// The canonical encoding of the nine fields.
    pub fn serialize(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.serialize()))
    }

    /// The sender address attached out-of-band by the source record.
    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub fn fields(&self) -> &[Bytes] {
        &self.fields
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        self.fields.encode(out);
    }

    fn length(&self) -> usize {
        self.fields.length()
    }
}

fn variable_field(obj: &Map<String, Value>, aliases: &[&str]) -> Result<Bytes, ConversionError> {
    match rpc::field(obj, aliases) {
        Some(value) => to_variable_buffer(value),
        None => Ok(Bytes::new()),
    }
}

/// Recovery-id normalization: values below 27 are raw recovery ids and
/// gain the legacy offset; anything at or above 27 passes through.
fn normalized_v(obj: &Map<String, Value>) -> Result<Bytes, ConversionError> {
    let Some(value) = rpc::field(obj, &["v"]) else {
        return Ok(Bytes::new());
    };
    let mut v = to_u64(value)?;
    if v < 27 {
        v += 27;
    }
    let be = v.to_be_bytes();
    let first = be.iter().position(|b| *b != 0).unwrap_or(be.len());
    Ok(Bytes::copy_from_slice(&be[first..]))
}

/// A declared hash that is absent, empty or a bare `0x` means "no check
/// requested", matching the defaulting convention used elsewhere.
fn declared_hash(obj: &Map<String, Value>) -> Result<Option<B256>, ConversionError> {
    match rpc::field(obj, &["hash"]) {
        Some(Value::String(s)) if s.is_empty() || s == "0x" => Ok(None),
        Some(value) => Ok(Some(B256::from_slice(&to_buffer(
            value,
            ByteWidth::Exact(32),
        )?))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    /// Index of `v` in the canonical field order.
    const V: usize = 6;

    fn base_record() -> Value {
        json!({
            "nonce": "0x7",
            "gasPrice": "0x4a817c800",
            "gasLimit": "0x5208",
            "to": "0x3535353535353535353535353535353535353535",
            "value": "0xde0b6b3a7640000",
            "data": "0x",
            "v": "0x25",
            "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
            "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
            "from": "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        })
    }

    #[rstest]
    #[case(json!(0), vec![27])]
    #[case(json!(1), vec![28])]
    #[case(json!("0x0"), vec![27])]
    #[case(json!("0x1"), vec![28])]
    #[case(json!(37), vec![37])]
    #[case(json!("0x25"), vec![37])]
    fn recovery_id_normalization(#[case] v: Value, #[case] expected: Vec<u8>) {
        let mut record = base_record();
        record["v"] = v;
        let tx = Transaction::from_rpc(&record).unwrap();
        assert_eq!(tx.fields()[V].to_vec(), expected);
    }

    #[test]
    fn legacy_field_names_encode_identically() {
        let canonical = Transaction::from_rpc(&base_record()).unwrap();

        let mut legacy = base_record();
        let obj = legacy.as_object_mut().unwrap();
        let gas = obj.remove("gasLimit").unwrap();
        let data = obj.remove("data").unwrap();
        obj.insert("gas".into(), gas);
        obj.insert("input".into(), data);
        let legacy = Transaction::from_rpc(&legacy).unwrap();

        assert_eq!(legacy.serialize(), canonical.serialize());
        assert_eq!(legacy.hash(), canonical.hash());
    }

    #[test]
    fn canonical_name_wins_over_legacy() {
        let mut record = base_record();
        record["gas"] = json!("0xffff");
        let tx = Transaction::from_rpc(&record).unwrap();
        // gasLimit 0x5208, not the legacy gas value
        assert_eq!(tx.fields()[2].to_vec(), vec![0x52, 0x08]);
    }

    #[test]
    fn absent_to_means_contract_creation() {
        let mut record = base_record();
        record.as_object_mut().unwrap().remove("to");
        let tx = Transaction::from_rpc(&record).unwrap();
        assert!(tx.fields()[3].is_empty());
    }

    #[test]
    fn present_to_is_twenty_bytes_left_padded() {
        let mut record = base_record();
        record["to"] = json!("0x1");
        let tx = Transaction::from_rpc(&record).unwrap();
        let mut expected = vec![0_u8; 20];
        expected[19] = 1;
        assert_eq!(tx.fields()[3].to_vec(), expected);
    }

    #[test]
    fn zero_like_numeric_fields_encode_empty() {
        let tx = Transaction::from_rpc(&json!({
            "nonce": "0x0",
            "gasPrice": null,
            "value": 0,
        }))
        .unwrap();
        for field in &tx.fields()[..3] {
            assert!(field.is_empty());
        }
    }

    #[test]
    fn sender_is_attached_but_never_encoded() {
        let tx = Transaction::from_rpc(&base_record()).unwrap();
        assert_eq!(
            tx.sender().unwrap().to_string().to_lowercase(),
            "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f"
        );
        let sender_bytes = tx.sender().unwrap().to_vec();
        assert!(tx
            .fields()
            .iter()
            .all(|field| field.to_vec() != sender_bytes));
    }

    #[test]
    fn matching_declared_hash_is_pinned_verbatim() {
        let unhashed = Transaction::from_rpc(&base_record()).unwrap();
        let declared = unhashed.hash();

        let mut record = base_record();
        record["hash"] = json!(declared.to_string());
        let tx = Transaction::from_rpc(&record).unwrap();
        assert_eq!(tx.hash(), declared);
    }

    #[test]
    fn declared_hash_survives_field_normalization() {
        let declared = Transaction::from_rpc(&base_record()).unwrap().hash();

        // same transaction spelled with the legacy field names
        let mut record = base_record();
        let obj = record.as_object_mut().unwrap();
        let gas = obj.remove("gasLimit").unwrap();
        obj.insert("gas".into(), gas);
        obj.insert("hash".into(), json!(declared.to_string()));

        let tx = Transaction::from_rpc(&record).unwrap();
        assert_eq!(tx.hash(), declared);
    }

    #[test_log::test]
    fn mismatched_declared_hash_aborts_reconstruction() {
        let mut record = base_record();
        record["hash"] =
            json!("0x1111111111111111111111111111111111111111111111111111111111111111");
        let err = Transaction::from_rpc(&record).unwrap_err();
        assert_matches!(err, ObjectError::Integrity { declared, computed, encoded } => {
            assert!(declared.starts_with("0x1111"));
            assert_ne!(declared, computed);
            assert!(encoded.starts_with("0x"));
        });
    }

    #[rstest]
    #[case(json!(""))]
    #[case(json!("0x"))]
    #[case(json!(null))]
    fn empty_declared_hash_skips_the_check(#[case] hash: Value) {
        let mut record = base_record();
        record["hash"] = hash;
        let tx = Transaction::from_rpc(&record).unwrap();
        // nothing pinned: the hash is recomputed from the fields
        assert_eq!(tx.hash(), keccak256(tx.serialize()));
    }

    #[test]
    fn encoding_round_trips() {
        let tx = Transaction::from_rpc(&base_record()).unwrap();
        let encoded = tx.serialize();
        let decoded = Transaction::from_encoded(&encoded).unwrap();
        assert_eq!(decoded.serialize(), encoded);
        assert_eq!(decoded.fields(), tx.fields());
    }

    #[test]
    fn short_field_lists_are_rejected() {
        let encoded = alloy_rlp::encode(&vec![Bytes::new(); 3]);
        assert_matches!(
            Transaction::from_encoded(&encoded),
            Err(ObjectError::UnexpectedShape(_))
        );
    }
}
