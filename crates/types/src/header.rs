//! The block header codec.
//!
//! A header is an ordered list of byte-string fields. It can be built
//! from three input shapes — a raw canonical encoding, a hex string, or a
//! loosely-typed field-name object out of a JSON-RPC response — and all
//! three produce the same internal field list, so the same logical header
//! always hashes to the same digest no matter how it arrived.

use alloy_primitives::{keccak256, Bytes, B256};
use alloy_rlp::{Decodable, Encodable};
use ethcanon_primitives::{to_buffer, ByteWidth, Item, EMPTY_HASH};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ObjectError;
use crate::rpc;
use crate::transaction::Transaction;

/// One logical header field: its accepted spellings (first present wins)
/// and the byte width its value is normalized to.
struct FieldSchema {
    aliases: &'static [&'static str],
    width: ByteWidth,
}

/// The thirteen mandatory fields, in canonical order. The RPC spelling is
/// listed first, the older field name second.
const HEADER_SCHEMA: [FieldSchema; 13] = [
    FieldSchema { aliases: &["parentHash"], width: ByteWidth::Exact(32) },
    FieldSchema { aliases: &["sha3Uncles", "uncleHash"], width: ByteWidth::Exact(32) },
    FieldSchema { aliases: &["miner", "coinbase"], width: ByteWidth::Exact(20) },
    FieldSchema { aliases: &["stateRoot"], width: ByteWidth::Exact(32) },
    FieldSchema { aliases: &["transactionsRoot", "transactionsTrie"], width: ByteWidth::Exact(32) },
    FieldSchema { aliases: &["receiptsRoot", "receiptTrie"], width: ByteWidth::Exact(32) },
    FieldSchema { aliases: &["logsBloom", "bloom"], width: ByteWidth::Exact(256) },
    FieldSchema { aliases: &["difficulty"], width: ByteWidth::Variable },
    FieldSchema { aliases: &["number"], width: ByteWidth::Variable },
    FieldSchema { aliases: &["gasLimit"], width: ByteWidth::Variable },
    FieldSchema { aliases: &["gasUsed"], width: ByteWidth::Variable },
    FieldSchema { aliases: &["timestamp"], width: ByteWidth::Variable },
    FieldSchema { aliases: &["extraData"], width: ByteWidth::Unbounded },
];

/// The variable tail after the thirteen mandatory fields. Selected once
/// at construction: a non-empty `sealFields` list means a sealed header,
/// otherwise the proof-of-work pair applies, each half independently
/// optional. The two shapes never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SealTail {
    /// Opaque consensus-engine seal values, each already stripped of its
    /// carrier encoding.
    Sealed(Vec<Item>),
    ProofOfWork {
        mix_hash: Option<Bytes>,
        nonce: Option<Bytes>,
    },
}

impl SealTail {
    fn from_rpc(obj: &Map<String, Value>) -> Result<Self, ObjectError> {
        if let Some(Value::Array(entries)) = rpc::field(obj, &["sealFields"]) {
            if !entries.is_empty() {
                let mut seal = Vec::with_capacity(entries.len());
                for entry in entries {
                    let carrier = to_buffer(entry, ByteWidth::Unbounded)?;
                    seal.push(Item::decode(&mut &carrier[..])?);
                }
                return Ok(Self::Sealed(seal));
            }
        }
        let mix_hash = rpc::field(obj, &["mixHash"])
            .map(|value| to_buffer(value, ByteWidth::Exact(32)))
            .transpose()?;
        let nonce = rpc::field(obj, &["nonce"])
            .map(|value| to_buffer(value, ByteWidth::Exact(8)))
            .transpose()?;
        Ok(Self::ProofOfWork { mix_hash, nonce })
    }

    fn append_to(self, fields: &mut Vec<Item>) {
        match self {
            Self::Sealed(seal) => fields.extend(seal),
            Self::ProofOfWork { mix_hash, nonce } => {
                fields.extend(mix_hash.map(Item::Bytes));
                fields.extend(nonce.map(Item::Bytes));
            }
        }
    }
}

/// A block header as an ordered canonical field list, with the
/// transactions the payload embedded (if it carried full objects rather
/// than hashes) attached alongside.
///
/// The field list is populated once at construction and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHeader {
    fields: Vec<Item>,
    transactions: Option<Vec<Transaction>>,
}

impl BlockHeader {
    /// Decodes a header from its canonical encoding. The decoded list is
    /// taken verbatim — no schema is applied, and an empty input is a
    /// legal zero-field header.
    pub fn from_encoded(buf: &[u8]) -> Result<Self, ObjectError> {
        if buf.is_empty() {
            return Ok(Self::default());
        }
        let fields = Vec::<Item>::decode(&mut &buf[..])?;
        Ok(Self {
            fields,
            transactions: None,
        })
    }

    /// Decodes a header from a hex string with an optional `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, ObjectError> {
        let raw = to_buffer(&Value::from(hex_str), ByteWidth::Unbounded)?;
        Self::from_encoded(&raw)
    }

    /// Builds a header from a JSON-RPC block object.
    ///
    /// Each mandatory field resolves through its alias table and falls
    /// back to [`EMPTY_HASH`] when no spelling is present, keeping the
    /// encoding fixed-width and unambiguous. The tail is then selected
    /// once: a non-empty `sealFields` list means a sealed header,
    /// otherwise the proof-of-work pair applies.
    pub fn from_rpc(value: &Value) -> Result<Self, ObjectError> {
        let obj = value
            .as_object()
            .ok_or(ObjectError::UnexpectedShape("a block header object"))?;

        let mut fields = Vec::with_capacity(HEADER_SCHEMA.len() + 2);
        for schema in &HEADER_SCHEMA {
            let bytes = match rpc::field(obj, schema.aliases) {
                Some(value) => to_buffer(value, schema.width)?,
                None => to_buffer(&Value::from(EMPTY_HASH.to_string()), schema.width)?,
            };
            fields.push(Item::Bytes(bytes));
        }

        let tail = SealTail::from_rpc(obj)?;
        debug!(
            sealed = matches!(tail, SealTail::Sealed(_)),
            "selected header tail"
        );
        tail.append_to(&mut fields);

        let transactions = embedded_transactions(obj)?;

        Ok(Self {
            fields,
            transactions,
        })
    }

    /// Builds a header from either remaining textual shape: a hex string
    /// or a field-name object.
    pub fn from_value(value: &Value) -> Result<Self, ObjectError> {
        match value {
            Value::String(s) => Self::from_hex(s),
            Value::Object(_) => Self::from_rpc(value),
            _ => Err(ObjectError::UnexpectedShape(
                "a hex string or a block header object",
            )),
        }
    }

    /// The canonical encoding of the field list; identical on every call.
    pub fn serialize(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    /// keccak256 of the canonical encoding.
    pub fn hash(&self) -> B256 {
        keccak256(self.serialize())
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.serialize()))
    }

    pub fn fields(&self) -> &[Item] {
        &self.fields
    }

    /// The transactions embedded in the source payload, when it carried
    /// full objects rather than hashes.
    pub fn transactions(&self) -> Option<&[Transaction]> {
        self.transactions.as_deref()
    }
}

impl Encodable for BlockHeader {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        self.fields.encode(out);
    }

    fn length(&self) -> usize {
        self.fields.length()
    }
}

fn embedded_transactions(
    obj: &Map<String, Value>,
) -> Result<Option<Vec<Transaction>>, ObjectError> {
    match obj.get("transactions") {
        Some(Value::Array(list)) if list.first().is_some_and(Value::is_object) => {
            let mut transactions = Vec::with_capacity(list.len());
            for record in list {
                transactions.push(Transaction::from_rpc(record)?);
            }
            debug!(count = transactions.len(), "reconstructed embedded transactions");
            Ok(Some(transactions))
        }
        _ => Ok(None),
    }
}
