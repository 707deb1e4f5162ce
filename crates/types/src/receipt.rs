//! Canonical encoding of a transaction receipt.

use alloy_primitives::{keccak256, Bytes, B256};
use alloy_rlp::{Decodable, Encodable};
use ethcanon_primitives::{to_buffer, to_variable_buffer, ByteWidth, Item};
use serde_json::{Map, Value};

use crate::error::ObjectError;
use crate::rpc;

const FIELD_COUNT: usize = 4;

/// A receipt's four fields in fixed order:
/// `[status-or-root, cumulativeGasUsed, logsBloom, logs]`, where each log
/// entry is the ordered triple `[address, topics, data]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    fields: Vec<Item>,
}

impl Receipt {
    pub fn from_rpc(record: &Value) -> Result<Self, ObjectError> {
        let obj = record
            .as_object()
            .ok_or(ObjectError::UnexpectedShape("a receipt object"))?;

        // a boolean-like status trims like an integer (a failed receipt
        // encodes as the empty string); a pre-Byzantium state root passes
        // through untouched
        let status_or_root = if let Some(status) = rpc::field(obj, &["status"]) {
            to_variable_buffer(status)?
        } else if let Some(root) = rpc::field(obj, &["root"]) {
            to_buffer(root, ByteWidth::Unbounded)?
        } else {
            Default::default()
        };

        let gas_used = match rpc::field(obj, &["cumulativeGasUsed"]) {
            Some(value) => to_variable_buffer(value)?,
            None => Default::default(),
        };
        let bloom = match rpc::field(obj, &["logsBloom", "bloom"]) {
            Some(value) => to_buffer(value, ByteWidth::Exact(256))?,
            None => to_buffer(&Value::Null, ByteWidth::Exact(256))?,
        };

        let mut logs = Vec::new();
        if let Some(Value::Array(entries)) = rpc::field(obj, &["logs"]) {
            for entry in entries {
                logs.push(encode_log(entry)?);
            }
        }

        Ok(Self {
            fields: vec![
                Item::Bytes(status_or_root),
                Item::Bytes(gas_used),
                Item::Bytes(bloom),
                Item::List(logs),
            ],
        })
    }

    /// Decodes a receipt from its canonical four-field encoding.
    pub fn from_encoded(buf: &[u8]) -> Result<Self, ObjectError> {
        let fields = Vec::<Item>::decode(&mut &buf[..])?;
        if fields.len() != FIELD_COUNT {
            return Err(ObjectError::UnexpectedShape("a four-field receipt list"));
        }
        Ok(Self { fields })
    }

    pub fn serialize(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    pub fn hash(&self) -> B256 {
        keccak256(self.serialize())
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.serialize()))
    }

    pub fn fields(&self) -> &[Item] {
        &self.fields
    }
}

impl Encodable for Receipt {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        self.fields.encode(out);
    }

    fn length(&self) -> usize {
        self.fields.length()
    }
}

/// One log entry as the ordered triple `[address, topics, data]`.
fn encode_log(entry: &Value) -> Result<Item, ObjectError> {
    let obj = entry
        .as_object()
        .ok_or(ObjectError::UnexpectedShape("a log object"))?;

    let address = field_or_empty(obj, "address", ByteWidth::Exact(20))?;
    let mut topics = Vec::new();
    if let Some(Value::Array(entries)) = rpc::field(obj, &["topics"]) {
        for topic in entries {
            topics.push(Item::Bytes(to_buffer(topic, ByteWidth::Exact(32))?));
        }
    }
    let data = field_or_empty(obj, "data", ByteWidth::Unbounded)?;

    Ok(Item::List(vec![
        Item::Bytes(address),
        Item::List(topics),
        Item::Bytes(data),
    ]))
}

fn field_or_empty(
    obj: &Map<String, Value>,
    name: &str,
    width: ByteWidth,
) -> Result<Bytes, ObjectError> {
    match rpc::field(obj, &[name]) {
        Some(value) => Ok(to_buffer(value, width)?),
        None => Ok(to_buffer(&Value::Null, width)?),
    }
}
