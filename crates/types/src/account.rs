//! Canonical encoding of an account state record.

use alloy_primitives::{keccak256, Bytes, B256};
use alloy_rlp::{Decodable, Encodable};
use ethcanon_primitives::{to_buffer, ByteWidth, EMPTY_HASH, EMPTY_TRIE_ROOT};
use serde_json::{Map, Value};

use crate::error::ObjectError;
use crate::rpc;

const FIELD_COUNT: usize = 4;

/// An account's four state fields in fixed order:
/// `[nonce, balance, storageRoot, codeHash]`.
///
/// Each field defaults independently: `nonce` and `balance` to the single
/// zero byte, `storageRoot` to [`EMPTY_TRIE_ROOT`], `codeHash` to
/// [`EMPTY_HASH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    fields: Vec<Bytes>,
}

impl Account {
    pub fn from_rpc(record: &Value) -> Result<Self, ObjectError> {
        let obj = record
            .as_object()
            .ok_or(ObjectError::UnexpectedShape("an account object"))?;

        let nonce = zero_defaulted(obj, &["nonce"])?;
        let balance = zero_defaulted(obj, &["balance"])?;
        // `storageHash` is the eth_getProof spelling
        let storage_root = match rpc::field(obj, &["storageRoot", "storageHash"]) {
            Some(value) => to_buffer(value, ByteWidth::Exact(32))?,
            None => Bytes::copy_from_slice(EMPTY_TRIE_ROOT.as_slice()),
        };
        let code_hash = match rpc::field(obj, &["codeHash"]) {
            Some(value) => to_buffer(value, ByteWidth::Exact(32))?,
            None => Bytes::copy_from_slice(EMPTY_HASH.as_slice()),
        };

        Ok(Self {
            fields: vec![nonce, balance, storage_root, code_hash],
        })
    }

    /// Decodes an account from its canonical four-field encoding.
    pub fn from_encoded(buf: &[u8]) -> Result<Self, ObjectError> {
        let fields = Vec::<Bytes>::decode(&mut &buf[..])?;
        if fields.len() != FIELD_COUNT {
            return Err(ObjectError::UnexpectedShape("a four-field account list"));
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

    pub fn fields(&self) -> &[Bytes] {
        &self.fields
    }
}

impl Encodable for Account {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        self.fields.encode(out);
    }

    fn length(&self) -> usize {
        self.fields.length()
    }
}

/// Account quantities pass through without trimming, so a zero arrives as
/// the single byte `0x00` — which is also the default for an absent field.
fn zero_defaulted(obj: &Map<String, Value>, aliases: &[&str]) -> Result<Bytes, ObjectError> {
    match rpc::field(obj, aliases) {
        Some(value) => Ok(to_buffer(value, ByteWidth::Unbounded)?),
        None => Ok(Bytes::from_static(&[0x00])),
    }
}
