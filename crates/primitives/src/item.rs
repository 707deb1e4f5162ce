//! A dynamically-shaped RLP value: a byte string or a list of nested
//! items.
//!
//! Ledger objects received from a remote node are consumed as plain field
//! lists before any schema is applied, so the codec needs a value type
//! that can hold whatever `decode` produced. `decode(encode(x)) == x`
//! holds for every well-formed item.

use alloy_primitives::Bytes;
use alloy_rlp::{length_of_length, Decodable, Encodable, Header};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Bytes(Bytes),
    List(Vec<Item>),
}

impl Item {
    /// The RLP encoding of this item.
    pub fn encoded(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    /// The payload when this item is a byte string.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::List(_) => None,
        }
    }

    fn payload_length(items: &[Self]) -> usize {
        items.iter().map(Encodable::length).sum()
    }
}

impl From<Bytes> for Item {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<Item>> for Item {
    fn from(items: Vec<Item>) -> Self {
        Self::List(items)
    }
}

impl Encodable for Item {
    fn encode(&self, out: &mut dyn bytes::BufMut) {
        match self {
            Self::Bytes(bytes) => bytes.encode(out),
            Self::List(items) => {
                Header {
                    list: true,
                    payload_length: Self::payload_length(items),
                }
                .encode(out);
                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.length(),
            Self::List(items) => {
                let payload_length = Self::payload_length(items);
                payload_length + length_of_length(payload_length)
            }
        }
    }
}

impl Decodable for Item {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if buf.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort);
        }
        let (mut payload, rest) = buf.split_at(header.payload_length);
        *buf = rest;

        if header.list {
            let mut items = Vec::new();
            while !payload.is_empty() {
                items.push(Self::decode(&mut payload)?);
            }
            Ok(Self::List(items))
        } else {
            Ok(Self::Bytes(Bytes::copy_from_slice(payload)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn bytes(data: &[u8]) -> Item {
        Item::Bytes(Bytes::copy_from_slice(data))
    }

    #[rstest]
    #[case(bytes(b""), vec![0x80])]
    #[case(bytes(b"\x00"), vec![0x00])]
    #[case(bytes(b"\x7f"), vec![0x7f])]
    #[case(bytes(b"dog"), vec![0x83, b'd', b'o', b'g'])]
    #[case(Item::List(vec![]), vec![0xc0])]
    #[case(
        Item::List(vec![bytes(b"cat"), bytes(b"dog")]),
        vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
    )]
    fn encodes_known_vectors(#[case] item: Item, #[case] expected: Vec<u8>) {
        assert_eq!(item.encoded(), expected);
        assert_eq!(item.length(), expected.len());
    }

    #[rstest]
    #[case(bytes(b""))]
    #[case(bytes(b"\x00"))]
    #[case(bytes(&[0xab; 60]))]
    #[case(Item::List(vec![]))]
    #[case(Item::List(vec![bytes(b"cat"), Item::List(vec![bytes(b"dog"), bytes(b"")])]))]
    fn round_trips(#[case] item: Item) {
        let encoded = item.encoded();
        let decoded = Item::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, item);
        assert_eq!(decoded.encoded(), encoded);
    }

    #[test]
    fn decodes_nested_lists() {
        // [[], [[]], [[], [[]]]]
        let encoded = [0xc7, 0xc0, 0xc1, 0xc0, 0xc3, 0xc0, 0xc1, 0xc0];
        let decoded = Item::decode(&mut encoded.as_slice()).unwrap();
        let empty = Item::List(vec![]);
        let one = Item::List(vec![empty.clone()]);
        assert_eq!(
            decoded,
            Item::List(vec![empty.clone(), one.clone(), Item::List(vec![empty, one])])
        );
    }

    #[test]
    fn truncated_input_is_rejected() {
        let encoded = [0x83, b'd', b'o'];
        assert_eq!(
            Item::decode(&mut encoded.as_slice()),
            Err(alloy_rlp::Error::InputTooShort)
        );
    }

    #[test]
    fn top_level_vec_round_trips() {
        let fields = vec![bytes(b"cat"), Item::List(vec![bytes(b"dog")])];
        let encoded = alloy_rlp::encode(&fields);
        let decoded = Vec::<Item>::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded, fields);
    }
}
