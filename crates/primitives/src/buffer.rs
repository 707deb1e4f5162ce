//! Conversion of loosely-typed JSON-RPC values (hex strings, numbers,
//! booleans) into canonical byte buffers.
//!
//! The same logical value can arrive from a remote node in several textual
//! shapes; every consumer in this workspace funnels field values through
//! [`to_buffer`] so that one shape never hashes differently from another.

use alloy_primitives::Bytes;
use serde_json::Value;

/// How a converted value is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteWidth {
    /// Minimal big-endian representation: leading zero bytes are trimmed
    /// and a zero value becomes the empty buffer (the RLP convention for
    /// integers).
    Variable,
    /// Exactly this many bytes: shorter values are left-padded with zeros,
    /// longer values keep their rightmost bytes.
    Exact(usize),
    /// Hex-decoded as-is; no trimming, no padding. Used for opaque data
    /// fields whose leading zeros are significant.
    Unbounded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot convert {0} to bytes: expected hex string, number, boolean or null")]
    UnsupportedValue(String),
    #[error("invalid hex value {value:?}: {reason}")]
    InvalidHex { value: String, reason: String },
    #[error("number {0} is not an unsigned integer")]
    NonIntegerNumber(String),
}

/// Converts a JSON value into a byte buffer of the requested width.
///
/// Accepted shapes: `null` (empty), hex strings with an optional `0x`
/// prefix (odd-length values gain a leading zero nibble), unsigned
/// integers, and booleans. Anything else is a
/// [`ConversionError::UnsupportedValue`].
pub fn to_buffer(value: &Value, width: ByteWidth) -> Result<Bytes, ConversionError> {
    let raw = match value {
        Value::Null => Vec::new(),
        Value::String(s) => decode_hex(s)?,
        Value::Number(n) => {
            let n = n
                .as_u64()
                .ok_or_else(|| ConversionError::NonIntegerNumber(n.to_string()))?;
            // minimal big-endian, but zero keeps one byte so that the
            // width rules below decide whether it survives
            let mut hex = format!("{n:x}");
            if hex.len() % 2 != 0 {
                hex.insert(0, '0');
            }
            decode_hex(&hex)?
        }
        Value::Bool(true) => vec![0x01],
        Value::Bool(false) => Vec::new(),
        other => return Err(ConversionError::UnsupportedValue(other.to_string())),
    };

    let sized = match width {
        ByteWidth::Variable => {
            let first = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
            raw[first..].to_vec()
        }
        ByteWidth::Exact(len) => {
            if raw.len() >= len {
                raw[raw.len() - len..].to_vec()
            } else {
                let mut padded = vec![0_u8; len - raw.len()];
                padded.extend_from_slice(&raw);
                padded
            }
        }
        ByteWidth::Unbounded => raw,
    };
    Ok(sized.into())
}

/// [`to_buffer`] with [`ByteWidth::Variable`]: the conversion for values
/// that must never carry leading zero bytes.
pub fn to_variable_buffer(value: &Value) -> Result<Bytes, ConversionError> {
    to_buffer(value, ByteWidth::Variable)
}

/// Reads a JSON value as a `u64`: native numbers directly, strings as hex
/// (with or without the `0x` prefix), `null` as zero.
pub fn to_u64(value: &Value) -> Result<u64, ConversionError> {
    match value {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ConversionError::NonIntegerNumber(n.to_string())),
        Value::String(s) => {
            let digits = strip_prefix(s);
            if digits.is_empty() {
                return Ok(0);
            }
            u64::from_str_radix(digits, 16).map_err(|e| ConversionError::InvalidHex {
                value: s.clone(),
                reason: e.to_string(),
            })
        }
        other => Err(ConversionError::UnsupportedValue(other.to_string())),
    }
}

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, ConversionError> {
    let digits = strip_prefix(s);
    let padded;
    let digits = if digits.len() % 2 != 0 {
        padded = format!("0{digits}");
        &padded
    } else {
        digits
    };
    hex::decode(digits).map_err(|e| ConversionError::InvalidHex {
        value: s.to_string(),
        reason: e.to_string(),
    })
}
