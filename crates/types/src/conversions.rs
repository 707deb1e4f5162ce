//! Hex-string ⇄ header round-trip helpers.

use serde_json::Value;

use crate::error::ObjectError;
use crate::header::BlockHeader;

/// Builds a header from any header-like value and renders its canonical
/// encoding as a `0x`-prefixed hex string.
pub fn header_to_hex(header_like: &Value) -> Result<String, ObjectError> {
    Ok(BlockHeader::from_value(header_like)?.to_hex())
}

/// Parses a header back out of its hex form.
pub fn header_from_hex(hex_str: &str) -> Result<BlockHeader, ObjectError> {
    BlockHeader::from_hex(hex_str)
}
